//! Window-to-handler registry
//!
//! GLFW hands every callback the raw window pointer it fired for. Rather than
//! stashing an untyped pointer on the native window, each interactor registers
//! itself here under its window's id and the registry routes drained events to
//! the right handler.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Weak;

use super::{NativeEvent, WindowId};

/// Receiver of native events for one window
pub trait NativeEventSink {
    /// Decode and dispatch one native event; returns `true` when an observer consumed it
    fn handle_native_event(&mut self, event: NativeEvent) -> bool;
}

/// Maps window ids to the sink handling their callbacks
///
/// Entries are weak: dropping the interactor is enough to stop delivery, and
/// dead entries are pruned on the next lookup.
#[derive(Default)]
pub struct CallbackRegistry {
    sinks: RefCell<HashMap<WindowId, Weak<RefCell<dyn NativeEventSink>>>>,
}

impl CallbackRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `window` to `sink`, replacing any previous binding
    pub fn register(&self, window: WindowId, sink: Weak<RefCell<dyn NativeEventSink>>) {
        if self.sinks.borrow_mut().insert(window, sink).is_some() {
            log::debug!("Rebinding callbacks for window {}", window.raw());
        }
    }

    /// Remove the binding for `window`
    pub fn unregister(&self, window: WindowId) -> bool {
        self.sinks.borrow_mut().remove(&window).is_some()
    }

    /// Whether `window` has a live sink
    pub fn is_registered(&self, window: WindowId) -> bool {
        self.sinks
            .borrow()
            .get(&window)
            .is_some_and(|sink| sink.strong_count() > 0)
    }

    /// Number of bindings, live or not
    pub fn len(&self) -> usize {
        self.sinks.borrow().len()
    }

    /// True when nothing is bound
    pub fn is_empty(&self) -> bool {
        self.sinks.borrow().is_empty()
    }

    /// Deliver `event` to the sink bound to `window`
    ///
    /// Returns `false` when no live sink is bound, or when the sink is already
    /// busy handling an event (an observer pumping the queue re-entrantly).
    pub fn dispatch(&self, window: WindowId, event: NativeEvent) -> bool {
        let sink = self.sinks.borrow().get(&window).map(Weak::upgrade);
        match sink {
            Some(Some(sink)) => match sink.try_borrow_mut() {
                Ok(mut sink) => {
                    sink.handle_native_event(event);
                    true
                }
                Err(_) => {
                    log::warn!(
                        "Dropping {:?} for window {}: handler is busy",
                        event.channel(),
                        window.raw()
                    );
                    false
                }
            },
            Some(None) => {
                self.sinks.borrow_mut().remove(&window);
                log::trace!("Pruned dead handler for window {}", window.raw());
                false
            }
            None => {
                log::trace!("No handler bound for window {}", window.raw());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        events: Vec<NativeEvent>,
    }

    impl NativeEventSink for Recorder {
        fn handle_native_event(&mut self, event: NativeEvent) -> bool {
            self.events.push(event);
            false
        }
    }

    #[test]
    fn test_dispatch_reaches_bound_sink() {
        let registry = CallbackRegistry::new();
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let sink: Rc<RefCell<dyn NativeEventSink>> = recorder.clone();
        let window = WindowId::next();
        registry.register(window, Rc::downgrade(&sink));

        assert!(registry.dispatch(window, NativeEvent::Char('x')));
        assert!(!registry.dispatch(WindowId::next(), NativeEvent::Char('y')));
        assert_eq!(recorder.borrow().events, vec![NativeEvent::Char('x')]);
    }

    #[test]
    fn test_dead_sinks_are_pruned() {
        let registry = CallbackRegistry::new();
        let window = WindowId::next();
        {
            let sink: Rc<RefCell<dyn NativeEventSink>> = Rc::new(RefCell::new(Recorder::default()));
            registry.register(window, Rc::downgrade(&sink));
            assert!(registry.is_registered(window));
        }
        assert!(!registry.is_registered(window));
        assert!(!registry.dispatch(window, NativeEvent::CursorEnter(true)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister() {
        let registry = CallbackRegistry::new();
        let sink: Rc<RefCell<dyn NativeEventSink>> = Rc::new(RefCell::new(Recorder::default()));
        let window = WindowId::next();
        registry.register(window, Rc::downgrade(&sink));
        assert!(registry.unregister(window));
        assert!(!registry.unregister(window));
        assert!(!registry.dispatch(window, NativeEvent::Size(1, 1)));
    }
}
