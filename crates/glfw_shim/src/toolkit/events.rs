//! Toolkit events and observer dispatch
//!
//! Mirrors the toolkit's command/observer mechanism:
//! - Handlers are registered per event id (only interested observers run)
//! - Observers run in registration order
//! - An observer returning `true` consumes the event and stops forwarding
//! - Event data lives in the interactor's [`EventInfo`]; observers read it
//!   through the [`EventContext`] they are handed

use std::collections::HashMap;
use std::path::PathBuf;

/// High-level events an interactor raises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventId {
    /// Character typed
    Char,
    /// Cursor position while files are dragged over the window
    UpdateDropLocation,
    /// Files dropped on the window
    DropFiles,
    /// Cursor entered the window
    Enter,
    /// Cursor left the window
    Leave,
    /// Cursor moved
    MouseMove,
    /// Left button pressed
    LeftButtonPress,
    /// Left button released
    LeftButtonRelease,
    /// Middle button pressed
    MiddleButtonPress,
    /// Middle button released
    MiddleButtonRelease,
    /// Right button pressed
    RightButtonPress,
    /// Right button released
    RightButtonRelease,
    /// Wheel rolled away from the user
    MouseWheelForward,
    /// Wheel rolled towards the user
    MouseWheelBackward,
    /// Horizontal scroll to the left
    MouseWheelLeft,
    /// Horizontal scroll to the right
    MouseWheelRight,
    /// Key pressed or auto-repeated
    KeyPress,
    /// Key released
    KeyRelease,
    /// Window resized
    Configure,
    /// Application asked to exit
    Exit,
}

/// Extra data attached to an event invocation
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EventPayload {
    /// Nothing beyond [`EventInfo`]
    #[default]
    None,
    /// Window-space location `[x, y]`
    Location([f64; 2]),
    /// Dropped file paths
    FilePaths(Vec<PathBuf>),
}

/// Normalized input state shared by every event
///
/// Positions use the toolkit's convention: origin bottom-left, so native
/// y coordinates are flipped against the window height.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventInfo {
    /// Current pointer position
    pub position: (i32, i32),
    /// Pointer position before the last update
    pub last_position: (i32, i32),
    /// Control held
    pub control: bool,
    /// Shift held
    pub shift: bool,
    /// Alt held
    pub alt: bool,
    /// Character associated with the last key event
    pub key_code: Option<char>,
    /// 1 for auto-repeated keys, 0 otherwise
    pub repeat_count: u32,
    /// Key symbol name of the last key event
    pub key_sym: Option<String>,
}

impl EventInfo {
    /// Record a pointer event
    pub fn set_event_information(&mut self, x: i32, y: i32, control: bool, shift: bool) {
        self.last_position = self.position;
        self.position = (x, y);
        self.control = control;
        self.shift = shift;
    }

    /// Record a key event; the pointer position is left untouched
    pub fn set_key_event_information(
        &mut self,
        control: bool,
        shift: bool,
        key_code: Option<char>,
        repeat_count: u32,
        key_sym: Option<String>,
    ) {
        self.control = control;
        self.shift = shift;
        self.key_code = key_code;
        self.repeat_count = repeat_count;
        self.key_sym = key_sym;
    }
}

/// What an observer sees when it runs
pub struct EventContext<'a> {
    /// Event being raised
    pub event: EventId,
    /// Input state at the time of the event
    pub info: &'a EventInfo,
    /// Event-specific data
    pub payload: &'a EventPayload,
    terminate: bool,
}

impl EventContext<'_> {
    /// Ask the interactor to leave its event loop once dispatch finishes
    pub fn request_terminate(&mut self) {
        self.terminate = true;
    }
}

/// Observer of interactor events
pub trait EventObserver {
    /// Handle an event, return true if consumed
    fn on_event(&mut self, context: &mut EventContext<'_>) -> bool;
}

impl<F> EventObserver for F
where
    F: FnMut(&mut EventContext<'_>) -> bool,
{
    fn on_event(&mut self, context: &mut EventContext<'_>) -> bool {
        self(context)
    }
}

/// Handle returned by [`EventDispatcher::add_observer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Result of one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dispatch {
    /// Some observer consumed the event
    pub consumed: bool,
    /// Some observer asked to terminate
    pub terminate: bool,
}

/// Observer table keyed by event id
#[derive(Default)]
pub struct EventDispatcher {
    observers: HashMap<EventId, Vec<(ObserverId, Box<dyn EventObserver>)>>,
    next_id: u64,
}

impl EventDispatcher {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer for `event`
    pub fn add_observer(&mut self, event: EventId, observer: Box<dyn EventObserver>) -> ObserverId {
        self.next_id += 1;
        let id = ObserverId(self.next_id);
        self.observers.entry(event).or_default().push((id, observer));
        id
    }

    /// Remove an observer; returns whether it was registered
    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        let mut removed = false;
        for observers in self.observers.values_mut() {
            let before = observers.len();
            observers.retain(|(observer, _)| *observer != id);
            removed |= observers.len() != before;
        }
        self.observers.retain(|_, observers| !observers.is_empty());
        removed
    }

    /// Whether anything observes `event`
    pub fn has_observer(&self, event: EventId) -> bool {
        self.observers.contains_key(&event)
    }

    /// Run the observers of `event` until one consumes it
    pub fn invoke(&mut self, event: EventId, info: &EventInfo, payload: &EventPayload) -> Dispatch {
        let mut context = EventContext {
            event,
            info,
            payload,
            terminate: false,
        };
        let mut consumed = false;
        if let Some(observers) = self.observers.get_mut(&event) {
            for (_, observer) in observers.iter_mut() {
                if observer.on_event(&mut context) {
                    consumed = true;
                    break;
                }
            }
        }
        Dispatch {
            consumed,
            terminate: context.terminate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str, consume: bool) -> Box<dyn EventObserver> {
        let log = Rc::clone(log);
        Box::new(move |_: &mut EventContext<'_>| {
            log.borrow_mut().push(name);
            consume
        })
    }

    #[test]
    fn test_only_interested_observers_run() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = EventDispatcher::new();
        dispatcher.add_observer(EventId::Char, recorder(&log, "char", false));
        dispatcher.add_observer(EventId::MouseMove, recorder(&log, "move", false));

        dispatcher.invoke(EventId::Char, &EventInfo::default(), &EventPayload::None);
        assert_eq!(*log.borrow(), vec!["char"]);
    }

    #[test]
    fn test_event_consumption() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = EventDispatcher::new();
        dispatcher.add_observer(EventId::KeyPress, recorder(&log, "first", true));
        dispatcher.add_observer(EventId::KeyPress, recorder(&log, "second", false));

        let dispatch = dispatcher.invoke(EventId::KeyPress, &EventInfo::default(), &EventPayload::None);
        assert!(dispatch.consumed);
        assert_eq!(*log.borrow(), vec!["first"]);
    }

    #[test]
    fn test_remove_observer() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = EventDispatcher::new();
        let id = dispatcher.add_observer(EventId::Exit, recorder(&log, "exit", false));
        assert!(dispatcher.has_observer(EventId::Exit));
        assert!(dispatcher.remove_observer(id));
        assert!(!dispatcher.remove_observer(id));
        assert!(!dispatcher.has_observer(EventId::Exit));
    }

    #[test]
    fn test_terminate_request() {
        let mut dispatcher = EventDispatcher::new();
        dispatcher.add_observer(
            EventId::KeyPress,
            Box::new(|context: &mut EventContext<'_>| {
                context.request_terminate();
                false
            }),
        );
        let dispatch = dispatcher.invoke(EventId::KeyPress, &EventInfo::default(), &EventPayload::None);
        assert!(dispatch.terminate);
        assert!(!dispatch.consumed);
    }

    #[test]
    fn test_event_information_tracks_last_position() {
        let mut info = EventInfo::default();
        info.set_event_information(10, 20, true, false);
        info.set_event_information(15, 25, false, true);
        assert_eq!(info.position, (15, 25));
        assert_eq!(info.last_position, (10, 20));
        assert!(!info.control);
        assert!(info.shift);
    }
}
