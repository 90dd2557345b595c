//! GLFW-backed interactor
//!
//! [`GlfwRenderWindowInteractor`] subscribes to the native input channels of
//! its render window, and on every native callback decodes the payload into
//! [`EventInfo`] and raises the matching [`EventId`].
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized ──initialize──▶ Initialized ──▶ Enabled ⇄ Disabled
//!                                                  │
//!                              terminate_app / close request
//!                                                  ▼
//!                                                Done
//! ```
//!
//! # Ownership
//!
//! The decoding state lives in an `Rc<RefCell<InteractorCore>>` that the
//! window system's [`CallbackRegistry`](crate::platform::CallbackRegistry)
//! references weakly under the window's id. The render window is held
//! weakly too: the application owns it.

pub mod decode;

use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::config::InteractorConfig;
use crate::platform::{
    Action, InputChannel, Key, Modifiers, MouseButton, NativeEvent, NativeEventSink, Platform,
    WindowId, WindowSystem,
};
use crate::toolkit::{
    EventDispatcher, EventId, EventInfo, EventObserver, EventPayload, InteractorBackend,
    ObserverId, RenderWindow, TimerKind, WindowBackend,
};

use decode::{button_event, flip_y, key_code_from_symbol, key_event, scroll_event, split_modifiers};

/// Decoding state reached from native callbacks
struct InteractorCore<P: Platform> {
    system: Rc<WindowSystem<P>>,
    window_id: Option<WindowId>,
    render_window: Option<Weak<RefCell<dyn WindowBackend>>>,
    enabled: bool,
    done: bool,
    mouse_in_window: bool,
    size: Rc<Cell<(i32, i32)>>,
    info: EventInfo,
    dispatcher: EventDispatcher,
}

impl<P: Platform> InteractorCore<P> {
    fn render_window(&self) -> Option<Rc<RefCell<dyn WindowBackend>>> {
        self.render_window.as_ref().and_then(Weak::upgrade)
    }

    fn keyboard_modifiers(&self) -> Modifiers {
        self.window_id
            .map(|window| self.system.platform().modifier_state(window))
            .unwrap_or_default()
    }

    fn cursor_position(&self) -> (f64, f64) {
        self.window_id
            .map_or((0.0, 0.0), |window| self.system.platform().cursor_pos(window))
    }

    fn invoke(&mut self, event: EventId, payload: &EventPayload) -> bool {
        let dispatch = self.dispatcher.invoke(event, &self.info, payload);
        if dispatch.terminate {
            self.done = true;
        }
        dispatch.consumed
    }

    fn set_pointer(&mut self, x: f64, y: f64, control: bool, shift: bool) {
        let (x, y) = flip_y(x, y, self.size.get().1);
        self.info.set_event_information(x, y, control, shift);
    }

    fn update_size(&mut self, width: i32, height: i32) {
        if self.size.get() == (width, height) {
            return;
        }
        self.size.set((width, height));
        if let Some(render_window) = self.render_window() {
            match render_window.try_borrow_mut() {
                Ok(mut render_window) => render_window.set_size(width, height),
                Err(_) => log::warn!("Render window busy; not resizing to {width}x{height}"),
            };
        }
    }

    fn on_char(&mut self, codepoint: char) -> bool {
        if !self.enabled {
            return false;
        }
        let (control, shift, alt) = split_modifiers(self.keyboard_modifiers());
        self.info.alt = alt;
        self.info
            .set_key_event_information(control, shift, Some(codepoint), 0, None);
        self.invoke(EventId::Char, &EventPayload::None)
    }

    fn on_drop(&mut self, paths: Vec<PathBuf>) -> bool {
        if !self.enabled {
            return false;
        }
        let (x, y) = self.cursor_position();
        self.invoke(EventId::UpdateDropLocation, &EventPayload::Location([x, y]));
        self.invoke(EventId::DropFiles, &EventPayload::FilePaths(paths))
    }

    fn on_enter(&mut self, entered: bool) -> bool {
        if !self.enabled {
            return false;
        }
        self.mouse_in_window = entered;
        let event = if entered { EventId::Enter } else { EventId::Leave };
        self.invoke(event, &EventPayload::None)
    }

    fn on_mouse_move(&mut self, x: f64, y: f64) -> bool {
        if !self.enabled || !self.mouse_in_window {
            return false;
        }
        let (control, shift, alt) = split_modifiers(self.keyboard_modifiers());
        self.info.alt = alt;
        self.set_pointer(x, y, control, shift);
        self.invoke(EventId::MouseMove, &EventPayload::None)
    }

    fn on_mouse_button(&mut self, button: MouseButton, action: Action, mods: Modifiers) -> bool {
        if !self.enabled {
            return false;
        }
        let (control, shift, alt) = split_modifiers(mods);
        self.info.alt = alt;
        let (x, y) = self.cursor_position();
        self.set_pointer(x, y, control, shift);

        match button_event(button, action) {
            Some(event) => self.invoke(event, &EventPayload::None),
            None => false,
        }
    }

    fn on_scroll(&mut self, dx: f64, dy: f64) -> bool {
        if !self.enabled {
            return false;
        }
        let (control, shift, alt) = split_modifiers(self.keyboard_modifiers());
        self.info.alt = alt;
        self.info.control = control;
        self.info.shift = shift;

        match scroll_event(dx, dy) {
            Some(event) => self.invoke(event, &EventPayload::None),
            None => false,
        }
    }

    fn on_key(&mut self, key: Key, scancode: i32, action: Action, mods: Modifiers) -> bool {
        if !self.enabled {
            return false;
        }
        let (control, shift, alt) = split_modifiers(mods);
        let key_sym = self.system.platform().key_name(key, scancode);
        let key_code = key_code_from_symbol(key_sym.as_deref());
        let repeat = u32::from(action == Action::Repeat);
        self.info.alt = alt;
        self.info
            .set_key_event_information(control, shift, key_code, repeat, key_sym);
        self.invoke(key_event(action), &EventPayload::None)
    }

    fn on_size(&mut self, width: i32, height: i32) -> bool {
        if !self.enabled {
            return false;
        }
        self.update_size(width, height);
        self.invoke(EventId::Configure, &EventPayload::None)
    }
}

impl<P: Platform> NativeEventSink for InteractorCore<P> {
    fn handle_native_event(&mut self, event: NativeEvent) -> bool {
        match event {
            NativeEvent::Char(codepoint) => self.on_char(codepoint),
            NativeEvent::FileDrop(paths) => self.on_drop(paths),
            NativeEvent::CursorEnter(entered) => self.on_enter(entered),
            NativeEvent::CursorPos(x, y) => self.on_mouse_move(x, y),
            NativeEvent::MouseButton(button, action, mods) => {
                self.on_mouse_button(button, action, mods)
            }
            NativeEvent::Scroll(dx, dy) => self.on_scroll(dx, dy),
            NativeEvent::Key {
                key,
                scancode,
                action,
                mods,
            } => self.on_key(key, scancode, action, mods),
            NativeEvent::Size(width, height) => self.on_size(width, height),
        }
    }
}

/// Interactor translating GLFW input into toolkit events
pub struct GlfwRenderWindowInteractor<P: Platform + 'static> {
    core: Rc<RefCell<InteractorCore<P>>>,
    initialized: bool,
    install_callbacks: bool,
    wait_timeout: Option<Duration>,
}

impl<P: Platform + 'static> GlfwRenderWindowInteractor<P> {
    /// Interactor with default settings
    pub fn new(system: Rc<WindowSystem<P>>) -> Self {
        Self::from_config(system, &InteractorConfig::default())
    }

    /// Interactor configured from `config`
    pub fn from_config(system: Rc<WindowSystem<P>>, config: &InteractorConfig) -> Self {
        let core = InteractorCore {
            system,
            window_id: None,
            render_window: None,
            enabled: false,
            done: false,
            mouse_in_window: true,
            size: Rc::new(Cell::new((0, 0))),
            info: EventInfo::default(),
            dispatcher: EventDispatcher::new(),
        };
        Self {
            core: Rc::new(RefCell::new(core)),
            initialized: false,
            install_callbacks: config.install_callbacks,
            wait_timeout: config.wait_timeout_ms.map(Duration::from_millis),
        }
    }

    /// Drive `render_window`; only a weak reference is kept
    pub fn set_render_window(&mut self, render_window: &RenderWindow) {
        self.core.borrow_mut().render_window = Some(render_window.downgrade());
    }

    /// Whether enabling subscribes to native input channels
    pub fn set_install_callbacks(&mut self, install: bool) {
        self.install_callbacks = install;
    }

    /// Size the interactor believes the window has
    pub fn size(&self) -> (i32, i32) {
        self.core.borrow().size.get()
    }

    /// Snapshot of the normalized event information
    pub fn event_info(&self) -> EventInfo {
        self.core.borrow().info.clone()
    }

    /// Whether the pointer is inside the window
    pub fn mouse_in_window(&self) -> bool {
        self.core.borrow().mouse_in_window
    }

    /// Native window this interactor is bound to
    pub fn window_id(&self) -> Option<WindowId> {
        self.core.borrow().window_id
    }

    fn render_window(&self) -> Option<Rc<RefCell<dyn WindowBackend>>> {
        self.core.borrow().render_window()
    }

    /// Whether the render window still exists and still owns native `window`
    fn drives_window(&self, window: WindowId) -> bool {
        self.render_window().is_some_and(|render_window| {
            render_window
                .try_borrow()
                .map_or(true, |render_window| render_window.native_window_id() == Some(window))
        })
    }

    fn set_channels(&self, enabled: bool) {
        let core = self.core.borrow();
        let Some(window) = core.window_id else {
            let verb = if enabled { "enable" } else { "disable" };
            log::warn!("No native window to {verb} input channels on");
            return;
        };
        let mut platform = core.system.platform_mut();
        for channel in InputChannel::ALL {
            platform.set_channel_enabled(window, channel, enabled);
        }
    }
}

impl<P: Platform + 'static> InteractorBackend for GlfwRenderWindowInteractor<P> {
    fn initialize(&mut self) {
        let Some(render_window) = self.render_window() else {
            log::error!("No render window defined!");
            return;
        };
        if self.initialized {
            return;
        }
        self.initialized = true;

        let size_cell = Rc::clone(&self.core.borrow().size);
        let (size, window) = {
            let mut render_window = render_window.borrow_mut();
            render_window.start();
            render_window.end();
            let size = render_window.size();
            render_window.position();
            render_window.attach_interactor_size(Rc::downgrade(&size_cell));
            (size, render_window.native_window_id())
        };

        {
            let mut core = self.core.borrow_mut();
            core.window_id = window;
            match window {
                Some(window) => {
                    let sink: Rc<RefCell<dyn NativeEventSink>> = self.core.clone();
                    core.system.registry().register(window, Rc::downgrade(&sink));
                }
                None => log::error!("Render window has no native window; input will not be delivered"),
            }
        }

        self.enable();
        size_cell.set(size);
    }

    fn enable(&mut self) {
        if !self.initialized {
            return;
        }
        if self.render_window().is_none() {
            log::error!("No render window defined!");
            return;
        }
        if self.install_callbacks {
            self.set_channels(true);
        }
        self.core.borrow_mut().enabled = true;
    }

    fn disable(&mut self) {
        if !self.initialized {
            return;
        }
        if self.render_window().is_none() {
            log::error!("No render window defined!");
            return;
        }
        if self.install_callbacks {
            self.set_channels(false);
        }
        self.core.borrow_mut().enabled = false;
    }

    fn process_events(&mut self) {
        let system = {
            let core = self.core.borrow();
            if !core.enabled {
                return;
            }
            Rc::clone(&core.system)
        };
        system.pump(self.wait_timeout);
    }

    fn start_event_loop(&mut self) {
        if !self.is_enabled() {
            return;
        }
        if self.render_window().is_none() {
            log::error!("No render window defined!");
            return;
        }
        let (system, window) = {
            let core = self.core.borrow();
            (Rc::clone(&core.system), core.window_id)
        };
        let Some(window) = window else {
            log::error!("Render window has no native window; not starting the event loop");
            return;
        };

        log::debug!("Entering event loop for window {}", window.raw());
        while self.is_enabled() && !self.is_done() {
            if !self.drives_window(window) {
                log::debug!("Window {} was destroyed", window.raw());
                self.core.borrow_mut().done = true;
                break;
            }
            if system.platform().window_should_close(window) {
                log::debug!("Window {} asked to close", window.raw());
                self.core.borrow_mut().done = true;
                break;
            }
            self.process_events();
        }
        log::debug!("Left event loop for window {}", window.raw());
    }

    fn terminate_app(&mut self) {
        self.core.borrow_mut().done = true;
    }

    fn exit_callback(&mut self) {
        {
            let mut core = self.core.borrow_mut();
            if core.dispatcher.has_observer(EventId::Exit) {
                core.invoke(EventId::Exit, &EventPayload::None);
            }
        }
        self.terminate_app();
    }

    /// There is no native timer behind this interactor: every request is
    /// accepted and logged, and nothing ever fires.
    fn create_timer(&mut self, timer_id: i32, kind: TimerKind, duration: Duration) -> bool {
        log::debug!("Timer {timer_id} ({kind:?}, {duration:?}) accepted without a native timer");
        true
    }

    fn destroy_timer(&mut self, platform_timer_id: i32) -> bool {
        log::debug!("Timer {platform_timer_id} released");
        true
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn is_enabled(&self) -> bool {
        self.core.borrow().enabled
    }

    fn is_done(&self) -> bool {
        self.core.borrow().done
    }

    fn add_observer(&mut self, event: EventId, observer: Box<dyn EventObserver>) -> ObserverId {
        self.core.borrow_mut().dispatcher.add_observer(event, observer)
    }

    fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.core.borrow_mut().dispatcher.remove_observer(id)
    }

    fn has_observer(&self, event: EventId) -> bool {
        self.core.borrow().dispatcher.has_observer(event)
    }

    fn on_char(&mut self, codepoint: char) -> bool {
        self.core.borrow_mut().on_char(codepoint)
    }

    fn on_drop(&mut self, paths: Vec<PathBuf>) -> bool {
        self.core.borrow_mut().on_drop(paths)
    }

    fn on_enter(&mut self, entered: bool) -> bool {
        self.core.borrow_mut().on_enter(entered)
    }

    fn on_mouse_move(&mut self, x: f64, y: f64) -> bool {
        self.core.borrow_mut().on_mouse_move(x, y)
    }

    fn on_mouse_button(&mut self, button: MouseButton, action: Action, mods: Modifiers) -> bool {
        self.core.borrow_mut().on_mouse_button(button, action, mods)
    }

    fn on_scroll(&mut self, dx: f64, dy: f64) -> bool {
        self.core.borrow_mut().on_scroll(dx, dy)
    }

    fn on_key(&mut self, key: Key, scancode: i32, action: Action, mods: Modifiers) -> bool {
        self.core.borrow_mut().on_key(key, scancode, action, mods)
    }

    fn on_size(&mut self, width: i32, height: i32) -> bool {
        self.core.borrow_mut().on_size(width, height)
    }
}

impl<P: Platform + 'static> Drop for GlfwRenderWindowInteractor<P> {
    fn drop(&mut self) {
        if let Ok(core) = self.core.try_borrow() {
            if let Some(window) = core.window_id {
                core.system.registry().unregister(window);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::HeadlessPlatform;
    use crate::toolkit::EventContext;
    use crate::window::GlfwRenderWindow;

    type Interactor = GlfwRenderWindowInteractor<HeadlessPlatform>;

    fn setup() -> (Rc<WindowSystem<HeadlessPlatform>>, RenderWindow, Interactor) {
        let system = WindowSystem::new(HeadlessPlatform::new());
        let window = RenderWindow::new(GlfwRenderWindow::new(Rc::clone(&system)));
        let mut interactor = GlfwRenderWindowInteractor::new(Rc::clone(&system));
        interactor.set_render_window(&window);
        (system, window, interactor)
    }

    fn count(interactor: &mut Interactor, event: EventId) -> Rc<Cell<u32>> {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        interactor.add_observer(
            event,
            Box::new(move |_: &mut EventContext<'_>| {
                counter.set(counter.get() + 1);
                false
            }),
        );
        hits
    }

    #[test]
    fn test_initialize_without_render_window() {
        let system = WindowSystem::new(HeadlessPlatform::new());
        let mut interactor = GlfwRenderWindowInteractor::new(system);
        interactor.initialize();
        assert!(!interactor.is_initialized());
        assert!(!interactor.is_enabled());
    }

    #[test]
    fn test_initialize_binds_window() {
        let (system, window, mut interactor) = setup();
        interactor.initialize();
        let id = window.native_window_id().unwrap();
        assert_eq!(interactor.window_id(), Some(id));
        assert!(system.registry().is_registered(id));
        assert!(interactor.is_enabled());
        assert_eq!(interactor.size(), (300, 300));
    }

    #[test]
    fn test_handlers_ignore_input_while_disabled() {
        let (_system, _window, mut interactor) = setup();
        let chars = count(&mut interactor, EventId::Char);
        assert!(!interactor.on_char('x'));
        assert_eq!(chars.get(), 0);

        interactor.initialize();
        interactor.disable();
        interactor.on_char('x');
        assert_eq!(chars.get(), 0);

        interactor.enable();
        interactor.on_char('x');
        assert_eq!(chars.get(), 1);
        assert_eq!(interactor.event_info().key_code, Some('x'));
    }

    #[test]
    fn test_mouse_move_flips_y_and_tracks_enter() {
        let (_system, _window, mut interactor) = setup();
        interactor.initialize();
        let moves = count(&mut interactor, EventId::MouseMove);

        interactor.on_mouse_move(10.0, 20.0);
        assert_eq!(interactor.event_info().position, (10, 279));

        interactor.on_enter(false);
        assert!(!interactor.mouse_in_window());
        interactor.on_mouse_move(30.0, 40.0);
        assert_eq!(moves.get(), 1);

        interactor.on_enter(true);
        interactor.on_mouse_move(30.0, 40.0);
        assert_eq!(moves.get(), 2);
        assert_eq!(interactor.event_info().last_position, (10, 279));
    }

    #[test]
    fn test_key_event_information() {
        let (_system, _window, mut interactor) = setup();
        interactor.initialize();
        let presses = count(&mut interactor, EventId::KeyPress);
        let releases = count(&mut interactor, EventId::KeyRelease);

        interactor.on_key(Key(81), 24, Action::Repeat, Modifiers::CONTROL);
        let info = interactor.event_info();
        assert_eq!(info.key_sym.as_deref(), Some("q"));
        assert_eq!(info.key_code, Some('q'));
        assert_eq!(info.repeat_count, 1);
        assert!(info.control);

        interactor.on_key(Key(81), 24, Action::Release, Modifiers::empty());
        assert_eq!(presses.get(), 1);
        assert_eq!(releases.get(), 1);
        assert_eq!(interactor.event_info().repeat_count, 0);
    }

    #[test]
    fn test_timers_are_stubbed() {
        let (_system, _window, mut interactor) = setup();
        assert!(interactor.create_timer(1, TimerKind::Repeating, Duration::from_millis(10)));
        assert!(interactor.destroy_timer(1));
    }

    #[test]
    fn test_exit_callback_notifies_and_terminates() {
        let (_system, _window, mut interactor) = setup();
        interactor.initialize();
        let exits = count(&mut interactor, EventId::Exit);
        interactor.exit_callback();
        assert_eq!(exits.get(), 1);
        assert!(interactor.is_done());
    }

    #[test]
    fn test_observer_can_request_termination() {
        let (_system, _window, mut interactor) = setup();
        interactor.initialize();
        interactor.add_observer(
            EventId::KeyPress,
            Box::new(|context: &mut EventContext<'_>| {
                if context.info.key_sym.as_deref() == Some("q") {
                    context.request_terminate();
                }
                true
            }),
        );
        assert!(interactor.on_key(Key(81), 24, Action::Press, Modifiers::empty()));
        assert!(interactor.is_done());
    }
}
