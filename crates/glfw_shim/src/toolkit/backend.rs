//! Capability traits the toolkit holds its window and interactor through
//!
//! The toolkit's generic types never see GLFW. They talk to a
//! [`WindowBackend`] (drawable surface + GL context) and an
//! [`InteractorBackend`] (input translation), and hand the window any number
//! of [`Renderer`]s to draw each frame.

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Weak;
use std::time::Duration;

use super::events::{EventId, EventObserver, ObserverId};
use crate::platform::{Action, Key, Modifiers, MouseButton, WindowId};

/// Something that draws into the window once per frame
pub trait Renderer {
    /// Draw one frame into a viewport of `size` pixels
    fn render(&mut self, size: (i32, i32));

    /// Drop GPU objects before the owning context goes away
    fn release_graphics_resources(&mut self) {}
}

/// Render-window contract
///
/// The toolkit drives a render window through this trait alone: it never
/// sees the native window, only ids and cached geometry.
///
/// # Design Philosophy
///
/// A backend owns one native window and its GL context. Everything else is
/// state the toolkit can ask for at any time, including before the window
/// exists or after it was destroyed, so queries answer from a cache when
/// there is nothing native to ask.
///
/// # Error Handling
///
/// Failures (no display, no context) are logged and turn the affected calls
/// into no-ops; queries fall back to the last cached value.
///
/// # Context Discipline
///
/// At most one context is current per thread. [`WindowBackend::push_context`]
/// and [`WindowBackend::pop_context`] must be balanced; an unbalanced pop is
/// logged and ignored.
pub trait WindowBackend {
    /// Initialize the windowing library and create the window and context
    fn initialize(&mut self);

    /// Release renderer resources and destroy the window
    fn finalize(&mut self);

    /// Prepare for rendering: initialize on first use, make the context current
    fn start(&mut self);

    /// Counterpart of [`WindowBackend::start`]
    fn end(&mut self) {}

    /// Draw every renderer, then present
    fn render(&mut self);

    /// Present the frame (swap buffers when double-buffered)
    fn frame(&mut self);

    /// Bind this window's context to the calling thread
    fn make_current(&mut self);

    /// Whether this window's context is bound to the calling thread
    fn is_current(&self) -> bool;

    /// Save the current context and make this one current
    fn push_context(&mut self);

    /// Restore the context saved by the matching [`WindowBackend::push_context`]
    fn pop_context(&mut self);

    /// Set the swap interval; always reports success
    fn set_swap_control(&mut self, interval: i32) -> bool;

    /// Client-area size (native when mapped, cached otherwise)
    fn size(&mut self) -> (i32, i32);

    /// Resize; re-renders once when the size actually changed
    fn set_size(&mut self, width: i32, height: i32);

    /// Screen position (native when mapped, cached otherwise)
    fn position(&mut self) -> (i32, i32);

    /// Move the window
    fn set_position(&mut self, x: i32, y: i32);

    /// Resolution of the screen the window lives on
    fn screen_size(&mut self) -> (i32, i32);

    /// Full-screen flag
    fn full_screen(&self) -> bool;

    /// Enter or leave full screen (only while mapped)
    fn set_full_screen(&mut self, full_screen: bool);

    /// Visibility flag
    fn show_window(&self) -> bool;

    /// Show or hide the window
    fn set_show_window(&mut self, show: bool);

    /// Title
    fn window_name(&self) -> &str;

    /// Change the title
    fn set_window_name(&mut self, name: &str);

    /// Dots per inch of the window's screen
    fn dpi(&self) -> f64;

    /// Hide the cursor over the window
    fn hide_cursor(&mut self);

    /// Show the cursor over the window
    fn show_cursor(&mut self);

    /// Bits per RGBA channel of the color buffer
    fn color_buffer_sizes(&self) -> [u8; 4];

    /// Native window, once created
    fn native_window_id(&self) -> Option<WindowId>;

    /// Whether the user asked to close the window
    fn should_close(&self) -> bool;

    /// Keep the interactor's cached size in step with [`WindowBackend::set_size`]
    fn attach_interactor_size(&mut self, size: Weak<Cell<(i32, i32)>>);

    /// Add a renderer drawn by [`WindowBackend::render`]
    fn add_renderer(&mut self, renderer: Box<dyn Renderer>);
}

/// Timer flavour requested by the toolkit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Fires once
    OneShot,
    /// Fires until destroyed
    Repeating,
}

/// Interactor contract
pub trait InteractorBackend {
    /// Bind to the render window's native window and enable input
    fn initialize(&mut self);

    /// Start receiving native input
    fn enable(&mut self);

    /// Stop receiving native input
    fn disable(&mut self);

    /// Pump the native queue once and dispatch what arrived
    fn process_events(&mut self);

    /// Pump until terminated or the window is asked to close
    fn start_event_loop(&mut self);

    /// Leave the event loop
    fn terminate_app(&mut self);

    /// Raise [`EventId::Exit`] when observed, then terminate
    fn exit_callback(&mut self);

    /// Create a platform timer
    fn create_timer(&mut self, timer_id: i32, kind: TimerKind, duration: Duration) -> bool;

    /// Destroy a platform timer
    fn destroy_timer(&mut self, platform_timer_id: i32) -> bool;

    /// `initialize` has run
    fn is_initialized(&self) -> bool;

    /// Input is being received
    fn is_enabled(&self) -> bool;

    /// The event loop has been told to stop
    fn is_done(&self) -> bool;

    /// Register an observer for `event`
    fn add_observer(&mut self, event: EventId, observer: Box<dyn EventObserver>) -> ObserverId;

    /// Unregister an observer
    fn remove_observer(&mut self, id: ObserverId) -> bool;

    /// Whether anything observes `event`
    fn has_observer(&self, event: EventId) -> bool;

    /// Character input
    fn on_char(&mut self, codepoint: char) -> bool;

    /// Files dropped
    fn on_drop(&mut self, paths: Vec<PathBuf>) -> bool;

    /// Cursor entered or left
    fn on_enter(&mut self, entered: bool) -> bool;

    /// Cursor moved to native `(x, y)`
    fn on_mouse_move(&mut self, x: f64, y: f64) -> bool;

    /// Mouse button transition
    fn on_mouse_button(&mut self, button: MouseButton, action: Action, mods: Modifiers) -> bool;

    /// Scroll offsets
    fn on_scroll(&mut self, dx: f64, dy: f64) -> bool;

    /// Key transition
    fn on_key(&mut self, key: Key, scancode: i32, action: Action, mods: Modifiers) -> bool;

    /// Client area resized
    fn on_size(&mut self, width: i32, height: i32) -> bool;
}
