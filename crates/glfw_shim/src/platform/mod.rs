//! Windowing-library seam
//!
//! Everything the adapters need from the native windowing library goes through
//! the [`Platform`] trait. Two implementations ship with the crate:
//!
//! - [`GlfwPlatform`]: the real thing, built on the `glfw` crate
//! - [`HeadlessPlatform`]: an in-memory stand-in with no display, used by the
//!   test suite and by headless runs
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ GlfwRenderWindow / Interactor│
//! └──────────────┬───────────────┘
//!                │ Rc<WindowSystem<P>>
//!      ┌─────────▼─────────┐
//!      │ WindowSystem      │ ← platform + callback registry
//!      └─────────┬─────────┘
//!                │ P: Platform
//!   ┌────────────▼────────────┐
//!   │ GlfwPlatform            │
//!   │ HeadlessPlatform        │
//!   └─────────────────────────┘
//! ```

pub mod glfw_backend;
pub mod headless;
pub mod registry;

use std::cell::{Ref, RefCell, RefMut};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bitflags::bitflags;
use thiserror::Error;

pub use glfw_backend::GlfwPlatform;
pub use headless::{HeadlessPlatform, NativeCall};
pub use registry::{CallbackRegistry, NativeEventSink};

/// Errors reported by the windowing library
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The library refused to initialize (no display, missing driver, ...)
    #[error("windowing library initialization failed")]
    InitializationFailed,

    /// A window operation was attempted before initialization
    #[error("windowing library is not initialized")]
    NotInitialized,

    /// Native window (and context) creation failed
    #[error("window creation failed")]
    CreationFailed,

    /// The referenced window does not exist on this platform
    #[error("unknown window {0:?}")]
    UnknownWindow(WindowId),
}

/// Result alias for platform calls
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Opaque identifier of a native window and its GL context
///
/// Identifiers are unique for the lifetime of the process, so a stale id can
/// never alias a newer window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(u64);

impl WindowId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value, for logging
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Native input channels an interactor can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InputChannel {
    /// Unicode character input
    Char,
    /// Paths dropped onto the window
    FileDrop,
    /// Cursor entering or leaving the client area
    CursorEnter,
    /// Cursor motion
    CursorPos,
    /// Mouse button press/release
    MouseButton,
    /// Scroll wheel / trackpad scrolling
    Scroll,
    /// Physical key press/release/repeat
    Key,
    /// Window client-area resize
    Size,
}

impl InputChannel {
    /// Every channel, in registration order
    pub const ALL: [Self; 8] = [
        Self::Char,
        Self::FileDrop,
        Self::CursorEnter,
        Self::CursorPos,
        Self::MouseButton,
        Self::Scroll,
        Self::Key,
        Self::Size,
    ];
}

bitflags! {
    /// Keyboard modifier state
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Either shift key
        const SHIFT = 0b0001;
        /// Either control key
        const CONTROL = 0b0010;
        /// Either alt key
        const ALT = 0b0100;
        /// Either super/command key
        const SUPER = 0b1000;
    }
}

/// Button or key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Released
    Release,
    /// Pressed
    Press,
    /// Held down long enough to auto-repeat
    Repeat,
}

/// Native mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button
    Left,
    /// Secondary button
    Right,
    /// Wheel button
    Middle,
    /// Any extra button, by native index
    Other(u8),
}

/// Native key code (GLFW key token; printable keys use their ASCII value)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key(pub i32);

impl Key {
    /// Key without a known token
    pub const UNKNOWN: Self = Self(-1);
}

/// Raw payload of one native callback invocation
#[derive(Debug, Clone, PartialEq)]
pub enum NativeEvent {
    /// Character input
    Char(char),
    /// Dropped paths
    FileDrop(Vec<PathBuf>),
    /// Cursor entered (`true`) or left (`false`) the window
    CursorEnter(bool),
    /// Cursor position in window coordinates (origin top-left)
    CursorPos(f64, f64),
    /// Mouse button transition with the modifiers held at the time
    MouseButton(MouseButton, Action, Modifiers),
    /// Scroll offsets
    Scroll(f64, f64),
    /// Key transition
    Key {
        /// Key token
        key: Key,
        /// Platform scancode
        scancode: i32,
        /// Transition
        action: Action,
        /// Modifiers held
        mods: Modifiers,
    },
    /// New client-area size
    Size(i32, i32),
}

impl NativeEvent {
    /// Channel this event is delivered through
    pub const fn channel(&self) -> InputChannel {
        match self {
            Self::Char(_) => InputChannel::Char,
            Self::FileDrop(_) => InputChannel::FileDrop,
            Self::CursorEnter(_) => InputChannel::CursorEnter,
            Self::CursorPos(..) => InputChannel::CursorPos,
            Self::MouseButton(..) => InputChannel::MouseButton,
            Self::Scroll(..) => InputChannel::Scroll,
            Self::Key { .. } => InputChannel::Key,
            Self::Size(..) => InputChannel::Size,
        }
    }
}

/// Monitor video mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoMode {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Red channel depth
    pub red_bits: u32,
    /// Green channel depth
    pub green_bits: u32,
    /// Blue channel depth
    pub blue_bits: u32,
    /// Refresh rate in Hz
    pub refresh_rate: u32,
}

/// Snapshot of a monitor's properties
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorInfo {
    /// Human readable name, when the platform reports one
    pub name: Option<String>,
    /// Current video mode
    pub video_mode: VideoMode,
    /// Physical size in millimetres; `(0, 0)` when unknown
    pub physical_size_mm: (i32, i32),
    /// Content scale (ratio between current DPI and platform default)
    pub content_scale: (f32, f32),
}

/// Cursor visibility mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMode {
    /// Visible, free
    Normal,
    /// Invisible while over the window
    Hidden,
    /// Invisible and locked to the window
    Disabled,
}

/// Context/framebuffer hints applied before window creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextHints {
    /// Requested context version `(major, minor)`
    pub version: (u32, u32),
    /// Request an OpenGL ES context instead of desktop GL
    pub gles: bool,
    /// Request a core profile
    pub core_profile: bool,
    /// MSAA samples; 0 disables multisampling
    pub samples: u32,
    /// Stencil buffer depth
    pub stencil_bits: u32,
    /// Double-buffered framebuffer
    pub double_buffer: bool,
    /// Window starts visible
    pub visible: bool,
}

impl Default for ContextHints {
    fn default() -> Self {
        Self {
            version: (3, 2),
            gles: false,
            core_profile: true,
            samples: 0,
            stencil_bits: 8,
            double_buffer: true,
            visible: true,
        }
    }
}

/// Native windowing library operations
///
/// This is the only place the adapters touch the windowing library. Each
/// method maps onto one native call (or a short fixed sequence of them), so
/// an implementation stays a thin translation layer and the adapters above
/// it can be driven by [`HeadlessPlatform`] in tests.
///
/// # Contract
///
/// - Methods that address a window by id silently ignore unknown ids;
///   queries on unknown ids return `None` or a neutral value.
/// - Only initialization and creation report errors.
/// - Input arrives through [`Platform::poll_events`] and only on channels
///   enabled with [`Platform::set_channel_enabled`].
/// - Context queries see only windows created by this platform instance.
///
/// # Thread Safety
///
/// Implementations are not `Send`; GLFW requires every call on the thread
/// that initialized it.
pub trait Platform {
    /// Initialize the library; repeated calls are harmless
    fn init(&mut self) -> PlatformResult<()>;

    /// Hints used by subsequent `create_window` calls
    fn set_context_hints(&mut self, hints: &ContextHints);

    /// Create a window with its GL context, optionally sharing objects with `share`
    fn create_window(
        &mut self,
        width: u32,
        height: u32,
        title: &str,
        share: Option<WindowId>,
    ) -> PlatformResult<WindowId>;

    /// Destroy a window and its context
    fn destroy_window(&mut self, window: WindowId);

    /// Bind `window`'s context to the calling thread, or unbind with `None`
    fn make_context_current(&mut self, window: Option<WindowId>);

    /// Context currently bound to the calling thread
    fn current_context(&self) -> Option<WindowId>;

    /// Present the back buffer
    fn swap_buffers(&mut self, window: WindowId);

    /// Swap interval for the current context
    fn set_swap_interval(&mut self, interval: i32);

    /// Client-area size
    fn window_size(&self, window: WindowId) -> Option<(i32, i32)>;

    /// Resize the client area
    fn set_window_size(&mut self, window: WindowId, width: i32, height: i32);

    /// Screen position of the client area
    fn window_pos(&self, window: WindowId) -> Option<(i32, i32)>;

    /// Move the window
    fn set_window_pos(&mut self, window: WindowId, x: i32, y: i32);

    /// Make the window visible
    fn show_window(&mut self, window: WindowId);

    /// Hide the window
    fn hide_window(&mut self, window: WindowId);

    /// Change the title bar text
    fn set_window_title(&mut self, window: WindowId, title: &str);

    /// Properties of the primary monitor
    fn primary_monitor(&mut self) -> Option<MonitorInfo>;

    /// Put the window on the primary monitor (`full_screen`) or back into windowed mode
    fn set_window_monitor(
        &mut self,
        window: WindowId,
        full_screen: bool,
        position: (i32, i32),
        size: (u32, u32),
        refresh_rate: Option<u32>,
    );

    /// Cursor visibility over the window
    fn set_cursor_mode(&mut self, window: WindowId, mode: CursorMode);

    /// Start or stop delivering events of `channel` for `window`
    fn set_channel_enabled(&mut self, window: WindowId, channel: InputChannel, enabled: bool);

    /// Whether `channel` currently delivers events for `window`
    fn channel_enabled(&self, window: WindowId, channel: InputChannel) -> bool;

    /// Pump the native queue once and drain what arrived
    ///
    /// `None` returns immediately; `Some(timeout)` blocks until an event
    /// arrives or the timeout elapses.
    fn poll_events(&mut self, wait: Option<Duration>) -> Vec<(WindowId, NativeEvent)>;

    /// Whether the user asked to close the window
    fn window_should_close(&self, window: WindowId) -> bool;

    /// Cursor position in window coordinates
    fn cursor_pos(&self, window: WindowId) -> (f64, f64);

    /// Modifier keys currently held, read from keyboard state
    fn modifier_state(&self, window: WindowId) -> Modifiers;

    /// Layout-specific name of a printable key
    fn key_name(&self, key: Key, scancode: i32) -> Option<String>;
}

/// A platform plus the callback registry routing its native events
///
/// Shared by every window and interactor created on the same thread. The
/// platform is only borrowed for the duration of a single native call; events
/// are drained before being dispatched so observers never run while it is
/// borrowed.
///
/// Use one system per thread. A platform only knows the windows it created,
/// so [`Platform::current_context`] reports `None` for a context made current
/// through another system. A window cannot adopt such a context, and a
/// push/pop spanning two systems restores `None` rather than the other
/// system's context.
pub struct WindowSystem<P: Platform> {
    platform: RefCell<P>,
    registry: CallbackRegistry,
}

impl<P: Platform> WindowSystem<P> {
    /// Wrap a platform
    pub fn new(platform: P) -> Rc<Self> {
        Rc::new(Self {
            platform: RefCell::new(platform),
            registry: CallbackRegistry::new(),
        })
    }

    /// Shared access to the platform
    pub fn platform(&self) -> Ref<'_, P> {
        self.platform.borrow()
    }

    /// Exclusive access to the platform
    pub fn platform_mut(&self) -> RefMut<'_, P> {
        self.platform.borrow_mut()
    }

    /// Window-to-sink registry
    pub const fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }

    /// Drain the native queue and route each event to its window's sink
    ///
    /// Returns the number of events that reached a sink.
    pub fn pump(&self, wait: Option<Duration>) -> usize {
        let events = self.platform.borrow_mut().poll_events(wait);
        events
            .into_iter()
            .map(|(window, event)| self.registry.dispatch(window, event))
            .filter(|delivered| *delivered)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_ids_are_unique() {
        let a = WindowId::next();
        let b = WindowId::next();
        assert_ne!(a, b);
        assert!(b.raw() > a.raw());
    }

    #[test]
    fn test_event_channels() {
        assert_eq!(NativeEvent::Char('a').channel(), InputChannel::Char);
        assert_eq!(NativeEvent::Size(1, 1).channel(), InputChannel::Size);
        assert_eq!(
            NativeEvent::MouseButton(MouseButton::Left, Action::Press, Modifiers::empty()).channel(),
            InputChannel::MouseButton
        );
    }

    #[test]
    fn test_all_channels_distinct() {
        let mut channels = InputChannel::ALL.to_vec();
        channels.sort();
        channels.dedup();
        assert_eq!(channels.len(), InputChannel::ALL.len());
    }
}
