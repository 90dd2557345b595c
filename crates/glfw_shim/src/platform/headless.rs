//! In-memory platform
//!
//! Behaves like a windowing library with no display attached: windows are
//! plain records, contexts are ids, and input arrives only when injected with
//! [`HeadlessPlatform::push_event`]. Every state-changing native call is
//! appended to a call log so callers can assert on exactly what the adapters
//! forwarded.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::time::Duration;

use super::{
    ContextHints, CursorMode, InputChannel, Key, Modifiers, MonitorInfo, NativeEvent, Platform,
    PlatformError, PlatformResult, VideoMode, WindowId,
};

/// A native call recorded by [`HeadlessPlatform`]
#[derive(Debug, Clone, PartialEq)]
pub enum NativeCall {
    /// `init`
    Init,
    /// `create_window`
    CreateWindow {
        /// New window
        window: WindowId,
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Context shared with
        share: Option<WindowId>,
    },
    /// `destroy_window`
    DestroyWindow(WindowId),
    /// `make_context_current`
    MakeCurrent(Option<WindowId>),
    /// `swap_buffers`
    SwapBuffers(WindowId),
    /// `set_swap_interval`
    SwapInterval(i32),
    /// `set_window_size`
    SetSize(WindowId, i32, i32),
    /// `set_window_pos`
    SetPosition(WindowId, i32, i32),
    /// `show_window` / `hide_window`
    SetVisible(WindowId, bool),
    /// `set_window_title`
    SetTitle(WindowId, String),
    /// `set_window_monitor`
    SetMonitor(WindowId, bool),
    /// `set_cursor_mode`
    SetCursorMode(WindowId, CursorMode),
    /// `set_channel_enabled`
    SetChannel(WindowId, InputChannel, bool),
}

#[derive(Debug, Clone)]
struct HeadlessWindow {
    size: (i32, i32),
    position: (i32, i32),
    title: String,
    visible: bool,
    full_screen: bool,
    should_close: bool,
    cursor: (f64, f64),
    cursor_mode: CursorMode,
    channels: BTreeSet<InputChannel>,
}

/// Platform without a display
#[derive(Debug)]
pub struct HeadlessPlatform {
    initialized: bool,
    fail_init: bool,
    fail_create: bool,
    hints: ContextHints,
    windows: BTreeMap<WindowId, HeadlessWindow>,
    current: Option<WindowId>,
    monitor: Option<MonitorInfo>,
    modifiers: Modifiers,
    queue: VecDeque<(WindowId, NativeEvent)>,
    calls: Vec<NativeCall>,
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPlatform {
    /// A platform with a single 24" 1080p monitor
    pub fn new() -> Self {
        Self {
            initialized: false,
            fail_init: false,
            fail_create: false,
            hints: ContextHints::default(),
            windows: BTreeMap::new(),
            current: None,
            monitor: Some(Self::default_monitor()),
            modifiers: Modifiers::empty(),
            queue: VecDeque::new(),
            calls: Vec::new(),
        }
    }

    /// The monitor reported by [`HeadlessPlatform::new`]
    pub fn default_monitor() -> MonitorInfo {
        MonitorInfo {
            name: Some("Headless".to_string()),
            video_mode: VideoMode {
                width: 1920,
                height: 1080,
                red_bits: 8,
                green_bits: 8,
                blue_bits: 8,
                refresh_rate: 60,
            },
            physical_size_mm: (527, 296),
            content_scale: (1.0, 1.0),
        }
    }

    /// Make `init` fail, as on a machine without a display server
    #[must_use]
    pub const fn with_failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// Make `create_window` fail
    #[must_use]
    pub const fn with_failing_window_creation(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// Replace the primary monitor (or remove it)
    #[must_use]
    pub fn with_monitor(mut self, monitor: Option<MonitorInfo>) -> Self {
        self.monitor = monitor;
        self
    }

    /// Queue a native event for `window`
    ///
    /// Size events also resize the window, as a user drag would. The event is
    /// only queued when the window exists and its channel is enabled; returns
    /// whether it was queued.
    pub fn push_event(&mut self, window: WindowId, event: NativeEvent) -> bool {
        let Some(state) = self.windows.get_mut(&window) else {
            return false;
        };
        match event {
            NativeEvent::Size(width, height) => state.size = (width, height),
            NativeEvent::CursorPos(x, y) => state.cursor = (x, y),
            _ => {}
        }
        if !state.channels.contains(&event.channel()) {
            return false;
        }
        self.queue.push_back((window, event));
        true
    }

    /// Flag `window` as asked to close
    pub fn request_close(&mut self, window: WindowId) {
        if let Some(state) = self.windows.get_mut(&window) {
            state.should_close = true;
        }
    }

    /// Move the cursor without generating an event
    pub fn set_cursor_position(&mut self, window: WindowId, x: f64, y: f64) {
        if let Some(state) = self.windows.get_mut(&window) {
            state.cursor = (x, y);
        }
    }

    /// Modifier keys reported as held
    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    /// Every native call so far
    pub fn calls(&self) -> &[NativeCall] {
        &self.calls
    }

    /// Number of recorded calls matching `predicate`
    pub fn count_calls(&self, predicate: impl Fn(&NativeCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    /// Forget the call log
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Whether `init` succeeded
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Hints in effect
    pub const fn hints(&self) -> &ContextHints {
        &self.hints
    }

    /// Number of live windows
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Whether `window` exists
    pub fn has_window(&self, window: WindowId) -> bool {
        self.windows.contains_key(&window)
    }

    /// Enabled channels of `window`
    pub fn enabled_channels(&self, window: WindowId) -> Vec<InputChannel> {
        self.windows
            .get(&window)
            .map(|state| state.channels.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Title of `window`
    pub fn window_title(&self, window: WindowId) -> Option<&str> {
        self.windows.get(&window).map(|state| state.title.as_str())
    }

    /// Visibility of `window`
    pub fn is_visible(&self, window: WindowId) -> bool {
        self.windows.get(&window).is_some_and(|state| state.visible)
    }

    /// Full-screen state of `window`
    pub fn is_full_screen(&self, window: WindowId) -> bool {
        self.windows.get(&window).is_some_and(|state| state.full_screen)
    }

    /// Cursor mode of `window`
    pub fn cursor_mode(&self, window: WindowId) -> Option<CursorMode> {
        self.windows.get(&window).map(|state| state.cursor_mode)
    }

    /// Events queued and not yet polled
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }
}

impl Platform for HeadlessPlatform {
    fn init(&mut self) -> PlatformResult<()> {
        self.calls.push(NativeCall::Init);
        if self.fail_init {
            return Err(PlatformError::InitializationFailed);
        }
        self.initialized = true;
        Ok(())
    }

    fn set_context_hints(&mut self, hints: &ContextHints) {
        self.hints = *hints;
    }

    fn create_window(
        &mut self,
        width: u32,
        height: u32,
        title: &str,
        share: Option<WindowId>,
    ) -> PlatformResult<WindowId> {
        if !self.initialized {
            return Err(PlatformError::NotInitialized);
        }
        if self.fail_create {
            return Err(PlatformError::CreationFailed);
        }
        if let Some(parent) = share {
            if !self.windows.contains_key(&parent) {
                return Err(PlatformError::UnknownWindow(parent));
            }
        }
        let window = WindowId::next();
        self.windows.insert(
            window,
            HeadlessWindow {
                size: (
                    i32::try_from(width).unwrap_or(i32::MAX),
                    i32::try_from(height).unwrap_or(i32::MAX),
                ),
                position: (0, 0),
                title: title.to_string(),
                visible: self.hints.visible,
                full_screen: false,
                should_close: false,
                cursor: (0.0, 0.0),
                cursor_mode: CursorMode::Normal,
                channels: BTreeSet::new(),
            },
        );
        self.calls.push(NativeCall::CreateWindow {
            window,
            width,
            height,
            share,
        });
        Ok(window)
    }

    fn destroy_window(&mut self, window: WindowId) {
        if self.windows.remove(&window).is_some() {
            if self.current == Some(window) {
                self.current = None;
            }
            self.queue.retain(|(target, _)| *target != window);
            self.calls.push(NativeCall::DestroyWindow(window));
        }
    }

    fn make_context_current(&mut self, window: Option<WindowId>) {
        if window.is_some_and(|id| !self.windows.contains_key(&id)) {
            return;
        }
        self.current = window;
        self.calls.push(NativeCall::MakeCurrent(window));
    }

    fn current_context(&self) -> Option<WindowId> {
        self.current
    }

    fn swap_buffers(&mut self, window: WindowId) {
        if self.windows.contains_key(&window) {
            self.calls.push(NativeCall::SwapBuffers(window));
        }
    }

    fn set_swap_interval(&mut self, interval: i32) {
        self.calls.push(NativeCall::SwapInterval(interval));
    }

    fn window_size(&self, window: WindowId) -> Option<(i32, i32)> {
        self.windows.get(&window).map(|state| state.size)
    }

    fn set_window_size(&mut self, window: WindowId, width: i32, height: i32) {
        if let Some(state) = self.windows.get_mut(&window) {
            state.size = (width, height);
            self.calls.push(NativeCall::SetSize(window, width, height));
        }
    }

    fn window_pos(&self, window: WindowId) -> Option<(i32, i32)> {
        self.windows.get(&window).map(|state| state.position)
    }

    fn set_window_pos(&mut self, window: WindowId, x: i32, y: i32) {
        if let Some(state) = self.windows.get_mut(&window) {
            state.position = (x, y);
            self.calls.push(NativeCall::SetPosition(window, x, y));
        }
    }

    fn show_window(&mut self, window: WindowId) {
        if let Some(state) = self.windows.get_mut(&window) {
            state.visible = true;
            self.calls.push(NativeCall::SetVisible(window, true));
        }
    }

    fn hide_window(&mut self, window: WindowId) {
        if let Some(state) = self.windows.get_mut(&window) {
            state.visible = false;
            self.calls.push(NativeCall::SetVisible(window, false));
        }
    }

    fn set_window_title(&mut self, window: WindowId, title: &str) {
        if let Some(state) = self.windows.get_mut(&window) {
            state.title = title.to_string();
            self.calls.push(NativeCall::SetTitle(window, title.to_string()));
        }
    }

    fn primary_monitor(&mut self) -> Option<MonitorInfo> {
        self.monitor.clone()
    }

    fn set_window_monitor(
        &mut self,
        window: WindowId,
        full_screen: bool,
        position: (i32, i32),
        size: (u32, u32),
        _refresh_rate: Option<u32>,
    ) {
        if full_screen && self.monitor.is_none() {
            return;
        }
        if let Some(state) = self.windows.get_mut(&window) {
            state.full_screen = full_screen;
            state.position = position;
            state.size = (
                i32::try_from(size.0).unwrap_or(i32::MAX),
                i32::try_from(size.1).unwrap_or(i32::MAX),
            );
            self.calls.push(NativeCall::SetMonitor(window, full_screen));
        }
    }

    fn set_cursor_mode(&mut self, window: WindowId, mode: CursorMode) {
        if let Some(state) = self.windows.get_mut(&window) {
            state.cursor_mode = mode;
            self.calls.push(NativeCall::SetCursorMode(window, mode));
        }
    }

    fn set_channel_enabled(&mut self, window: WindowId, channel: InputChannel, enabled: bool) {
        if let Some(state) = self.windows.get_mut(&window) {
            if enabled {
                state.channels.insert(channel);
            } else {
                state.channels.remove(&channel);
                self.queue
                    .retain(|(target, event)| *target != window || event.channel() != channel);
            }
            self.calls.push(NativeCall::SetChannel(window, channel, enabled));
        }
    }

    fn channel_enabled(&self, window: WindowId, channel: InputChannel) -> bool {
        self.windows
            .get(&window)
            .is_some_and(|state| state.channels.contains(&channel))
    }

    fn poll_events(&mut self, _wait: Option<Duration>) -> Vec<(WindowId, NativeEvent)> {
        self.queue.drain(..).collect()
    }

    fn window_should_close(&self, window: WindowId) -> bool {
        self.windows.get(&window).is_some_and(|state| state.should_close)
    }

    fn cursor_pos(&self, window: WindowId) -> (f64, f64) {
        self.windows
            .get(&window)
            .map_or((0.0, 0.0), |state| state.cursor)
    }

    fn modifier_state(&self, _window: WindowId) -> Modifiers {
        self.modifiers
    }

    fn key_name(&self, key: Key, _scancode: i32) -> Option<String> {
        // Printable GLFW key tokens are their ASCII upper-case values.
        u8::try_from(key.0)
            .ok()
            .filter(|code| (33..=96).contains(code))
            .map(|code| char::from(code).to_ascii_lowercase().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform_with_window() -> (HeadlessPlatform, WindowId) {
        let mut platform = HeadlessPlatform::new();
        platform.init().unwrap();
        let window = platform.create_window(640, 480, "test", None).unwrap();
        (platform, window)
    }

    #[test]
    fn test_create_requires_init() {
        let mut platform = HeadlessPlatform::new();
        assert_eq!(
            platform.create_window(10, 10, "x", None),
            Err(PlatformError::NotInitialized)
        );
    }

    #[test]
    fn test_events_need_enabled_channel() {
        let (mut platform, window) = platform_with_window();
        assert!(!platform.push_event(window, NativeEvent::Char('a')));
        platform.set_channel_enabled(window, InputChannel::Char, true);
        assert!(platform.push_event(window, NativeEvent::Char('a')));
        assert_eq!(platform.poll_events(None), vec![(window, NativeEvent::Char('a'))]);
        assert_eq!(platform.pending_events(), 0);
    }

    #[test]
    fn test_destroy_clears_current_context() {
        let (mut platform, window) = platform_with_window();
        platform.make_context_current(Some(window));
        assert_eq!(platform.current_context(), Some(window));
        platform.destroy_window(window);
        assert_eq!(platform.current_context(), None);
        assert!(!platform.has_window(window));
    }

    #[test]
    fn test_key_names() {
        let platform = HeadlessPlatform::new();
        assert_eq!(platform.key_name(Key(65), 0).as_deref(), Some("a"));
        assert_eq!(platform.key_name(Key(256), 0), None);
        assert_eq!(platform.key_name(Key::UNKNOWN, 0), None);
    }

    #[test]
    fn test_size_event_resizes_window() {
        let (mut platform, window) = platform_with_window();
        platform.push_event(window, NativeEvent::Size(800, 600));
        assert_eq!(platform.window_size(window), Some((800, 600)));
    }
}
