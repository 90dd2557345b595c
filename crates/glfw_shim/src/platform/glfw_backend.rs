//! Platform implementation on GLFW
//!
//! GLFW delivers input to a per-window receiver once polling is enabled for
//! that kind of event; enabling/disabling polling is what "installing a
//! callback" means here. Events are drained from every receiver after each
//! pump and translated into [`NativeEvent`]s.

use std::collections::BTreeMap;
use std::time::Duration;

use glfw::Context;

use super::{
    Action, ContextHints, CursorMode, InputChannel, Key, Modifiers, MonitorInfo, MouseButton,
    NativeEvent, Platform, PlatformError, PlatformResult, VideoMode, WindowId,
};

struct NativeWindow {
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
}

/// GLFW-backed platform
///
/// Must live on the thread that initialized GLFW (the main thread on macOS).
#[derive(Default)]
pub struct GlfwPlatform {
    glfw: Option<glfw::Glfw>,
    windows: BTreeMap<WindowId, NativeWindow>,
}

impl GlfwPlatform {
    /// Uninitialized platform; call [`Platform::init`] before creating windows
    pub fn new() -> Self {
        Self::default()
    }

    fn native(&self, window: WindowId) -> Option<&NativeWindow> {
        self.windows.get(&window)
    }

    fn native_mut(&mut self, window: WindowId) -> Option<&mut NativeWindow> {
        self.windows.get_mut(&window)
    }
}

impl Platform for GlfwPlatform {
    fn init(&mut self) -> PlatformResult<()> {
        if self.glfw.is_some() {
            return Ok(());
        }
        let glfw = glfw::init(glfw::log_errors).map_err(|err| {
            log::error!("GLFW init error: {err:?}");
            PlatformError::InitializationFailed
        })?;
        self.glfw = Some(glfw);
        Ok(())
    }

    fn set_context_hints(&mut self, hints: &ContextHints) {
        let Some(glfw) = self.glfw.as_mut() else {
            log::warn!("Context hints ignored: GLFW is not initialized");
            return;
        };
        glfw.window_hint(glfw::WindowHint::Samples(Some(hints.samples)));
        glfw.window_hint(glfw::WindowHint::ClientApi(if hints.gles {
            glfw::ClientApiHint::OpenGlEs
        } else {
            glfw::ClientApiHint::OpenGl
        }));
        glfw.window_hint(glfw::WindowHint::ContextVersion(hints.version.0, hints.version.1));
        if hints.core_profile {
            glfw.window_hint(glfw::WindowHint::OpenGlProfile(glfw::OpenGlProfileHint::Core));
        }
        glfw.window_hint(glfw::WindowHint::StencilBits(Some(hints.stencil_bits)));
        glfw.window_hint(glfw::WindowHint::DoubleBuffer(hints.double_buffer));
        glfw.window_hint(glfw::WindowHint::Visible(hints.visible));
    }

    fn create_window(
        &mut self,
        width: u32,
        height: u32,
        title: &str,
        share: Option<WindowId>,
    ) -> PlatformResult<WindowId> {
        let glfw = self.glfw.as_mut().ok_or(PlatformError::NotInitialized)?;

        let created = match share {
            Some(parent) => {
                let parent = self
                    .windows
                    .get(&parent)
                    .ok_or(PlatformError::UnknownWindow(parent))?;
                parent
                    .window
                    .create_shared(width, height, title, glfw::WindowMode::Windowed)
            }
            None => glfw.create_window(width, height, title, glfw::WindowMode::Windowed),
        };
        let (window, events) = created.ok_or(PlatformError::CreationFailed)?;

        let id = WindowId::next();
        self.windows.insert(id, NativeWindow { window, events });
        Ok(id)
    }

    fn destroy_window(&mut self, window: WindowId) {
        // Dropping the PWindow destroys the native window.
        self.windows.remove(&window);
    }

    fn make_context_current(&mut self, window: Option<WindowId>) {
        match window {
            Some(id) => {
                if let Some(native) = self.native_mut(id) {
                    native.window.make_current();
                }
            }
            None => glfw::make_context_current(None),
        }
    }

    fn current_context(&self) -> Option<WindowId> {
        self.windows
            .iter()
            .find(|(_, native)| native.window.is_current())
            .map(|(id, _)| *id)
    }

    fn swap_buffers(&mut self, window: WindowId) {
        if let Some(native) = self.native_mut(window) {
            native.window.swap_buffers();
        }
    }

    fn set_swap_interval(&mut self, interval: i32) {
        let Some(glfw) = self.glfw.as_mut() else {
            return;
        };
        let interval = match u32::try_from(interval) {
            Ok(0) => glfw::SwapInterval::None,
            Ok(frames) => glfw::SwapInterval::Sync(frames),
            Err(_) => glfw::SwapInterval::Adaptive,
        };
        glfw.set_swap_interval(interval);
    }

    fn window_size(&self, window: WindowId) -> Option<(i32, i32)> {
        self.native(window).map(|native| native.window.get_size())
    }

    fn set_window_size(&mut self, window: WindowId, width: i32, height: i32) {
        if let Some(native) = self.native_mut(window) {
            native.window.set_size(width, height);
        }
    }

    fn window_pos(&self, window: WindowId) -> Option<(i32, i32)> {
        self.native(window).map(|native| native.window.get_pos())
    }

    fn set_window_pos(&mut self, window: WindowId, x: i32, y: i32) {
        if let Some(native) = self.native_mut(window) {
            native.window.set_pos(x, y);
        }
    }

    fn show_window(&mut self, window: WindowId) {
        if let Some(native) = self.native_mut(window) {
            native.window.show();
        }
    }

    fn hide_window(&mut self, window: WindowId) {
        if let Some(native) = self.native_mut(window) {
            native.window.hide();
        }
    }

    fn set_window_title(&mut self, window: WindowId, title: &str) {
        if let Some(native) = self.native_mut(window) {
            native.window.set_title(title);
        }
    }

    fn primary_monitor(&mut self) -> Option<MonitorInfo> {
        let glfw = self.glfw.as_mut()?;
        glfw.with_primary_monitor(|_, monitor| {
            let monitor = monitor?;
            let mode = monitor.get_video_mode()?;
            Some(MonitorInfo {
                name: monitor.get_name(),
                video_mode: VideoMode {
                    width: mode.width,
                    height: mode.height,
                    red_bits: mode.red_bits,
                    green_bits: mode.green_bits,
                    blue_bits: mode.blue_bits,
                    refresh_rate: mode.refresh_rate,
                },
                physical_size_mm: monitor.get_physical_size(),
                content_scale: monitor.get_content_scale(),
            })
        })
    }

    fn set_window_monitor(
        &mut self,
        window: WindowId,
        full_screen: bool,
        position: (i32, i32),
        size: (u32, u32),
        refresh_rate: Option<u32>,
    ) {
        let Some(glfw) = self.glfw.as_mut() else {
            return;
        };
        let Some(native) = self.windows.get_mut(&window) else {
            return;
        };
        let (x, y) = position;
        let (width, height) = size;
        if full_screen {
            glfw.with_primary_monitor(|_, monitor| match monitor {
                Some(monitor) => native.window.set_monitor(
                    glfw::WindowMode::FullScreen(monitor),
                    x,
                    y,
                    width,
                    height,
                    refresh_rate,
                ),
                None => log::warn!("No primary monitor; staying windowed"),
            });
        } else {
            native
                .window
                .set_monitor(glfw::WindowMode::Windowed, x, y, width, height, refresh_rate);
        }
    }

    fn set_cursor_mode(&mut self, window: WindowId, mode: CursorMode) {
        if let Some(native) = self.native_mut(window) {
            native.window.set_cursor_mode(match mode {
                CursorMode::Normal => glfw::CursorMode::Normal,
                CursorMode::Hidden => glfw::CursorMode::Hidden,
                CursorMode::Disabled => glfw::CursorMode::Disabled,
            });
        }
    }

    fn set_channel_enabled(&mut self, window: WindowId, channel: InputChannel, enabled: bool) {
        let Some(native) = self.native_mut(window) else {
            return;
        };
        let window = &mut native.window;
        match channel {
            InputChannel::Char => window.set_char_polling(enabled),
            InputChannel::FileDrop => window.set_drag_and_drop_polling(enabled),
            InputChannel::CursorEnter => window.set_cursor_enter_polling(enabled),
            InputChannel::CursorPos => window.set_cursor_pos_polling(enabled),
            InputChannel::MouseButton => window.set_mouse_button_polling(enabled),
            InputChannel::Scroll => window.set_scroll_polling(enabled),
            InputChannel::Key => window.set_key_polling(enabled),
            InputChannel::Size => window.set_size_polling(enabled),
        }
    }

    fn channel_enabled(&self, window: WindowId, channel: InputChannel) -> bool {
        let Some(native) = self.native(window) else {
            return false;
        };
        let window = &native.window;
        match channel {
            InputChannel::Char => window.is_char_polling(),
            InputChannel::FileDrop => window.is_drag_and_drop_polling(),
            InputChannel::CursorEnter => window.is_cursor_enter_polling(),
            InputChannel::CursorPos => window.is_cursor_pos_polling(),
            InputChannel::MouseButton => window.is_mouse_button_polling(),
            InputChannel::Scroll => window.is_scroll_polling(),
            InputChannel::Key => window.is_key_polling(),
            InputChannel::Size => window.is_size_polling(),
        }
    }

    fn poll_events(&mut self, wait: Option<Duration>) -> Vec<(WindowId, NativeEvent)> {
        let Some(glfw) = self.glfw.as_mut() else {
            return Vec::new();
        };
        match wait {
            Some(timeout) => glfw.wait_events_timeout(timeout.as_secs_f64()),
            None => glfw.poll_events(),
        }

        let mut drained = Vec::new();
        for (id, native) in &self.windows {
            for (_, event) in glfw::flush_messages(&native.events) {
                if let Some(event) = translate_event(event) {
                    drained.push((*id, event));
                }
            }
        }
        drained
    }

    fn window_should_close(&self, window: WindowId) -> bool {
        self.native(window)
            .is_some_and(|native| native.window.should_close())
    }

    fn cursor_pos(&self, window: WindowId) -> (f64, f64) {
        self.native(window)
            .map_or((0.0, 0.0), |native| native.window.get_cursor_pos())
    }

    fn modifier_state(&self, window: WindowId) -> Modifiers {
        let Some(native) = self.native(window) else {
            return Modifiers::empty();
        };
        let held = |keys: [glfw::Key; 2]| {
            keys.iter()
                .any(|key| native.window.get_key(*key) != glfw::Action::Release)
        };
        let mut modifiers = Modifiers::empty();
        modifiers.set(Modifiers::SHIFT, held([glfw::Key::LeftShift, glfw::Key::RightShift]));
        modifiers.set(
            Modifiers::CONTROL,
            held([glfw::Key::LeftControl, glfw::Key::RightControl]),
        );
        modifiers.set(Modifiers::ALT, held([glfw::Key::LeftAlt, glfw::Key::RightAlt]));
        modifiers.set(Modifiers::SUPER, held([glfw::Key::LeftSuper, glfw::Key::RightSuper]));
        modifiers
    }

    fn key_name(&self, _key: Key, scancode: i32) -> Option<String> {
        // With no key token GLFW resolves the name from the scancode alone,
        // which yields the same layout-specific name for printable keys.
        glfw::get_key_name(None, Some(scancode))
    }
}

fn translate_event(event: glfw::WindowEvent) -> Option<NativeEvent> {
    let event = match event {
        glfw::WindowEvent::Char(codepoint) => NativeEvent::Char(codepoint),
        glfw::WindowEvent::FileDrop(paths) => NativeEvent::FileDrop(paths),
        glfw::WindowEvent::CursorEnter(entered) => NativeEvent::CursorEnter(entered),
        glfw::WindowEvent::CursorPos(x, y) => NativeEvent::CursorPos(x, y),
        glfw::WindowEvent::MouseButton(button, action, mods) => NativeEvent::MouseButton(
            translate_button(button),
            translate_action(action),
            translate_modifiers(mods),
        ),
        glfw::WindowEvent::Scroll(x, y) => NativeEvent::Scroll(x, y),
        glfw::WindowEvent::Key(key, scancode, action, mods) => NativeEvent::Key {
            key: Key(key as i32),
            scancode,
            action: translate_action(action),
            mods: translate_modifiers(mods),
        },
        glfw::WindowEvent::Size(width, height) => NativeEvent::Size(width, height),
        _ => return None,
    };
    Some(event)
}

fn translate_button(button: glfw::MouseButton) -> MouseButton {
    match button {
        glfw::MouseButton::Button1 => MouseButton::Left,
        glfw::MouseButton::Button2 => MouseButton::Right,
        glfw::MouseButton::Button3 => MouseButton::Middle,
        other => MouseButton::Other(u8::try_from(other as i32).unwrap_or(u8::MAX)),
    }
}

const fn translate_action(action: glfw::Action) -> Action {
    match action {
        glfw::Action::Release => Action::Release,
        glfw::Action::Press => Action::Press,
        glfw::Action::Repeat => Action::Repeat,
    }
}

fn translate_modifiers(mods: glfw::Modifiers) -> Modifiers {
    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::SHIFT, mods.contains(glfw::Modifiers::Shift));
    modifiers.set(Modifiers::CONTROL, mods.contains(glfw::Modifiers::Control));
    modifiers.set(Modifiers::ALT, mods.contains(glfw::Modifiers::Alt));
    modifiers.set(Modifiers::SUPER, mods.contains(glfw::Modifiers::Super));
    modifiers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_mouse_button() {
        assert_eq!(translate_button(glfw::MouseButton::Button1), MouseButton::Left);
        assert_eq!(translate_button(glfw::MouseButton::Button2), MouseButton::Right);
        assert_eq!(translate_button(glfw::MouseButton::Button3), MouseButton::Middle);
        assert_eq!(translate_button(glfw::MouseButton::Button5), MouseButton::Other(4));
    }

    #[test]
    fn test_translate_modifiers() {
        let mods = translate_modifiers(glfw::Modifiers::Shift | glfw::Modifiers::Alt);
        assert_eq!(mods, Modifiers::SHIFT | Modifiers::ALT);
        assert_eq!(translate_modifiers(glfw::Modifiers::empty()), Modifiers::empty());
    }

    #[test]
    fn test_translate_filters_unrelated_events() {
        assert_eq!(translate_event(glfw::WindowEvent::Close), None);
        assert_eq!(
            translate_event(glfw::WindowEvent::Scroll(0.0, -1.0)),
            Some(NativeEvent::Scroll(0.0, -1.0))
        );
        assert_eq!(
            translate_event(glfw::WindowEvent::Char('q')),
            Some(NativeEvent::Char('q'))
        );
    }

    #[test]
    fn test_platform_without_init_is_inert() {
        let mut platform = GlfwPlatform::new();
        assert!(platform.poll_events(None).is_empty());
        assert_eq!(platform.primary_monitor(), None);
        assert_eq!(
            platform.create_window(10, 10, "x", None),
            Err(PlatformError::NotInitialized)
        );
    }
}
