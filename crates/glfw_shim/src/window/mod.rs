//! GLFW-backed render window
//!
//! [`GlfwRenderWindow`] implements [`WindowBackend`] by forwarding to a
//! [`Platform`]. It owns exactly one native window and its GL context, keeps
//! a cached copy of size and position for use while the window is unmapped
//! or absent, and maintains a save-and-restore stack so nested code can
//! borrow the current context and hand it back.
//!
//! Nothing here returns an error. Initialization failures are logged and the
//! window degrades to a set of no-ops, matching the toolkit contract.

pub mod context;
pub mod dpi;

use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::config::WindowConfig;
use crate::platform::{ContextHints, CursorMode, Platform, WindowId, WindowSystem};
use crate::toolkit::{Renderer, WindowBackend};

pub use context::ContextStack;
pub use dpi::{monitor_dpi, native_dpi, DEFAULT_DPI};

/// Title used when none is configured
pub const DEFAULT_WINDOW_NAME: &str = "Visualization Toolkit - GLFW OpenGL";

const FALLBACK_EDGE: i32 = 300;

/// Render window driving one GLFW window + GL context
pub struct GlfwRenderWindow<P: Platform> {
    system: Rc<WindowSystem<P>>,
    hints: ContextHints,
    swap_interval: Option<i32>,
    initial_full_screen: bool,

    window_id: Option<WindowId>,
    context_id: Option<WindowId>,
    shared_context: Option<WindowId>,
    context_stack: ContextStack,

    size: (i32, i32),
    position: (i32, i32),
    windowed_geometry: Option<((i32, i32), (i32, i32))>,
    window_name: String,
    dpi: f64,

    double_buffer: bool,
    swap_buffers: bool,
    abort_render: bool,
    full_screen: bool,
    own_context: bool,
    mapped: bool,
    show_window: bool,
    initialized: bool,

    renderers: Vec<Box<dyn Renderer>>,
    interactor_size: Option<Weak<Cell<(i32, i32)>>>,
}

impl<P: Platform> GlfwRenderWindow<P> {
    /// Window with default settings; nothing native happens until [`WindowBackend::initialize`]
    pub fn new(system: Rc<WindowSystem<P>>) -> Self {
        Self::from_config(system, &WindowConfig::default())
    }

    /// Window configured from `config`
    pub fn from_config(system: Rc<WindowSystem<P>>, config: &WindowConfig) -> Self {
        Self {
            system,
            hints: config.context_hints(),
            swap_interval: config.swap_interval,
            initial_full_screen: config.full_screen,
            window_id: None,
            context_id: None,
            shared_context: None,
            context_stack: ContextStack::new(),
            size: (config.width, config.height),
            position: config.position,
            windowed_geometry: None,
            window_name: config.title.clone(),
            dpi: DEFAULT_DPI,
            double_buffer: config.double_buffer,
            swap_buffers: true,
            abort_render: false,
            full_screen: false,
            own_context: false,
            mapped: false,
            show_window: config.show_window,
            initialized: false,
            renderers: Vec::new(),
            interactor_size: None,
        }
    }

    /// Windowing system this window lives on
    pub const fn system(&self) -> &Rc<WindowSystem<P>> {
        &self.system
    }

    /// Share GL objects with another window's context; only affects windows created afterwards
    pub fn set_shared_context(&mut self, parent: Option<WindowId>) {
        self.shared_context = parent;
    }

    /// Context this window renders with
    pub const fn context_id(&self) -> Option<WindowId> {
        self.context_id
    }

    /// Outstanding [`WindowBackend::push_context`] calls
    pub fn context_depth(&self) -> usize {
        self.context_stack.depth()
    }

    /// Whether the window is shown on screen
    pub const fn is_mapped(&self) -> bool {
        self.mapped
    }

    /// Whether [`WindowBackend::initialize`] produced a window
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Toggle buffer swapping in [`WindowBackend::frame`]
    pub fn set_swap_buffers(&mut self, swap: bool) {
        self.swap_buffers = swap;
    }

    /// Skip presentation of the frame being rendered
    pub fn set_abort_render(&mut self, abort: bool) {
        self.abort_render = abort;
    }

    /// Whether the framebuffer is double-buffered
    pub const fn double_buffer(&self) -> bool {
        self.double_buffer
    }

    fn create_a_window(&mut self) {
        let width = if self.size.0 > 0 { self.size.0 } else { FALLBACK_EDGE };
        let height = if self.size.1 > 0 { self.size.1 } else { FALLBACK_EDGE };
        self.size = (width, height);

        let created = self.system.platform_mut().create_window(
            width.unsigned_abs(),
            height.unsigned_abs(),
            &self.window_name,
            self.shared_context,
        );
        let window = match created {
            Ok(window) => window,
            Err(err) => {
                log::error!("Failed to create GLFW window: {err}");
                return;
            }
        };
        self.window_id = Some(window);
        self.mapped = self.show_window;
        self.make_current();

        if self.position.0 >= 0 && self.position.1 >= 0 {
            self.system
                .platform_mut()
                .set_window_pos(window, self.position.0, self.position.1);
        }

        let monitor = self.system.platform_mut().primary_monitor();
        match monitor {
            Some(monitor) => {
                let mode = &monitor.video_mode;
                log::debug!("Pixels {}x{}", mode.width, mode.height);
                log::debug!(
                    "Screen {}x{} (mm)",
                    monitor.physical_size_mm.0,
                    monitor.physical_size_mm.1
                );
                log::debug!(
                    "Color bits r{} g{} b{}, refresh rate {} Hz",
                    mode.red_bits,
                    mode.green_bits,
                    mode.blue_bits,
                    mode.refresh_rate
                );
                log::debug!(
                    "Content scale {}x{}",
                    monitor.content_scale.0,
                    monitor.content_scale.1
                );
                self.dpi = monitor_dpi(&monitor);
                log::debug!("Current DPI {:.1}", self.dpi);
            }
            None => log::debug!("No primary monitor reported; keeping {} DPI", self.dpi),
        }
    }

    fn destroy_window(&mut self) {
        self.clean();
        if let Some(window) = self.window_id.take() {
            self.system.registry().unregister(window);
            self.system.platform_mut().destroy_window(window);
        }
        self.mapped = false;
        self.initialized = false;
    }

    fn clean(&mut self) {
        if self.own_context && self.context_id.is_some() {
            self.make_current();
            for renderer in &mut self.renderers {
                renderer.release_graphics_resources();
            }
        }
        self.context_id = None;
        self.own_context = false;
    }

    fn screen_geometry_for_monitor(&self) -> Option<((i32, i32), (u32, u32), u32)> {
        let monitor = self.system.platform_mut().primary_monitor()?;
        let mode = monitor.video_mode;
        Some(((0, 0), (mode.width, mode.height), mode.refresh_rate))
    }
}

impl<P: Platform> WindowBackend for GlfwRenderWindow<P> {
    fn initialize(&mut self) {
        if let Err(err) = self.system.platform_mut().init() {
            log::error!("Error initializing GLFW: {err}");
            return;
        }
        self.system.platform_mut().set_context_hints(&self.hints);

        if self.window_id.is_none() {
            self.create_a_window();
        }

        if self.context_id.is_none() {
            self.context_id = self.system.platform().current_context();
        }
        if self.context_id.is_none() {
            log::error!("Unable to create GLFW OpenGL context");
            return;
        }
        self.own_context = true;

        if let Some(interval) = self.swap_interval {
            self.set_swap_control(interval);
        }
        self.initialized = self.window_id.is_some();
        if self.initial_full_screen {
            self.set_full_screen(true);
        }
    }

    fn finalize(&mut self) {
        self.destroy_window();
    }

    fn start(&mut self) {
        if !self.initialized {
            self.initialize();
        }
        self.make_current();
    }

    fn render(&mut self) {
        if !self.initialized {
            log::debug!("Render skipped: window not initialized");
            return;
        }
        self.make_current();
        let size = self.size;
        for renderer in &mut self.renderers {
            renderer.render(size);
        }
        self.frame();
    }

    fn frame(&mut self) {
        if self.abort_render || !self.double_buffer || !self.swap_buffers {
            return;
        }
        if let Some(window) = self.window_id {
            self.system.platform_mut().swap_buffers(window);
        }
    }

    fn make_current(&mut self) {
        if let Some(window) = self.window_id {
            self.system.platform_mut().make_context_current(Some(window));
            self.context_id = Some(window);
        }
    }

    fn is_current(&self) -> bool {
        self.window_id.is_some() && self.system.platform().current_context() == self.window_id
    }

    fn push_context(&mut self) {
        let current = self.system.platform().current_context();
        self.context_stack.push(current);
        if current != self.context_id {
            self.make_current();
        }
    }

    fn pop_context(&mut self) {
        let Some(target) = self.context_stack.pop() else {
            log::warn!("pop_context without matching push_context");
            return;
        };
        let current = self.system.platform().current_context();
        if target != current {
            self.system.platform_mut().make_context_current(target);
        }
    }

    fn set_swap_control(&mut self, interval: i32) -> bool {
        self.system.platform_mut().set_swap_interval(interval);
        true
    }

    fn size(&mut self) -> (i32, i32) {
        if let (Some(window), true) = (self.window_id, self.mapped) {
            if let Some(size) = self.system.platform().window_size(window) {
                self.size = size;
            }
        }
        self.size
    }

    fn set_size(&mut self, width: i32, height: i32) {
        if self.size == (width, height) {
            return;
        }
        self.size = (width, height);
        if let Some(size) = self.interactor_size.as_ref().and_then(Weak::upgrade) {
            size.set((width, height));
        }
        if let Some(window) = self.window_id {
            self.system.platform_mut().set_window_size(window, width, height);
        }
        self.render();
    }

    fn position(&mut self) -> (i32, i32) {
        if !self.mapped {
            return self.position;
        }
        if let Some(position) = self
            .window_id
            .and_then(|window| self.system.platform().window_pos(window))
        {
            self.position = position;
        }
        self.position
    }

    fn set_position(&mut self, x: i32, y: i32) {
        if self.position == (x, y) {
            return;
        }
        self.position = (x, y);
        if let (Some(window), true) = (self.window_id, self.mapped) {
            self.system.platform_mut().set_window_pos(window, x, y);
        }
    }

    fn screen_size(&mut self) -> (i32, i32) {
        let monitor = self.system.platform_mut().primary_monitor();
        monitor.map_or(self.size, |monitor| {
            (
                i32::try_from(monitor.video_mode.width).unwrap_or(i32::MAX),
                i32::try_from(monitor.video_mode.height).unwrap_or(i32::MAX),
            )
        })
    }

    fn full_screen(&self) -> bool {
        self.full_screen
    }

    fn set_full_screen(&mut self, full_screen: bool) {
        if self.full_screen == full_screen || !self.mapped {
            return;
        }
        let Some(window) = self.window_id else {
            return;
        };

        if full_screen {
            let Some((origin, extent, refresh)) = self.screen_geometry_for_monitor() else {
                log::warn!("Cannot enter full screen: no primary monitor");
                return;
            };
            let windowed = (self.position(), self.size());
            self.windowed_geometry = Some(windowed);
            self.system
                .platform_mut()
                .set_window_monitor(window, true, origin, extent, Some(refresh));
        } else {
            let (position, size) = self
                .windowed_geometry
                .take()
                .unwrap_or((self.position, self.size));
            let extent = (size.0.unsigned_abs(), size.1.unsigned_abs());
            self.system
                .platform_mut()
                .set_window_monitor(window, false, position, extent, None);
        }
        self.full_screen = full_screen;
    }

    fn show_window(&self) -> bool {
        self.show_window
    }

    fn set_show_window(&mut self, show: bool) {
        if show == self.show_window {
            return;
        }
        if let Some(window) = self.window_id {
            let mut platform = self.system.platform_mut();
            if show {
                platform.show_window(window);
            } else {
                platform.hide_window(window);
            }
            self.mapped = show;
        }
        self.show_window = show;
    }

    fn window_name(&self) -> &str {
        &self.window_name
    }

    fn set_window_name(&mut self, name: &str) {
        name.clone_into(&mut self.window_name);
        if let Some(window) = self.window_id {
            self.system.platform_mut().set_window_title(window, name);
        }
    }

    fn dpi(&self) -> f64 {
        self.dpi
    }

    fn hide_cursor(&mut self) {
        if let Some(window) = self.window_id {
            self.system
                .platform_mut()
                .set_cursor_mode(window, CursorMode::Hidden);
        }
    }

    fn show_cursor(&mut self) {
        if let Some(window) = self.window_id {
            self.system
                .platform_mut()
                .set_cursor_mode(window, CursorMode::Normal);
        }
    }

    fn color_buffer_sizes(&self) -> [u8; 4] {
        [8, 8, 8, 8]
    }

    fn native_window_id(&self) -> Option<WindowId> {
        self.window_id
    }

    fn should_close(&self) -> bool {
        self.window_id
            .is_some_and(|window| self.system.platform().window_should_close(window))
    }

    fn attach_interactor_size(&mut self, size: Weak<Cell<(i32, i32)>>) {
        self.interactor_size = Some(size);
    }

    fn add_renderer(&mut self, renderer: Box<dyn Renderer>) {
        self.renderers.push(renderer);
    }
}

impl<P: Platform> Drop for GlfwRenderWindow<P> {
    fn drop(&mut self) {
        self.destroy_window();
    }
}
