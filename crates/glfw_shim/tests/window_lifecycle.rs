//! Render window lifecycle against the headless platform
//!
//! Covers context save/restore across windows, resize short-circuiting and
//! native teardown.

use std::cell::Cell;
use std::rc::Rc;

use glfw_shim::platform::{NativeCall, Platform};
use glfw_shim::prelude::*;

struct CountingRenderer {
    frames: Rc<Cell<u32>>,
    last_size: Rc<Cell<(i32, i32)>>,
}

impl Renderer for CountingRenderer {
    fn render(&mut self, size: (i32, i32)) {
        self.frames.set(self.frames.get() + 1);
        self.last_size.set(size);
    }
}

fn initialized_window(system: &Rc<WindowSystem<HeadlessPlatform>>) -> RenderWindow {
    let window = RenderWindow::new(GlfwRenderWindow::new(Rc::clone(system)));
    window.initialize();
    window
}

#[test]
fn test_initialize_is_idempotent() {
    let system = WindowSystem::new(HeadlessPlatform::new());
    let window = initialized_window(&system);
    window.initialize();
    window.with(|backend| backend.start());

    let created = system
        .platform()
        .count_calls(|call| matches!(call, NativeCall::CreateWindow { .. }));
    assert_eq!(created, 1);
    assert_eq!(system.platform().window_count(), 1);
}

#[test]
fn test_push_pop_restores_context_across_windows() {
    let system = WindowSystem::new(HeadlessPlatform::new());
    let first = initialized_window(&system);
    let second = initialized_window(&system);
    let second_id = second.native_window_id();
    assert_eq!(system.platform().current_context(), second_id);

    first.with(|backend| backend.push_context());
    assert_eq!(system.platform().current_context(), first.native_window_id());
    second.with(|backend| backend.push_context());
    first.with(|backend| backend.push_context());

    first.with(|backend| backend.pop_context());
    second.with(|backend| backend.pop_context());
    first.with(|backend| backend.pop_context());
    assert_eq!(system.platform().current_context(), second_id);
}

#[test]
fn test_unbalanced_pop_is_harmless() {
    let system = WindowSystem::new(HeadlessPlatform::new());
    let window = initialized_window(&system);
    let current = system.platform().current_context();

    window.with(|backend| backend.pop_context());
    assert_eq!(system.platform().current_context(), current);
}

#[test]
fn test_resize_to_same_size_is_a_no_op() {
    let system = WindowSystem::new(HeadlessPlatform::new());
    let window = initialized_window(&system);
    let frames = Rc::new(Cell::new(0));
    let last_size = Rc::new(Cell::new((0, 0)));
    window.add_renderer(CountingRenderer {
        frames: Rc::clone(&frames),
        last_size: Rc::clone(&last_size),
    });
    system.platform_mut().clear_calls();

    window.set_size(300, 300);
    assert_eq!(frames.get(), 0);
    assert_eq!(
        system
            .platform()
            .count_calls(|call| matches!(call, NativeCall::SetSize(..))),
        0
    );

    window.set_size(640, 480);
    assert_eq!(frames.get(), 1);
    assert_eq!(last_size.get(), (640, 480));
    let id = window.native_window_id().unwrap();
    assert_eq!(
        system
            .platform()
            .count_calls(|call| *call == NativeCall::SetSize(id, 640, 480)),
        1
    );
    assert_eq!(window.size(), (640, 480));
}

#[test]
fn test_render_before_initialize_draws_nothing() {
    let system = WindowSystem::new(HeadlessPlatform::new());
    let window = RenderWindow::new(GlfwRenderWindow::new(Rc::clone(&system)));
    let frames = Rc::new(Cell::new(0));
    window.add_renderer(CountingRenderer {
        frames: Rc::clone(&frames),
        last_size: Rc::new(Cell::new((0, 0))),
    });

    window.render();
    assert_eq!(frames.get(), 0);
    assert!(system.platform().calls().is_empty());

    window.initialize();
    window.render();
    assert_eq!(frames.get(), 1);
    assert_eq!(
        system
            .platform()
            .count_calls(|call| matches!(call, NativeCall::SwapBuffers(_))),
        1
    );
}

#[test]
fn test_configured_window() {
    let system = WindowSystem::new(HeadlessPlatform::new());
    let config = WindowConfig {
        title: "Cone".to_string(),
        width: 800,
        height: 600,
        swap_interval: Some(1),
        show_window: false,
        ..WindowConfig::default()
    };
    let window = RenderWindow::new(GlfwRenderWindow::from_config(Rc::clone(&system), &config));
    window.initialize();

    let id = window.native_window_id().unwrap();
    let platform = system.platform();
    assert_eq!(platform.window_title(id), Some("Cone"));
    assert_eq!(platform.window_size(id), Some((800, 600)));
    assert!(!platform.is_visible(id));
    assert_eq!(platform.count_calls(|call| *call == NativeCall::SwapInterval(1)), 1);
}

#[test]
fn test_shared_context_is_forwarded() {
    let system = WindowSystem::new(HeadlessPlatform::new());
    let parent = initialized_window(&system);
    let parent_id = parent.native_window_id();

    let mut child = GlfwRenderWindow::new(Rc::clone(&system));
    child.set_shared_context(parent_id);
    child.initialize();

    let shared = system.platform().count_calls(|call| {
        matches!(call, NativeCall::CreateWindow { share, .. } if *share == parent_id)
    });
    assert_eq!(shared, 1);
}

#[test]
fn test_dropping_last_handle_destroys_native_window() {
    let system = WindowSystem::new(HeadlessPlatform::new());
    let window = initialized_window(&system);
    let id = window.native_window_id().unwrap();
    let clone = window.clone();

    drop(window);
    assert!(system.platform().has_window(id));

    drop(clone);
    assert!(!system.platform().has_window(id));
    assert_eq!(system.platform().current_context(), None);
}

#[test]
fn test_context_queries_are_per_system() {
    let first_system = WindowSystem::new(HeadlessPlatform::new());
    let second_system = WindowSystem::new(HeadlessPlatform::new());
    let first = initialized_window(&first_system);
    let mut second = GlfwRenderWindow::new(Rc::clone(&second_system));
    second.initialize();
    second_system.platform_mut().make_context_current(None);

    assert_eq!(
        first_system.platform().current_context(),
        first.native_window_id()
    );
    assert_eq!(second_system.platform().current_context(), None);

    second.push_context();
    assert_eq!(second_system.platform().current_context(), second.native_window_id());
    second.pop_context();
    assert_eq!(second_system.platform().current_context(), None);
}
