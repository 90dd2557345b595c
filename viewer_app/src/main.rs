//! Minimal viewer
//!
//! Opens a GLFW render window, attaches an interactor and logs the toolkit
//! events it raises. `q` or `e` quits, `f` toggles full screen, and dropping
//! files onto the window lists them.
//!
//! Usage: `viewer [config.toml|config.ron]`

use std::cell::Cell;
use std::rc::Rc;

use glfw_shim::foundation::logging;
use glfw_shim::prelude::*;

/// Logs the frame count and size of every rendered frame
struct FrameLogger {
    frames: Rc<Cell<u64>>,
}

impl Renderer for FrameLogger {
    fn render(&mut self, size: (i32, i32)) {
        let frame = self.frames.get() + 1;
        self.frames.set(frame);
        log::trace!("Frame {frame} at {}x{}", size.0, size.1);
    }
}

fn load_config() -> Result<ShimConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => ShimConfig::load_from_file(path),
        None => Ok(ShimConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    logging::init_with_level(&config.logging.level);

    log::info!("Starting viewer");

    let system = WindowSystem::new(GlfwPlatform::new());
    let window = RenderWindow::new(GlfwRenderWindow::from_config(
        Rc::clone(&system),
        &config.window,
    ));
    let frames = Rc::new(Cell::new(0));
    window.add_renderer(FrameLogger {
        frames: Rc::clone(&frames),
    });

    let mut interactor = GlfwRenderWindowInteractor::from_config(system, &config.interactor);
    interactor.set_render_window(&window);

    interactor.add_observer(
        EventId::KeyPress,
        Box::new(|context: &mut EventContext<'_>| match context.info.key_sym.as_deref() {
            Some("q" | "e") => {
                log::info!("Quit requested");
                context.request_terminate();
                true
            }
            _ => false,
        }),
    );

    let full_screen_window = window.clone();
    interactor.add_observer(
        EventId::KeyPress,
        Box::new(move |context: &mut EventContext<'_>| {
            if context.info.key_sym.as_deref() != Some("f") {
                return false;
            }
            full_screen_window.with(|backend| {
                let full_screen = !backend.full_screen();
                backend.set_full_screen(full_screen);
            });
            full_screen_window.render();
            true
        }),
    );

    interactor.add_observer(
        EventId::DropFiles,
        Box::new(|context: &mut EventContext<'_>| {
            if let EventPayload::FilePaths(paths) = context.payload {
                for path in paths {
                    log::info!("Dropped {}", path.display());
                }
            }
            true
        }),
    );

    let configure_window = window.clone();
    interactor.add_observer(
        EventId::Configure,
        Box::new(move |_: &mut EventContext<'_>| {
            configure_window.render();
            false
        }),
    );

    interactor.add_observer(
        EventId::LeftButtonPress,
        Box::new(|context: &mut EventContext<'_>| {
            let (x, y) = context.info.position;
            log::info!("Left click at ({x}, {y})");
            false
        }),
    );

    interactor.initialize();
    if !interactor.is_initialized() {
        return Err("interactor failed to initialize".into());
    }
    window.render();

    let dpi = window.with(|backend| backend.dpi());
    let (width, height) = window.size();
    log::info!("Window {width}x{height} at {dpi:.1} DPI");

    interactor.start_event_loop();

    log::info!("Viewer closed after {} frames", frames.get());
    window.with(|backend| backend.finalize());
    Ok(())
}
