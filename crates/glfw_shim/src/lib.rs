//! # GLFW Shim
//!
//! A GLFW windowing backend for a visualization toolkit: an OpenGL render
//! window and an input interactor that turns native GLFW callbacks into the
//! toolkit's event vocabulary.
//!
//! ## Features
//!
//! - **Render Window**: context creation and sharing, buffer swapping,
//!   geometry, visibility, full screen and DPI
//! - **Interactor**: keyboard, mouse, scroll, drag-and-drop, enter/leave and
//!   resize decoding with toolkit (bottom-left origin) coordinates
//! - **Headless Platform**: an in-memory platform for tests and CI
//! - **Configuration**: TOML or RON files for window, interactor and logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use glfw_shim::prelude::*;
//!
//! let system = WindowSystem::new(GlfwPlatform::new());
//! let window = RenderWindow::new(GlfwRenderWindow::new(system.clone()));
//!
//! let mut interactor = GlfwRenderWindowInteractor::new(system);
//! interactor.set_render_window(&window);
//! interactor.add_observer(
//!     EventId::KeyPress,
//!     Box::new(|context: &mut EventContext<'_>| {
//!         if context.info.key_sym.as_deref() == Some("q") {
//!             context.request_terminate();
//!         }
//!         true
//!     }),
//! );
//!
//! window.render();
//! interactor.initialize();
//! interactor.start_event_loop();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod config;
pub mod foundation;
pub mod interactor;
pub mod platform;
pub mod toolkit;
pub mod window;

pub use interactor::GlfwRenderWindowInteractor;
pub use window::GlfwRenderWindow;

/// Common imports for shim users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, InteractorConfig, LoggingConfig, ShimConfig, WindowConfig},
        interactor::GlfwRenderWindowInteractor,
        platform::{
            Action, GlfwPlatform, HeadlessPlatform, Key, Modifiers, MouseButton, NativeEvent,
            Platform, PlatformError, WindowId, WindowSystem,
        },
        toolkit::{
            EventContext, EventId, EventInfo, EventPayload, InteractorBackend, RenderWindow,
            Renderer, TimerKind, WindowBackend,
        },
        window::GlfwRenderWindow,
    };
}
