//! Shared render-window handle
//!
//! The application owns the window; interactors only keep a weak reference
//! to it, so dropping the last [`RenderWindow`] tears the native window down
//! even while an interactor is still around.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::backend::{Renderer, WindowBackend};
use crate::platform::WindowId;

/// Owning, cloneable handle around any [`WindowBackend`]
#[derive(Clone)]
pub struct RenderWindow {
    backend: Rc<RefCell<dyn WindowBackend>>,
}

impl RenderWindow {
    /// Take ownership of a backend
    pub fn new<B: WindowBackend + 'static>(backend: B) -> Self {
        Self {
            backend: Rc::new(RefCell::new(backend)),
        }
    }

    /// Wrap a backend the caller also keeps a typed handle to
    pub fn from_shared(backend: Rc<RefCell<dyn WindowBackend>>) -> Self {
        Self { backend }
    }

    /// Non-owning reference for interactors
    pub fn downgrade(&self) -> Weak<RefCell<dyn WindowBackend>> {
        Rc::downgrade(&self.backend)
    }

    /// Run `f` against the backend
    ///
    /// # Panics
    /// Panics when called re-entrantly from inside another `with` on the same window.
    pub fn with<R>(&self, f: impl FnOnce(&mut dyn WindowBackend) -> R) -> R {
        let mut backend = self.backend.borrow_mut();
        f(&mut *backend)
    }

    /// Initialize the window and context
    pub fn initialize(&self) {
        self.with(|backend| backend.initialize());
    }

    /// Draw one frame
    pub fn render(&self) {
        self.with(|backend| backend.render());
    }

    /// Client-area size
    pub fn size(&self) -> (i32, i32) {
        self.with(|backend| backend.size())
    }

    /// Resize the window
    pub fn set_size(&self, width: i32, height: i32) {
        self.with(|backend| backend.set_size(width, height));
    }

    /// Native window id, once created
    pub fn native_window_id(&self) -> Option<WindowId> {
        self.backend.borrow().native_window_id()
    }

    /// Add a renderer
    pub fn add_renderer(&self, renderer: impl Renderer + 'static) {
        self.with(|backend| backend.add_renderer(Box::new(renderer)));
    }
}
