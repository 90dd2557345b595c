//! Toolkit-facing contracts
//!
//! - **`backend`**: the `WindowBackend` / `InteractorBackend` capability traits
//! - **`events`**: event ids, normalized event information, observer dispatch
//! - **`handle`**: the shared `RenderWindow` handle applications hold

pub mod backend;
pub mod events;
pub mod handle;

pub use backend::{InteractorBackend, Renderer, TimerKind, WindowBackend};
pub use events::{
    Dispatch, EventContext, EventDispatcher, EventId, EventInfo, EventObserver, EventPayload,
    ObserverId,
};
pub use handle::RenderWindow;
