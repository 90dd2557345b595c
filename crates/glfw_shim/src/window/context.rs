//! Save-and-restore stack for the thread's current context

use crate::platform::WindowId;

/// Contexts that were current before each push
///
/// `None` entries are meaningful: they record that no context was current.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ContextStack {
    saved: Vec<Option<WindowId>>,
}

impl ContextStack {
    /// Empty stack
    pub const fn new() -> Self {
        Self { saved: Vec::new() }
    }

    /// Remember the context that was current
    pub fn push(&mut self, current: Option<WindowId>) {
        self.saved.push(current);
    }

    /// Context to restore, or `None` when the stack is empty (unbalanced pop)
    pub fn pop(&mut self) -> Option<Option<WindowId>> {
        self.saved.pop()
    }

    /// Number of outstanding pushes
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// No outstanding pushes
    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }
}
