//! Shared mutable state handle used by the async orchestration functions.
//!
//! Everything runs on one logical thread; continuations interleave only at
//! `.await` points, so a handle is borrowed for the duration of one closure
//! and never across an await.

use std::cell::RefCell;
use std::rc::Rc;

pub trait StateCell<T> {
    /// Mutate the state. `None` when the underlying state is gone
    /// (e.g. the owning page was disposed).
    fn update_with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R>;
}

impl<T> StateCell<T> for Rc<RefCell<T>> {
    fn update_with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        Some(f(&mut self.borrow_mut()))
    }
}
