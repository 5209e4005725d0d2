use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Somewhere a view keeps its state.
///
/// Updates return `None` once the owning view has been torn down, so async
/// work that resolves late cannot write into a dead view.
pub trait StateCell<T>: Clone + 'static {
    fn try_update_state<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R>;
}

/// Plain `Rc<RefCell<_>>` cell for hosts without a reactive runtime.
pub struct Shared<T> {
    value: Rc<RefCell<T>>,
    live: Rc<Cell<bool>>,
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            value: Rc::clone(&self.value),
            live: Rc::clone(&self.live),
        }
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Rc::new(RefCell::new(value)),
            live: Rc::new(Cell::new(true)),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Marks the cell dead; later `try_update_state` calls are ignored.
    pub fn release(&self) {
        self.live.set(false);
    }

    pub fn is_live(&self) -> bool {
        self.live.get()
    }
}

impl<T: 'static> StateCell<T> for Shared<T> {
    fn try_update_state<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        if !self.live.get() {
            return None;
        }
        Some(f(&mut self.value.borrow_mut()))
    }
}
