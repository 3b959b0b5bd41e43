//! Dependency-keyed memoization.
//!
//! Stands in for a UI host's "memo by dependency list" primitive: the cached
//! value is kept until the dependency key changes.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Caches one value against a dependency key.
pub struct Memo<D, T> {
    slot: RefCell<Option<(D, T)>>,
}

impl<D: PartialEq, T: Clone> Memo<D, T> {
    pub fn new() -> Self {
        Self {
            slot: RefCell::new(None),
        }
    }

    /// Return the cached value if `deps` equals the stored key, otherwise
    /// compute, store and return a new one.
    ///
    /// The second element is `true` on a cache hit.
    pub fn get_or_compute(&self, deps: D, compute: impl FnOnce() -> T) -> (T, bool) {
        if let Some((cached_deps, value)) = self.slot.borrow().as_ref() {
            if *cached_deps == deps {
                return (value.clone(), true);
            }
        }

        let value = compute();
        *self.slot.borrow_mut() = Some((deps, value.clone()));
        (value, false)
    }

    /// Drop the cached value.
    #[cfg(test)]
    pub fn clear(&self) {
        self.slot.borrow_mut().take();
    }

    #[cfg(test)]
    pub fn is_cached(&self) -> bool {
        self.slot.borrow().is_some()
    }
}

impl<D: PartialEq, T: Clone> Default for Memo<D, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D, T> fmt::Debug for Memo<D, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo")
            .field("cached", &self.slot.borrow().is_some())
            .finish()
    }
}

/// Dependency that compares by `Rc` pointer instead of by value.
///
/// Holding the `Rc` keeps the allocation alive, so a freed pointer can never be
/// mistaken for a new table at the same address.
pub struct ByRef<T>(pub Rc<T>);

impl<T> PartialEq for ByRef<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for ByRef<T> {
    fn clone(&self) -> Self {
        ByRef(Rc::clone(&self.0))
    }
}

impl<T> fmt::Debug for ByRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByRef({:p})", Rc::as_ptr(&self.0))
    }
}
