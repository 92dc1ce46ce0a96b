#![forbid(unsafe_code)]

//! The Changing-Set: controls currently undergoing a user-driven edit.
//!
//! A control's change handler holds an [`EditGuard`] while it calls the
//! setter. Reflect listeners consult [`ChangingSet::is_changing`] and skip
//! the control that originated the change, which breaks the
//! control → setter → listener → control loop.
//!
//! # Invariants
//!
//! 1. Membership is released when the guard drops: on success, on error,
//!    and on unwind.
//! 2. Edits of different controls nest; every control on the stack is
//!    suppressed until its own guard drops.
//! 3. Re-entrant edits of the same control are counted, so an inner guard
//!    dropping does not release the outer edit.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque identity of one control.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(u64);

static NEXT_CONTROL_ID: AtomicU64 = AtomicU64::new(1);

impl ControlId {
    /// A process-unique id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_CONTROL_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctl#{}", self.0)
    }
}

/// Shared set of controls being edited, owned by one adapter.
///
/// Cloning yields another handle to the same set.
#[derive(Clone, Default)]
pub struct ChangingSet {
    active: Rc<RefCell<HashMap<ControlId, usize>>>,
}

impl fmt::Debug for ChangingSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<ControlId> = self.active.borrow().keys().copied().collect();
        ids.sort_unstable();
        f.debug_struct("ChangingSet").field("active", &ids).finish()
    }
}

impl ChangingSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `control` as being edited until the returned guard drops.
    #[must_use = "dropping the guard ends the edit immediately"]
    pub fn begin_edit(&self, control: ControlId) -> EditGuard {
        let depth = {
            let mut active = self.active.borrow_mut();
            let depth = active.entry(control).or_insert(0);
            *depth += 1;
            *depth
        };
        tracing::trace!(control = %control, depth, "edit begins");
        EditGuard {
            active: Rc::clone(&self.active),
            control,
        }
    }

    #[must_use]
    pub fn is_changing(&self, control: ControlId) -> bool {
        self.active.borrow().contains_key(&control)
    }

    /// Number of distinct controls being edited.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.borrow().is_empty()
    }
}

/// RAII membership in a [`ChangingSet`].
#[must_use = "dropping the guard ends the edit immediately"]
pub struct EditGuard {
    active: Rc<RefCell<HashMap<ControlId, usize>>>,
    control: ControlId,
}

impl EditGuard {
    #[must_use]
    pub fn control(&self) -> ControlId {
        self.control
    }
}

impl fmt::Debug for EditGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditGuard")
            .field("control", &self.control)
            .finish()
    }
}

impl Drop for EditGuard {
    fn drop(&mut self) {
        let mut active = self.active.borrow_mut();
        if let Some(depth) = active.get_mut(&self.control) {
            *depth -= 1;
            if *depth == 0 {
                active.remove(&self.control);
            }
        }
        tracing::trace!(control = %self.control, "edit ends");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    #[test]
    fn guard_releases_on_drop() {
        let set = ChangingSet::new();
        let id = ControlId::next();
        {
            let guard = set.begin_edit(id);
            assert_eq!(guard.control(), id);
            assert!(set.is_changing(id));
        }
        assert!(!set.is_changing(id));
        assert!(set.is_empty());
    }

    #[test]
    fn nested_edits_of_different_controls() {
        let set = ChangingSet::new();
        let text = ControlId::next();
        let slider = ControlId::next();
        let _outer = set.begin_edit(text);
        {
            let _inner = set.begin_edit(slider);
            assert!(set.is_changing(text));
            assert!(set.is_changing(slider));
            assert_eq!(set.len(), 2);
        }
        assert!(set.is_changing(text));
        assert!(!set.is_changing(slider));
    }

    #[test]
    fn reentrant_edit_is_counted() {
        let set = ChangingSet::new();
        let id = ControlId::next();
        let outer = set.begin_edit(id);
        let inner = set.begin_edit(id);
        drop(inner);
        assert!(set.is_changing(id));
        drop(outer);
        assert!(!set.is_changing(id));
    }

    #[test]
    fn guard_releases_on_unwind() {
        let set = ChangingSet::new();
        let id = ControlId::next();
        let s = set.clone();
        let result = catch_unwind(AssertUnwindSafe(move || {
            let _g = s.begin_edit(id);
            panic!("setter exploded");
        }));
        assert!(result.is_err());
        assert!(!set.is_changing(id));
    }

    #[test]
    fn ids_are_unique_and_displayable() {
        let a = ControlId::next();
        let b = ControlId::next();
        assert_ne!(a, b);
        assert!(a.to_string().starts_with("ctl#"));
    }
}
