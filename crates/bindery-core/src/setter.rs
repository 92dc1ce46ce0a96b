#![forbid(unsafe_code)]

//! Notifying setters.
//!
//! A [`NotifyingSetter`] wraps a plain setter function. Each successful call
//! fans the new value out to the calling instance's listener list:
//!
//! 1. the wrapped function runs with the original value;
//! 2. the payload is the function's returned value when it returned
//!    `Some`, otherwise the original value;
//! 3. every listener of `(instance, setter)` runs once, in registration
//!    order, with the payload;
//! 4. the function's return value goes back to the caller unchanged.
//!
//! When the function fails, no listener runs and the error reaches the
//! caller as is.
//!
//! Setters are plain `fn` pointers so they can live in associated consts and
//! be called from other methods of the same type:
//!
//! ```
//! use std::cell::Cell;
//! use bindery_core::error::SetterError;
//! use bindery_core::listeners::{ListenerRegistry, Notifier};
//! use bindery_core::setter::NotifyingSetter;
//!
//! #[derive(Default)]
//! struct Amp {
//!     volume: Cell<i64>,
//!     listeners: ListenerRegistry,
//! }
//!
//! impl Notifier for Amp {
//!     fn listener_registry(&self) -> &ListenerRegistry {
//!         &self.listeners
//!     }
//! }
//!
//! impl Amp {
//!     const VOLUME: NotifyingSetter<Self, i64> = NotifyingSetter::new("volume", Self::set_volume);
//!
//!     fn set_volume(&self, v: i64) -> Result<Option<i64>, SetterError> {
//!         let clamped = v.clamp(0, 11);
//!         self.volume.set(clamped);
//!         Ok(Some(clamped))
//!     }
//! }
//!
//! let amp = Amp::default();
//! let seen = std::rc::Rc::new(Cell::new(0));
//! let s = seen.clone();
//! Amp::VOLUME.listeners(&amp).push(move |v| s.set(*v));
//!
//! assert_eq!(Amp::VOLUME.call(&amp, 20).unwrap(), Some(11));
//! assert_eq!(seen.get(), 11);
//! ```

use std::fmt;

use crate::error::SetterError;
use crate::listeners::{Delivery, ListenerList, Notifier, SetterKey};

/// Signature of a wrapped setter.
pub type SetterFn<M, V> = fn(&M, V) -> Result<Option<V>, SetterError>;

/// A setter that notifies per-instance listeners after every successful call.
pub struct NotifyingSetter<M, V> {
    name: &'static str,
    f: SetterFn<M, V>,
}

impl<M, V> Clone for NotifyingSetter<M, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M, V> Copy for NotifyingSetter<M, V> {}

impl<M, V> fmt::Debug for NotifyingSetter<M, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifyingSetter")
            .field("name", &self.name)
            .finish()
    }
}

/// Result of a call, with the fan-out outcome.
#[derive(Clone, Debug, PartialEq)]
pub struct Notification<V> {
    /// What the wrapped function returned.
    pub returned: Option<V>,
    pub delivery: Delivery,
}

impl<M, V> NotifyingSetter<M, V> {
    /// Wrap `f` under `name`. Names must be unique among a type's setters.
    #[must_use]
    pub const fn new(name: &'static str, f: SetterFn<M, V>) -> Self {
        Self { name, f }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<M: Notifier, V: Clone + 'static> NotifyingSetter<M, V> {
    #[must_use]
    pub fn key(&self) -> SetterKey {
        SetterKey::of::<V>(self.name)
    }

    /// Call the setter on `instance`, then notify its listeners.
    ///
    /// # Errors
    ///
    /// Returns the wrapped function's error unchanged; listeners do not run.
    pub fn call(&self, instance: &M, value: V) -> Result<Option<V>, SetterError> {
        self.call_reporting(instance, value).map(|n| n.returned)
    }

    /// Like [`call`](Self::call), also reporting how many listeners ran and
    /// how many failed.
    ///
    /// # Errors
    ///
    /// Returns the wrapped function's error unchanged; listeners do not run.
    pub fn call_reporting(&self, instance: &M, value: V) -> Result<Notification<V>, SetterError> {
        let original = value.clone();
        let returned = (self.f)(instance, value)?;
        let payload = returned.as_ref().unwrap_or(&original);
        let delivery = self.listeners(instance).notify(payload);
        tracing::trace!(
            setter = self.name,
            delivered = delivery.delivered,
            failed = delivery.failed,
            "setter notified"
        );
        Ok(Notification { returned, delivery })
    }

    /// The listener list of `instance` for this setter, created on first
    /// access.
    pub fn listeners(&self, instance: &M) -> ListenerList<V> {
        instance.listener_registry().list::<V>(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listeners::ListenerRegistry;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Default)]
    struct Knob {
        val: Cell<i32>,
        val2: Cell<i32>,
        calls: Cell<u32>,
        listeners: ListenerRegistry,
    }

    impl Notifier for Knob {
        fn listener_registry(&self) -> &ListenerRegistry {
            &self.listeners
        }
    }

    impl Knob {
        const VAL: NotifyingSetter<Self, i32> = NotifyingSetter::new("val", Self::set_val);
        const VAL2: NotifyingSetter<Self, i32> = NotifyingSetter::new("val2", Self::set_val2);
        const FAILING: NotifyingSetter<Self, i32> = NotifyingSetter::new("failing", Self::reject);

        fn set_val(&self, v: i32) -> Result<Option<i32>, SetterError> {
            self.calls.set(self.calls.get() + 1);
            self.val.set(v);
            Ok(None)
        }

        fn reject(&self, _v: i32) -> Result<Option<i32>, SetterError> {
            Err(SetterError::new("rejected"))
        }

        fn set_val2(&self, v: i32) -> Result<Option<i32>, SetterError> {
            let normalized = v.abs();
            self.val2.set(normalized);
            Ok(Some(normalized))
        }
    }

    fn recorder(list: &ListenerList<i32>) -> Rc<RefCell<Vec<i32>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        list.push(move |v| s.borrow_mut().push(*v));
        seen
    }

    #[test]
    fn payload_is_argument_when_nothing_returned() {
        let p = Knob::default();
        let seen = recorder(&Knob::VAL.listeners(&p));
        assert_eq!(Knob::VAL.call(&p, 2).unwrap(), None);
        assert_eq!(p.val.get(), 2);
        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn payload_is_returned_value_when_present() {
        let p = Knob::default();
        let seen = recorder(&Knob::VAL2.listeners(&p));
        assert_eq!(Knob::VAL2.call(&p, -42).unwrap(), Some(42));
        assert_eq!(*seen.borrow(), vec![42]);
    }

    #[test]
    fn error_skips_listeners_and_propagates() {
        let p = Knob::default();
        let seen = recorder(&Knob::FAILING.listeners(&p));
        let err = Knob::FAILING.call(&p, 1).unwrap_err();
        assert_eq!(err.to_string(), "rejected");
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn listeners_are_per_instance() {
        let a = Knob::default();
        let b = Knob::default();
        let seen_a = recorder(&Knob::VAL.listeners(&a));
        Knob::VAL.call(&b, 9).unwrap();
        assert!(seen_a.borrow().is_empty());
        assert!(Knob::VAL.listeners(&b).is_empty());
        assert!(!Knob::VAL.listeners(&a).ptr_eq(&Knob::VAL.listeners(&b)));
    }

    #[test]
    fn reporting_counts_deliveries() {
        let p = Knob::default();
        let list = Knob::VAL.listeners(&p);
        list.push(|_| {});
        list.push_fallible(|_| Err(crate::error::ListenerError::new("x")));
        let n = Knob::VAL.call_reporting(&p, 3).unwrap();
        assert_eq!(n.returned, None);
        assert_eq!(n.delivery.delivered, 1);
        assert_eq!(n.delivery.failed, 1);
    }

    #[test]
    fn setter_without_listeners_still_runs() {
        let p = Knob::default();
        Knob::VAL.call(&p, 5).unwrap();
        assert_eq!(p.calls.get(), 1);
        assert_eq!(Knob::VAL.name(), "val");
    }
}
