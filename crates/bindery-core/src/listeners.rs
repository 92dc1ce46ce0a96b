#![forbid(unsafe_code)]

//! Per-instance listener lists.
//!
//! Every object that exposes notifying setters embeds a [`ListenerRegistry`]
//! and implements [`Notifier`]. The registry maps a setter's identity to that
//! instance's [`ListenerList`], creating the list on first access.
//!
//! # Invariants
//!
//! 1. Lists are unique per (instance, setter): two instances of the same type
//!    never share a list, and one instance always returns the same list for
//!    the same setter.
//! 2. Listeners run in registration order.
//! 3. Notification iterates a snapshot taken when it starts. Listeners added
//!    during a notification first run on the next one.
//! 4. A failing listener does not stop the listeners after it.
//! 5. A listener pushed with an owner ([`ListenerList::push_owned`]) never
//!    runs after the owner is dropped, and is pruned from the list on the
//!    next access.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Listener returns `Err` | user callback failed | logged at `warn`, counted, next listener runs |
//! | Listener re-enters setter | reflect loop | allowed, guarded at the adapter layer |

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::ListenerError;

/// Identity of a setter within one instance's registry.
///
/// Setter names are unique per type; the value type is part of the key so a
/// lookup can never hand back a list of the wrong element type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SetterKey {
    name: &'static str,
    value_type: TypeId,
}

impl SetterKey {
    #[must_use]
    pub fn of<V: 'static>(name: &'static str) -> Self {
        Self {
            name,
            value_type: TypeId::of::<V>(),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

/// Objects owning per-instance listener storage.
pub trait Notifier {
    fn listener_registry(&self) -> &ListenerRegistry;
}

/// Per-instance map from setter identity to listener list.
#[derive(Default)]
pub struct ListenerRegistry {
    lists: RefCell<HashMap<SetterKey, Box<dyn Any>>>,
}

impl ListenerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The list for `key`, created empty on first access.
    pub fn list<V: 'static>(&self, key: SetterKey) -> ListenerList<V> {
        let mut lists = self.lists.borrow_mut();
        if let Some(existing) = lists
            .get(&key)
            .and_then(|any| any.downcast_ref::<ListenerList<V>>())
        {
            return existing.clone();
        }
        let list = ListenerList::new(key.name());
        lists.insert(key, Box::new(list.clone()));
        tracing::trace!(setter = key.name(), "created listener list");
        list
    }

    /// Number of lists created so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lists.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lists.borrow().is_empty()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lists = self.lists.borrow();
        let mut names: Vec<&str> = lists.keys().map(SetterKey::name).collect();
        names.sort_unstable();
        f.debug_struct("ListenerRegistry")
            .field("setters", &names)
            .finish()
    }
}

type ListenerFn<V> = dyn Fn(&V) -> Result<(), ListenerError>;

/// A single registered callback.
pub struct Listener<V> {
    call: Rc<ListenerFn<V>>,
    owner: Option<Weak<dyn Any>>,
}

impl<V> Clone for Listener<V> {
    fn clone(&self) -> Self {
        Self {
            call: Rc::clone(&self.call),
            owner: self.owner.clone(),
        }
    }
}

impl<V> Listener<V> {
    fn new(call: Rc<ListenerFn<V>>) -> Self {
        Self { call, owner: None }
    }

    pub fn invoke(&self, payload: &V) -> Result<(), ListenerError> {
        (self.call)(payload)
    }

    /// `false` once the owner, if any, has been dropped.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.owner.as_ref().is_none_or(|owner| owner.strong_count() > 0)
    }
}

/// Outcome of one fan-out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Delivery {
    pub delivered: usize,
    pub failed: usize,
}

/// Shared, ordered, mutable sequence of listeners for one (instance, setter).
///
/// Cloning yields another handle to the same list.
pub struct ListenerList<V> {
    setter: &'static str,
    entries: Rc<RefCell<Vec<Listener<V>>>>,
}

impl<V> Clone for ListenerList<V> {
    fn clone(&self) -> Self {
        Self {
            setter: self.setter,
            entries: Rc::clone(&self.entries),
        }
    }
}

impl<V: 'static> fmt::Debug for ListenerList<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerList")
            .field("setter", &self.setter)
            .field("len", &self.len())
            .finish()
    }
}

impl<V: 'static> ListenerList<V> {
    fn new(setter: &'static str) -> Self {
        Self {
            setter,
            entries: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Append an infallible listener.
    pub fn push(&self, f: impl Fn(&V) + 'static) {
        self.push_fallible(move |v| {
            f(v);
            Ok(())
        });
    }

    /// Append a listener that may fail.
    pub fn push_fallible(&self, f: impl Fn(&V) -> Result<(), ListenerError> + 'static) {
        self.append(Listener::new(Rc::new(f)));
    }

    /// Append a listener that lives only as long as `owner`. Once the owner
    /// is dropped the listener stops running and is pruned.
    pub fn push_owned(
        &self,
        owner: Weak<dyn Any>,
        f: impl Fn(&V) -> Result<(), ListenerError> + 'static,
    ) {
        self.append(Listener {
            call: Rc::new(f),
            owner: Some(owner),
        });
    }

    fn append(&self, listener: Listener<V>) {
        let mut entries = self.entries.borrow_mut();
        entries.retain(Listener::is_live);
        entries.push(listener);
    }

    /// Insert an infallible listener at `index`, shifting later ones.
    /// Returns `false`, dropping `f`, when `index > len`.
    pub fn insert(&self, index: usize, f: impl Fn(&V) + 'static) -> bool {
        let mut entries = self.entries.borrow_mut();
        entries.retain(Listener::is_live);
        if index > entries.len() {
            return false;
        }
        let listener = Listener::new(Rc::new(move |v: &V| {
            f(v);
            Ok(())
        }));
        entries.insert(index, listener);
        true
    }

    /// Drop listeners whose owner is gone. Returns how many were removed.
    pub fn prune(&self) -> usize {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(Listener::is_live);
        let pruned = before - entries.len();
        if pruned > 0 {
            tracing::trace!(setter = self.setter, pruned, "pruned dead listeners");
        }
        pruned
    }

    /// Remove the listener at `index`. Returns `false` when out of range.
    pub fn remove(&self, index: usize) -> bool {
        let mut entries = self.entries.borrow_mut();
        entries.retain(Listener::is_live);
        if index < entries.len() {
            entries.remove(index);
            true
        } else {
            false
        }
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    /// Number of live listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prune();
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the current live entries.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Listener<V>> {
        self.prune();
        self.entries.borrow().clone()
    }

    /// Whether both handles refer to the same underlying list.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.entries, &other.entries)
    }

    /// Invoke every listener present now, in order, with `payload`.
    pub fn notify(&self, payload: &V) -> Delivery {
        let snapshot = self.snapshot();
        let mut delivery = Delivery::default();
        for (index, listener) in snapshot.iter().enumerate() {
            // An earlier listener may have dropped this one's owner.
            if !listener.is_live() {
                continue;
            }
            match listener.invoke(payload) {
                Ok(()) => delivery.delivered += 1,
                Err(err) => {
                    delivery.failed += 1;
                    tracing::warn!(setter = self.setter, index, error = %err, "listener failed");
                }
            }
        }
        delivery
    }
}
