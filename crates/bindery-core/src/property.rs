#![forbid(unsafe_code)]

//! Explicit property registration and type-erased control bindings.
//!
//! A model type implements [`Bindable`] and lists its annotated setters and
//! buttons in [`Bindable::register`]. [`PropertyRegistry::bind`] turns them
//! into [`ControlBinding`]s, one per metadata record, which an adapter can
//! drive without knowing the model's value types.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use bindery_core::prelude::*;
//!
//! #[derive(Default)]
//! struct Fan {
//!     speed: Cell<i64>,
//!     listeners: ListenerRegistry,
//! }
//!
//! impl Notifier for Fan {
//!     fn listener_registry(&self) -> &ListenerRegistry {
//!         &self.listeners
//!     }
//! }
//!
//! impl Fan {
//!     const SPEED: NotifyingSetter<Self, i64> = NotifyingSetter::new("speed", Self::set_speed);
//!     const STOP: Action<Self> = Action::new("stop", Self::stop);
//!
//!     fn set_speed(&self, v: i64) -> Result<Option<i64>, SetterError> {
//!         self.speed.set(v);
//!         Ok(None)
//!     }
//!
//!     fn stop(&self) -> Result<(), SetterError> {
//!         Self::SPEED.call(self, 0).map(drop)
//!     }
//! }
//!
//! impl Bindable for Fan {
//!     fn register(registry: &mut PropertyRegistry<Self>) {
//!         registry
//!             .setter(UiSetter::new(Self::SPEED).with(slider(0, 5, 1.0)))
//!             .button(button(Self::STOP));
//!     }
//! }
//!
//! let fan = Rc::new(Fan::default());
//! let bindings = PropertyRegistry::<Fan>::of().bind(&fan);
//! assert_eq!(bindings.len(), 2);
//! bindings[0].apply(ControlValue::Position(3)).unwrap();
//! assert_eq!(fan.speed.get(), 3);
//! bindings[1].activate().unwrap();
//! assert_eq!(fan.speed.get(), 0);
//! ```

use std::any::Any;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::annotate::{Action, Annotation, UiSetter};
use crate::control::ControlValue;
use crate::error::{BindError, ListenerError};
use crate::listeners::Notifier;
use crate::metadata::{Annotated, ControlKind, Metadata, MetadataRecord};
use crate::setter::NotifyingSetter;

/// A model type whose annotated setters can be bound to controls.
pub trait Bindable: Notifier + 'static {
    /// Declare the annotated setters and buttons, in display order.
    fn register(registry: &mut PropertyRegistry<Self>)
    where
        Self: Sized;

    /// Title of the panel showing this object. Defaults to the type's name.
    fn panel_title(&self) -> String {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full).to_owned()
    }
}

trait Registered<M> {
    fn name(&self) -> &'static str;
    fn metadata(&self) -> &Metadata;
    fn bindings(&self, instance: &Rc<M>) -> Vec<ControlBinding>;
}

impl<M, V> Registered<M> for UiSetter<M, V>
where
    M: Notifier + 'static,
    V: Clone + 'static,
{
    fn name(&self) -> &'static str {
        UiSetter::name(self)
    }

    fn metadata(&self) -> &Metadata {
        UiSetter::metadata(self)
    }

    fn bindings(&self, instance: &Rc<M>) -> Vec<ControlBinding> {
        self.annotations()
            .map(|annotation| ControlBinding {
                setter: self.name(),
                record: annotation.record(),
                ops: Rc::new(TypedBinding {
                    instance: Rc::clone(instance),
                    setter: self.setter(),
                    annotation: annotation.clone(),
                }),
            })
            .collect()
    }
}

impl<M: 'static> Registered<M> for Annotated<Action<M>> {
    fn name(&self) -> &'static str {
        self.op().name()
    }

    fn metadata(&self) -> &Metadata {
        Annotated::metadata(self)
    }

    fn bindings(&self, instance: &Rc<M>) -> Vec<ControlBinding> {
        self.metadata()
            .iter()
            .map(|record| ControlBinding {
                setter: self.op().name(),
                record: record.clone(),
                ops: Rc::new(ButtonBinding {
                    instance: Rc::clone(instance),
                    action: *self.op(),
                }),
            })
            .collect()
    }
}

/// The annotated setters and buttons of one model type, in registration
/// order.
pub struct PropertyRegistry<M> {
    entries: Vec<Box<dyn Registered<M>>>,
}

impl<M> Default for PropertyRegistry<M> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<M: Notifier + 'static> fmt::Debug for PropertyRegistry<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRegistry")
            .field("names", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

impl<M: Notifier + 'static> PropertyRegistry<M> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry filled by `M`'s own [`Bindable::register`].
    #[must_use]
    pub fn of() -> Self
    where
        M: Bindable,
    {
        let mut registry = Self::new();
        M::register(&mut registry);
        registry
    }

    /// Register an annotated setter.
    pub fn setter<V: Clone + 'static>(&mut self, setter: UiSetter<M, V>) -> &mut Self {
        self.push(Box::new(setter));
        self
    }

    /// Register a button.
    pub fn button(&mut self, action: Annotated<Action<M>>) -> &mut Self {
        self.push(Box::new(action));
        self
    }

    fn push(&mut self, entry: Box<dyn Registered<M>>) {
        let name = entry.name();
        if entry.metadata().is_empty() {
            tracing::debug!(setter = name, "registered without annotations");
        }
        match self.entries.iter_mut().find(|e| e.name() == name) {
            Some(slot) => {
                tracing::warn!(setter = name, "duplicate registration replaces the earlier one");
                *slot = entry;
            }
            None => self.entries.push(entry),
        }
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.name())
    }

    /// Metadata of the entry registered under `name`.
    #[must_use]
    pub fn metadata(&self, name: &str) -> Option<&Metadata> {
        self.entries
            .iter()
            .find(|e| e.name() == name)
            .map(|e| e.metadata())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One binding per metadata record of every entry, entries in
    /// registration order and records in annotation order.
    #[must_use]
    pub fn bind(&self, instance: &Rc<M>) -> Vec<ControlBinding> {
        self.entries
            .iter()
            .flat_map(|e| e.bindings(instance))
            .collect()
    }
}

/// Callback a bound control installs to display model changes.
pub type Reflect = Rc<dyn Fn(&ControlValue)>;

trait BindingOps {
    fn apply(&self, setter: &'static str, raw: ControlValue) -> Result<(), BindError>;
    fn activate(&self) -> Result<(), BindError>;
    fn on_change(&self, owner: Option<Weak<dyn Any>>, reflect: Reflect);
    fn initial_value(&self, setter: &'static str) -> Option<Result<ControlValue, BindError>>;
}

/// One metadata record of one instance, ready to be attached to a control.
#[derive(Clone)]
pub struct ControlBinding {
    setter: &'static str,
    record: MetadataRecord,
    ops: Rc<dyn BindingOps>,
}

impl fmt::Debug for ControlBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlBinding")
            .field("setter", &self.setter)
            .field("record", &self.record)
            .finish()
    }
}

impl ControlBinding {
    /// Name of the bound setter or action.
    #[must_use]
    pub fn setter(&self) -> &'static str {
        self.setter
    }

    #[must_use]
    pub fn kind(&self) -> ControlKind {
        self.record.kind()
    }

    #[must_use]
    pub fn record(&self) -> &MetadataRecord {
        &self.record
    }

    /// Check the record's options.
    ///
    /// # Errors
    ///
    /// [`BindError::Construction`] naming the inconsistency.
    pub fn validate(&self) -> Result<(), BindError> {
        self.record
            .options()
            .validate()
            .map_err(|reason| self.construction(reason))
    }

    /// Map a raw control value back to the model and call the setter.
    ///
    /// # Errors
    ///
    /// [`BindError::Conversion`] when the value does not map (the setter is
    /// not called), [`BindError::Setter`] when the setter fails, and
    /// [`BindError::Unsupported`] for buttons.
    pub fn apply(&self, raw: ControlValue) -> Result<(), BindError> {
        self.ops.apply(self.setter, raw)
    }

    /// Trigger a button's action.
    ///
    /// # Errors
    ///
    /// [`BindError::Setter`] when the action fails, and
    /// [`BindError::Unsupported`] for value controls.
    pub fn activate(&self) -> Result<(), BindError> {
        self.ops.activate()
    }

    /// Register `reflect` on the setter's listener list. It receives every
    /// notified payload mapped to a control value. Buttons ignore this.
    pub fn on_change(&self, reflect: Reflect) {
        self.ops.on_change(None, reflect);
    }

    /// Like [`on_change`](Self::on_change), but `reflect` is unregistered
    /// once `owner` is dropped. Controls pass themselves here so rebinding
    /// an object does not accumulate listeners of discarded controls.
    pub fn on_change_owned(&self, owner: Weak<dyn Any>, reflect: Reflect) {
        self.ops.on_change(Some(owner), reflect);
    }

    /// The getter's current value mapped for display, or `None` without a
    /// getter.
    #[must_use]
    pub fn initial_value(&self) -> Option<Result<ControlValue, BindError>> {
        self.ops.initial_value(self.setter)
    }

    fn construction(&self, reason: impl fmt::Display) -> BindError {
        construction(self.setter, self.kind(), reason)
    }
}

fn construction(setter: &str, kind: ControlKind, reason: impl fmt::Display) -> BindError {
    BindError::Construction {
        setter: setter.to_owned(),
        kind,
        reason: reason.to_string(),
    }
}

struct TypedBinding<M, V> {
    instance: Rc<M>,
    setter: NotifyingSetter<M, V>,
    annotation: Annotation<M, V>,
}

impl<M, V> BindingOps for TypedBinding<M, V>
where
    M: Notifier + 'static,
    V: Clone + 'static,
{
    fn apply(&self, setter: &'static str, raw: ControlValue) -> Result<(), BindError> {
        let value = self
            .annotation
            .mapping()
            .inverse(raw)
            .map_err(|source| BindError::Conversion {
                setter: setter.to_owned(),
                source,
            })?;
        self.setter.call(&self.instance, value)?;
        Ok(())
    }

    fn activate(&self) -> Result<(), BindError> {
        Err(BindError::Unsupported("activate on a value control"))
    }

    fn on_change(&self, owner: Option<Weak<dyn Any>>, reflect: Reflect) {
        let mapping = Rc::clone(self.annotation.mapping());
        let listener = move |payload: &V| {
            let shown = mapping.forward(payload).map_err(ListenerError::new)?;
            reflect(&shown);
            Ok(())
        };
        let list = self.setter.listeners(&self.instance);
        match owner {
            Some(owner) => list.push_owned(owner, listener),
            None => list.push_fallible(listener),
        }
    }

    fn initial_value(&self, setter: &'static str) -> Option<Result<ControlValue, BindError>> {
        let getter = self.annotation.getter()?;
        let kind = self.annotation.kind();
        Some(
            getter
                .get(&self.instance)
                .map_err(|err| construction(setter, kind, format_args!("getter failed: {err}")))
                .and_then(|value| {
                    self.annotation
                        .mapping()
                        .forward(&value)
                        .map_err(|err| construction(setter, kind, err))
                }),
        )
    }
}

struct ButtonBinding<M> {
    instance: Rc<M>,
    action: Action<M>,
}

impl<M> BindingOps for ButtonBinding<M> {
    fn apply(&self, _setter: &'static str, _raw: ControlValue) -> Result<(), BindError> {
        Err(BindError::Unsupported("apply on a button"))
    }

    fn activate(&self) -> Result<(), BindError> {
        self.action.invoke(&self.instance)?;
        Ok(())
    }

    fn on_change(&self, _owner: Option<Weak<dyn Any>>, _reflect: Reflect) {}

    fn initial_value(&self, _setter: &'static str) -> Option<Result<ControlValue, BindError>> {
        None
    }
}
