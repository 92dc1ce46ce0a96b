#![forbid(unsafe_code)]

//! Core protocol of Bindery: UI-intent metadata attached to setters, notifying
//! setters with per-instance listener lists, and the value mappings between
//! model values and toolkit-neutral control values.
//!
//! This crate has no notion of threads, widgets, or event loops. The
//! feedback-loop guard, the UI-thread dispatcher, and the adapter contract
//! live in `bindery-runtime`.
//!
//! - [`metadata`]: [`ControlKind`], [`MetadataRecord`], [`annotate`](metadata::annotate)
//! - [`annotate`]: `slider` / `combobox` / `checkbox` / `textbox` / `button`
//! - [`setter`]: [`NotifyingSetter`]
//! - [`listeners`]: [`ListenerRegistry`], [`ListenerList`]
//! - [`control`]: [`ControlValue`] and the per-kind mappings
//! - [`property`]: [`Bindable`], [`PropertyRegistry`], [`ControlBinding`]

pub mod annotate;
pub mod control;
pub mod error;
pub mod listeners;
pub mod metadata;
pub mod property;
pub mod setter;

pub use annotate::{Action, Annotation, Getter, UiSetter};
pub use control::{CheckState, CheckValue, ControlMapping, ControlValue, MappingError, SliderValue};
pub use error::{BindError, BoxError, ListenerError, SetterError};
pub use listeners::{Delivery, ListenerList, ListenerRegistry, Notifier, SetterKey};
pub use metadata::{
    Annotated, ControlKind, ControlOptions, Metadata, MetadataRecord, SliderOptions,
};
pub use property::{Bindable, ControlBinding, PropertyRegistry, Reflect};
pub use setter::{Notification, NotifyingSetter};

/// Everything needed to declare a bindable model.
pub mod prelude {
    pub use crate::annotate::{Action, UiSetter, button, checkbox, combobox, slider, textbox};
    pub use crate::control::{CheckState, ControlValue};
    pub use crate::error::{BindError, SetterError};
    pub use crate::listeners::{ListenerRegistry, Notifier};
    pub use crate::metadata::ControlKind;
    pub use crate::property::{Bindable, PropertyRegistry};
    pub use crate::setter::NotifyingSetter;
}
