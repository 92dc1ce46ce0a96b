#![forbid(unsafe_code)]

//! Bindery public facade.
//!
//! Re-exports the core protocol, the runtime (feature `runtime`), and the
//! headless adapter (feature `headless`), plus a [`prelude`].

#[cfg(feature = "headless")]
pub use bindery_harness as headless;
#[cfg(feature = "runtime")]
pub use bindery_runtime as runtime;

pub use bindery_core::{
    Action, Annotated, Annotation, BindError, Bindable, CheckState, ControlBinding, ControlKind,
    ControlOptions, ControlValue, ListenerError, ListenerList, ListenerRegistry, MappingError,
    Metadata, MetadataRecord, Notifier, NotifyingSetter, PropertyRegistry, SetterError,
    SliderOptions, UiSetter,
};
pub use bindery_core::annotate::{button, checkbox, combobox, slider, textbox};
pub use bindery_core::metadata::annotate;

#[cfg(feature = "runtime")]
pub use bindery_runtime::{
    BinderyConfig, BindingAdapter, ChangingSet, ControlId, ControlSurface, DispatchError,
    DispatchHandle, Dispatcher, FileMode, WiredControl, wire_control,
};

#[cfg(feature = "headless")]
pub use bindery_harness::{HeadlessAdapter, HeadlessControl, HeadlessWidget};

/// Common imports for declaring and displaying bindable models.
pub mod prelude {
    pub use bindery_core::prelude::*;

    #[cfg(feature = "runtime")]
    pub use bindery_runtime::{BinderyConfig, BindingAdapter, DispatchHandle};

    #[cfg(feature = "headless")]
    pub use bindery_harness::HeadlessAdapter;
}
