#![forbid(unsafe_code)]

//! Toolkit-independent control wiring.
//!
//! A toolkit adapter instantiates a native control for a [`ControlBinding`]
//! (configured from the record's options), wraps it in a [`ControlSurface`],
//! and hands both to [`wire_control`]. Wiring then:
//!
//! 1. validates the record's options;
//! 2. reads the getter, if any, and maps it for display;
//! 3. registers a reflect listener on the setter's listener list that updates
//!    the control unless it is in the Changing-Set;
//! 4. displays the initial value.
//!
//! The adapter routes the control's native change event to
//! [`WiredControl::handle_edit`] and a button's activation to
//! [`WiredControl::handle_activate`].
//!
//! # Failure Modes
//!
//! | Failure | Returned | Control state |
//! |---------|----------|---------------|
//! | Invalid options | `BindError::Construction` | nothing registered |
//! | Getter or forward mapping fails | `BindError::Construction` | nothing registered |
//! | Raw value does not map | `BindError::Conversion` | setter not called |
//! | Setter fails | `BindError::Setter` | Changing-Set entry released |
//!
//! The reflect listener holds the control weakly and is owned by it: once the
//! control is dropped the listener leaves the model's listener list, so
//! rebinding an object does not accumulate dead listeners.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use bindery_core::control::ControlValue;
use bindery_core::error::BindError;
use bindery_core::metadata::ControlKind;
use bindery_core::property::ControlBinding;

use crate::guard::{ChangingSet, ControlId};

/// The native control as seen by the wiring.
pub trait ControlSurface {
    fn id(&self) -> ControlId;

    /// Update what the control displays. Must not fire the control's own
    /// change event.
    fn show(&self, value: &ControlValue);
}

/// A control whose events are connected to its setter.
#[derive(Clone)]
pub struct WiredControl {
    id: ControlId,
    binding: ControlBinding,
    changing: ChangingSet,
}

impl fmt::Debug for WiredControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WiredControl")
            .field("id", &self.id)
            .field("setter", &self.binding.setter())
            .field("kind", &self.binding.kind())
            .finish()
    }
}

/// Connect `control` to `binding`.
///
/// # Errors
///
/// [`BindError::Construction`] when the options are inconsistent or the
/// initial value cannot be read or displayed. Nothing is registered on the
/// model in that case.
pub fn wire_control<C>(
    binding: ControlBinding,
    control: &Rc<C>,
    changing: &ChangingSet,
) -> Result<WiredControl, BindError>
where
    C: ControlSurface + 'static,
{
    let id = control.id();
    binding.validate()?;
    let initial = binding.initial_value().transpose()?;

    if binding.kind().has_value() {
        let weak = Rc::downgrade(control);
        let owner: Rc<dyn Any> = control.clone();
        let guard = changing.clone();
        let setter = binding.setter();
        binding.on_change_owned(Rc::downgrade(&owner), Rc::new(move |value: &ControlValue| {
            if guard.is_changing(id) {
                tracing::trace!(control = %id, setter, "reflect suppressed during edit");
                return;
            }
            if let Some(control) = weak.upgrade() {
                control.show(value);
            }
        }));
    }

    if let Some(value) = initial {
        control.show(&value);
    }
    tracing::debug!(control = %id, setter = binding.setter(), kind = %binding.kind(), "control wired");

    Ok(WiredControl {
        id,
        binding,
        changing: changing.clone(),
    })
}

impl WiredControl {
    #[must_use]
    pub fn id(&self) -> ControlId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> ControlKind {
        self.binding.kind()
    }

    #[must_use]
    pub fn setter(&self) -> &'static str {
        self.binding.setter()
    }

    #[must_use]
    pub fn binding(&self) -> &ControlBinding {
        &self.binding
    }

    /// The control reported a user edit to `raw`.
    ///
    /// The control is in the Changing-Set for the duration of the setter call,
    /// so the listener fan-out does not write back to it.
    ///
    /// # Errors
    ///
    /// Conversion and setter failures from [`ControlBinding::apply`].
    pub fn handle_edit(&self, raw: ControlValue) -> Result<(), BindError> {
        let _edit = self.changing.begin_edit(self.id);
        self.binding.apply(raw)
    }

    /// The button was activated.
    ///
    /// # Errors
    ///
    /// The action's failure, or [`BindError::Unsupported`] for value controls.
    pub fn handle_activate(&self) -> Result<(), BindError> {
        self.binding.activate()
    }
}
