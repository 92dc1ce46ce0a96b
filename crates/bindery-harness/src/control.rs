#![forbid(unsafe_code)]

//! Simulated controls.

use std::cell::{Cell, OnceCell, RefCell};
use std::fmt;
use std::rc::Rc;

use bindery_core::control::{CheckState, ControlValue};
use bindery_core::error::BindError;
use bindery_core::metadata::{ControlKind, ControlOptions};
use bindery_core::property::ControlBinding;
use bindery_runtime::guard::ControlId;
use bindery_runtime::wiring::{ControlSurface, WiredControl};

/// A control with no toolkit behind it. It remembers what it displays and
/// how often the model wrote to it.
pub struct HeadlessControl {
    id: ControlId,
    setter: &'static str,
    options: ControlOptions,
    displayed: RefCell<Option<ControlValue>>,
    updates: Cell<usize>,
    wired: OnceCell<WiredControl>,
}

impl fmt::Debug for HeadlessControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessControl")
            .field("id", &self.id)
            .field("setter", &self.setter)
            .field("kind", &self.kind())
            .field("displayed", &self.displayed.borrow())
            .finish()
    }
}

impl HeadlessControl {
    /// A control configured from `binding`'s record, showing the kind's
    /// resting value.
    #[must_use]
    pub fn new(binding: &ControlBinding) -> Rc<Self> {
        let options = binding.record().options().clone();
        let resting = match &options {
            ControlOptions::Slider(opts) => Some(ControlValue::Position(opts.minimum)),
            ControlOptions::Combobox { labels } if !labels.is_empty() => {
                Some(ControlValue::Index(0))
            }
            ControlOptions::Checkbox => Some(ControlValue::Check(CheckState::Unchecked)),
            ControlOptions::Textbox => Some(ControlValue::Text(String::new())),
            ControlOptions::Combobox { .. } | ControlOptions::Button => None,
        };
        Rc::new(Self {
            id: ControlId::next(),
            setter: binding.setter(),
            options,
            displayed: RefCell::new(resting),
            updates: Cell::new(0),
            wired: OnceCell::new(),
        })
    }

    pub(crate) fn attach(&self, wired: WiredControl) {
        if self.wired.set(wired).is_err() {
            tracing::warn!(control = %self.id, "control wired twice; keeping the first wiring");
        }
    }

    #[must_use]
    pub fn kind(&self) -> ControlKind {
        self.options.kind()
    }

    #[must_use]
    pub fn setter(&self) -> &'static str {
        self.setter
    }

    #[must_use]
    pub fn options(&self) -> &ControlOptions {
        &self.options
    }

    /// Current display, `None` for buttons.
    #[must_use]
    pub fn displayed(&self) -> Option<ControlValue> {
        self.displayed.borrow().clone()
    }

    /// Number of model-driven display updates, including initialization.
    #[must_use]
    pub fn updates(&self) -> usize {
        self.updates.get()
    }

    #[must_use]
    pub fn is_wired(&self) -> bool {
        self.wired.get().is_some()
    }

    /// Play a user edit: the control shows `raw` and fires its change event.
    ///
    /// # Errors
    ///
    /// What the bound setter reports, or [`BindError::Unsupported`] when the
    /// control is not wired.
    pub fn simulate_edit(&self, raw: ControlValue) -> Result<(), BindError> {
        let wired = self
            .wired
            .get()
            .ok_or(BindError::Unsupported("edit on an unwired control"))?;
        let raw = self.clamp(raw);
        *self.displayed.borrow_mut() = Some(raw.clone());
        tracing::debug!(control = %self.id, setter = self.setter, value = %raw, "user edit");
        wired.handle_edit(raw).inspect_err(|err| {
            tracing::warn!(control = %self.id, setter = self.setter, error = %err, "edit rejected");
        })
    }

    /// Play a button click.
    ///
    /// # Errors
    ///
    /// What the action reports, or [`BindError::Unsupported`] when the control
    /// is not a wired button.
    pub fn simulate_click(&self) -> Result<(), BindError> {
        let wired = self
            .wired
            .get()
            .ok_or(BindError::Unsupported("click on an unwired control"))?;
        tracing::debug!(control = %self.id, setter = self.setter, "user click");
        wired.handle_activate().inspect_err(|err| {
            tracing::warn!(control = %self.id, setter = self.setter, error = %err, "click failed");
        })
    }

    fn clamp(&self, value: ControlValue) -> ControlValue {
        match (&self.options, value) {
            (ControlOptions::Slider(opts), ControlValue::Position(p)) => {
                ControlValue::Position(p.clamp(opts.minimum, opts.maximum.max(opts.minimum)))
            }
            (_, other) => other,
        }
    }

    /// One-line rendering of the current display.
    #[must_use]
    pub fn describe(&self) -> String {
        let shown = self.displayed.borrow();
        match (&self.options, shown.as_ref()) {
            (ControlOptions::Slider(opts), Some(ControlValue::Position(p))) => {
                format!("slider {}..={}: {p}", opts.minimum, opts.maximum)
            }
            (ControlOptions::Combobox { labels }, Some(ControlValue::Index(i))) => {
                let current = labels.get(*i).map_or("?", String::as_str);
                format!("combobox [{}]: {current}", labels.join("|"))
            }
            (ControlOptions::Button, _) => format!("<{}>", self.setter),
            (options, Some(value)) => format!("{} {value}", options.kind()),
            (options, None) => format!("{} (empty)", options.kind()),
        }
    }
}

impl ControlSurface for HeadlessControl {
    fn id(&self) -> ControlId {
        self.id
    }

    fn show(&self, value: &ControlValue) {
        let value = self.clamp(value.clone());
        tracing::trace!(control = %self.id, value = %value, "display updated");
        *self.displayed.borrow_mut() = Some(value);
        self.updates.set(self.updates.get() + 1);
    }
}
