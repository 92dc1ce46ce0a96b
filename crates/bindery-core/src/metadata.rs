#![forbid(unsafe_code)]

//! UI-intent records and the generic annotator.
//!
//! A [`MetadataRecord`] says which control a UI should build for an operation
//! and how to configure it. Records are attached with [`annotate`], which
//! wraps the operation in an [`Annotated`] without touching the operation
//! itself: the wrapper derefs to the original callable, so the call contract
//! is unchanged.
//!
//! # Invariants
//!
//! 1. A [`Metadata`] set holds at most one record per [`ControlKind`].
//!    Annotating the same kind twice replaces the earlier record in place.
//! 2. Records keep their annotation order; adapters lay out one control per
//!    record in that order.
//! 3. Options are not validated here. Validation happens when a control is
//!    bound, so a bad record fails only its own control.

use std::fmt;
use std::ops::Deref;

/// Discriminant selecting which control type an adapter instantiates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ControlKind {
    Slider,
    Combobox,
    Checkbox,
    Textbox,
    Button,
}

impl ControlKind {
    /// Every kind, in declaration order.
    pub const ALL: [ControlKind; 5] = [
        ControlKind::Slider,
        ControlKind::Combobox,
        ControlKind::Checkbox,
        ControlKind::Textbox,
        ControlKind::Button,
    ];

    /// Stable lowercase name (used in logs and scripts).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Slider => "slider",
            Self::Combobox => "combobox",
            Self::Checkbox => "checkbox",
            Self::Textbox => "textbox",
            Self::Button => "button",
        }
    }

    /// Whether controls of this kind carry a persistent value.
    #[must_use]
    pub const fn has_value(self) -> bool {
        !matches!(self, Self::Button)
    }

    /// Parse a kind from its [`as_str`](Self::as_str) name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slider configuration.
///
/// `scale` converts between the model value and the integer slider
/// position: `position = round(value * scale)` and `value = position / scale`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SliderOptions {
    pub minimum: i64,
    pub maximum: i64,
    pub scale: f64,
}

impl Default for SliderOptions {
    fn default() -> Self {
        Self {
            minimum: 0,
            maximum: 100,
            scale: 1.0,
        }
    }
}

/// Kind-specific options of a record.
#[derive(Clone, Debug, PartialEq)]
pub enum ControlOptions {
    Slider(SliderOptions),
    /// Combobox entries, as displayed.
    Combobox {
        labels: Vec<String>,
    },
    Checkbox,
    Textbox,
    Button,
}

impl ControlOptions {
    /// The discriminant these options belong to.
    #[must_use]
    pub const fn kind(&self) -> ControlKind {
        match self {
            Self::Slider(_) => ControlKind::Slider,
            Self::Combobox { .. } => ControlKind::Combobox,
            Self::Checkbox => ControlKind::Checkbox,
            Self::Textbox => ControlKind::Textbox,
            Self::Button => ControlKind::Button,
        }
    }

    /// Check the options for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns a short reason when a slider range is inverted, a slider scale
    /// is zero or not finite, or a combobox option set is empty or contains
    /// duplicate labels.
    pub fn validate(&self) -> Result<(), &'static str> {
        match self {
            Self::Slider(opts) => {
                if opts.minimum > opts.maximum {
                    return Err("slider minimum exceeds maximum");
                }
                if !opts.scale.is_finite() || opts.scale == 0.0 {
                    return Err("slider scale must be finite and non-zero");
                }
                Ok(())
            }
            Self::Combobox { labels } => {
                if labels.is_empty() {
                    return Err("combobox option set is empty");
                }
                for (i, label) in labels.iter().enumerate() {
                    if labels[..i].contains(label) {
                        return Err("combobox option labels must be unique");
                    }
                }
                Ok(())
            }
            Self::Checkbox | Self::Textbox | Self::Button => Ok(()),
        }
    }
}

/// One UI-intent record: kind, options, and whether a getter initializes it.
#[derive(Clone, Debug, PartialEq)]
pub struct MetadataRecord {
    options: ControlOptions,
    has_getter: bool,
}

impl MetadataRecord {
    #[must_use]
    pub fn new(options: ControlOptions, has_getter: bool) -> Self {
        Self {
            options,
            has_getter,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ControlKind {
        self.options.kind()
    }

    #[must_use]
    pub fn options(&self) -> &ControlOptions {
        &self.options
    }

    /// Whether the record carries a getter used to initialize the control.
    #[must_use]
    pub const fn has_getter(&self) -> bool {
        self.has_getter
    }
}

impl From<ControlOptions> for MetadataRecord {
    fn from(options: ControlOptions) -> Self {
        Self::new(options, false)
    }
}

/// Ordered set of records, at most one per kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    records: Vec<MetadataRecord>,
}

impl Metadata {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under its kind.
    ///
    /// Returns the replaced record when one of the same kind was present.
    pub fn insert(&mut self, record: MetadataRecord) -> Option<MetadataRecord> {
        match self.records.iter_mut().find(|r| r.kind() == record.kind()) {
            Some(slot) => Some(std::mem::replace(slot, record)),
            None => {
                self.records.push(record);
                None
            }
        }
    }

    /// Look up the record stored under `kind`.
    #[must_use]
    pub fn get(&self, kind: ControlKind) -> Option<&MetadataRecord> {
        self.records.iter().find(|r| r.kind() == kind)
    }

    #[must_use]
    pub fn contains(&self, kind: ControlKind) -> bool {
        self.get(kind).is_some()
    }

    /// Kinds present, in annotation order.
    pub fn kinds(&self) -> impl Iterator<Item = ControlKind> + '_ {
        self.records.iter().map(MetadataRecord::kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetadataRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// An operation plus the UI-intent records attached to it.
///
/// Derefs to the wrapped operation, so `annotated.call(..)`-style method
/// calls and `(*annotated)(..)` reach the original unchanged.
#[derive(Clone, Debug)]
pub struct Annotated<F> {
    op: F,
    metadata: Metadata,
}

/// Attach a record to `op`.
///
/// ```
/// use bindery_core::metadata::{annotate, ControlKind, ControlOptions};
///
/// let double = annotate(|x: i32| x * 2, ControlOptions::Textbox);
/// assert_eq!((*double)(21), 42);
/// assert!(double.metadata().contains(ControlKind::Textbox));
/// ```
pub fn annotate<F>(op: F, record: impl Into<MetadataRecord>) -> Annotated<F> {
    Annotated::new(op).annotate(record)
}

impl<F> Annotated<F> {
    /// Wrap `op` with an empty record set.
    #[must_use]
    pub fn new(op: F) -> Self {
        Self {
            op,
            metadata: Metadata::new(),
        }
    }

    /// Stack a further record.
    #[must_use]
    pub fn annotate(mut self, record: impl Into<MetadataRecord>) -> Self {
        self.metadata.insert(record.into());
        self
    }

    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    #[must_use]
    pub fn op(&self) -> &F {
        &self.op
    }

    #[must_use]
    pub fn into_inner(self) -> F {
        self.op
    }
}

impl<F> Deref for Annotated<F> {
    type Target = F;

    fn deref(&self) -> &F {
        &self.op
    }
}
