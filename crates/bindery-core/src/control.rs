#![forbid(unsafe_code)]

//! Toolkit-neutral control values and the per-kind value mappings.
//!
//! Every bound record owns a mapping that converts in two directions:
//!
//! - **forward**: model value to the value a control displays;
//! - **inverse**: the raw value a control reports on a user edit back to the
//!   model value passed to the setter.
//!
//! | Kind | Control value | Forward | Inverse |
//! |------|---------------|---------|---------|
//! | Slider | `Position(i64)` | `round(v * scale)` | `position / scale` |
//! | Combobox | `Index(usize)` | index of `v` in the options | option at index |
//! | Checkbox | `Check(CheckState)` | tri-state from `bool` / `Option<bool>` | back, partial only for `Option<bool>` |
//! | Textbox | `Text(String)` | `Display` | `FromStr` |

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use crate::metadata::ControlKind;

/// Three-state check mark.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CheckState {
    Unchecked,
    PartiallyChecked,
    Checked,
}

impl CheckState {
    /// `Some(true)` is checked, `Some(false)` unchecked, `None` partial.
    #[must_use]
    pub const fn from_bool(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Checked,
            Some(false) => Self::Unchecked,
            None => Self::PartiallyChecked,
        }
    }

    #[must_use]
    pub const fn to_bool(self) -> Option<bool> {
        match self {
            Self::Checked => Some(true),
            Self::Unchecked => Some(false),
            Self::PartiallyChecked => None,
        }
    }
}

/// A value as a control displays or reports it.
#[derive(Clone, Debug, PartialEq)]
pub enum ControlValue {
    /// Integer slider position.
    Position(i64),
    /// Selected combobox entry.
    Index(usize),
    Check(CheckState),
    Text(String),
}

impl ControlValue {
    /// Short name of the variant, for diagnostics.
    #[must_use]
    pub const fn variant_name(&self) -> &'static str {
        match self {
            Self::Position(_) => "position",
            Self::Index(_) => "index",
            Self::Check(_) => "check",
            Self::Text(_) => "text",
        }
    }
}

impl fmt::Display for ControlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position(p) => write!(f, "{p}"),
            Self::Index(i) => write!(f, "#{i}"),
            Self::Check(CheckState::Checked) => f.write_str("[x]"),
            Self::Check(CheckState::Unchecked) => f.write_str("[ ]"),
            Self::Check(CheckState::PartiallyChecked) => f.write_str("[-]"),
            Self::Text(t) => write!(f, "{t:?}"),
        }
    }
}

/// Why a value could not be mapped.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{kind} mapping failed: {reason}")]
pub struct MappingError {
    pub kind: ControlKind,
    pub reason: String,
}

impl MappingError {
    pub fn new(kind: ControlKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    fn unexpected(kind: ControlKind, got: &ControlValue) -> Self {
        Self::new(
            kind,
            format!("unexpected {} value {got}", got.variant_name()),
        )
    }
}

/// Numeric model values a slider can drive.
pub trait SliderValue: Clone + 'static {
    fn to_f64(&self) -> f64;
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_slider_int {
    ($($t:ty),*) => {$(
        impl SliderValue for $t {
            #[allow(clippy::cast_precision_loss)]
            fn to_f64(&self) -> f64 {
                *self as f64
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            fn from_f64(value: f64) -> Self {
                value.round() as $t
            }
        }
    )*};
}

impl_slider_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl SliderValue for f64 {
    fn to_f64(&self) -> f64 {
        *self
    }
    fn from_f64(value: f64) -> Self {
        value
    }
}

impl SliderValue for f32 {
    fn to_f64(&self) -> f64 {
        f64::from(*self)
    }
    #[allow(clippy::cast_possible_truncation)]
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

/// Model values a checkbox can drive.
pub trait CheckValue: Clone + 'static {
    fn to_check_state(&self) -> CheckState;
    /// `None` when the state has no representation in `Self`.
    fn from_check_state(state: CheckState) -> Option<Self>;
}

impl CheckValue for bool {
    fn to_check_state(&self) -> CheckState {
        CheckState::from_bool(Some(*self))
    }
    fn from_check_state(state: CheckState) -> Option<Self> {
        state.to_bool()
    }
}

impl CheckValue for Option<bool> {
    fn to_check_state(&self) -> CheckState {
        CheckState::from_bool(*self)
    }
    fn from_check_state(state: CheckState) -> Option<Self> {
        Some(state.to_bool())
    }
}

/// Two-way conversion between a model value and a control value.
pub trait ControlMapping<V> {
    fn kind(&self) -> ControlKind;

    /// Model value to displayed control value.
    fn forward(&self, value: &V) -> Result<ControlValue, MappingError>;

    /// Raw control value to model value.
    fn inverse(&self, raw: ControlValue) -> Result<V, MappingError>;
}

/// Slider mapping with scale.
#[derive(Clone, Copy, Debug)]
pub struct SliderMapping<V> {
    scale: f64,
    _value: PhantomData<fn() -> V>,
}

impl<V> SliderMapping<V> {
    #[must_use]
    pub fn new(scale: f64) -> Self {
        Self {
            scale,
            _value: PhantomData,
        }
    }
}

impl<V: SliderValue> ControlMapping<V> for SliderMapping<V> {
    fn kind(&self) -> ControlKind {
        ControlKind::Slider
    }

    #[allow(clippy::cast_possible_truncation)]
    fn forward(&self, value: &V) -> Result<ControlValue, MappingError> {
        let scaled = (value.to_f64() * self.scale).round();
        if !scaled.is_finite() {
            return Err(MappingError::new(
                ControlKind::Slider,
                format!("position {scaled} is not finite"),
            ));
        }
        Ok(ControlValue::Position(scaled as i64))
    }

    #[allow(clippy::cast_precision_loss)]
    fn inverse(&self, raw: ControlValue) -> Result<V, MappingError> {
        match raw {
            ControlValue::Position(p) => Ok(V::from_f64(p as f64 / self.scale)),
            other => Err(MappingError::unexpected(ControlKind::Slider, &other)),
        }
    }
}

/// Combobox mapping over a fixed option set.
#[derive(Clone, Debug)]
pub struct ComboboxMapping<V> {
    options: Vec<V>,
}

impl<V> ComboboxMapping<V> {
    #[must_use]
    pub fn new(options: Vec<V>) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &[V] {
        &self.options
    }
}

impl<V: Clone + PartialEq + fmt::Display> ControlMapping<V> for ComboboxMapping<V> {
    fn kind(&self) -> ControlKind {
        ControlKind::Combobox
    }

    fn forward(&self, value: &V) -> Result<ControlValue, MappingError> {
        self.options
            .iter()
            .position(|o| o == value)
            .map(ControlValue::Index)
            .ok_or_else(|| {
                MappingError::new(
                    ControlKind::Combobox,
                    format!("`{value}` is not one of the options"),
                )
            })
    }

    fn inverse(&self, raw: ControlValue) -> Result<V, MappingError> {
        match raw {
            ControlValue::Index(i) => self.options.get(i).cloned().ok_or_else(|| {
                MappingError::new(
                    ControlKind::Combobox,
                    format!("index {i} out of range for {} options", self.options.len()),
                )
            }),
            other => Err(MappingError::unexpected(ControlKind::Combobox, &other)),
        }
    }
}

/// Checkbox mapping.
#[derive(Clone, Copy, Debug)]
pub struct CheckboxMapping<V> {
    _value: PhantomData<fn() -> V>,
}

impl<V> CheckboxMapping<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            _value: PhantomData,
        }
    }
}

impl<V> Default for CheckboxMapping<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: CheckValue> ControlMapping<V> for CheckboxMapping<V> {
    fn kind(&self) -> ControlKind {
        ControlKind::Checkbox
    }

    fn forward(&self, value: &V) -> Result<ControlValue, MappingError> {
        Ok(ControlValue::Check(value.to_check_state()))
    }

    fn inverse(&self, raw: ControlValue) -> Result<V, MappingError> {
        match raw {
            ControlValue::Check(state) => V::from_check_state(state).ok_or_else(|| {
                MappingError::new(
                    ControlKind::Checkbox,
                    format!("{state:?} has no value for this property"),
                )
            }),
            other => Err(MappingError::unexpected(ControlKind::Checkbox, &other)),
        }
    }
}

/// Textbox mapping through `Display` and `FromStr`.
#[derive(Clone, Copy, Debug)]
pub struct TextboxMapping<V> {
    _value: PhantomData<fn() -> V>,
}

impl<V> TextboxMapping<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            _value: PhantomData,
        }
    }
}

impl<V> Default for TextboxMapping<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ControlMapping<V> for TextboxMapping<V>
where
    V: fmt::Display + FromStr,
    V::Err: fmt::Display,
{
    fn kind(&self) -> ControlKind {
        ControlKind::Textbox
    }

    fn forward(&self, value: &V) -> Result<ControlValue, MappingError> {
        Ok(ControlValue::Text(value.to_string()))
    }

    fn inverse(&self, raw: ControlValue) -> Result<V, MappingError> {
        match raw {
            ControlValue::Text(text) => text.parse::<V>().map_err(|e| {
                MappingError::new(ControlKind::Textbox, format!("cannot parse {text:?}: {e}"))
            }),
            other => Err(MappingError::unexpected(ControlKind::Textbox, &other)),
        }
    }
}
