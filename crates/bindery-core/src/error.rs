#![forbid(unsafe_code)]

//! Error types shared by the binding layers.

use std::error::Error as StdError;

use crate::control::MappingError;
use crate::metadata::ControlKind;

/// Boxed error produced by user code (setters, getters, listeners).
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Failure reported by a setter, getter, or button operation.
///
/// Wraps whatever error the user code produced; [`downcast_ref`](Self::downcast_ref)
/// gets the original back.
#[derive(Debug, thiserror::Error)]
#[error("{inner}")]
pub struct SetterError {
    inner: BoxError,
}

impl SetterError {
    pub fn new(err: impl Into<BoxError>) -> Self {
        Self { inner: err.into() }
    }

    #[must_use]
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }

    #[must_use]
    pub fn into_inner(self) -> BoxError {
        self.inner
    }
}

/// Failure reported by a listener.
#[derive(Debug, thiserror::Error)]
#[error("{inner}")]
pub struct ListenerError {
    inner: BoxError,
}

impl ListenerError {
    pub fn new(err: impl Into<BoxError>) -> Self {
        Self { inner: err.into() }
    }

    #[must_use]
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }
}

/// Errors raised while binding or driving a control.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// Metadata is inconsistent or the getter failed at bind time. Aborts
    /// binding of that one control.
    #[error("cannot build {kind} control for `{setter}`: {reason}")]
    Construction {
        setter: String,
        kind: ControlKind,
        reason: String,
    },
    /// The underlying setter failed; passed through unchanged.
    #[error(transparent)]
    Setter(#[from] SetterError),
    /// A control value could not be mapped to the setter's value type. The
    /// setter was not invoked.
    #[error("cannot apply control value to `{setter}`: {source}")]
    Conversion {
        setter: String,
        #[source]
        source: MappingError,
    },
    /// The adapter or binding does not provide this capability.
    #[error("`{0}` is not supported here")]
    Unsupported(&'static str),
}

impl BindError {
    /// The setter error, when this is a pass-through setter failure.
    #[must_use]
    pub fn as_setter_error(&self) -> Option<&SetterError> {
        match self {
            Self::Setter(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("volume too loud: {0}")]
    struct TooLoud(u32);

    #[test]
    fn setter_error_keeps_original() {
        let err = SetterError::new(TooLoud(11));
        assert_eq!(err.to_string(), "volume too loud: 11");
        assert_eq!(err.downcast_ref::<TooLoud>().map(|e| e.0), Some(11));
    }

    #[test]
    fn setter_error_from_message() {
        let err = SetterError::new("nope");
        assert_eq!(err.to_string(), "nope");
        assert!(err.downcast_ref::<TooLoud>().is_none());
    }

    #[test]
    fn setter_error_passes_through_bind_error() {
        let bind: BindError = SetterError::new(TooLoud(3)).into();
        assert_eq!(bind.to_string(), "volume too loud: 3");
        assert!(bind.as_setter_error().is_some());
    }

    #[test]
    fn construction_display() {
        let err = BindError::Construction {
            setter: "combo".into(),
            kind: ControlKind::Combobox,
            reason: "combobox option set is empty".into(),
        };
        assert_eq!(
            err.to_string(),
            "cannot build combobox control for `combo`: combobox option set is empty"
        );
        assert!(err.as_setter_error().is_none());
    }
}
