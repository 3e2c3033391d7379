//! Error types for simulation configuration, command resolution and generation

use thiserror::Error;

/// Failure reported by an attribute sink when a write is rejected
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("sink rejected write to {attribute}: {reason}")]
pub struct SinkError {
    /// Attribute the write was addressed to
    pub attribute: String,
    /// Sink-specific reason
    pub reason: String,
}

impl SinkError {
    pub fn new(attribute: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that can occur while loading configuration, resolving a command
/// or running an attribute generator task
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimError {
    /// Malformed parameter payload or configuration document
    #[error("parse error: {0}")]
    Parse(String),

    /// Non-numeric value where a number is required
    #[error("invalid value for {field}: {raw:?}")]
    Value {
        /// Field that failed to parse
        field: String,
        /// Raw text of the offending value
        raw: String,
    },

    /// Structurally invalid rule document or payload
    #[error("config error: {0}")]
    Config(String),

    /// Attribute sink write failed
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// Generator task stopped via cancellation
    #[error("task canceled")]
    Canceled,
}

impl SimError {
    pub(crate) fn value(field: impl Into<String>, raw: impl Into<String>) -> Self {
        SimError::Value {
            field: field.into(),
            raw: raw.into(),
        }
    }

    /// Whether this error ends only a single generator task
    pub fn is_task_scoped(&self) -> bool {
        matches!(self, SimError::Sink(_) | SimError::Canceled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_error_converts() {
        let err: SimError = SinkError::new("Temperature", "offline").into();
        assert_eq!(
            err.to_string(),
            "sink rejected write to Temperature: offline"
        );
        assert!(err.is_task_scoped());
    }

    #[test]
    fn test_request_scoped_errors() {
        assert!(!SimError::Parse("eof".into()).is_task_scoped());
        assert!(!SimError::Config("missing Response".into()).is_task_scoped());
        assert!(!SimError::value("minValue", "abc").is_task_scoped());
        assert!(SimError::Canceled.is_task_scoped());
    }

    #[test]
    fn test_value_error_message() {
        let err = SimError::value("maxValue", "1x");
        assert_eq!(err.to_string(), "invalid value for maxValue: \"1x\"");
    }
}
