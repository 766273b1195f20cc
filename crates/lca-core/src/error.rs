//! Error types for the project input model and scoring engine
//!
//! Every failure in this crate is a [`ValidationError`]: the scoring engine is
//! pure computation, so the only way it can fail is a malformed or
//! out-of-domain input field.

/// Malformed or out-of-domain project input
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Required field absent from the submitted input
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// Numeric field could not be coerced to a finite number
    #[error("invalid number for {field}: {value}")]
    InvalidNumber {
        /// Field name (camelCase, as submitted)
        field: &'static str,
        /// Raw submitted value
        value: String,
    },

    /// Numeric field outside its declared domain
    #[error("{field} out of range: {value} (expected {expected})")]
    OutOfRange {
        /// Field name (camelCase, as submitted)
        field: &'static str,
        /// Offending value
        value: f64,
        /// Human-readable domain description
        expected: &'static str,
    },

    /// Enum field with a value outside its variant set
    #[error("unknown {field}: {value:?}")]
    UnknownVariant {
        /// Field name (camelCase, as submitted)
        field: &'static str,
        /// Raw submitted value
        value: String,
    },

    /// Project name empty or whitespace only
    #[error("project name must not be empty")]
    EmptyProjectName,

    /// Input could not be decoded at all
    #[error("malformed project input: {0}")]
    Malformed(String),
}

impl ValidationError {
    /// Name of the offending field, when the error is tied to one
    #[must_use]
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField(field)
            | Self::InvalidNumber { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::UnknownVariant { field, .. } => Some(field),
            Self::EmptyProjectName => Some("projectName"),
            Self::Malformed(_) => None,
        }
    }

    pub(crate) fn unknown(field: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownVariant {
            field,
            value: value.into(),
        }
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}
