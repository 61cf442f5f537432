//! Error types for request construction.

/// A request was missing a field the gateway requires.
///
/// Raised locally, before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    /// Creates the error for a missing required field.
    pub fn missing(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("Invalid request, the '{}' field is required.", field);
        Self { field, message }
    }
}

/// A settlement day that is not a valid `MMDD` month/day pair.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid settlement day '{0}', expected MMDD")]
pub struct InvalidSettlementDay(pub String);
