//! Core error types for the subscription engine.
//!
//! Storage- and platform-specific failures are converted to these types by
//! the collaborators that implement the repository and delivery traits.

use chrono::ParseError as ChronoParseError;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the subscription engine.
#[derive(Error, Debug)]
pub enum Error {
    /// A recurrence or reminder definition that cannot describe a schedule.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The delivery layer reports that reminders may not be shown.
    #[error("Notification permission denied")]
    PermissionDenied,

    #[error("Reminder delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Whether the caller can keep going after surfacing this to the user.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::PermissionDenied | Error::Delivery(_))
    }
}

/// A rejection from the notification delivery collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Failed to schedule reminder: {0}")]
    ScheduleFailed(String),

    #[error("Failed to cancel reminder {handle}: {reason}")]
    CancelFailed { handle: String, reason: String },

    #[error("Failed to cancel all reminders: {0}")]
    CancelAllFailed(String),
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),

    #[error("Invalid date key '{0}', expected YYYY-MM-DD")]
    InvalidDateKey(String),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_errors() {
        assert!(Error::PermissionDenied.is_recoverable());
        assert!(Error::from(DeliveryError::ScheduleFailed("busy".to_string())).is_recoverable());
        assert!(!Error::InvalidConfiguration("custom without interval".to_string()).is_recoverable());
        assert!(!Error::NotFound("sub-1".to_string()).is_recoverable());
    }

    #[test]
    fn test_parse_errors_become_validation_errors() {
        let err: Error = "12.x".parse::<rust_decimal::Decimal>().unwrap_err().into();
        assert!(matches!(err, Error::Validation(ValidationError::DecimalParse(_))));

        let err: Error = chrono::NaiveDate::parse_from_str("2024-13-01", "%Y-%m-%d")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Validation(ValidationError::DateTimeParse(_))));
    }
}
