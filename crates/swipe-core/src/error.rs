use thiserror::Error;

use crate::outcome::OutcomeStatus;
use crate::source::Domain;

/// Caller-correctable input errors exposed by `swipe-core`.
///
/// Every variant is detected before any network call is made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unknown field(s) for {domain}: {}; available: {}", .fields.join(", "), .available.join(", "))]
    UnknownFields {
        domain: Domain,
        fields: Vec<String>,
        available: Vec<&'static str>,
    },

    #[error("{what} cannot be empty")]
    EmptyQuery { what: &'static str },

    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid interval '{value}', expected one of {expected}")]
    InvalidInterval { value: String, expected: String },

    #[error("invalid date format for '{value}', please use YYYY-MM-DD")]
    InvalidDate { value: String },
    #[error("{field} requires {requires}")]
    MissingDateBound {
        field: &'static str,
        requires: &'static str,
    },
    #[error("date range is inverted: {start} is after {end}")]
    InvertedDateRange { start: String, end: String },

    #[error("count must be between 1 and {max}, got {count}")]
    InvalidCount { count: usize, max: usize },

    #[error("option '{name}' has invalid value '{value}': {reason}")]
    InvalidOption {
        name: String,
        value: String,
        reason: &'static str,
    },

    #[error("request rejected by provider: {message}")]
    UpstreamRejected { message: String },

    #[error("configuration '{key}' has invalid value '{value}'")]
    InvalidConfig { key: &'static str, value: String },
}

/// Request-level failure, one variant per non-Ok [`OutcomeStatus`].
///
/// The partial-fetch coordinator is the only place these are turned into a
/// [`RequestOutcome`](crate::RequestOutcome).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    InvalidInput(#[from] ValidationError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    UpstreamUnavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub const fn status(&self) -> OutcomeStatus {
        match self {
            Self::InvalidInput(_) => OutcomeStatus::InvalidInput,
            Self::NotFound(_) => OutcomeStatus::NotFound,
            Self::UpstreamUnavailable(_) => OutcomeStatus::UpstreamUnavailable,
            Self::Internal(_) => OutcomeStatus::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_fields_message_lists_every_name() {
        let err = ValidationError::UnknownFields {
            domain: Domain::Search,
            fields: vec![String::from("titel"), String::from("ur")],
            available: vec!["url", "title"],
        };

        let message = err.to_string();
        assert!(message.contains("titel"));
        assert!(message.contains("ur"));
        assert!(message.contains("available: url, title"));
    }

    #[test]
    fn service_error_maps_to_status() {
        assert_eq!(
            ServiceError::from(ValidationError::EmptySymbol).status(),
            OutcomeStatus::InvalidInput
        );
        assert_eq!(
            ServiceError::NotFound(String::from("x")).status(),
            OutcomeStatus::NotFound
        );
        assert_eq!(
            ServiceError::UpstreamUnavailable(String::from("x")).status(),
            OutcomeStatus::UpstreamUnavailable
        );
        assert_eq!(
            ServiceError::Internal(String::from("x")).status(),
            OutcomeStatus::Internal
        );
    }
}
