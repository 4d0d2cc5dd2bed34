//! Error taxonomy
//!
//! None of these ever escape the controller: validation errors become inline
//! field status, storage errors are logged, external errors become notifications.

use thiserror::Error;

/// Why a name field was rejected
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("required")]
    Required,
    #[error("too short")]
    TooShort,
    #[error("invalid characters")]
    InvalidCharacters,
}

impl ValidationError {
    /// Message shown next to the offending input
    pub fn message(&self) -> &'static str {
        match self {
            ValidationError::Required => "This field is required",
            ValidationError::TooShort => "Please enter at least 2 characters",
            ValidationError::InvalidCharacters => {
                "Only letters, spaces, hyphens and apostrophes are allowed"
            }
        }
    }
}

/// Durable storage failure (quota, private mode, corrupt data)
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage quota exceeded")]
    QuotaExceeded,
    #[error("stored data corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("failed to serialize record: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Failure of an optional browser provider (confetti, share, image export)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExternalError {
    #[error("{0} is not available")]
    Unavailable(&'static str),
    #[error("provider rejected the request: {0}")]
    Rejected(String),
    /// The user dismissed the prompt; not reported
    #[error("cancelled by user")]
    Cancelled,
}
