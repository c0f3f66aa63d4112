/*
    errors.rs - Error types for the counter subsystem

    Covers local store failures, unknown-video verdicts from the
    catalog, and payload validation on the sync path.
*/

use thiserror::Error;

/// Errors that can occur in the counter subsystem
#[derive(Debug, Error)]
pub enum CounterError {
    /// Video id is not known to the metadata catalog
    #[error("Unknown video: {0}")]
    UnknownVideo(u64),

    /// Peer payload failed validation before merge
    #[error("Invalid sync payload: {0}")]
    InvalidPayload(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for counter operations
pub type CounterResult<T> = Result<T, CounterError>;

impl From<serde_json::Error> for CounterError {
    fn from(err: serde_json::Error) -> Self {
        CounterError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_video_display() {
        let err = CounterError::UnknownVideo(29);
        assert_eq!(err.to_string(), "Unknown video: 29");
    }

    #[test]
    fn test_invalid_payload_display() {
        let err = CounterError::InvalidPayload("empty replica id".to_string());
        assert!(err.to_string().contains("empty replica id"));
    }
}
