//! Error types for taskline-realtime.

use thiserror::Error;

/// Result type alias using taskline-realtime's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for taskline-realtime operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Inbound event payload could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Team Directory lookup failed (transport error or non-200).
    #[error("Directory error: {0}")]
    Directory(String),

    /// Event intake (broker subscription) failed.
    #[error("Intake error: {0}")]
    Intake(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_decode() {
        let err = Error::Decode("unexpected end of input".to_string());
        assert_eq!(err.to_string(), "Decode error: unexpected end of input");
    }

    #[test]
    fn test_error_display_directory() {
        let err = Error::Directory("team service returned 500".to_string());
        assert_eq!(err.to_string(), "Directory error: team service returned 500");
    }
}
