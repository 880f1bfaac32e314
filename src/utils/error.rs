//! Error types for the trellis framework
//!
//! The taxonomy separates programmer errors (invalid arguments and invalid
//! state transitions, which always surface to the caller) from request-time
//! failures (template and deployment problems). End-user validation failures
//! are never errors: they are recorded on the offending field and re-rendered
//! as inline feedback.

use thiserror::Error;

/// Main error type for trellis framework operations
#[derive(Debug, Error)]
pub enum TrellisError {
    /// Programmer error: a bad value passed at a call site
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Programmer error: an operation not legal in the current state
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Front controller configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Template lookup or rendering failure
    #[error("template '{path}' failed: {message}")]
    Template { path: String, message: String },

    /// Static resource deployment failure
    #[error("resource deploy failed: {0}")]
    Deploy(String),

    /// A page hook failed while handling a request
    #[error("page error: {0}")]
    Page(String),

    /// The error page itself failed after an earlier page error
    #[error("error page failed: {0}")]
    ErrorPage(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrellisError {
    /// Shorthand for an invalid-argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Shorthand for an invalid-state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }
}

/// Convenience Result type for trellis operations
pub type Result<T> = std::result::Result<T, TrellisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrellisError::invalid_argument("name is required");
        assert_eq!(err.to_string(), "invalid argument: name is required");

        let err = TrellisError::Template {
            path: "home.htm".to_string(),
            message: "not found".to_string(),
        };
        assert_eq!(err.to_string(), "template 'home.htm' failed: not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: TrellisError = io.into();
        assert!(matches!(err, TrellisError::Io(_)));
    }
}
