// common/src/error.rs
use thiserror::Error;

/// Failures surfaced to the user by account and level operations.
///
/// None of these are fatal: every operation that returns one leaves the
/// persisted session record exactly as it was before the call.
#[derive(Error, Debug)]
pub enum UploaderError {
    /// A value the configuration descriptor should provide is missing
    #[error("{0}")]
    Config(String),

    /// The request never produced a usable HTTP response
    #[error("{0}")]
    Transport(String),

    /// The remote service answered with a non-success status
    #[error("{message}")]
    Service { status: u16, message: String },

    /// A required field was rejected before any network call
    #[error("{0}")]
    Validation(String),

    /// A response body could not be decoded
    #[error("{0}")]
    Parse(String),

    /// The session document could not be written
    #[error("Session storage failed: {0}")]
    Storage(String),
}

impl UploaderError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// HTTP status reported by the remote service, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Service { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for UploaderError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<std::io::Error> for UploaderError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

pub type UploaderResult<T> = Result<T, UploaderError>;
