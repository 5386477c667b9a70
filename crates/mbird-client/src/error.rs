//! Client error taxonomy

use mbird_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Backend unreachable or the response could not be read.
    #[error("{0}")]
    Transport(String),

    /// Non-2xx response; `message` is the body's `detail` or the raw body.
    #[error("{status} {message}")]
    BackendRejected { status: u16, message: String },

    #[error("Filesystem access is not supported on this platform")]
    FilesystemUnsupported,

    #[error("{0} not found in selected directory")]
    FilesystemNotFound(String),

    /// The user dismissed an interactive picker. Never shown to the user.
    #[error("Cancelled by user")]
    UserCancelled,

    /// An operation was invoked from a state that does not allow it.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
