use std::time::Duration;

/// Crate-wide error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("System call error: {0}")]
    System(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Feature not available: {0}")]
    NotAvailable(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Migration to schema version {version} failed: {reason}")]
    Migration { version: u32, reason: String },

    #[error("Channel closed: {0}")]
    Channel(String),

    #[error(transparent)]
    Read(#[from] ReadError),
}

impl Error {
    pub(crate) fn system<S: Into<String>>(msg: S) -> Self {
        Error::System(msg.into())
    }

    pub(crate) fn invalid_data<S: Into<String>>(msg: S) -> Self {
        Error::InvalidData(msg.into())
    }

    pub(crate) fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    pub(crate) fn migration<S: Into<String>>(version: u32, reason: S) -> Self {
        Error::Migration { version, reason: reason.into() }
    }

    pub(crate) fn channel<S: Into<String>>(msg: S) -> Self {
        Error::Channel(msg.into())
    }
}

/// Result type for tonic-telemetry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single reader fetch.
///
/// `Unavailable` means the hardware is absent or unsupported and the widget should be
/// hidden. The other variants are transient: the last good snapshot stays visible and
/// the reader is retried on the next tick.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReadError {
    #[error("hardware unavailable: {0}")]
    Unavailable(String),

    #[error("native call timed out after {0:?}")]
    Timeout(Duration),

    #[error("native call failed: {0}")]
    NativeCall(String),
}

impl ReadError {
    pub fn unavailable<S: Into<String>>(msg: S) -> Self {
        ReadError::Unavailable(msg.into())
    }

    pub fn native<S: Into<String>>(msg: S) -> Self {
        ReadError::NativeCall(msg.into())
    }

    /// Whether the failure means "hide this widget" rather than "retry later"
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ReadError::Unavailable(_))
    }
}

impl From<std::io::Error> for ReadError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ReadError::Unavailable(err.to_string()),
            _ => ReadError::NativeCall(err.to_string()),
        }
    }
}
