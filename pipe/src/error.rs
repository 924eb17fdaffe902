//! Error types for pipe operations.

use std::error::Error as StdError;
use std::io;
use std::sync::Arc;

/// Result type alias for pipe operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Pipe operation error.
///
/// Blocking is the only retry mechanism for capacity and occupancy pressure;
/// every variant here is surfaced to the caller as soon as it is detected.
/// Reaching end-of-stream is not an error: reads return `Ok(0)` instead.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Bad length, offset or capacity. Reported before any blocking or mutation.
    #[error("pipe: invalid argument: {0}")]
    InvalidArgument(String),

    /// The endpoint lacks the capability for this operation.
    #[error("pipe: unsupported operation: {0}")]
    Unsupported(&'static str),

    /// The buffer has been closed for writing.
    #[error("pipe: closed")]
    Closed,

    /// The buffer has been aborted with an associated error.
    #[error("pipe: closed with error: {0}")]
    ClosedWithError(Arc<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Returns true for both the graceful and the abortive closed variants.
    pub fn is_closed(&self) -> bool {
        matches!(self, Error::Closed | Error::ClosedWithError(_))
    }
}

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        let kind = match e {
            Error::InvalidArgument(_) => io::ErrorKind::InvalidInput,
            Error::Unsupported(_) => io::ErrorKind::Unsupported,
            Error::Closed | Error::ClosedWithError(_) => io::ErrorKind::BrokenPipe,
        };
        io::Error::new(kind, e)
    }
}
