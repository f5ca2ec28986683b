use std::error::Error;
use std::fmt::{self, Display};

/// The kind of failure a transport reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The service did not answer in time.
    Timeout,
    /// The service answered with a non-success status.
    Status,
    /// The connection failed, or the body could not be read.
    Network,
    /// A response arrived, but it did not carry a usable answer.
    MalformedResponse,
    /// Any other errors.
    Other,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Timeout => write!(f, "timed out"),
            ErrorKind::Status => write!(f, "bad status"),
            ErrorKind::Network => write!(f, "network error"),
            ErrorKind::MalformedResponse => write!(f, "malformed response"),
            ErrorKind::Other => write!(f, "transport error"),
        }
    }
}

/// The error type of a [`crate::Transport`].
pub trait TransportError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}
