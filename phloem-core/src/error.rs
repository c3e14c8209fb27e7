use std::fmt;

/// Result type alias for phloem core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for phloem core operations
#[derive(Debug)]
pub enum Error {
    /// I/O errors from the transport layer
    Io(std::io::Error),

    /// Connection errors
    Connection(String),

    /// Configuration errors
    Config(String),

    /// Other errors
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Connection(msg) => write!(f, "Connection error: {msg}"),
            Error::Config(msg) => write!(f, "Configuration error: {msg}"),
            Error::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<phloem_transport::Error> for Error {
    fn from(err: phloem_transport::Error) -> Self {
        match err {
            phloem_transport::Error::Io(e) => Error::Io(e),
            phloem_transport::Error::Connection(msg) => Error::Connection(msg),
            phloem_transport::Error::Config(msg) => Error::Config(msg),
            phloem_transport::Error::Other(msg) => Error::Other(msg),
        }
    }
}
