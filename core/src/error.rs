//! Error types for the portwatch-core library.

use thiserror::Error;

/// Result type alias for portwatch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while probing a port or waiting on its state.
#[derive(Error, Debug)]
pub enum Error {
    /// The port text could not be read as a TCP port number. Carries the
    /// rejected text verbatim so callers see exactly what was refused.
    #[error("invalid port: {0}")]
    InvalidPort(String),

    /// An argument failed validation before any socket or timer existed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The deadline elapsed before the desired port state was observed.
    #[error("timeout")]
    Timeout,

    /// A connection attempt failed for a reason other than refusal.
    /// Refusal means the port is free and is not an error.
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),
}
