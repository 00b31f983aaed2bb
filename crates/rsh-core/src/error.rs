//! Error types for the rsh relay.

use std::net::SocketAddr;

use thiserror::Error;

/// Main error type for relay operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Framed command would not fit in the transmit buffer
    #[error("Command too long: framed length {len} exceeds {max} bytes")]
    CommandTooLong {
        /// Length the framed command would have had
        len: usize,
        /// Maximum allowed framed length
        max: usize,
    },

    /// Listening socket could not be set up
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Address the server tried to listen on
        addr: SocketAddr,
        /// Underlying socket error
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
