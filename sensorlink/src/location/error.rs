//! Error types for location clients.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while talking to a location daemon.
#[derive(Debug, Error)]
pub enum LocationError {
    /// TCP connection to the daemon failed.
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The daemon did not answer within the connect timeout.
    #[error("Timed out connecting to {addr} after {timeout:?}")]
    Timeout { addr: String, timeout: Duration },

    /// Read or write on an established connection failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Operation requires a connection.
    #[error("Not connected")]
    NotConnected,

    /// A report line could not be parsed.
    #[error("Malformed report: {0}")]
    MalformedReport(String),
}
