//! Error types for the sensor channel.

use thiserror::Error;

/// Errors surfaced by a [`SensorChannel`](super::SensorChannel).
///
/// The service treats every variant the same way: log and drop.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChannelError {
    /// The peer or the underlying transport closed the channel.
    #[error("Channel closed")]
    Closed,

    /// The transport failed to deliver or receive a message.
    #[error("Transport error: {0}")]
    Transport(String),

    /// An inbound payload could not be decoded.
    #[error("Failed to decode message: {0}")]
    Decode(String),
}

impl From<std::io::Error> for ChannelError {
    fn from(e: std::io::Error) -> Self {
        ChannelError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for ChannelError {
    fn from(e: serde_json::Error) -> Self {
        ChannelError::Decode(e.to_string())
    }
}
