//! Sensor channel abstraction.
//!
//! The sensor service talks to its peer through a [`SensorChannel`]: a
//! message-oriented sub-channel of the peer connection. Framing,
//! encryption and the physical transport sit below this trait and are not
//! modelled here.
//!
//! # Architecture
//!
//! ```text
//! SensorService (lane)
//!     │  ├── receive() ── one-shot, re-armed by the service after each message
//!     │  └── SendPipeline ── FIFO writer ──► SensorChannel::send()
//!     │                                          │
//!     └──────── completion (Result) ◄────────────┘
//! ```

mod error;
pub mod messages;
mod pipeline;

pub use error::ChannelError;
pub use messages::{InboundMessage, OutboundMessage};
pub use pipeline::{SendPipeline, SendResult};

use std::fmt;
use std::future::Future;

/// Logical channel identifier within the peer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(u8);

impl ChannelId {
    /// Sub-channel the sensor service conventionally runs on.
    pub const SENSOR: ChannelId = ChannelId(2);

    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message channel bound to one logical sub-channel.
///
/// Implementations must be shareable: the service receives on one task and
/// sends from another.
pub trait SensorChannel: Send + Sync + 'static {
    /// This channel's identifier, advertised during service discovery.
    fn id(&self) -> ChannelId;

    /// Wait for the next inbound message.
    ///
    /// Delivers exactly one message; the caller must call again for the
    /// next one.
    fn receive(&self) -> impl Future<Output = Result<InboundMessage, ChannelError>> + Send;

    /// Hand one message to the transport.
    ///
    /// Resolves once the transport has accepted or rejected the message.
    fn send(&self, message: OutboundMessage) -> impl Future<Output = SendResult> + Send;
}
