//! Location source for GPS events.
//!
//! The sensor service samples a [`LocationClient`] once per poll tick.
//! [`connect`] is async and runs off the service lane. [`data_ready`],
//! [`read_fix`] and [`disconnect`] are synchronous and must never wait;
//! they run on the lane.
//!
//! [`GpsdClient`] is the production implementation. Tests use scripted
//! clients.
//!
//! [`connect`]: LocationClient::connect
//! [`disconnect`]: LocationClient::disconnect
//! [`data_ready`]: LocationClient::data_ready
//! [`read_fix`]: LocationClient::read_fix

mod error;
mod fix;
mod gpsd;

use std::future::Future;
use std::pin::Pin;

pub use error::LocationError;
pub use fix::{Fix, FixMode, FixStatus};
pub use gpsd::{GpsdClient, DEFAULT_CONNECT_TIMEOUT, DEFAULT_GPSD_HOST, DEFAULT_GPSD_PORT};

/// Future returned by [`LocationClient::connect`].
pub type ConnectFuture<'a> = Pin<Box<dyn Future<Output = Result<(), LocationError>> + Send + 'a>>;

/// Polling connection to a location daemon.
pub trait LocationClient: Send {
    /// Open the connection and start streaming reports.
    fn connect<'a>(&'a mut self, host: &'a str, port: u16) -> ConnectFuture<'a>;

    /// Stop streaming and close the connection. Best effort; never waits.
    /// No-op when not connected.
    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    /// Whether a report can be read right now. Never waits.
    fn data_ready(&mut self) -> bool;

    /// Read pending reports and return the latest fix, if any arrived.
    fn read_fix(&mut self) -> Result<Option<Fix>, LocationError>;
}
