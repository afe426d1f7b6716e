//! Sensor service.
//!
//! Answers the peer's sensor channel requests and pushes sensor events:
//! driving status (always unrestricted), day/night mode from a marker file
//! and GPS location from a location daemon.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sensorlink::service::{SensorService, SensorServiceConfig};
//!
//! let service = SensorService::new(Arc::new(channel), SensorServiceConfig::default());
//! service.start();
//! // ...
//! service.shutdown().await;
//! ```

mod builder;
mod config;
mod core;
mod encode;
mod facade;
mod night;
mod status;

pub use builder::SensorServiceBuilder;
pub use config::{SensorServiceConfig, DEFAULT_POLL_INTERVAL};
pub use encode::{encode_location, ScaleRounding, MPS_TO_KNOTS};
pub use facade::{SensorService, ADVERTISED_SENSORS};
pub use night::NightModeTracker;
pub use status::ServiceStatus;
