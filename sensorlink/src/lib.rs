//! sensorlink - Sensor channel service for a head-unit link
//!
//! Answers a peer's sensor channel requests and pushes sensor events:
//! driving status, day/night mode and GPS location.
//!
//! # High-Level API
//!
//! The [`service`] module provides the service handle:
//!
//! ```ignore
//! use std::sync::Arc;
//! use sensorlink::service::{SensorService, SensorServiceConfig};
//!
//! let service = SensorService::new(Arc::new(channel), SensorServiceConfig::default());
//! service.start();
//! ```
//!
//! # Modules
//!
//! - [`channel`] - channel trait, wire messages and the ordered send pipeline
//! - [`lane`] - serialized execution lane and the periodic poll job
//! - [`location`] - location client trait and the gpsd client
//! - [`night_mode`] - marker-file night mode source
//! - [`config`] - INI configuration file
//! - [`logging`] - tracing subscriber setup

pub mod channel;
pub mod config;
pub mod lane;
pub mod location;
pub mod logging;
pub mod night_mode;
pub mod service;

/// Version of the sensorlink library and CLI.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
