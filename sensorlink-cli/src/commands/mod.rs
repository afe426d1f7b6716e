//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`run`] - Main command (serve the sensor channel over stdin/stdout)
//! - [`features`] - Print the service discovery entry
//! - [`gpsd`] - Watch the location daemon and print location events

pub mod features;
pub mod gpsd;
pub mod run;
