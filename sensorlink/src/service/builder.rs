//! Builder for [`SensorService`] with pluggable sources.
//!
//! Production wiring uses [`GpsdClient`] and a [`MarkerFile`] derived from
//! the config; tests swap in scripted sources.

use std::sync::Arc;

use tokio::sync::watch;

use super::config::SensorServiceConfig;
use super::core::SensorServiceCore;
use super::facade::SensorService;
use super::status::ServiceStatus;
use crate::channel::SensorChannel;
use crate::lane::{Lane, StopFlag};
use crate::location::{GpsdClient, LocationClient};
use crate::night_mode::{MarkerFile, NightModeSource};

/// Builds a [`SensorService`] bound to one channel.
pub struct SensorServiceBuilder<C: SensorChannel> {
    channel: Arc<C>,
    config: SensorServiceConfig,
    location: Option<Box<dyn LocationClient>>,
    night_mode: Option<Box<dyn NightModeSource>>,
}

impl<C: SensorChannel> SensorServiceBuilder<C> {
    pub fn new(channel: Arc<C>) -> Self {
        Self {
            channel,
            config: SensorServiceConfig::default(),
            location: None,
            night_mode: None,
        }
    }

    pub fn config(mut self, config: SensorServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Use `client` instead of a gpsd connection.
    pub fn location_client(mut self, client: impl LocationClient + 'static) -> Self {
        self.location = Some(Box::new(client));
        self
    }

    /// Use `source` instead of the configured marker file.
    pub fn night_mode_source(mut self, source: impl NightModeSource + 'static) -> Self {
        self.night_mode = Some(Box::new(source));
        self
    }

    /// Spawn the service lane. Must be called from inside a tokio runtime.
    ///
    /// The service is created stopped; call [`SensorService::start`].
    pub fn build(self) -> SensorService<C> {
        let Self {
            channel,
            config,
            location,
            night_mode,
        } = self;

        let location = location.unwrap_or_else(|| {
            Box::new(GpsdClient::with_connect_timeout(config.gpsd_connect_timeout))
        });
        let night_source = night_mode
            .unwrap_or_else(|| Box::new(MarkerFile::new(config.night_mode_marker.clone())));

        let channel_id = channel.id();
        let stop_flag = StopFlag::new();
        let (status_tx, status_rx) = watch::channel(ServiceStatus::Stopped);

        let core_stop_flag = stop_flag.clone();
        let (lane, lane_task) = Lane::spawn_with(move |weak| {
            SensorServiceCore::new(
                channel,
                weak,
                location,
                night_source,
                core_stop_flag,
                config,
                status_tx,
            )
        });

        SensorService::from_parts(lane, lane_task, stop_flag, channel_id, status_rx)
    }
}
