//! Public handle to a running sensor service.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::builder::SensorServiceBuilder;
use super::config::SensorServiceConfig;
use super::core::SensorServiceCore;
use super::status::ServiceStatus;
use crate::channel::messages::{
    ChannelDescriptor, SensorChannelDescriptor, SensorDescriptor, SensorType,
    ServiceDiscoveryResponse,
};
use crate::channel::{ChannelId, SensorChannel};
use crate::lane::{Lane, StopFlag};

/// Sensors advertised during service discovery, in advertisement order.
pub const ADVERTISED_SENSORS: [SensorType; 3] = [
    SensorType::DrivingStatus,
    SensorType::Location,
    SensorType::NightData,
];

/// Sensor service for one channel.
///
/// Lifecycle calls return immediately; the work runs on the service lane
/// in call order. Dropping the handle releases the lane: pending work
/// drains, then all outstanding callbacks become no-ops.
pub struct SensorService<C: SensorChannel> {
    lane: Lane<SensorServiceCore<C>>,
    lane_task: JoinHandle<()>,
    stop_flag: StopFlag,
    channel_id: ChannelId,
    status: watch::Receiver<ServiceStatus>,
}

impl<C: SensorChannel> SensorService<C> {
    /// Create a service with the default gpsd and marker-file sources.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn new(channel: Arc<C>, config: SensorServiceConfig) -> Self {
        SensorServiceBuilder::new(channel).config(config).build()
    }

    pub fn builder(channel: Arc<C>) -> SensorServiceBuilder<C> {
        SensorServiceBuilder::new(channel)
    }

    pub(crate) fn from_parts(
        lane: Lane<SensorServiceCore<C>>,
        lane_task: JoinHandle<()>,
        stop_flag: StopFlag,
        channel_id: ChannelId,
        status: watch::Receiver<ServiceStatus>,
    ) -> Self {
        Self {
            lane,
            lane_task,
            stop_flag,
            channel_id,
            status,
        }
    }

    /// Begin connecting the location source in the background, then emit
    /// the first poll tick, begin periodic polling and start receiving
    /// requests.
    pub fn start(&self) {
        self.dispatch("start", SensorServiceCore::start);
    }

    /// Stop periodic polling and disconnect the location source.
    ///
    /// The stop flag is raised before returning, so at most one tick that
    /// was already running can still emit.
    pub fn stop(&self) {
        self.stop_flag.raise();
        self.dispatch("stop", SensorServiceCore::stop);
    }

    pub fn pause(&self) {
        self.dispatch("pause", SensorServiceCore::pause);
    }

    pub fn resume(&self) {
        self.dispatch("resume", SensorServiceCore::resume);
    }

    /// Append this service's channel descriptor to a discovery response.
    pub fn fill_features(&self, response: &mut ServiceDiscoveryResponse) {
        info!(channel_id = %self.channel_id, "Fill features");

        let sensors = ADVERTISED_SENSORS
            .iter()
            .map(|&sensor_type| SensorDescriptor { sensor_type })
            .collect();

        response.channels.push(ChannelDescriptor {
            channel_id: u32::from(self.channel_id.value()),
            sensor_channel: Some(SensorChannelDescriptor { sensors }),
        });
    }

    pub fn status(&self) -> ServiceStatus {
        *self.status.borrow()
    }

    /// Watch lifecycle transitions.
    pub fn subscribe_status(&self) -> watch::Receiver<ServiceStatus> {
        self.status.clone()
    }

    /// Stop the service, release the lane and wait for queued work to
    /// finish.
    pub async fn shutdown(self) {
        self.stop();

        let Self { lane, lane_task, .. } = self;
        drop(lane);

        if let Err(e) = lane_task.await {
            warn!(error = %e, "Sensor service lane ended abnormally");
        }
    }

    fn dispatch(&self, operation: &'static str, task: fn(&mut SensorServiceCore<C>)) {
        if !self.lane.dispatch(task) {
            warn!(operation, "Sensor service lane is gone");
        }
    }
}
