//! Sensor service state machine.
//!
//! [`SensorServiceCore`] is the state owned by the service lane. Every
//! method here runs on that lane: lifecycle commands from the handle,
//! inbound requests from the receive task, send completions from the
//! pipeline writer and poll ticks from the periodic job.
//!
//! # Request flow
//!
//! ```text
//! receive task ──► on_inbound ──► on_channel_open_request ──► send(open response)
//!                            └──► on_sensor_start_request ──► send(start response, follow-up)
//!                                                                   │
//!                     on_send_complete(follow-up, Ok) ◄─────────────┘
//!                            ├── DrivingStatusUnrestricted ──► emit_driving_status_unrestricted
//!                            └── NightMode ──► emit_night_mode
//! ```
//!
//! # Location connect
//!
//! `start` moves the location client into a connect task and carries on.
//! The task hands the client back through the lane once the connect has
//! finished, so a slow or unreachable daemon never holds up inbound
//! requests or ticks. Until then ticks skip location.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use super::config::SensorServiceConfig;
use super::encode::encode_location;
use super::night::NightModeTracker;
use super::status::ServiceStatus;
use crate::channel::messages::{
    ChannelOpenRequest, ChannelOpenResponse, DrivingStatus, SensorEventIndication,
    SensorStartRequest, SensorStartResponse, SensorType, Status,
};
use crate::channel::{
    ChannelError, InboundMessage, OutboundMessage, SendPipeline, SendResult, SensorChannel,
};
use crate::lane::{PeriodicJob, StopFlag, WeakLane};
use crate::location::{Fix, LocationClient, LocationError};
use crate::night_mode::NightModeSource;

/// What to do once a send has been accepted by the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FollowUp {
    Nothing,
    DrivingStatusUnrestricted,
    NightMode,
}

/// Lane-owned state of one sensor service.
pub(crate) struct SensorServiceCore<C: SensorChannel> {
    channel: Arc<C>,
    lane: WeakLane<Self>,
    pipeline: SendPipeline<Self>,
    /// `None` while a connect task owns the client.
    location: Option<Box<dyn LocationClient>>,
    location_enabled: bool,
    connect_task: Option<JoinHandle<()>>,
    night_source: Box<dyn NightModeSource>,
    night: NightModeTracker,
    stop_flag: StopFlag,
    poll_job: Option<PeriodicJob>,
    receivers: Vec<JoinHandle<()>>,
    config: SensorServiceConfig,
    status: watch::Sender<ServiceStatus>,
}

impl<C: SensorChannel> SensorServiceCore<C> {
    pub(crate) fn new(
        channel: Arc<C>,
        lane: WeakLane<Self>,
        location: Box<dyn LocationClient>,
        night_source: Box<dyn NightModeSource>,
        stop_flag: StopFlag,
        config: SensorServiceConfig,
        status: watch::Sender<ServiceStatus>,
    ) -> Self {
        let pipeline = SendPipeline::spawn(Arc::clone(&channel), lane.clone());

        Self {
            channel,
            lane,
            pipeline,
            location: Some(location),
            location_enabled: false,
            connect_task: None,
            night_source,
            night: NightModeTracker::new(),
            stop_flag,
            poll_job: None,
            receivers: Vec::new(),
            config,
            status,
        }
    }

    // -------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------

    pub(crate) fn start(&mut self) {
        self.set_status(ServiceStatus::Starting);

        self.connect_location();
        self.night.set(self.night_source.is_night());

        // A new start begins a fresh tick chain.
        self.stop_flag.clear();
        if let Some(job) = self.poll_job.take() {
            job.cancel();
        }
        self.poll_tick();
        self.schedule_polling();

        info!(channel_id = %self.channel.id(), "Sensor service start");
        self.set_status(ServiceStatus::Running);
        self.arm_receive();
    }

    pub(crate) fn stop(&mut self) {
        self.set_status(ServiceStatus::Stopping);
        self.stop_flag.raise();

        self.disconnect_location();

        info!("Sensor service stop");
        self.set_status(ServiceStatus::Stopped);
    }

    pub(crate) fn pause(&mut self) {
        info!("Sensor service pause");
    }

    pub(crate) fn resume(&mut self) {
        info!("Sensor service resume");
    }

    fn set_status(&self, status: ServiceStatus) {
        self.status.send_replace(status);
    }

    // -------------------------------------------------------------------
    // Location connection
    // -------------------------------------------------------------------

    fn connect_location(&mut self) {
        let Some(mut client) = self.location.take() else {
            debug!("gpsd connect already in progress");
            return;
        };
        self.location_enabled = false;

        let host = self.config.gpsd_host.clone();
        let port = self.config.gpsd_port;
        let lane = self.lane.clone();
        self.connect_task = Some(tokio::spawn(async move {
            let result = client.connect(&host, port).await;
            let delivered = lane.dispatch(move |core: &mut Self| {
                core.on_location_connected(client, &host, port, result)
            });
            if !delivered {
                trace!("Sensor service gone, dropping gpsd connection");
            }
        }));
    }

    fn on_location_connected(
        &mut self,
        mut client: Box<dyn LocationClient>,
        host: &str,
        port: u16,
        result: Result<(), LocationError>,
    ) {
        self.connect_task = None;

        match result {
            Ok(()) if self.stop_flag.is_raised() => {
                debug!(host, port, "Stopped while connecting, closing gpsd connection");
                client.disconnect();
            }
            Ok(()) => {
                info!(host, port, "Connected to gpsd");
                self.location_enabled = true;
            }
            Err(e) => {
                warn!(host, port, error = %e, "Can't connect to gpsd, location events disabled");
            }
        }
        self.location = Some(client);

        // The start tick ran before the connection existed.
        if let Some(fix) = self.sample_location() {
            self.emit_location(&fix);
        }
    }

    fn disconnect_location(&mut self) {
        if !self.location_enabled {
            return;
        }
        self.location_enabled = false;
        if let Some(location) = self.location.as_mut() {
            location.disconnect();
        }
    }

    // -------------------------------------------------------------------
    // Polling
    // -------------------------------------------------------------------

    fn schedule_polling(&mut self) {
        if self.stop_flag.is_raised() {
            return;
        }
        self.poll_job = Some(PeriodicJob::spawn(
            self.lane.clone(),
            self.config.poll_interval,
            self.stop_flag.clone(),
            Self::poll_tick,
        ));
    }

    /// One sample of the night marker and the location source.
    pub(crate) fn poll_tick(&mut self) {
        let is_night = self.night_source.is_night();
        if self.night.observe(is_night) {
            self.emit_night_mode();
        }

        if let Some(fix) = self.sample_location() {
            self.emit_location(&fix);
        }
    }

    fn sample_location(&mut self) -> Option<Fix> {
        if !self.location_enabled {
            return None;
        }
        let location = self.location.as_mut()?;
        if !location.data_ready() {
            return None;
        }

        match location.read_fix() {
            Ok(Some(fix)) if fix.is_reportable() => Some(fix),
            Ok(Some(fix)) => {
                trace!(status = ?fix.status, mode = ?fix.mode, "Fix not reportable");
                None
            }
            Ok(None) => None,
            Err(e) => {
                debug!(error = %e, "Location read failed");
                None
            }
        }
    }

    // -------------------------------------------------------------------
    // Inbound
    // -------------------------------------------------------------------

    /// Ask the channel for exactly one more inbound message.
    fn arm_receive(&mut self) {
        self.receivers.retain(|handle| !handle.is_finished());

        let channel = Arc::clone(&self.channel);
        let lane = self.lane.clone();
        let handle = tokio::spawn(async move {
            let result = channel.receive().await;
            if !lane.dispatch(move |core: &mut Self| core.on_inbound(result)) {
                trace!("Sensor service gone, dropping inbound message");
            }
        });
        self.receivers.push(handle);
    }

    fn on_inbound(&mut self, result: Result<InboundMessage, ChannelError>) {
        match result {
            Ok(InboundMessage::ChannelOpenRequest(request)) => {
                self.on_channel_open_request(&request)
            }
            Ok(InboundMessage::SensorStartRequest(request)) => {
                self.on_sensor_start_request(&request)
            }
            Ok(InboundMessage::Unhandled { message_id }) => {
                warn!(message_id, "Unhandled sensor channel message");
                self.arm_receive();
            }
            Err(e) => self.on_channel_error(&e),
        }
    }

    pub(crate) fn on_channel_open_request(&mut self, request: &ChannelOpenRequest) {
        info!(priority = request.priority, "Open request");
        let status = Status::Ok;
        info!(%status, "Open status");

        self.send(ChannelOpenResponse { status }, FollowUp::Nothing);
        self.arm_receive();
    }

    pub(crate) fn on_sensor_start_request(&mut self, request: &SensorStartRequest) {
        info!(sensor_type = request.sensor_type, "Sensor start request");

        let follow_up = match request.sensor() {
            Some(SensorType::DrivingStatus) => FollowUp::DrivingStatusUnrestricted,
            Some(SensorType::NightData) => FollowUp::NightMode,
            _ => FollowUp::Nothing,
        };

        self.send(SensorStartResponse { status: Status::Ok }, follow_up);
        self.arm_receive();
    }

    // -------------------------------------------------------------------
    // Outbound
    // -------------------------------------------------------------------

    pub(crate) fn emit_driving_status_unrestricted(&mut self) {
        self.send(
            SensorEventIndication::driving_status(DrivingStatus::Unrestricted),
            FollowUp::Nothing,
        );
    }

    pub(crate) fn emit_night_mode(&mut self) {
        let is_night = self.night.is_night();
        if is_night {
            info!("Mode night triggered");
        } else {
            info!("Mode day triggered");
        }

        self.send(SensorEventIndication::night_mode(is_night), FollowUp::Nothing);
        self.night.mark_emitted();
    }

    pub(crate) fn emit_location(&mut self, fix: &Fix) {
        let location = encode_location(fix, self.config.rounding);
        trace!(
            lat = location.latitude,
            lon = location.longitude,
            accuracy_mm = location.accuracy,
            "Location event"
        );
        self.send(SensorEventIndication::gps_location(location), FollowUp::Nothing);
    }

    fn send(&self, message: impl Into<OutboundMessage>, follow_up: FollowUp) {
        self.pipeline
            .send(message, move |core: &mut Self, result| {
                core.on_send_complete(follow_up, result)
            });
    }

    fn on_send_complete(&mut self, follow_up: FollowUp, result: SendResult) {
        match result {
            Ok(()) => match follow_up {
                FollowUp::Nothing => {}
                FollowUp::DrivingStatusUnrestricted => self.emit_driving_status_unrestricted(),
                FollowUp::NightMode => self.emit_night_mode(),
            },
            Err(e) => self.on_channel_error(&e),
        }
    }

    fn on_channel_error(&self, error: &ChannelError) {
        error!(error = %error, "Sensor channel error");
    }
}

impl<C: SensorChannel> Drop for SensorServiceCore<C> {
    fn drop(&mut self) {
        for handle in self.receivers.drain(..) {
            handle.abort();
        }
        if let Some(job) = self.poll_job.take() {
            job.cancel();
        }
        if let Some(task) = self.connect_task.take() {
            task.abort();
        }
        self.disconnect_location();
    }
}
