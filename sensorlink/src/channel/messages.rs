//! Wire messages exchanged on the sensor channel.
//!
//! These mirror the peer's versioned message catalog. Only the fields the
//! sensor service reads or writes are modelled; numeric values of the
//! enumerations match the catalog so they can be framed by any transport.
//!
//! All types are `serde`-serializable. The catalog's framing is the
//! transport's concern; the JSON form is used by the CLI's line channel.

use serde::{Deserialize, Serialize};

/// Sensor kinds known to the message catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum SensorType {
    None = 0,
    Location = 1,
    Compass = 2,
    CarSpeed = 3,
    Rpm = 4,
    Odometer = 5,
    FuelLevel = 6,
    ParkingBrake = 7,
    Gear = 8,
    Diagnostics = 9,
    NightData = 10,
    Environment = 11,
    Hvac = 12,
    DrivingStatus = 13,
    DeadReckoning = 14,
    Passenger = 15,
    Door = 16,
    Light = 17,
    Tire = 18,
    Accel = 19,
    Gyro = 20,
    Gps = 21,
}

impl SensorType {
    /// Raw catalog value.
    pub fn as_raw(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for SensorType {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        let sensor = match value {
            0 => Self::None,
            1 => Self::Location,
            2 => Self::Compass,
            3 => Self::CarSpeed,
            4 => Self::Rpm,
            5 => Self::Odometer,
            6 => Self::FuelLevel,
            7 => Self::ParkingBrake,
            8 => Self::Gear,
            9 => Self::Diagnostics,
            10 => Self::NightData,
            11 => Self::Environment,
            12 => Self::Hvac,
            13 => Self::DrivingStatus,
            14 => Self::DeadReckoning,
            15 => Self::Passenger,
            16 => Self::Door,
            17 => Self::Light,
            18 => Self::Tire,
            19 => Self::Accel,
            20 => Self::Gyro,
            21 => Self::Gps,
            other => return Err(other),
        };
        Ok(sensor)
    }
}

/// Response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum Status {
    Ok = 0,
    Fail = 1,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

/// Driving restriction level reported to the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum DrivingStatus {
    Unrestricted = 0,
    NoVideo = 1,
    NoKeyboardInput = 2,
    NoVoiceInput = 4,
    NoConfig = 8,
    LimitMessageLen = 16,
    FullyRestricted = 31,
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelOpenRequest {
    pub priority: i32,
    pub channel_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorStartRequest {
    /// Raw catalog value; peers may send types this side does not know.
    pub sensor_type: i32,
    #[serde(default)]
    pub refresh_interval: i64,
}

impl SensorStartRequest {
    pub fn new(sensor_type: SensorType) -> Self {
        Self {
            sensor_type: sensor_type.as_raw(),
            refresh_interval: 0,
        }
    }

    /// The requested sensor, if this side knows the value.
    pub fn sensor(&self) -> Option<SensorType> {
        SensorType::try_from(self.sensor_type).ok()
    }
}

/// A message delivered to the service by the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    ChannelOpenRequest(ChannelOpenRequest),
    SensorStartRequest(SensorStartRequest),
    /// A message id the sensor service does not handle.
    Unhandled { message_id: u16 },
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelOpenResponse {
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorStartResponse {
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrivingStatusData {
    pub status: DrivingStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NightModeData {
    pub is_night: bool,
}

/// GPS fix in the catalog's fixed-point units.
///
/// | field     | unit                   |
/// |-----------|------------------------|
/// | timestamp | milliseconds since epoch |
/// | latitude  | 1e-7 degrees           |
/// | longitude | 1e-7 degrees           |
/// | accuracy  | millimeters            |
/// | altitude  | centimeters            |
/// | speed     | knots × 1000           |
/// | bearing   | 1e-6 degrees           |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsLocationData {
    pub timestamp: u64,
    pub latitude: i32,
    pub longitude: i32,
    pub accuracy: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearing: Option<i32>,
}

/// Sensor event pushed to the peer. Each list may carry zero or more samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorEventIndication {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub driving_status: Vec<DrivingStatusData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub night_mode: Vec<NightModeData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gps_location: Vec<GpsLocationData>,
}

impl SensorEventIndication {
    pub fn driving_status(status: DrivingStatus) -> Self {
        Self {
            driving_status: vec![DrivingStatusData { status }],
            ..Default::default()
        }
    }

    pub fn night_mode(is_night: bool) -> Self {
        Self {
            night_mode: vec![NightModeData { is_night }],
            ..Default::default()
        }
    }

    pub fn gps_location(location: GpsLocationData) -> Self {
        Self {
            gps_location: vec![location],
            ..Default::default()
        }
    }
}

/// A message the service hands to the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    ChannelOpenResponse(ChannelOpenResponse),
    SensorStartResponse(SensorStartResponse),
    SensorEventIndication(SensorEventIndication),
}

impl OutboundMessage {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ChannelOpenResponse(_) => "channel_open_response",
            Self::SensorStartResponse(_) => "sensor_start_response",
            Self::SensorEventIndication(_) => "sensor_event_indication",
        }
    }
}

impl From<ChannelOpenResponse> for OutboundMessage {
    fn from(m: ChannelOpenResponse) -> Self {
        Self::ChannelOpenResponse(m)
    }
}

impl From<SensorStartResponse> for OutboundMessage {
    fn from(m: SensorStartResponse) -> Self {
        Self::SensorStartResponse(m)
    }
}

impl From<SensorEventIndication> for OutboundMessage {
    fn from(m: SensorEventIndication) -> Self {
        Self::SensorEventIndication(m)
    }
}

// ---------------------------------------------------------------------------
// Service discovery
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDescriptor {
    pub sensor_type: SensorType,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorChannelDescriptor {
    pub sensors: Vec<SensorDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelDescriptor {
    pub channel_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_channel: Option<SensorChannelDescriptor>,
}

/// Peer-supplied discovery response; each service appends its own channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDiscoveryResponse {
    pub channels: Vec<ChannelDescriptor>,
}
