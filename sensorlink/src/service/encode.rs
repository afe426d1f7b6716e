//! Fix → wire encoding.
//!
//! The peer expects fixed-point integers:
//!
//! | field     | conversion                          |
//! |-----------|-------------------------------------|
//! | timestamp | seconds × 1000                      |
//! | latitude  | degrees × 1e7                       |
//! | longitude | degrees × 1e7                       |
//! | accuracy  | sqrt(epx² + epy²) × 1000            |
//! | altitude  | meters × 100, only if valid         |
//! | speed     | m/s × 1.94384 × 1000, only if valid |
//! | bearing   | degrees × 1e6, only if valid        |
//!
//! Speed is knots scaled by 1000; the two factors are applied in that order
//! and must stay that way, consumers depend on the exact value.
//!
//! Conversion to integer goes through [`ScaleRounding`] and then a
//! saturating cast (NaN becomes 0).

use crate::channel::messages::GpsLocationData;
use crate::location::Fix;

/// Meters per second to knots.
pub const MPS_TO_KNOTS: f64 = 1.94384;

/// How a scaled floating-point value becomes an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleRounding {
    /// Toward zero (`19438.9` → `19438`, `-0.9` → `0`).
    #[default]
    Truncate,
    /// To nearest, halves away from zero (`19438.5` → `19439`).
    Nearest,
}

impl ScaleRounding {
    fn apply(self, value: f64) -> f64 {
        match self {
            Self::Truncate => value.trunc(),
            Self::Nearest => value.round(),
        }
    }

    fn to_i32(self, value: f64) -> i32 {
        self.apply(value) as i32
    }

    fn to_u32(self, value: f64) -> u32 {
        self.apply(value) as u32
    }

    fn to_u64(self, value: f64) -> u64 {
        self.apply(value) as u64
    }
}

impl std::str::FromStr for ScaleRounding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "truncate" => Ok(Self::Truncate),
            "nearest" | "round" => Ok(Self::Nearest),
            other => Err(format!("unknown rounding '{}'", other)),
        }
    }
}

impl std::fmt::Display for ScaleRounding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Truncate => write!(f, "truncate"),
            Self::Nearest => write!(f, "nearest"),
        }
    }
}

/// Encode a reportable fix.
///
/// Missing time or position encode as 0; callers only pass fixes that pass
/// [`Fix::is_reportable`]. A missing error component counts as 0 m.
pub fn encode_location(fix: &Fix, rounding: ScaleRounding) -> GpsLocationData {
    let epx = fix.epx.unwrap_or(0.0);
    let epy = fix.epy.unwrap_or(0.0);
    let accuracy = (epx.powi(2) + epy.powi(2)).sqrt();

    GpsLocationData {
        timestamp: rounding.to_u64(fix.time.unwrap_or(0.0) * 1e3),
        latitude: rounding.to_i32(fix.latitude.unwrap_or(0.0) * 1e7),
        longitude: rounding.to_i32(fix.longitude.unwrap_or(0.0) * 1e7),
        accuracy: rounding.to_u32(accuracy * 1e3),
        altitude: fix.altitude.map(|alt| rounding.to_i32(alt * 1e2)),
        speed: fix
            .speed
            .map(|speed| rounding.to_i32(speed * MPS_TO_KNOTS * 1e3)),
        bearing: fix.track.map(|track| rounding.to_i32(track * 1e6)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{FixMode, FixStatus};

    fn mountain_view() -> Fix {
        Fix {
            status: FixStatus::Fix,
            mode: FixMode::TwoD,
            time: Some(1_700_000_000.0),
            latitude: Some(37.422000),
            longitude: Some(-122.084000),
            epx: Some(3.0),
            epy: Some(4.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_position_and_accuracy() {
        for rounding in [ScaleRounding::Truncate, ScaleRounding::Nearest] {
            let encoded = encode_location(&mountain_view(), rounding);
            assert_eq!(encoded.latitude, 374220000);
            assert_eq!(encoded.longitude, -1220840000);
            assert_eq!(encoded.accuracy, 5000);
            assert_eq!(encoded.timestamp, 1_700_000_000_000);
            assert_eq!(encoded.altitude, None);
            assert_eq!(encoded.speed, None);
            assert_eq!(encoded.bearing, None);
        }
    }

    #[test]
    fn test_speed_ten_mps_same_under_both_policies() {
        let fix = Fix {
            speed: Some(10.0),
            ..mountain_view()
        };
        // 10 × 1.94384 × 1000 = 19438.4
        assert_eq!(
            encode_location(&fix, ScaleRounding::Truncate).speed,
            Some(19438)
        );
        assert_eq!(
            encode_location(&fix, ScaleRounding::Nearest).speed,
            Some(19438)
        );
    }

    #[test]
    fn test_speed_where_policies_differ() {
        let fix = Fix {
            speed: Some(1.0),
            ..mountain_view()
        };
        // 1 × 1.94384 × 1000 = 1943.84
        assert_eq!(
            encode_location(&fix, ScaleRounding::Truncate).speed,
            Some(1943)
        );
        assert_eq!(
            encode_location(&fix, ScaleRounding::Nearest).speed,
            Some(1944)
        );
    }

    #[test]
    fn test_optional_fields_when_valid() {
        let fix = Fix {
            altitude: Some(12.346),
            track: Some(271.5),
            ..mountain_view()
        };
        let encoded = encode_location(&fix, ScaleRounding::Truncate);
        assert_eq!(encoded.altitude, Some(1234));
        assert_eq!(encoded.bearing, Some(271_500_000));
        assert_eq!(encoded.speed, None);

        let encoded = encode_location(&fix, ScaleRounding::Nearest);
        assert_eq!(encoded.altitude, Some(1235));
    }

    #[test]
    fn test_fractional_timestamp_to_millis() {
        let fix = Fix {
            time: Some(1_700_000_000.5),
            ..mountain_view()
        };
        assert_eq!(
            encode_location(&fix, ScaleRounding::Truncate).timestamp,
            1_700_000_000_500
        );
    }

    #[test]
    fn test_negative_values_truncate_toward_zero() {
        let fix = Fix {
            altitude: Some(-0.509),
            ..mountain_view()
        };
        assert_eq!(
            encode_location(&fix, ScaleRounding::Truncate).altitude,
            Some(-50)
        );
        assert_eq!(
            encode_location(&fix, ScaleRounding::Nearest).altitude,
            Some(-51)
        );
    }

    #[test]
    fn test_missing_error_components_count_as_zero() {
        let fix = Fix {
            epx: None,
            epy: Some(2.5),
            ..mountain_view()
        };
        assert_eq!(encode_location(&fix, ScaleRounding::Truncate).accuracy, 2500);
    }

    #[test]
    fn test_rounding_parse() {
        assert_eq!("truncate".parse::<ScaleRounding>(), Ok(ScaleRounding::Truncate));
        assert_eq!("Nearest".parse::<ScaleRounding>(), Ok(ScaleRounding::Nearest));
        assert_eq!("round".parse::<ScaleRounding>(), Ok(ScaleRounding::Nearest));
        assert!("floor".parse::<ScaleRounding>().is_err());
        assert_eq!(ScaleRounding::Nearest.to_string(), "nearest");
    }
}
