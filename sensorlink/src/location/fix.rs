//! Location fix sample.

/// Receiver fix status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixStatus {
    #[default]
    NoFix,
    Fix,
    /// Differential or better (DGPS, RTK, ...).
    Differential,
}

/// Receiver fix dimensionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixMode {
    /// No report seen yet.
    #[default]
    NotSeen,
    NoFix,
    TwoD,
    ThreeD,
}

/// One location sample with per-field validity.
///
/// `None` means the receiver did not mark the field valid for this report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fix {
    pub status: FixStatus,
    pub mode: FixMode,
    /// Seconds since the Unix epoch.
    pub time: Option<f64>,
    /// Decimal degrees.
    pub latitude: Option<f64>,
    /// Decimal degrees.
    pub longitude: Option<f64>,
    /// Longitude error estimate, meters.
    pub epx: Option<f64>,
    /// Latitude error estimate, meters.
    pub epy: Option<f64>,
    /// Meters.
    pub altitude: Option<f64>,
    /// Meters per second.
    pub speed: Option<f64>,
    /// Degrees from true north.
    pub track: Option<f64>,
}

impl Fix {
    /// Whether this fix may be reported to the peer.
    ///
    /// Requires a real fix, 2-D or 3-D mode, and valid time and position.
    pub fn is_reportable(&self) -> bool {
        self.status != FixStatus::NoFix
            && matches!(self.mode, FixMode::TwoD | FixMode::ThreeD)
            && self.time.is_some()
            && self.latitude.is_some()
            && self.longitude.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn good_fix() -> Fix {
        Fix {
            status: FixStatus::Fix,
            mode: FixMode::ThreeD,
            time: Some(1_700_000_000.0),
            latitude: Some(37.422),
            longitude: Some(-122.084),
            epx: Some(3.0),
            epy: Some(4.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_fix_is_reportable() {
        assert!(good_fix().is_reportable());
        assert!(Fix {
            mode: FixMode::TwoD,
            status: FixStatus::Differential,
            ..good_fix()
        }
        .is_reportable());
    }

    #[test]
    fn test_no_fix_status_not_reportable() {
        let fix = Fix {
            status: FixStatus::NoFix,
            ..good_fix()
        };
        assert!(!fix.is_reportable());
    }

    #[test]
    fn test_mode_must_be_2d_or_3d() {
        for mode in [FixMode::NotSeen, FixMode::NoFix] {
            let fix = Fix { mode, ..good_fix() };
            assert!(!fix.is_reportable(), "mode {:?} must not report", mode);
        }
    }

    #[test]
    fn test_time_and_position_required() {
        assert!(!Fix {
            time: None,
            ..good_fix()
        }
        .is_reportable());
        assert!(!Fix {
            latitude: None,
            ..good_fix()
        }
        .is_reportable());
        assert!(!Fix {
            longitude: None,
            ..good_fix()
        }
        .is_reportable());
    }

    #[test]
    fn test_default_fix_is_empty() {
        let fix = Fix::default();
        assert_eq!(fix.status, FixStatus::NoFix);
        assert_eq!(fix.mode, FixMode::NotSeen);
        assert!(!fix.is_reportable());
    }
}
