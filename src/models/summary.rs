use crate::models::{clock_request::ClockRequest, punch::PunchRecord};
use crate::utils::formatting::secs2readable;
use std::fmt;

/// Differences smaller than this are reported as matching the request.
pub const NEGLIGIBLE_DELTA_SECS: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Delta {
    Negligible,
    More(f64),
    Less(f64),
}

impl Delta {
    pub fn classify(requested_secs: f64, actual_secs: f64) -> Self {
        let diff = actual_secs - requested_secs;
        if diff.abs() < NEGLIGIBLE_DELTA_SECS {
            Delta::Negligible
        } else if diff > 0.0 {
            Delta::More(diff)
        } else {
            Delta::Less(-diff)
        }
    }
}

/// Final report: actual clocked time against the requested time.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockSummary {
    pub requested_hours: f64,
    pub actual_seconds: f64,
    pub delta: Delta,
}

impl ClockSummary {
    /// None unless both punches were recorded.
    pub fn from_record(request: &ClockRequest, record: &PunchRecord) -> Option<Self> {
        let actual = record.elapsed_seconds()?;
        Some(Self {
            requested_hours: request.hours_to_clock(),
            actual_seconds: actual,
            delta: Delta::classify(request.seconds_to_clock(), actual),
        })
    }
}

impl fmt::Display for ClockSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Clocked {:.3}hrs / {:.0}mins, ",
            self.actual_seconds / 3600.0,
            self.actual_seconds / 60.0
        )?;
        match self.delta {
            Delta::Negligible => write!(f, "as requested ({}hrs)", self.requested_hours),
            Delta::More(secs) => write!(
                f,
                "more than requested ({}hrs) by {}",
                self.requested_hours,
                secs2readable(secs)
            ),
            Delta::Less(secs) => write!(
                f,
                "less than requested ({}hrs) by {}",
                self.requested_hours,
                secs2readable(secs)
            ),
        }
    }
}
