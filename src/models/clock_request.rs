use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Local, TimeDelta};

/// What the user asked for on the command line. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockRequest {
    hours_to_clock: f64,
    only_out: bool,
    start_time: DateTime<Local>,
    end_time: DateTime<Local>,
}

impl ClockRequest {
    pub fn new(hours_to_clock: f64, only_out: bool) -> AppResult<Self> {
        Self::starting_at(hours_to_clock, only_out, Local::now())
    }

    pub fn starting_at(
        hours_to_clock: f64,
        only_out: bool,
        start_time: DateTime<Local>,
    ) -> AppResult<Self> {
        if !hours_to_clock.is_finite() || hours_to_clock < 0.0 {
            return Err(AppError::InvalidHours(hours_to_clock));
        }
        // hours that push the end past the calendar are rejected here, not at display time
        let end_time = start_time
            .checked_add_signed(duration_for(hours_to_clock))
            .ok_or(AppError::InvalidHours(hours_to_clock))?;
        Ok(Self {
            hours_to_clock,
            only_out,
            start_time,
            end_time,
        })
    }

    pub fn hours_to_clock(&self) -> f64 {
        self.hours_to_clock
    }

    pub fn only_out(&self) -> bool {
        self.only_out
    }

    pub fn start_time(&self) -> DateTime<Local> {
        self.start_time
    }

    pub fn seconds_to_clock(&self) -> f64 {
        self.hours_to_clock * 3600.0
    }

    /// Requested duration, rounded to the microsecond.
    pub fn clock_duration(&self) -> TimeDelta {
        duration_for(self.hours_to_clock)
    }

    pub fn end_time(&self) -> DateTime<Local> {
        self.end_time
    }
}

fn duration_for(hours: f64) -> TimeDelta {
    // the cast saturates, so huge inputs surface as an out-of-range end time
    TimeDelta::microseconds((hours * 3600.0 * 1_000_000.0).round() as i64)
}
