use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Local};

/// Timestamps of the punches performed during one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PunchRecord {
    clock_in_time: Option<DateTime<Local>>,
    clock_in_synthetic: bool,
    clock_out_time: Option<DateTime<Local>>,
    elapsed_seconds: Option<f64>,
}

impl PunchRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_clock_in(&mut self, at: DateTime<Local>) -> AppResult<()> {
        if self.clock_in_time.is_some() {
            return Err(AppError::PunchState("clock-in already recorded".into()));
        }
        self.clock_in_time = Some(at);
        Ok(())
    }

    /// Used when clock-in is skipped, so the elapsed report still has a start.
    pub fn record_synthetic_clock_in(&mut self, at: DateTime<Local>) -> AppResult<()> {
        self.record_clock_in(at)?;
        self.clock_in_synthetic = true;
        Ok(())
    }

    pub fn record_clock_out(&mut self, at: DateTime<Local>) -> AppResult<()> {
        if self.clock_out_time.is_some() {
            return Err(AppError::PunchState("clock-out already recorded".into()));
        }
        self.clock_out_time = Some(at);
        self.elapsed_seconds = self
            .clock_in_time
            .map(|start| (at - start).num_microseconds().unwrap_or(i64::MAX) as f64 / 1_000_000.0);
        Ok(())
    }

    pub fn clock_in_time(&self) -> Option<DateTime<Local>> {
        self.clock_in_time
    }

    pub fn clock_in_synthetic(&self) -> bool {
        self.clock_in_synthetic
    }

    pub fn clock_out_time(&self) -> Option<DateTime<Local>> {
        self.clock_out_time
    }

    pub fn elapsed_seconds(&self) -> Option<f64> {
        self.elapsed_seconds
    }
}
