//! Unified application error type.
//! Every module (browser, core, config, cli) returns AppError so the
//! orchestrator can decide in one place what is fatal and what gets notified.

use std::io;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    // ---------------------------
    // Input errors
    // ---------------------------
    #[error("Invalid number of hours: {0} (must be a finite value >= 0)")]
    InvalidHours(f64),

    #[error("Invalid wait request: {0}")]
    InvalidWait(String),

    // ---------------------------
    // Waiting / locating
    // ---------------------------
    #[error("Timed out after {:.1}s waiting until {description}", .elapsed.as_secs_f64())]
    WaitTimeout {
        description: String,
        elapsed: Duration,
    },

    #[error("No second-factor confirmation after waiting for {:.0} seconds", .waited.as_secs_f64())]
    SecondFactorTimeout { waited: Duration },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    // ---------------------------
    // Browser / driver
    // ---------------------------
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Failed to start browser driver: {0}")]
    DriverLaunch(String),

    // ---------------------------
    // Logic errors
    // ---------------------------
    #[error("Punch record error: {0}")]
    PunchState(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    /// True for the outcomes an optional-popup probe treats as "not there".
    pub fn is_probe_miss(&self) -> bool {
        matches!(
            self,
            AppError::WaitTimeout { .. } | AppError::ElementNotFound(_)
        )
    }

    /// True when the failure channel has already been pinged for this error.
    pub fn already_notified(&self) -> bool {
        matches!(self, AppError::SecondFactorTimeout { .. })
    }
}

impl From<fantoccini::error::CmdError> for AppError {
    fn from(e: fantoccini::error::CmdError) -> Self {
        AppError::Browser(e.to_string())
    }
}

impl From<fantoccini::error::NewSessionError> for AppError {
    fn from(e: fantoccini::error::NewSessionError) -> Self {
        AppError::DriverLaunch(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
