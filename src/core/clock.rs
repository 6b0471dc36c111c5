//! Punch transitions and the keep-alive hold between them.

use crate::browser::{Browser, Locator};
use crate::config::IdleConfig;
use crate::core::login::LoginController;
use crate::core::notifier::Notifier;
use crate::core::selectors as sel;
use crate::core::session::BrowserSession;
use crate::core::wait::{Condition, TimeoutTier, WaitSpec};
use crate::errors::{AppError, AppResult};
use crate::models::punch::PunchRecord;
use crate::ui::messages::{info, warning};
use crate::utils::formatting::hours_minutes;
use crate::utils::time::{format_timestamp, minutes_f64, seconds_since};
use chrono::Local;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleSettings {
    /// Sleep between two iterations of the hold loop.
    pub tick: Duration,
    /// Refresh cadence, counted in loop iterations of `tick`.
    pub keepalive_every: Duration,
    /// Progress line cadence, counted the same way.
    pub progress_every: Duration,
}

impl IdleSettings {
    pub fn ticks_per_keepalive(&self) -> u64 {
        self.ticks_for(self.keepalive_every)
    }

    pub fn ticks_per_progress(&self) -> u64 {
        self.ticks_for(self.progress_every)
    }

    fn ticks_for(&self, every: Duration) -> u64 {
        let tick = self.tick.as_secs_f64().max(f64::EPSILON);
        ((every.as_secs_f64() / tick).round() as u64).max(1)
    }
}

impl Default for IdleSettings {
    fn default() -> Self {
        Self::from(&IdleConfig::default())
    }
}

impl From<&IdleConfig> for IdleSettings {
    fn from(cfg: &IdleConfig) -> Self {
        Self {
            tick: Duration::from_millis(cfg.tick_ms),
            keepalive_every: minutes_f64(cfg.keepalive_minutes),
            progress_every: minutes_f64(cfg.progress_minutes),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleOutcome {
    Completed,
    Interrupted,
}

/// What the "already clocked in" dialog looked like during `clock_in`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoubleClock {
    Absent,
    Dismissed,
    /// OK was pressed but the Back button never showed up.
    Confirmed,
}

/// Snapshot of the hold, shown to the operator while it runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdleProgress {
    pub elapsed_secs: f64,
    pub total_secs: f64,
}

impl IdleProgress {
    pub fn remaining_secs(&self) -> f64 {
        (self.total_secs - self.elapsed_secs).max(0.0)
    }

    pub fn percent(&self) -> f64 {
        progress_percent(self.elapsed_secs, self.total_secs)
    }
}

impl fmt::Display for IdleProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Clocking: {} elapsed, {} remaining ({:.1}%)",
            hours_minutes(self.elapsed_secs),
            hours_minutes(self.remaining_secs()),
            self.percent()
        )
    }
}

pub struct ClockController<'a, N: Notifier + ?Sized> {
    login: &'a LoginController<'a, N>,
    idle: IdleSettings,
    cancel: Arc<AtomicBool>,
    record: PunchRecord,
    progress: Option<IdleProgress>,
}

impl<'a, N: Notifier + ?Sized> ClockController<'a, N> {
    pub fn new(login: &'a LoginController<'a, N>, idle: IdleSettings, cancel: Arc<AtomicBool>) -> Self {
        Self {
            login,
            idle,
            cancel,
            record: PunchRecord::new(),
            progress: None,
        }
    }

    pub fn record(&self) -> &PunchRecord {
        &self.record
    }

    /// Last progress line printed by `idle`, if any.
    pub fn progress(&self) -> Option<IdleProgress> {
        self.progress
    }

    pub fn into_record(self) -> PunchRecord {
        self.record
    }

    /// Start the elapsed clock without punching in.
    pub fn skip_clock_in(&mut self) -> AppResult<()> {
        self.record.record_synthetic_clock_in(Local::now())
    }

    pub fn clock_in<B: Browser>(&mut self, session: &mut BrowserSession<B>) -> AppResult<DoubleClock> {
        self.login.ensure_on_clock_page(session)?;

        session.wait(&WaitSpec::press_return(Locator::id(sel::PUNCH_MENU_ID)))?;
        session.wait(&WaitSpec::press_return(Locator::id(sel::PUNCH_IN_ID)))?;

        let double_clock = self.dismiss_double_clock(session)?;

        session.wait(&WaitSpec::locate(status_reads(sel::STATUS_IN)))?;

        let now = Local::now();
        self.record.record_clock_in(now)?;
        info(format!("Clocked in at {}", format_timestamp(now)));
        Ok(double_clock)
    }

    fn dismiss_double_clock<B: Browser>(
        &self,
        session: &mut BrowserSession<B>,
    ) -> AppResult<DoubleClock> {
        let ok = WaitSpec::press_return(Locator::id(sel::DOUBLE_CLOCK_OK_ID))
            .with_tier(TimeoutTier::Short);
        match session.wait(&ok) {
            Ok(_) => {}
            Err(e) if e.is_probe_miss() => {
                debug!("no double-clock popup: {e}");
                return Ok(DoubleClock::Absent);
            }
            Err(e) => return Err(e),
        }

        let back = WaitSpec::press_return(Locator::id(sel::DOUBLE_CLOCK_BACK_ID))
            .with_tier(TimeoutTier::Short);
        match session.wait(&back) {
            Ok(_) => {
                warn!("Double-clock prevented.");
                Ok(DoubleClock::Dismissed)
            }
            Err(e) if e.is_probe_miss() => {
                warn!("Double-clock dialog confirmed, but its Back button never appeared: {e}");
                Ok(DoubleClock::Confirmed)
            }
            Err(e) => Err(e),
        }
    }

    /// Hold for `duration_secs` after clock-in, refreshing the page
    /// periodically so the portal session does not expire.
    pub fn idle<B: Browser>(
        &mut self,
        session: &mut BrowserSession<B>,
        duration_secs: f64,
    ) -> AppResult<IdleOutcome> {
        let start = self
            .record
            .clock_in_time()
            .ok_or_else(|| AppError::PunchState("idle requested before clock-in".into()))?;
        let every = self.idle.ticks_per_keepalive();
        let report_every = self.idle.ticks_per_progress();
        let mut ticks: u64 = 0;

        loop {
            let elapsed = seconds_since(start);
            if elapsed >= duration_secs {
                return Ok(IdleOutcome::Completed);
            }
            if self.cancel.load(Ordering::SeqCst) {
                warning(format!(
                    "Interrupted after {:.3}hrs, clocking out",
                    elapsed / 3600.0
                ));
                return Ok(IdleOutcome::Interrupted);
            }

            thread::sleep(self.idle.tick);
            ticks += 1;

            if ticks % report_every == 0 {
                let progress = IdleProgress {
                    elapsed_secs: seconds_since(start),
                    total_secs: duration_secs,
                };
                info(progress);
                self.progress = Some(progress);
            }

            if ticks % every == 0 {
                debug!(
                    "{:.3}hrs / {:.0}mins elapsed ({:.1}%)",
                    elapsed / 3600.0,
                    elapsed / 60.0,
                    progress_percent(elapsed, duration_secs)
                );
                self.keep_alive(session)?;
            }
        }
    }

    fn keep_alive<B: Browser>(&self, session: &mut BrowserSession<B>) -> AppResult<()> {
        session.refresh()?;
        let popup = WaitSpec::press_return(Locator::id(sel::SESSION_TIMEOUT_POPUP_ID))
            .with_tier(TimeoutTier::Tiny);
        match session.wait(&popup) {
            Ok(_) => {
                warn!("Timeout Prevented");
                Ok(())
            }
            Err(e) if e.is_probe_miss() => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub fn clock_out<B: Browser>(&mut self, session: &mut BrowserSession<B>) -> AppResult<()> {
        self.login.ensure_on_clock_page(session)?;

        session.wait(&WaitSpec::press_return(Locator::id(sel::PUNCH_MENU_ID)))?;
        session.wait(&WaitSpec::press_return(Locator::id(sel::PUNCH_OUT_ID)))?;
        session.wait(&WaitSpec::locate(status_reads(sel::STATUS_OUT)))?;

        let now = Local::now();
        self.record.record_clock_out(now)?;
        info(format!("Clocked out at {}", format_timestamp(now)));
        Ok(())
    }
}

fn status_reads(text: &str) -> Condition {
    Condition::AttributeContains {
        locator: Locator::id(sel::STATUS_ID),
        attribute: sel::STATUS_ATTRIBUTE.to_string(),
        text: text.to_string(),
    }
}

pub fn progress_percent(elapsed_secs: f64, total_secs: f64) -> f64 {
    if total_secs <= 0.0 {
        return 100.0;
    }
    (elapsed_secs / total_secs * 100.0).clamp(0.0, 100.0)
}
