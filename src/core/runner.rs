//! Orchestrates one run: login, clock-in, hold, and the mandatory clock-out.

use crate::browser::Browser;
use crate::config::Config;
use crate::core::clock::{ClockController, IdleOutcome, IdleSettings};
use crate::core::login::{Credentials, LoginController};
use crate::core::notifier::Notifier;
use crate::core::session::BrowserSession;
use crate::core::wait::{Timeouts, Waiter};
use crate::errors::AppResult;
use crate::models::clock_request::ClockRequest;
use crate::models::punch::PunchRecord;
use crate::models::summary::ClockSummary;
use crate::ui::messages::{error, info, success, warning};
use crate::utils::time::format_timestamp;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub target_url: String,
    pub timeouts: Timeouts,
    pub idle: IdleSettings,
    pub cancel: Arc<AtomicBool>,
}

impl RunSettings {
    pub fn from_config(cfg: &Config, cancel: Arc<AtomicBool>) -> Self {
        Self {
            target_url: cfg.login_url.clone(),
            timeouts: Timeouts::from(&cfg.timeouts),
            idle: IdleSettings::from(&cfg.idle),
            cancel,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub record: PunchRecord,
    pub idle: Option<IdleOutcome>,
    pub summary: Option<ClockSummary>,
}

pub struct Runner<'a, N: Notifier + ?Sized> {
    request: &'a ClockRequest,
    credentials: &'a Credentials,
    notifier: &'a N,
    settings: RunSettings,
}

impl<'a, N: Notifier + ?Sized> Runner<'a, N> {
    pub fn new(
        request: &'a ClockRequest,
        credentials: &'a Credentials,
        notifier: &'a N,
        settings: RunSettings,
    ) -> Self {
        Self {
            request,
            credentials,
            notifier,
            settings,
        }
    }

    /// Take ownership of `browser` for the whole run; it is quit on every exit path.
    pub fn run<B: Browser>(&self, browser: B) -> AppResult<RunReport> {
        let mut session = BrowserSession::new(
            browser,
            Waiter::new(self.settings.timeouts.clone()),
            self.settings.target_url.clone(),
        );

        let outcome = self.run_session(&mut session);
        if let Err(e) = session.close() {
            warn!("browser did not close cleanly: {e}");
        }
        outcome
    }

    fn run_session<B: Browser>(&self, session: &mut BrowserSession<B>) -> AppResult<RunReport> {
        let req = self.request;
        if !req.only_out() {
            info(format!(
                "Clocking {}hrs / {:.0}mins (clock in at {}, out at {})",
                req.hours_to_clock(),
                req.hours_to_clock() * 60.0,
                format_timestamp(req.start_time()),
                format_timestamp(req.end_time())
            ));
        }

        let login = LoginController::new(self.credentials, self.notifier);
        login.ensure_on_clock_page(session)?;
        debug!("Logged in");

        let mut clock = ClockController::new(&login, self.settings.idle, self.settings.cancel.clone());

        let work = self.work(&mut clock, session);
        if let Err(e) = &work {
            error(format!("{e}, clocking out anyway"));
        }

        // clock-out runs no matter how the work phase ended
        clock.clock_out(session)?;
        let idle = work?;

        let record = clock.into_record();
        let summary = ClockSummary::from_record(req, &record);
        if let Some(s) = &summary {
            success(s);
        }

        Ok(RunReport {
            record,
            idle,
            summary,
        })
    }

    fn work<B: Browser>(
        &self,
        clock: &mut ClockController<'_, N>,
        session: &mut BrowserSession<B>,
    ) -> AppResult<Option<IdleOutcome>> {
        if self.request.only_out() {
            warning("Only clocking out");
            clock.skip_clock_in()?;
            return Ok(None);
        }

        clock.clock_in(session)?;
        let outcome = clock.idle(session, self.request.seconds_to_clock())?;
        debug!("Idle complete ({outcome:?})");
        Ok(Some(outcome))
    }
}
