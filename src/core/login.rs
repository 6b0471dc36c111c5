//! Login flow: SSO hand-off, credentials, second-factor wait, trust prompt.

use crate::browser::{Browser, Locator};
use crate::config::Config;
use crate::core::notifier::Notifier;
use crate::core::selectors as sel;
use crate::core::session::BrowserSession;
use crate::core::wait::{Condition, TimeoutTier, TypedInput, WaitSpec};
use crate::errors::{AppError, AppResult};
use crate::models::session_state::SessionState;
use crate::ui::messages::{info, success};
use std::time::Duration;
use tracing::{debug, error};

/// How often the operator is reminded that a push is pending.
const SECOND_FACTOR_PROGRESS_EVERY: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl From<&Config> for Credentials {
    fn from(cfg: &Config) -> Self {
        Self {
            username: cfg.username.clone(),
            password: cfg.password.clone(),
        }
    }
}

pub struct LoginController<'a, N: Notifier + ?Sized> {
    credentials: &'a Credentials,
    notifier: &'a N,
}

impl<'a, N: Notifier + ?Sized> LoginController<'a, N> {
    pub fn new(credentials: &'a Credentials, notifier: &'a N) -> Self {
        Self {
            credentials,
            notifier,
        }
    }

    /// Full login sequence, ending on a freshly reloaded clock page.
    pub fn login<B: Browser>(&self, session: &mut BrowserSession<B>) -> AppResult<()> {
        session.goto_target()?;

        session.wait(&WaitSpec::click(Locator::xpath(sel::IDP_LOGO_XPATH)))?;
        session.wait(&WaitSpec::type_into(
            Locator::name(sel::USERNAME_NAME),
            TypedInput::Text(self.credentials.username.clone()),
        ))?;
        session.wait(&WaitSpec::type_into(
            Locator::name(sel::PASSWORD_NAME),
            TypedInput::Secret(self.credentials.password.clone()),
        ))?;
        session.wait(&WaitSpec::click(Locator::name(sel::SUBMIT_NAME)))?;

        let second_factor = Condition::Present(Locator::id(sel::SECOND_FACTOR_ID));
        session.wait(&WaitSpec::locate(second_factor.clone()))?;
        session.set_state(SessionState::AwaitingSecondFactor);

        info("Waiting for Duo Auth, approve the push on your device");
        let approval = session.wait_reporting(
            &WaitSpec::absence(second_factor).with_tier(TimeoutTier::SecondFactor),
            SECOND_FACTOR_PROGRESS_EVERY,
            |elapsed| {
                info(format!(
                    "Still waiting for Duo Auth ({:.0}s elapsed)",
                    elapsed.as_secs_f64()
                ))
            },
        );
        if let Err(e) = approval {
            session.set_state(SessionState::Failed);
            return Err(self.second_factor_failed(session, e));
        }

        // trust this browser (dont-trust-browser-button for not trusting)
        session.wait(&WaitSpec::click(Locator::id(sel::TRUST_BROWSER_ID)))?;

        let landing = session.target_url().to_string();
        session.wait(&WaitSpec::locate(Condition::UrlIs(landing)))?;

        // the first render after the redirect is blank
        session.refresh()?;

        session.set_state(SessionState::Authenticated);
        success("Authenticated");
        Ok(())
    }

    fn second_factor_failed<B: Browser>(
        &self,
        session: &mut BrowserSession<B>,
        cause: AppError,
    ) -> AppError {
        let AppError::WaitTimeout { elapsed, .. } = cause else {
            return cause;
        };

        let secs = elapsed.as_secs_f64();
        self.notifier.notify(
            &format!("No Duo Auth after waiting for {secs:.0} seconds."),
            Some(&format!("NO DUO AUTH ({secs:.0}s)")),
        );
        if let Err(e) = session.terminate() {
            error!("failed to close browser after second-factor timeout: {e}");
        }
        AppError::SecondFactorTimeout { waited: elapsed }
    }

    /// Log in if needed, otherwise just make sure the clock page is showing.
    pub fn ensure_on_clock_page<B: Browser>(&self, session: &mut BrowserSession<B>) -> AppResult<()> {
        if !session.is_authenticated() {
            debug!("Logging in.");
            return self.login(session);
        }
        if session.on_target()? {
            debug!("Already logged in and on clock page.");
        } else {
            debug!("Already logged in, but not on clock page. Going to clock page.");
            session.goto_target()?;
        }
        Ok(())
    }
}
