//! The one browser session of a run, owned by the orchestrator and lent to
//! the controllers.

use crate::browser::Browser;
use crate::core::wait::{WaitSpec, Waited, Waiter};
use crate::errors::AppResult;
use crate::models::session_state::SessionState;
use std::time::Duration;
use tracing::debug;

pub struct BrowserSession<B: Browser> {
    browser: B,
    waiter: Waiter,
    state: SessionState,
    target_url: String,
    closed: bool,
}

impl<B: Browser> BrowserSession<B> {
    pub fn new(browser: B, waiter: Waiter, target_url: impl Into<String>) -> Self {
        Self {
            browser,
            waiter,
            state: SessionState::Unauthenticated,
            target_url: target_url.into(),
            closed: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn set_state(&mut self, state: SessionState) {
        debug!("session {} -> {}", self.state, state);
        self.state = state;
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn wait(&mut self, spec: &WaitSpec) -> AppResult<Waited> {
        self.waiter.wait(&mut self.browser, spec)
    }

    pub fn wait_reporting(
        &mut self,
        spec: &WaitSpec,
        every: Duration,
        on_progress: impl FnMut(Duration),
    ) -> AppResult<Waited> {
        self.waiter
            .wait_reporting(&mut self.browser, spec, every, on_progress)
    }

    pub fn goto_target(&mut self) -> AppResult<()> {
        debug!("navigating to {}", self.target_url);
        self.browser.goto(&self.target_url)
    }

    pub fn on_target(&mut self) -> AppResult<bool> {
        Ok(self.browser.current_url()? == self.target_url)
    }

    pub fn refresh(&mut self) -> AppResult<()> {
        debug!("refreshing page");
        self.browser.refresh()
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    pub fn browser_mut(&mut self) -> &mut B {
        &mut self.browser
    }

    /// Quit the browser. Later calls are no-ops.
    pub fn terminate(&mut self) -> AppResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.browser.quit()
    }

    /// Consume the session, releasing the browser.
    pub fn close(mut self) -> AppResult<()> {
        self.terminate()
    }
}
