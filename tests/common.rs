#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use rautoclock::browser::{Browser, ElementState, Locator};
use rautoclock::core::clock::IdleSettings;
use rautoclock::core::login::Credentials;
use rautoclock::core::notifier::Notifier;
use rautoclock::core::runner::RunSettings;
use rautoclock::core::selectors as sel;
use rautoclock::core::session::BrowserSession;
use rautoclock::core::wait::{RETURN_KEY, Timeouts, Waiter};
use rautoclock::errors::{AppError, AppResult};
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const CLOCK_URL: &str = "https://portal.example/clock";
pub const SSO_URL: &str = "https://sso.example/login";

pub fn rac() -> Command {
    cargo_bin_cmd!("rautoclock")
}

/// Millisecond-scale tiers so timeouts are cheap to hit.
pub fn fast_timeouts() -> Timeouts {
    Timeouts {
        tiny: Duration::from_millis(20),
        short: Duration::from_millis(30),
        medium: Duration::from_millis(300),
        long: Duration::from_millis(400),
        second_factor: Duration::from_millis(100),
        poll_interval: Duration::from_millis(2),
    }
}

pub fn fast_idle() -> IdleSettings {
    IdleSettings {
        tick: Duration::from_millis(1),
        keepalive_every: Duration::from_millis(10),
        progress_every: Duration::from_millis(5),
    }
}

pub fn settings(cancel: Arc<AtomicBool>) -> RunSettings {
    RunSettings {
        target_url: CLOCK_URL.to_string(),
        timeouts: fast_timeouts(),
        idle: fast_idle(),
        cancel,
    }
}

pub fn credentials() -> Credentials {
    Credentials {
        username: "gburdell3".to_string(),
        password: "hunter2".to_string(),
    }
}

pub fn session(portal: FakePortal) -> BrowserSession<FakePortal> {
    BrowserSession::new(portal, Waiter::new(fast_timeouts()), CLOCK_URL)
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub calls: RefCell<Vec<(String, Option<String>)>>,
}

impl RecordingNotifier {
    pub fn count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, payload: Option<&str>) {
        self.calls
            .borrow_mut()
            .push((message.to_string(), payload.map(str::to_string)));
    }
}

/// How the simulated portal behaves.
#[derive(Debug, Clone, Copy)]
pub struct PortalScript {
    /// Second-factor frame lookups before the push counts as approved; None = never.
    pub second_factor_polls: Option<u32>,
    pub double_clock_popup: bool,
    /// The double-clock dialog closes on OK without offering Back.
    pub double_clock_without_back: bool,
    pub session_timeout_popup: bool,
    pub broken_refresh: bool,
}

impl Default for PortalScript {
    fn default() -> Self {
        Self {
            second_factor_polls: Some(2),
            double_clock_popup: false,
            double_clock_without_back: false,
            session_timeout_popup: false,
            broken_refresh: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Stage {
    Blank,
    IdpChooser,
    Credentials,
    SecondFactor { lookups: u32 },
    Trust,
    ClockBlank,
    ClockPage,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Dialog {
    Ok,
    Back,
}

/// Interactions the portal saw, shared with the test after the browser moved away.
#[derive(Clone, Default)]
pub struct PortalLog {
    events: Arc<Mutex<Vec<String>>>,
    quits: Arc<AtomicUsize>,
}

impl PortalLog {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn count(&self, event: &str) -> usize {
        self.events().iter().filter(|e| e.as_str() == event).count()
    }

    pub fn contains(&self, event: &str) -> bool {
        self.count(event) > 0
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }

    pub fn quits(&self) -> usize {
        self.quits.load(Ordering::SeqCst)
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn keys_event(id: &str) -> String {
    format!("return id={id}")
}

pub fn click_event(locator: &Locator) -> String {
    format!("click {locator}")
}

/// Scripted stand-in for the OneUSG portal and its SSO pages.
pub struct FakePortal {
    script: PortalScript,
    url: String,
    stage: Stage,
    authenticated: bool,
    menu_open: bool,
    dialog: Option<Dialog>,
    timeout_popup: bool,
    status: String,
    log: PortalLog,
}

impl FakePortal {
    pub fn new(script: PortalScript) -> (Self, PortalLog) {
        let log = PortalLog::default();
        let portal = Self {
            script,
            url: "about:blank".to_string(),
            stage: Stage::Blank,
            authenticated: false,
            menu_open: false,
            dialog: None,
            timeout_popup: false,
            status: "Out".to_string(),
            log: log.clone(),
        };
        (portal, log)
    }

    pub fn stock() -> (Self, PortalLog) {
        Self::new(PortalScript::default())
    }

    fn visible(&mut self, locator: &Locator) -> bool {
        let v = locator.value.as_str();
        match &mut self.stage {
            Stage::IdpChooser => v == sel::IDP_LOGO_XPATH,
            Stage::Credentials => {
                [sel::USERNAME_NAME, sel::PASSWORD_NAME, sel::SUBMIT_NAME].contains(&v)
            }
            Stage::SecondFactor { lookups } => {
                if v != sel::SECOND_FACTOR_ID {
                    return false;
                }
                *lookups += 1;
                let seen = *lookups;
                let approved = self.script.second_factor_polls.is_some_and(|n| seen > n);
                if approved {
                    self.stage = Stage::Trust;
                }
                !approved
            }
            Stage::Trust => v == sel::TRUST_BROWSER_ID,
            Stage::ClockPage => match v {
                sel::PUNCH_MENU_ID | sel::STATUS_ID => true,
                sel::PUNCH_IN_ID | sel::PUNCH_OUT_ID => self.menu_open,
                sel::DOUBLE_CLOCK_OK_ID => self.dialog == Some(Dialog::Ok),
                sel::DOUBLE_CLOCK_BACK_ID => self.dialog == Some(Dialog::Back),
                sel::SESSION_TIMEOUT_POPUP_ID => self.timeout_popup,
                _ => false,
            },
            Stage::Blank | Stage::ClockBlank => false,
        }
    }

    fn require(&mut self, locator: &Locator) -> AppResult<()> {
        if self.visible(locator) {
            Ok(())
        } else {
            Err(AppError::ElementNotFound(locator.to_string()))
        }
    }

    fn open_clock_page(&mut self) {
        self.stage = Stage::ClockPage;
        self.menu_open = false;
        self.dialog = None;
    }

    fn activate(&mut self, locator: &Locator) {
        match locator.value.as_str() {
            sel::IDP_LOGO_XPATH => self.stage = Stage::Credentials,
            sel::SUBMIT_NAME => self.stage = Stage::SecondFactor { lookups: 0 },
            sel::TRUST_BROWSER_ID => {
                self.authenticated = true;
                self.url = CLOCK_URL.to_string();
                self.stage = Stage::ClockBlank;
            }
            sel::PUNCH_MENU_ID => self.menu_open = true,
            sel::PUNCH_IN_ID => {
                self.menu_open = false;
                if self.script.double_clock_popup {
                    self.dialog = Some(Dialog::Ok);
                }
                self.status = "In".to_string();
            }
            sel::PUNCH_OUT_ID => {
                self.menu_open = false;
                self.status = "Out".to_string();
            }
            sel::DOUBLE_CLOCK_OK_ID => {
                self.dialog = (!self.script.double_clock_without_back).then_some(Dialog::Back)
            }
            sel::DOUBLE_CLOCK_BACK_ID => self.dialog = None,
            sel::SESSION_TIMEOUT_POPUP_ID => self.timeout_popup = false,
            _ => {}
        }
    }
}

impl Browser for FakePortal {
    fn goto(&mut self, url: &str) -> AppResult<()> {
        self.log.push(format!("goto {url}"));
        if url == CLOCK_URL {
            if self.authenticated {
                self.url = CLOCK_URL.to_string();
                self.open_clock_page();
            } else {
                self.url = SSO_URL.to_string();
                self.stage = Stage::IdpChooser;
            }
        } else {
            self.url = url.to_string();
            self.stage = Stage::Blank;
        }
        Ok(())
    }

    fn current_url(&mut self) -> AppResult<String> {
        Ok(self.url.clone())
    }

    fn refresh(&mut self) -> AppResult<()> {
        self.log.push("refresh".to_string());
        if self.script.broken_refresh && self.stage == Stage::ClockPage {
            return Err(AppError::Browser("connection reset by peer".to_string()));
        }
        if matches!(self.stage, Stage::ClockBlank | Stage::ClockPage) {
            self.open_clock_page();
            self.timeout_popup = self.script.session_timeout_popup;
        }
        Ok(())
    }

    fn find(&mut self, locator: &Locator) -> AppResult<Option<ElementState>> {
        Ok(self.visible(locator).then_some(ElementState {
            displayed: true,
            enabled: true,
        }))
    }

    fn attribute(&mut self, locator: &Locator, name: &str) -> AppResult<Option<String>> {
        if locator.value == sel::STATUS_ID && name == sel::STATUS_ATTRIBUTE && self.visible(locator) {
            return Ok(Some(format!("<span>{}</span>", self.status)));
        }
        Ok(None)
    }

    fn click(&mut self, locator: &Locator) -> AppResult<()> {
        self.require(locator)?;
        self.log.push(click_event(locator));
        self.activate(locator);
        Ok(())
    }

    fn send_keys(&mut self, locator: &Locator, keys: &str) -> AppResult<()> {
        self.require(locator)?;
        if keys == RETURN_KEY {
            self.log.push(format!("return {locator}"));
            self.activate(locator);
        } else {
            self.log.push(format!("type {locator} {keys}"));
        }
        Ok(())
    }

    fn quit(&mut self) -> AppResult<()> {
        self.log.push("quit".to_string());
        self.log.quits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
