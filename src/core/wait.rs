//! Waited-action primitive: block until a page condition holds (or stops
//! holding), then optionally act on the element it resolved.

use crate::browser::{Browser, Locator};
use crate::config::TimeoutConfig;
use crate::errors::{AppError, AppResult};
use crate::utils::formatting::mask;
use crate::utils::time::secs_f64;
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// WebDriver key code for Enter/Return.
pub const RETURN_KEY: &str = "\u{E007}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutTier {
    Tiny,
    Short,
    Medium,
    Long,
    SecondFactor,
}

impl TimeoutTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeoutTier::Tiny => "tiny",
            TimeoutTier::Short => "short",
            TimeoutTier::Medium => "medium",
            TimeoutTier::Long => "long",
            TimeoutTier::SecondFactor => "second-factor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeouts {
    pub tiny: Duration,
    pub short: Duration,
    pub medium: Duration,
    pub long: Duration,
    pub second_factor: Duration,
    pub poll_interval: Duration,
}

impl Timeouts {
    pub fn duration(&self, tier: TimeoutTier) -> Duration {
        match tier {
            TimeoutTier::Tiny => self.tiny,
            TimeoutTier::Short => self.short,
            TimeoutTier::Medium => self.medium,
            TimeoutTier::Long => self.long,
            TimeoutTier::SecondFactor => self.second_factor,
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::from(&TimeoutConfig::default())
    }
}

impl From<&TimeoutConfig> for Timeouts {
    fn from(cfg: &TimeoutConfig) -> Self {
        Self {
            tiny: secs_f64(cfg.tiny),
            short: secs_f64(cfg.short),
            medium: secs_f64(cfg.medium),
            long: secs_f64(cfg.long),
            second_factor: secs_f64(cfg.second_factor),
            poll_interval: Duration::from_millis(cfg.poll_interval_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Present(Locator),
    Clickable(Locator),
    UrlIs(String),
    AttributeContains {
        locator: Locator,
        attribute: String,
        text: String,
    },
}

impl Condition {
    /// Element the condition resolves to, if any.
    pub fn locator(&self) -> Option<&Locator> {
        match self {
            Condition::Present(l) | Condition::Clickable(l) => Some(l),
            Condition::AttributeContains { locator, .. } => Some(locator),
            Condition::UrlIs(_) => None,
        }
    }

    pub fn holds<B: Browser + ?Sized>(&self, browser: &mut B) -> AppResult<bool> {
        match self {
            Condition::Present(l) => Ok(browser.find(l)?.is_some()),
            Condition::Clickable(l) => Ok(browser.find(l)?.is_some_and(|s| s.clickable())),
            Condition::UrlIs(url) => Ok(browser.current_url()? == *url),
            Condition::AttributeContains {
                locator,
                attribute,
                text,
            } => Ok(browser
                .attribute(locator, attribute)?
                .is_some_and(|v| v.contains(text.as_str()))),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Present(l) => write!(f, "{l} is present"),
            Condition::Clickable(l) => write!(f, "{l} is clickable"),
            Condition::UrlIs(url) => write!(f, "url is {url}"),
            Condition::AttributeContains {
                locator,
                attribute,
                text,
            } => write!(f, "{locator}[{attribute}] contains {text:?}"),
        }
    }
}

/// Text sent to an element.
#[derive(Clone, PartialEq, Eq)]
pub enum TypedInput {
    Text(String),
    /// Never printed in clear.
    Secret(String),
    Return,
}

impl TypedInput {
    pub fn keys(&self) -> &str {
        match self {
            TypedInput::Text(s) | TypedInput::Secret(s) => s,
            TypedInput::Return => RETURN_KEY,
        }
    }
}

impl fmt::Display for TypedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedInput::Text(s) => f.write_str(s),
            TypedInput::Secret(s) => f.write_str(&mask(s)),
            TypedInput::Return => f.write_str("<RETURN>"),
        }
    }
}

impl fmt::Debug for TypedInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypedInput({self})")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitRequest {
    LocateOnly(Condition),
    LocateAndClick(Condition),
    LocateAndType(Condition, TypedInput),
    WaitForAbsence(Condition),
}

impl WaitRequest {
    pub fn condition(&self) -> &Condition {
        match self {
            WaitRequest::LocateOnly(c)
            | WaitRequest::LocateAndClick(c)
            | WaitRequest::LocateAndType(c, _)
            | WaitRequest::WaitForAbsence(c) => c,
        }
    }
}

/// One waited-action invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitSpec {
    pub request: WaitRequest,
    pub tier: TimeoutTier,
}

impl WaitSpec {
    pub fn locate(condition: Condition) -> Self {
        Self::medium(WaitRequest::LocateOnly(condition))
    }

    /// Wait for the element to become clickable, then click it.
    pub fn click(locator: Locator) -> Self {
        Self::medium(WaitRequest::LocateAndClick(Condition::Clickable(locator)))
    }

    /// Wait for the element to become clickable, then type into it.
    pub fn type_into(locator: Locator, input: TypedInput) -> Self {
        Self::medium(WaitRequest::LocateAndType(
            Condition::Clickable(locator),
            input,
        ))
    }

    /// Clickable element, then RETURN (PeopleSoft buttons ignore plain clicks when headless).
    pub fn press_return(locator: Locator) -> Self {
        Self::type_into(locator, TypedInput::Return)
    }

    pub fn absence(condition: Condition) -> Self {
        Self::medium(WaitRequest::WaitForAbsence(condition))
    }

    pub fn with_tier(mut self, tier: TimeoutTier) -> Self {
        self.tier = tier;
        self
    }

    fn medium(request: WaitRequest) -> Self {
        Self {
            request,
            tier: TimeoutTier::Medium,
        }
    }

    pub fn describe(&self) -> String {
        match &self.request {
            WaitRequest::WaitForAbsence(c) => format!("not ({c})"),
            other => other.condition().to_string(),
        }
    }
}

/// Outcome of a successful wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Waited {
    pub element: Option<Locator>,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct Waiter {
    timeouts: Timeouts,
}

impl Waiter {
    pub fn new(timeouts: Timeouts) -> Self {
        Self { timeouts }
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    pub fn wait<B: Browser + ?Sized>(&self, browser: &mut B, spec: &WaitSpec) -> AppResult<Waited> {
        self.poll(browser, spec, None)
    }

    /// Like [`Waiter::wait`], calling `on_progress` with the time spent so far
    /// roughly every `every` while the condition does not hold yet.
    pub fn wait_reporting<B: Browser + ?Sized>(
        &self,
        browser: &mut B,
        spec: &WaitSpec,
        every: Duration,
        mut on_progress: impl FnMut(Duration),
    ) -> AppResult<Waited> {
        let on_progress: &mut dyn FnMut(Duration) = &mut on_progress;
        self.poll(browser, spec, Some((every, on_progress)))
    }

    fn poll<B: Browser + ?Sized>(
        &self,
        browser: &mut B,
        spec: &WaitSpec,
        mut report: Option<(Duration, &mut dyn FnMut(Duration))>,
    ) -> AppResult<Waited> {
        let timeout = self.timeouts.duration(spec.tier);
        let absence = matches!(spec.request, WaitRequest::WaitForAbsence(_));
        let condition = spec.request.condition();
        let element = condition.locator().cloned();

        // validate before polling, a bad request should not cost a timeout
        if matches!(
            spec.request,
            WaitRequest::LocateAndClick(_) | WaitRequest::LocateAndType(..)
        ) && element.is_none()
        {
            return Err(AppError::InvalidWait(format!(
                "cannot act on '{condition}', it does not resolve to an element"
            )));
        }

        debug!(
            "waiting until {} ({} timeout, {:?})",
            spec.describe(),
            spec.tier.as_str(),
            timeout
        );
        let started = Instant::now();
        let mut next_report = report.as_ref().map_or(Duration::MAX, |(every, _)| *every);
        loop {
            if condition.holds(browser)? != absence {
                break;
            }
            let elapsed = started.elapsed();
            if let Some((every, on_progress)) = report.as_mut()
                && elapsed >= next_report
            {
                (*on_progress)(elapsed);
                next_report = elapsed.saturating_add(*every);
            }
            if elapsed >= timeout {
                return Err(AppError::WaitTimeout {
                    description: spec.describe(),
                    elapsed,
                });
            }
            thread::sleep(self.timeouts.poll_interval.min(timeout - elapsed));
        }

        match (&spec.request, element.as_ref()) {
            (WaitRequest::LocateAndClick(_), Some(l)) => {
                debug!("clicking {l}");
                browser.click(l)?;
            }
            (WaitRequest::LocateAndType(_, input), Some(l)) => {
                debug!("sending keys {input} to {l}");
                browser.send_keys(l, input.keys())?;
            }
            _ => debug!("returning {} without acting", spec.describe()),
        }

        Ok(Waited {
            element,
            elapsed: started.elapsed(),
        })
    }
}
