//! Browser-automation capability.
//!
//! The controllers only talk to the [`Browser`] trait; the real backend is
//! [`webdriver::WebDriverBrowser`], tests plug in a scripted fake.

pub mod webdriver;

use crate::errors::AppResult;
use std::fmt;

/// Element lookup strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum By {
    Id,
    Name,
    XPath,
    Css,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    pub by: By,
    pub value: String,
}

impl Locator {
    pub fn id(value: impl Into<String>) -> Self {
        Self {
            by: By::Id,
            value: value.into(),
        }
    }

    pub fn name(value: impl Into<String>) -> Self {
        Self {
            by: By::Name,
            value: value.into(),
        }
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self {
            by: By::XPath,
            value: value.into(),
        }
    }

    pub fn css(value: impl Into<String>) -> Self {
        Self {
            by: By::Css,
            value: value.into(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let by = match self.by {
            By::Id => "id",
            By::Name => "name",
            By::XPath => "xpath",
            By::Css => "css",
        };
        write!(f, "{by}={}", self.value)
    }
}

/// Snapshot of an element found on the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementState {
    pub displayed: bool,
    pub enabled: bool,
}

impl ElementState {
    pub fn clickable(&self) -> bool {
        self.displayed && self.enabled
    }
}

/// Minimal set of browser operations the portal flow needs.
///
/// Lookups return `Ok(None)` when the element is absent; `Err` is reserved
/// for real failures (dead driver, lost session, ...).
pub trait Browser {
    fn goto(&mut self, url: &str) -> AppResult<()>;

    fn current_url(&mut self) -> AppResult<String>;

    fn refresh(&mut self) -> AppResult<()>;

    fn find(&mut self, locator: &Locator) -> AppResult<Option<ElementState>>;

    /// Property or attribute value, `None` if the element is absent.
    fn attribute(&mut self, locator: &Locator, name: &str) -> AppResult<Option<String>>;

    fn click(&mut self, locator: &Locator) -> AppResult<()>;

    fn send_keys(&mut self, locator: &Locator, keys: &str) -> AppResult<()>;

    /// Close the session. Calling it twice is a no-op.
    fn quit(&mut self) -> AppResult<()>;
}
