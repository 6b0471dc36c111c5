use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable that points to an alternative configuration file.
pub const CONFIG_ENV: &str = "RAUTOCLOCK_CONFIG";

pub const DEFAULT_LOGIN_URL: &str = "https://selfservice.hprod.onehcm.usg.edu/psc/hprodsssso_newwin/HCMSS/HRMS/c/TL_EMPLOYEE_FL.TL_RPT_TIME_FLU.GBL?EMPDASHBD=Y&tW=1&tH=1&ICDoModeless=1&ICGrouplet=3&bReload=y&nWidth=236&nHeight=163&TL_JOB_CHAR=0";

const PLACEHOLDERS: [&str; 2] = ["USERNAME_HERE", "PASSWORD_HERE"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_login_url")]
    pub login_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_chromedriver")]
    pub chromedriver_path: String,
    #[serde(default = "default_webdriver_port")]
    pub webdriver_port: u16,
    #[serde(default = "default_headless")]
    pub headless: bool,
    /// Failure ping endpoint (including the trailing /fail for healthchecks-style services)
    #[serde(default)]
    pub fail_ping_url: Option<String>,
    #[serde(default = "default_hours")]
    pub default_hours_to_clock: f64,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub idle: IdleConfig,
}

/// Wait tiers, in seconds. Missing fields keep their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub tiny: f64,
    pub short: f64,
    pub medium: f64,
    pub long: f64,
    pub second_factor: f64,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    pub tick_ms: u64,
    pub keepalive_minutes: f64,
    /// How often the hold loop prints its progress line.
    pub progress_minutes: f64,
}

fn default_login_url() -> String {
    DEFAULT_LOGIN_URL.to_string()
}
fn default_chromedriver() -> String {
    "chromedriver".to_string()
}
fn default_webdriver_port() -> u16 {
    9515
}
fn default_headless() -> bool {
    true
}
fn default_hours() -> f64 {
    8.0
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            tiny: 5.0,
            short: 15.0,
            medium: 30.0,
            long: 60.0,
            second_factor: 120.0,
            poll_interval_ms: 500,
        }
    }
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            tick_ms: 600,
            keepalive_minutes: 15.0,
            progress_minutes: 5.0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            login_url: default_login_url(),
            username: String::new(),
            password: String::new(),
            chromedriver_path: default_chromedriver(),
            webdriver_port: default_webdriver_port(),
            headless: default_headless(),
            fail_ping_url: None,
            default_hours_to_clock: default_hours(),
            timeouts: TimeoutConfig::default(),
            idle: IdleConfig::default(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("rautoclock")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".rautoclock")
        }
    }

    /// Return the full path of the config file, honouring RAUTOCLOCK_CONFIG
    pub fn config_file() -> PathBuf {
        match env::var(CONFIG_ENV) {
            Ok(p) if !p.trim().is_empty() => PathBuf::from(p),
            _ => Self::config_dir().join("rautoclock.conf"),
        }
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            Self::from_yaml(&content)
        } else {
            Ok(Config::default())
        }
    }

    pub fn from_yaml(content: &str) -> AppResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Reject configurations that cannot possibly log in, before a browser is started.
    pub fn validate(&self) -> AppResult<()> {
        let path = Self::config_file();

        if self.login_url.trim().is_empty() {
            return Err(AppError::Config(format!(
                "login_url is empty (edit {})",
                path.display()
            )));
        }

        for (field, value) in [("username", &self.username), ("password", &self.password)] {
            if value.trim().is_empty() || PLACEHOLDERS.contains(&value.as_str()) {
                return Err(AppError::Config(format!(
                    "{field} is not set (edit {})",
                    path.display()
                )));
            }
        }

        if !self.default_hours_to_clock.is_finite() || self.default_hours_to_clock < 0.0 {
            return Err(AppError::InvalidHours(self.default_hours_to_clock));
        }

        if self.timeouts.poll_interval_ms == 0 || self.idle.tick_ms == 0 {
            return Err(AppError::Config(
                "poll_interval_ms and tick_ms must be greater than zero".to_string(),
            ));
        }

        let t = &self.timeouts;
        for (field, secs) in [
            ("timeouts.tiny", t.tiny),
            ("timeouts.short", t.short),
            ("timeouts.medium", t.medium),
            ("timeouts.long", t.long),
            ("timeouts.second_factor", t.second_factor),
        ] {
            check_span(field, secs, false)?;
        }

        check_span("idle.keepalive_minutes", self.idle.keepalive_minutes * 60.0, true)?;
        check_span("idle.progress_minutes", self.idle.progress_minutes * 60.0, true)?;

        Ok(())
    }
}

/// A span of seconds must fit in a `Duration`; some must also be non-zero.
fn check_span(field: &str, secs: f64, positive: bool) -> AppResult<()> {
    let in_range = secs.is_finite() && Duration::try_from_secs_f64(secs).is_ok();
    if !in_range || (positive && secs <= 0.0) {
        let bound = if positive { "greater than zero" } else { "zero or more" };
        return Err(AppError::Config(format!(
            "{field} must be a finite number of seconds, {bound} (got {secs})"
        )));
    }
    Ok(())
}
