//! rautoclock library root.
//! Exposes the CLI parser, the high-level run() function and the building
//! blocks (browser, controllers, models) used by the integration tests.

pub mod browser;
pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod logging;
pub mod models;
pub mod signals;
pub mod ui;
pub mod utils;

use chrono::Local;
use clap::Parser;
use crate::browser::webdriver::{WebDriverBrowser, WebDriverSettings};
use crate::cli::parser::Cli;
use crate::config::Config;
use crate::core::login::Credentials;
use crate::core::notifier::{HttpNotifier, Notifier};
use crate::core::runner::{RunReport, RunSettings, Runner};
use crate::errors::{AppError, AppResult};
use crate::models::clock_request::ClockRequest;
use crate::utils::time::format_timestamp;

/// Validate inputs, start the browser and hand over to the orchestrator.
pub fn execute<N: Notifier + ?Sized>(cli: &Cli, cfg: &Config, notifier: &N) -> AppResult<RunReport> {
    let hours = cli.hours.unwrap_or(cfg.default_hours_to_clock);
    let request = ClockRequest::new(hours, cli.only_out)?;
    cfg.validate()?;

    let cancel = signals::install()?;
    let credentials = Credentials::from(cfg);
    let browser = WebDriverBrowser::launch(&WebDriverSettings::from(cfg))?;

    Runner::new(
        &request,
        &credentials,
        notifier,
        RunSettings::from_config(cfg, cancel),
    )
    .run(browser)
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();
    logging::init(cli.debug);

    let cfg = Config::load()?;
    let notifier = HttpNotifier::new(cfg.fail_ping_url.clone());

    let result = execute(&cli, &cfg, &notifier);
    if let Err(e) = &result {
        report_failure(e, &notifier);
    }
    result.map(|_| ())
}

/// Ping the failure channel for an error that reached the top level,
/// unless whoever raised it has already done so.
pub fn report_failure<N: Notifier + ?Sized>(err: &AppError, notifier: &N) {
    if err.already_notified() {
        return;
    }
    notifier.notify(
        &format!("Uncaught error at {}", format_timestamp(Local::now())),
        Some(&err.to_string()),
    );
}
