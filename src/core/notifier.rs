//! Best-effort failure ping.

use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{debug, warn};

pub const PING_TIMEOUT: Duration = Duration::from_secs(10);

pub trait Notifier {
    /// Fire and forget; implementations never fail.
    fn notify(&self, message: &str, payload: Option<&str>);
}

/// GETs the configured endpoint, with the payload as request body.
pub struct HttpNotifier {
    url: Option<String>,
    client: Option<Client>,
}

impl HttpNotifier {
    pub fn new(url: Option<String>) -> Self {
        let url = url.filter(|u| !u.trim().is_empty());
        let client = match Client::builder().timeout(PING_TIMEOUT).build() {
            Ok(c) => Some(c),
            Err(e) => {
                warn!("cannot build ping client: {e}");
                None
            }
        };
        Self { url, client }
    }
}

impl Notifier for HttpNotifier {
    fn notify(&self, message: &str, payload: Option<&str>) {
        let (Some(url), Some(client)) = (self.url.as_deref(), self.client.as_ref()) else {
            debug!("{message} (no ping url configured)");
            return;
        };

        let mut request = client.get(url);
        if let Some(body) = payload {
            request = request.body(body.to_string());
        }

        match request.send().and_then(|r| r.error_for_status()) {
            Ok(_) => debug!("{message} ping success"),
            Err(e) => warn!("{message} ping failed: {e}"),
        }
    }
}
