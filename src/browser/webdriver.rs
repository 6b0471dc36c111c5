//! fantoccini-backed [`Browser`] driving a locally spawned chromedriver.

use crate::browser::{Browser, By, ElementState, Locator};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tracing::{debug, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_RETRY: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct WebDriverSettings {
    pub chromedriver_path: String,
    pub port: u16,
    pub headless: bool,
}

impl From<&Config> for WebDriverSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            chromedriver_path: cfg.chromedriver_path.clone(),
            port: cfg.webdriver_port,
            headless: cfg.headless,
        }
    }
}

/// Chrome session over WebDriver. Every call blocks on a private
/// current-thread runtime, so callers stay synchronous.
pub struct WebDriverBrowser {
    rt: Runtime,
    client: Option<Client>,
    driver: Option<Child>,
}

impl WebDriverBrowser {
    pub fn launch(settings: &WebDriverSettings) -> AppResult<Self> {
        debug!("Initializing browser");
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let driver = spawn_driver(settings)?;
        let mut browser = Self {
            rt,
            client: None,
            driver: Some(driver),
        };

        let url = format!("http://localhost:{}", settings.port);
        let client = browser.connect(&url, settings.headless)?;
        browser.client = Some(client);
        debug!("Browser initialized");
        Ok(browser)
    }

    fn connect(&mut self, url: &str, headless: bool) -> AppResult<Client> {
        let mut args = vec!["--disable-gpu", "--window-size=1280,1024"];
        if headless {
            args.push("--headless=new");
        }
        let mut caps = serde_json::Map::new();
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));

        let started = Instant::now();
        loop {
            let attempt = self
                .rt
                .block_on(async { ClientBuilder::native().capabilities(caps.clone()).connect(url).await });
            match attempt {
                Ok(client) => return Ok(client),
                Err(e) => {
                    if let Some(child) = self.driver.as_mut()
                        && let Ok(Some(status)) = child.try_wait()
                    {
                        return Err(AppError::DriverLaunch(format!(
                            "driver exited early ({status})"
                        )));
                    }
                    if started.elapsed() >= CONNECT_TIMEOUT {
                        return Err(e.into());
                    }
                    debug!("driver not ready yet: {e}");
                    std::thread::sleep(CONNECT_RETRY);
                }
            }
        }
    }

    fn client(&self) -> AppResult<Client> {
        self.client
            .clone()
            .ok_or_else(|| AppError::Browser("browser session already closed".to_string()))
    }

    fn element(&self, locator: &Locator) -> AppResult<Option<Element>> {
        let client = self.client()?;
        let found = self.rt.block_on(locate(&client, locator));
        match found {
            Ok(el) => Ok(Some(el)),
            Err(e) if is_absent(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn required(&self, locator: &Locator) -> AppResult<Element> {
        self.element(locator)?
            .ok_or_else(|| AppError::ElementNotFound(locator.to_string()))
    }
}

impl Browser for WebDriverBrowser {
    fn goto(&mut self, url: &str) -> AppResult<()> {
        let client = self.client()?;
        self.rt.block_on(client.goto(url))?;
        Ok(())
    }

    fn current_url(&mut self) -> AppResult<String> {
        let client = self.client()?;
        let url = self.rt.block_on(client.current_url())?;
        Ok(url.to_string())
    }

    fn refresh(&mut self) -> AppResult<()> {
        let client = self.client()?;
        self.rt.block_on(client.refresh())?;
        Ok(())
    }

    fn find(&mut self, locator: &Locator) -> AppResult<Option<ElementState>> {
        let Some(el) = self.element(locator)? else {
            return Ok(None);
        };
        let state = self.rt.block_on(async {
            let displayed = el.is_displayed().await?;
            let enabled = el.is_enabled().await?;
            Ok::<_, CmdError>(ElementState { displayed, enabled })
        });
        match state {
            Ok(s) => Ok(Some(s)),
            Err(e) if is_absent(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn attribute(&mut self, locator: &Locator, name: &str) -> AppResult<Option<String>> {
        let Some(el) = self.element(locator)? else {
            return Ok(None);
        };
        // innerHTML and friends are DOM properties, not attributes
        let value = self.rt.block_on(async {
            match el.prop(name).await? {
                Some(v) => Ok(Some(v)),
                None => el.attr(name).await,
            }
        });
        match value {
            Ok(v) => Ok(v),
            Err(e) if is_absent(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn click(&mut self, locator: &Locator) -> AppResult<()> {
        let el = self.required(locator)?;
        self.rt.block_on(el.click())?;
        Ok(())
    }

    fn send_keys(&mut self, locator: &Locator, keys: &str) -> AppResult<()> {
        let el = self.required(locator)?;
        self.rt.block_on(el.send_keys(keys))?;
        Ok(())
    }

    fn quit(&mut self) -> AppResult<()> {
        let closed = match self.client.take() {
            Some(client) => {
                debug!("Closing browser");
                self.rt.block_on(client.close()).map_err(AppError::from)
            }
            None => Ok(()),
        };
        if let Some(mut child) = self.driver.take() {
            if let Err(e) = child.kill() {
                warn!("failed to stop chromedriver: {e}");
            }
            let _ = child.wait();
        }
        closed
    }
}

impl Drop for WebDriverBrowser {
    fn drop(&mut self) {
        if let Err(e) = self.quit() {
            warn!("browser shutdown failed: {e}");
        }
    }
}

fn spawn_driver(settings: &WebDriverSettings) -> AppResult<Child> {
    debug!(
        "starting {} on port {}",
        settings.chromedriver_path, settings.port
    );
    let mut cmd = Command::new(&settings.chromedriver_path);
    cmd.arg(format!("--port={}", settings.port))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    // keep Ctrl-C away from the driver so clock-out can still run
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    cmd.spawn().map_err(|e| {
        AppError::DriverLaunch(format!("{}: {e}", settings.chromedriver_path))
    })
}

async fn locate(client: &Client, locator: &Locator) -> Result<Element, CmdError> {
    let css;
    let wd = match locator.by {
        By::Id => fantoccini::Locator::Id(&locator.value),
        By::XPath => fantoccini::Locator::XPath(&locator.value),
        By::Css => fantoccini::Locator::Css(&locator.value),
        By::Name => {
            css = format!("[name=\"{}\"]", locator.value);
            fantoccini::Locator::Css(&css)
        }
    };
    client.find(wd).await
}

/// Missing and stale elements both mean "not on the page right now".
fn is_absent(e: &CmdError) -> bool {
    e.is_no_such_element() || e.is_stale_element_reference()
}
