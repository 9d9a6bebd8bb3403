//! Chrome/Chromium over the DevTools protocol, via chromiumoxide.

use crate::domain::model::WaitUntil;
use crate::domain::ports::{BrowserDriver, BrowserPage, BrowserSession};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::{
    EventDomContentEventFired, EventLoadEventFired, NavigateParams,
};
use chromiumoxide::Page;
use futures::stream::BoxStream;
use futures::StreamExt;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    /// Explicit executable. When unset, CHROME_BIN / CHROMIUM_BIN and PATH are searched.
    pub chrome_binary: Option<PathBuf>,
    /// Bound on any single DevTools command.
    pub request_timeout: Duration,
    pub sandbox: bool,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_binary: None,
            request_timeout: Duration::from_secs(30),
            sandbox: true,
        }
    }
}

pub struct ChromiumDriver {
    options: BrowserOptions,
}

impl ChromiumDriver {
    pub fn new(options: BrowserOptions) -> Self {
        Self { options }
    }

    fn browser_config(&self, profile_dir: &Path) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(self.options.request_timeout)
            .user_data_dir(profile_dir)
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .arg("--disable-sync");

        if !self.options.headless {
            builder = builder.with_head();
        }

        if !self.options.sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(binary) = resolve_chrome_binary(self.options.chrome_binary.as_ref())? {
            tracing::debug!("Using Chrome binary: {}", binary.display());
            builder = builder.chrome_executable(binary);
        }

        builder
            .build()
            .map_err(|message| EtlError::BrowserLaunchError { message })
    }
}

#[async_trait]
impl BrowserDriver for ChromiumDriver {
    type Session = ChromiumSession;

    async fn launch(&self) -> Result<ChromiumSession> {
        let profile_dir = profile_dir();
        let config = self.browser_config(&profile_dir)?;

        tracing::debug!(
            "Launching browser (headless={}, sandbox={})",
            self.options.headless,
            self.options.sandbox
        );
        let (browser, mut handler) = match Browser::launch(config).await {
            Ok(launched) => launched,
            Err(e) => {
                remove_profile_dir(&profile_dir).await;
                return Err(EtlError::BrowserLaunchError {
                    message: e.to_string(),
                });
            }
        };

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler error: {}", e);
                }
            }
        });

        Ok(ChromiumSession {
            browser,
            handler_task,
            profile_dir,
            exit_timeout: self.options.request_timeout,
        })
    }
}

pub struct ChromiumSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    profile_dir: PathBuf,
    /// How long to wait for the process to exit once asked to close.
    exit_timeout: Duration,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    type Page = ChromiumPage;

    async fn new_page(&self) -> Result<ChromiumPage> {
        let page = self.browser.new_page("about:blank").await?;
        Ok(ChromiumPage { page })
    }

    async fn close(mut self) -> Result<()> {
        tracing::debug!("Closing browser");
        let closed = self.browser.close().await;
        if let Err(e) = &closed {
            tracing::warn!("Close command failed, killing the browser: {}", e);
        }
        if closed.is_err() {
            // The process may still be running.
            self.kill().await;
        }

        let waited = wait_for_exit(self.browser.wait(), self.exit_timeout).await;
        if waited.is_err() {
            self.kill().await;
        }
        self.handler_task.abort();
        remove_profile_dir(&self.profile_dir).await;

        closed?;
        waited
    }
}

impl ChromiumSession {
    async fn kill(&mut self) {
        if let Some(Err(e)) = self.browser.kill().await {
            tracing::debug!("Could not kill browser process: {}", e);
        }
    }
}

/// Bounds the wait for the browser process to exit.
async fn wait_for_exit<F, T>(exit: F, limit: Duration) -> Result<()>
where
    F: std::future::Future<Output = std::io::Result<T>>,
{
    match time::timeout(limit, exit).await {
        Ok(status) => {
            status?;
            Ok(())
        }
        Err(_) => Err(EtlError::BrowserShutdownError {
            message: format!("browser process still running after {}s", limit.as_secs()),
        }),
    }
}

fn profile_dir() -> PathBuf {
    env::temp_dir().join(format!("breed-etl-profile-{}", std::process::id()))
}

async fn remove_profile_dir(dir: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(dir).await {
        tracing::debug!("Could not remove profile dir {}: {}", dir.display(), e);
    }
}

pub struct ChromiumPage {
    page: Page,
}

impl ChromiumPage {
    async fn milestone_stream(&self, wait_until: WaitUntil) -> Result<BoxStream<'static, ()>> {
        let stream = match wait_until {
            WaitUntil::DomContentLoaded => self
                .page
                .event_listener::<EventDomContentEventFired>()
                .await?
                .map(|_| ())
                .boxed(),
            WaitUntil::Load => self
                .page
                .event_listener::<EventLoadEventFired>()
                .await?
                .map(|_| ())
                .boxed(),
        };
        Ok(stream)
    }

    async fn navigate_until(&self, url: &str, milestone: &mut BoxStream<'static, ()>) -> Result<()> {
        let response = self.page.execute(NavigateParams::new(url)).await?;
        if let Some(reason) = response.result.error_text.clone() {
            return Err(EtlError::NavigationError {
                url: url.to_string(),
                reason,
            });
        }

        match milestone.next().await {
            Some(()) => Ok(()),
            None => Err(EtlError::NavigationError {
                url: url.to_string(),
                reason: "page closed before reaching the wait condition".to_string(),
            }),
        }
    }
}

#[async_trait]
impl BrowserPage for ChromiumPage {
    async fn navigate(&self, url: &str, wait_until: WaitUntil, timeout: Duration) -> Result<()> {
        // Subscribe before navigating so the milestone event cannot be missed.
        let mut milestone = self.milestone_stream(wait_until).await?;

        time::timeout(timeout, self.navigate_until(url, &mut milestone))
            .await
            .map_err(|_| EtlError::NavigationTimeout {
                url: url.to_string(),
                timeout_secs: timeout.as_secs(),
            })?
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        let probe = selector_probe_script(selector);
        let deadline = Instant::now() + timeout;

        loop {
            let found: bool = self
                .page
                .evaluate(probe.as_str())
                .await?
                .into_value()
                .map_err(|e| EtlError::ExtractionError {
                    message: format!("unexpected selector probe result: {}", e),
                })?;

            if found {
                return Ok(());
            }

            if Instant::now() >= deadline {
                return Err(EtlError::SelectorTimeout {
                    selector: selector.to_string(),
                    timeout_secs: timeout.as_secs(),
                });
            }

            time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }

    async fn extract_text(&self, selector: &str) -> Result<Vec<String>> {
        self.page
            .evaluate(extraction_script(selector))
            .await?
            .into_value()
            .map_err(|e| EtlError::ExtractionError {
                message: format!("expected an array of strings: {}", e),
            })
    }
}

/// Quotes `selector` as a JavaScript string literal.
fn js_string(selector: &str) -> String {
    serde_json::Value::String(selector.to_string()).to_string()
}

pub fn selector_probe_script(selector: &str) -> String {
    format!("document.querySelector({}) !== null", js_string(selector))
}

pub fn extraction_script(selector: &str) -> String {
    format!(
        "Array.from(document.querySelectorAll({}), el => (el.textContent ?? '').trim())",
        js_string(selector)
    )
}

/// `Ok(None)` leaves executable discovery to chromiumoxide.
fn resolve_chrome_binary(explicit: Option<&PathBuf>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(Some(path.clone()));
        }
        return Err(EtlError::BrowserLaunchError {
            message: format!(
                "Chrome/Chromium binary not found at provided path: {}",
                path.display()
            ),
        });
    }

    for key in ["CHROME_BIN", "CHROMIUM_BIN"] {
        if let Some(candidate) = env::var_os(key).map(PathBuf::from) {
            if candidate.is_file() {
                return Ok(Some(candidate));
            }
            tracing::warn!("{} points at a missing file: {}", key, candidate.display());
        }
    }

    let names = [
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
        "chrome",
    ];

    let on_path = env::var_os("PATH").and_then(|path_var| {
        env::split_paths(&path_var)
            .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
            .find(|candidate| candidate.is_file())
    });

    Ok(on_path.or_else(|| known_locations().into_iter().find(|p| p.is_file())))
}

fn known_locations() -> Vec<PathBuf> {
    let paths: &[&str] = if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ]
    } else if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
        ]
    };

    paths.iter().map(PathBuf::from).collect()
}
