use crate::adapters::chromium::BrowserOptions;
use crate::config::TomlConfig;
use crate::core::ConfigProvider;
use crate::domain::model::{
    WaitUntil, DEFAULT_OUTPUT_DIR, DEFAULT_OUTPUT_FILE, DEFAULT_SELECTOR, DEFAULT_TARGET_URL,
    DEFAULT_TIMEOUT_SECS,
};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "breed-etl")]
#[command(about = "Scrape dog breed names from a rendered page into a JSON file")]
pub struct CliConfig {
    /// Page to load
    #[arg(long, default_value = DEFAULT_TARGET_URL)]
    pub url: String,

    /// CSS selector whose matches hold the names
    #[arg(long, default_value = DEFAULT_SELECTOR)]
    pub selector: String,

    /// Directory the output file is written to
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_path: String,

    #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
    pub output_file: String,

    /// Navigation milestone: domcontentloaded or load
    #[arg(long, default_value = "domcontentloaded")]
    pub wait_until: WaitUntil,

    /// Bound on navigation and on the selector wait
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// Chrome/Chromium executable, otherwise CHROME_BIN or a PATH lookup
    #[arg(long)]
    pub chrome_bin: Option<PathBuf>,

    /// Pass --no-sandbox to Chrome (needed when running as root in containers)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Read settings from a TOML file instead of the flags above
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log per-phase CPU and memory usage")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_TARGET_URL.to_string(),
            selector: DEFAULT_SELECTOR.to_string(),
            output_path: DEFAULT_OUTPUT_DIR.to_string(),
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            wait_until: WaitUntil::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            headful: false,
            chrome_bin: None,
            no_sandbox: false,
            config: None,
            verbose: false,
            monitor: false,
            json_logs: false,
        }
    }
}

impl CliConfig {
    pub fn browser_options(&self) -> BrowserOptions {
        BrowserOptions {
            headless: !self.headful,
            chrome_binary: self.chrome_bin.clone(),
            request_timeout: Duration::from_secs(self.timeout_secs),
            sandbox: !self.no_sandbox,
        }
    }

    /// Applies the flags that still count alongside `--config`.
    /// Returns the file config and whether monitoring is on.
    pub fn overlay(&self, mut config: TomlConfig) -> (TomlConfig, bool) {
        if self.headful {
            config.browser.headless = Some(false);
        }
        let monitor = self.monitor || config.monitoring_enabled();
        (config, monitor)
    }
}

impl ConfigProvider for CliConfig {
    fn target_url(&self) -> &str {
        &self.url
    }

    fn selector(&self) -> &str {
        &self.selector
    }

    fn wait_until(&self) -> WaitUntil {
        self.wait_until
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_file(&self) -> &str {
        &self.output_file
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("--url", &self.url)?;
        validation::validate_selector("--selector", &self.selector)?;
        validation::validate_path("--output-path", &self.output_path)?;
        validation::validate_file_name("--output-file", &self.output_file)?;
        validation::validate_range("--timeout-secs", self.timeout_secs, 1, 600)?;
        Ok(())
    }
}
