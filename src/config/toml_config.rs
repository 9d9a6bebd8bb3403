use crate::adapters::chromium::BrowserOptions;
use crate::core::ConfigProvider;
use crate::domain::model::{
    WaitUntil, DEFAULT_OUTPUT_DIR, DEFAULT_OUTPUT_FILE, DEFAULT_SELECTOR, DEFAULT_TIMEOUT_SECS,
};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub source: SourceConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub selector: Option<String>,
    pub wait_until: Option<WaitUntil>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrowserConfig {
    pub headless: Option<bool>,
    pub chrome_bin: Option<PathBuf>,
    pub sandbox: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: Option<String>,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static pattern compiles"))
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value. Unset variables are left as written.
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        let url = validation::validate_required_field("source.url", &self.source.url)?;
        validation::validate_url("source.url", url)?;
        validation::validate_selector("extract.selector", self.selector())?;
        validation::validate_range(
            "extract.timeout_seconds",
            self.timeout_seconds(),
            1,
            600,
        )?;
        validation::validate_path("load.output_path", self.output_path())?;
        validation::validate_file_name("load.filename", self.output_file())?;

        if let Some(bin) = &self.browser.chrome_bin {
            validation::validate_path("browser.chrome_bin", &bin.to_string_lossy())?;
        }

        Ok(())
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.extract.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn browser_options(&self) -> BrowserOptions {
        BrowserOptions {
            headless: self.browser.headless.unwrap_or(true),
            chrome_binary: self.browser.chrome_bin.clone(),
            request_timeout: Duration::from_secs(self.timeout_seconds()),
            sandbox: self.browser.sandbox.unwrap_or(true),
        }
    }
}

impl ConfigProvider for TomlConfig {
    fn target_url(&self) -> &str {
        self.source.url.as_deref().unwrap_or_default()
    }

    fn selector(&self) -> &str {
        self.extract.selector.as_deref().unwrap_or(DEFAULT_SELECTOR)
    }

    fn wait_until(&self) -> WaitUntil {
        self.extract.wait_until.unwrap_or_default()
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds())
    }

    fn output_path(&self) -> &str {
        self.load.output_path.as_deref().unwrap_or(DEFAULT_OUTPUT_DIR)
    }

    fn output_file(&self) -> &str {
        self.load.filename.as_deref().unwrap_or(DEFAULT_OUTPUT_FILE)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
