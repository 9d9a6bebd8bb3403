use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Browser launch failed: {message}")]
    BrowserLaunchError { message: String },

    #[error("Browser shutdown failed: {message}")]
    BrowserShutdownError { message: String },

    #[error("Browser error: {0}")]
    BrowserError(#[from] chromiumoxide::error::CdpError),

    #[error("Navigation to {url} failed: {reason}")]
    NavigationError { url: String, reason: String },

    #[error("Navigation to {url} timed out after {timeout_secs}s")]
    NavigationTimeout { url: String, timeout_secs: u64 },

    #[error("Selector '{selector}' did not appear within {timeout_secs}s")]
    SelectorTimeout { selector: String, timeout_secs: u64 },

    #[error("Text extraction failed: {message}")]
    ExtractionError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Browser,
    Network,
    Extraction,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Transient, worth running again.
    Medium,
    /// The page did not yield what was expected.
    High,
    /// Environment or setup problem.
    Critical,
}

impl ErrorSeverity {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::BrowserLaunchError { .. }
            | EtlError::BrowserShutdownError { .. }
            | EtlError::BrowserError(_) => ErrorCategory::Browser,
            EtlError::NavigationError { .. } | EtlError::NavigationTimeout { .. } => {
                ErrorCategory::Network
            }
            EtlError::SelectorTimeout { .. } | EtlError::ExtractionError { .. } => {
                ErrorCategory::Extraction
            }
            EtlError::IoError(_) | EtlError::SerializationError(_) => ErrorCategory::Storage,
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::NavigationError { .. }
            | EtlError::NavigationTimeout { .. }
            | EtlError::BrowserError(_) => ErrorSeverity::Medium,
            EtlError::SelectorTimeout { .. }
            | EtlError::ExtractionError { .. }
            | EtlError::SerializationError(_) => ErrorSeverity::High,
            EtlError::BrowserLaunchError { .. }
            | EtlError::BrowserShutdownError { .. }
            | EtlError::IoError(_)
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::BrowserLaunchError { .. } => {
                "Install Chrome or Chromium, or point --chrome-bin / CHROME_BIN at the executable"
            }
            EtlError::BrowserShutdownError { .. } => {
                "The browser was killed; check for leftover Chrome processes"
            }
            EtlError::BrowserError(_) => "Check that the browser is still running and retry",
            EtlError::NavigationError { .. } => {
                "Check network connectivity and that the URL is reachable"
            }
            EtlError::NavigationTimeout { .. } => {
                "The page is slow to load; retry or raise --timeout-secs"
            }
            EtlError::SelectorTimeout { .. } => {
                "The page markup may have changed; verify the selector against the live page"
            }
            EtlError::ExtractionError { .. } => "Verify the selector matches text-bearing elements",
            EtlError::IoError(_) => "Check that the output directory exists and is writable",
            EtlError::SerializationError(_) => "Report this as a bug",
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => {
                "Fix the configuration value and run again"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Browser => format!("Could not drive the browser: {}", self),
            ErrorCategory::Network => format!("Could not load the page: {}", self),
            ErrorCategory::Extraction => format!("Could not extract names: {}", self),
            ErrorCategory::Storage => format!("Could not write the output: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
