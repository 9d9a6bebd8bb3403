use anyhow::Result;
use async_trait::async_trait;
use breed_etl::core::{BrowserDriver, BrowserPage, BrowserSession, WaitUntil};
use breed_etl::{CliConfig, EtlEngine, EtlError, LocalStorage, ScrapePipeline};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

const SELECTOR: &str = ".breed-type-card__title";

/// How the fake page responds.
#[derive(Clone)]
enum PageBehaviour {
    Renders(Vec<String>),
    Unreachable,
    NeverRenders,
}

/// In-memory browser that records every call and whether the output file
/// existed when the browser was closed.
#[derive(Clone)]
struct FakeBrowser {
    behaviour: PageBehaviour,
    output_file: PathBuf,
    fail_close: bool,
    log: Arc<Mutex<Vec<String>>>,
}

impl FakeBrowser {
    fn new(behaviour: PageBehaviour, output_file: PathBuf) -> Self {
        Self {
            behaviour,
            output_file,
            fail_close: false,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn record(&self, entry: impl Into<String>) {
        self.log.lock().unwrap().push(entry.into());
    }

    fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserDriver for FakeBrowser {
    type Session = FakeBrowser;

    async fn launch(&self) -> breed_etl::Result<FakeBrowser> {
        self.record("launch");
        Ok(self.clone())
    }
}

#[async_trait]
impl BrowserSession for FakeBrowser {
    type Page = FakeBrowser;

    async fn new_page(&self) -> breed_etl::Result<FakeBrowser> {
        self.record("new_page");
        Ok(self.clone())
    }

    async fn close(self) -> breed_etl::Result<()> {
        self.record(format!("close output_exists={}", self.output_file.exists()));
        if self.fail_close {
            return Err(EtlError::BrowserLaunchError {
                message: "browser process already gone".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BrowserPage for FakeBrowser {
    async fn navigate(
        &self,
        url: &str,
        wait_until: WaitUntil,
        _timeout: Duration,
    ) -> breed_etl::Result<()> {
        self.record(format!("navigate {} {}", url, wait_until));
        match self.behaviour {
            PageBehaviour::Unreachable => Err(EtlError::NavigationError {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            }),
            _ => Ok(()),
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> breed_etl::Result<()> {
        self.record(format!("wait {}", selector));
        match &self.behaviour {
            PageBehaviour::Renders(texts) if !texts.is_empty() => Ok(()),
            _ => Err(EtlError::SelectorTimeout {
                selector: selector.to_string(),
                timeout_secs: timeout.as_secs(),
            }),
        }
    }

    async fn extract_text(&self, selector: &str) -> breed_etl::Result<Vec<String>> {
        self.record(format!("extract {}", selector));
        match &self.behaviour {
            PageBehaviour::Renders(texts) => Ok(texts.clone()),
            _ => Ok(Vec::new()),
        }
    }
}

fn config_for(output_dir: &Path) -> CliConfig {
    CliConfig {
        output_path: output_dir.to_string_lossy().to_string(),
        timeout_secs: 1,
        ..CliConfig::default()
    }
}

fn renders(texts: &[&str]) -> PageBehaviour {
    PageBehaviour::Renders(texts.iter().map(|t| t.to_string()).collect())
}

async fn run_with(
    browser: FakeBrowser,
    output_dir: &Path,
) -> breed_etl::Result<breed_etl::RunSummary> {
    let pipeline = ScrapePipeline::new(
        browser,
        LocalStorage::new(output_dir),
        config_for(output_dir),
    );
    EtlEngine::new(pipeline).run().await
}

#[tokio::test]
async fn test_trimmed_names_written_as_pretty_json() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_file = temp_dir.path().join("dog_names.json");
    let browser = FakeBrowser::new(renders(&["  Affenpinscher  ", "Afghan Hound"]), output_file.clone());

    let summary = run_with(browser.clone(), temp_dir.path()).await?;

    assert_eq!(summary.names.as_slice(), &["Affenpinscher", "Afghan Hound"]);
    assert_eq!(PathBuf::from(&summary.output_path), output_file);
    assert_eq!(
        std::fs::read_to_string(&output_file)?,
        "[\n  \"Affenpinscher\",\n  \"Afghan Hound\"\n]"
    );

    assert_eq!(
        browser.calls(),
        vec![
            "launch".to_string(),
            "new_page".to_string(),
            "navigate https://www.akc.org/dog-breeds/ domcontentloaded".to_string(),
            format!("wait {}", SELECTOR),
            format!("extract {}", SELECTOR),
            "close output_exists=true".to_string(),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_every_match_kept_in_document_order() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_file = temp_dir.path().join("dog_names.json");
    let texts = [
        "Airedale Terrier",
        " Akita",
        "Affenpinscher",
        "Akita ",
        "\tAlaskan Malamute\n",
    ];
    let browser = FakeBrowser::new(renders(&texts), output_file.clone());

    run_with(browser, temp_dir.path()).await?;

    let written: Vec<String> = serde_json::from_str(&std::fs::read_to_string(&output_file)?)?;
    assert_eq!(written.len(), texts.len());
    assert_eq!(
        written,
        vec![
            "Airedale Terrier",
            "Akita",
            "Affenpinscher",
            "Akita",
            "Alaskan Malamute"
        ]
    );
    assert!(written.iter().all(|name| name.trim() == name.as_str()));
    Ok(())
}

#[tokio::test]
async fn test_byte_order_marks_trimmed_but_next_line_kept() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_file = temp_dir.path().join("dog_names.json");
    let browser = FakeBrowser::new(
        renders(&["\u{FEFF}Akita\u{FEFF}", "Beagle\u{0085}"]),
        output_file.clone(),
    );

    run_with(browser, temp_dir.path()).await?;

    let written: Vec<String> = serde_json::from_str(&std::fs::read_to_string(&output_file)?)?;
    assert_eq!(written, vec!["Akita".to_string(), "Beagle\u{0085}".to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_repeated_runs_are_byte_identical() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_file = temp_dir.path().join("dog_names.json");
    let browser = FakeBrowser::new(
        renders(&["Affenpinscher", "Afghan Hound", "Airedale Terrier"]),
        output_file.clone(),
    );

    run_with(browser.clone(), temp_dir.path()).await?;
    let first = std::fs::read(&output_file)?;

    run_with(browser, temp_dir.path()).await?;
    let second = std::fs::read(&output_file)?;

    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn test_no_matches_fails_without_writing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_file = temp_dir.path().join("dog_names.json");
    let browser = FakeBrowser::new(renders(&[]), output_file.clone());

    let err = run_with(browser.clone(), temp_dir.path()).await.unwrap_err();

    assert!(matches!(err, EtlError::SelectorTimeout { .. }));
    assert!(!output_file.exists());
    assert!(!browser.calls().iter().any(|c| c.starts_with("extract")));
    assert_eq!(
        browser.calls().last().map(String::as_str),
        Some("close output_exists=false")
    );
    Ok(())
}

#[tokio::test]
async fn test_unreachable_page_leaves_previous_output_untouched() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_file = temp_dir.path().join("dog_names.json");
    std::fs::write(&output_file, "[\n  \"Beagle\"\n]")?;
    let browser = FakeBrowser::new(PageBehaviour::Unreachable, output_file.clone());

    let err = run_with(browser.clone(), temp_dir.path()).await.unwrap_err();

    assert!(matches!(err, EtlError::NavigationError { .. }));
    assert_ne!(err.severity().exit_code(), 0);
    assert_eq!(std::fs::read_to_string(&output_file)?, "[\n  \"Beagle\"\n]");
    assert!(!browser.calls().iter().any(|c| c.starts_with("wait")));
    assert!(browser.calls().iter().any(|c| c.starts_with("close")));
    Ok(())
}

#[tokio::test]
async fn test_unreachable_page_creates_no_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_file = temp_dir.path().join("dog_names.json");
    let browser = FakeBrowser::new(PageBehaviour::Unreachable, output_file.clone());

    assert!(run_with(browser, temp_dir.path()).await.is_err());
    assert!(!output_file.exists());
    Ok(())
}

#[tokio::test]
async fn test_selector_that_never_renders_closes_browser() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_file = temp_dir.path().join("dog_names.json");
    let browser = FakeBrowser::new(PageBehaviour::NeverRenders, output_file.clone());

    let err = run_with(browser.clone(), temp_dir.path()).await.unwrap_err();

    assert!(matches!(err, EtlError::SelectorTimeout { .. }));
    assert!(!output_file.exists());
    assert_eq!(
        browser.calls().last().map(String::as_str),
        Some("close output_exists=false")
    );
    Ok(())
}

#[tokio::test]
async fn test_write_failure_still_closes_browser() -> Result<()> {
    let temp_dir = TempDir::new()?;
    // A regular file where the output directory should be.
    let blocker = temp_dir.path().join("not-a-dir");
    std::fs::write(&blocker, "")?;
    let browser = FakeBrowser::new(renders(&["Affenpinscher"]), blocker.join("dog_names.json"));

    let err = run_with(browser.clone(), &blocker).await.unwrap_err();

    assert!(matches!(err, EtlError::IoError(_)));
    assert!(browser.calls().iter().any(|c| c.starts_with("close")));
    Ok(())
}

#[tokio::test]
async fn test_close_failure_after_success_is_reported() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_file = temp_dir.path().join("dog_names.json");
    let mut browser = FakeBrowser::new(renders(&["Affenpinscher"]), output_file.clone());
    browser.fail_close = true;

    let result = run_with(browser, temp_dir.path()).await;

    assert!(result.is_err());
    assert!(output_file.exists());
    Ok(())
}

#[tokio::test]
async fn test_phase_error_wins_over_close_error() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_file = temp_dir.path().join("dog_names.json");
    let mut browser = FakeBrowser::new(PageBehaviour::Unreachable, output_file);
    browser.fail_close = true;

    let err = run_with(browser, temp_dir.path()).await.unwrap_err();

    assert!(matches!(err, EtlError::NavigationError { .. }));
    Ok(())
}
