use crate::core::{
    BrowserDriver, BrowserPage, BrowserSession, ConfigProvider, NameList, Pipeline, Storage,
};
use crate::utils::error::Result;
use std::path::Path;

/// Scrapes the configured selector's text from a rendered page and writes it as JSON.
pub struct ScrapePipeline<D: BrowserDriver, S: Storage, C: ConfigProvider> {
    driver: D,
    storage: S,
    config: C,
}

impl<D: BrowserDriver, S: Storage, C: ConfigProvider> ScrapePipeline<D, S, C> {
    pub fn new(driver: D, storage: S, config: C) -> Self {
        Self {
            driver,
            storage,
            config,
        }
    }
}

#[async_trait::async_trait]
impl<D, S, C> Pipeline for ScrapePipeline<D, S, C>
where
    D: BrowserDriver,
    S: Storage,
    C: ConfigProvider,
{
    type Session = D::Session;

    async fn launch(&self) -> Result<D::Session> {
        self.driver.launch().await
    }

    async fn extract(&self, session: &D::Session) -> Result<Vec<String>> {
        let url = self.config.target_url();
        let selector = self.config.selector();
        let timeout = self.config.timeout();

        let page = session.new_page().await?;

        tracing::debug!(
            "Navigating to {} (wait until {})",
            url,
            self.config.wait_until()
        );
        page.navigate(url, self.config.wait_until(), timeout).await?;

        tracing::debug!("Waiting for selector {}", selector);
        page.wait_for_selector(selector, timeout).await?;
        tracing::info!("Fetching.....");

        let raw = page.extract_text(selector).await?;
        tracing::debug!("Selector {} matched {} elements", selector, raw.len());
        Ok(raw)
    }

    async fn transform(&self, raw: Vec<String>) -> Result<NameList> {
        let names = NameList::from_raw(raw);
        if names.is_empty() {
            tracing::warn!("No names to write for selector {}", self.config.selector());
        }
        Ok(names)
    }

    async fn load(&self, names: &NameList) -> Result<String> {
        let json = names.to_pretty_json()?;
        let file_name = self.config.output_file();

        tracing::debug!("Writing {} names ({} bytes)", names.len(), json.len());
        self.storage.write_file(file_name, json.as_bytes()).await?;

        Ok(Path::new(self.config.output_path())
            .join(file_name)
            .display()
            .to_string())
    }
}
