use crate::domain::model::{NameList, WaitUntil};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn target_url(&self) -> &str;
    fn selector(&self) -> &str;
    fn wait_until(&self) -> WaitUntil;
    /// Upper bound for both the navigation milestone and the selector wait.
    fn timeout(&self) -> Duration;
    fn output_path(&self) -> &str;
    fn output_file(&self) -> &str;
}

/// Starts browser processes.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    type Session: BrowserSession;

    async fn launch(&self) -> Result<Self::Session>;
}

/// A running browser owned by a single run. `close` consumes it.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    type Page: BrowserPage;

    async fn new_page(&self) -> Result<Self::Page>;
    async fn close(self) -> Result<()>;
}

#[async_trait]
pub trait BrowserPage: Send + Sync {
    async fn navigate(&self, url: &str, wait_until: WaitUntil, timeout: Duration) -> Result<()>;

    /// Resolves once at least one element matches, fails with `SelectorTimeout` otherwise.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Text content of every match, in document order.
    async fn extract_text(&self, selector: &str) -> Result<Vec<String>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    type Session: BrowserSession;

    async fn launch(&self) -> Result<Self::Session>;
    async fn extract(&self, session: &Self::Session) -> Result<Vec<String>>;
    async fn transform(&self, raw: Vec<String>) -> Result<NameList>;
    async fn load(&self, names: &NameList) -> Result<String>;
}
