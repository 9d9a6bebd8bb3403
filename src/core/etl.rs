use crate::core::{BrowserSession, NameList, Pipeline};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_path: String,
    pub names: NameList,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Runs extract, transform and load against one browser session.
    ///
    /// The output file is written before the browser is closed, and the browser is closed
    /// on every path once it has launched. When a phase fails, its error is returned even
    /// if closing also fails.
    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Started.....");
        let session = self.pipeline.launch().await?;
        self.monitor.log_stats("Launch");

        let outcome = self.run_phases(&session).await;

        let closed = session.close().await;
        self.monitor.log_final_stats();

        match (outcome, closed) {
            (Ok(summary), Ok(())) => Ok(summary),
            (Err(e), Ok(())) => Err(e),
            (Ok(_), Err(close_err)) => {
                tracing::error!("Output was written but the browser failed to close");
                Err(close_err)
            }
            (Err(e), Err(close_err)) => {
                tracing::warn!("Browser did not close cleanly: {}", close_err);
                Err(e)
            }
        }
    }

    async fn run_phases(&self, session: &P::Session) -> Result<RunSummary> {
        let raw = self.pipeline.extract(session).await?;
        self.monitor.log_stats("Extract");

        let names = self.pipeline.transform(raw).await?;
        tracing::debug!("Transformed {} names", names.len());

        tracing::info!("Writing.....");
        let output_path = self.pipeline.load(&names).await?;
        tracing::info!("File created successfully.....");
        self.monitor.log_stats("Load");

        Ok(RunSummary { output_path, names })
    }
}
