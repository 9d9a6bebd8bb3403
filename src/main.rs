use breed_etl::core::ConfigProvider;
use breed_etl::utils::{logger, validation::Validate};
use breed_etl::{
    BrowserOptions, ChromiumDriver, CliConfig, EtlEngine, EtlError, LocalStorage,
    ScrapePipeline, TomlConfig,
};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI config: {:?}", cli);

    let exit_code = match cli.config.clone() {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TomlConfig::from_file(&path) {
                Ok(config) => {
                    let (config, monitor) = cli.overlay(config);
                    let options = config.browser_options();
                    run(config, options, monitor).await
                }
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path, e);
                    eprintln!("💡 Make sure the file exists and is valid TOML");
                    e.severity().exit_code()
                }
            }
        }
        None => {
            let options = cli.browser_options();
            let monitor = cli.monitor;
            run(cli, options, monitor).await
        }
    };

    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

async fn run<C>(config: C, options: BrowserOptions, monitor: bool) -> i32
where
    C: ConfigProvider + Validate,
{
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        return report_failure(&e);
    }

    if monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path());
    let pipeline = ScrapePipeline::new(ChromiumDriver::new(options), storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!(
                "✅ Wrote {} names to {}",
                summary.names.len(),
                summary.output_path
            );
            println!("{:?}", summary.names.as_slice());
            0
        }
        Err(e) => report_failure(&e),
    }
}

fn report_failure(e: &EtlError) -> i32 {
    tracing::error!(
        "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    e.severity().exit_code()
}
