mod app;
mod cli;

use anyhow::Context;
use app::Application;
use cli::Cli;
use poembot_core::{AppConfig, ErrorReporter};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str =
    "poembot=info,poembot_core=info,reddit_client=info,llm_interface=info,notifier=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before reading POEM_MODE, RUST_LOG or any credentials.
    let dotenv_result = dotenv::dotenv();
    let cli = Cli::parse_or_exit();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = dotenv_result {
        tracing::debug!("No .env file loaded: {}", e);
    }

    tracing::info!("Starting poembot in {:?} mode", cli.mode);

    let reporter = ErrorReporter::new();
    let config = AppConfig::from_env();

    let app = Application::from_config(&config, cli.mode)
        .map_err(|e| {
            reporter.report_error(&e);
            e
        })
        .context("failed to set up poembot")?;
    tracing::debug!("Pipeline options: {:?}", app.options());

    let report = app
        .run(&cli.run_input())
        .await
        .map_err(|e| {
            reporter.report_error(&e);
            e
        })
        .context("poem run failed")?;

    for delivery in &report.deliveries {
        tracing::info!("{}: {:?}", delivery.sink, delivery.reference);
    }
    tracing::info!(
        "Theme {:?} produced {} characters; delivered to {} sink(s), skipped {:?}",
        report.theme,
        report.text.chars().count(),
        report.deliveries.len(),
        report.skipped
    );
    Ok(())
}
