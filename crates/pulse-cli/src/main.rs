mod classify;
mod config;
mod persist;
mod run;

use clap::Parser;
use config::Config;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    info!("Starting pulse v{}", env!("CARGO_PKG_VERSION"));
    info!("Output: {}", config.output.display());

    let doc = run::run_aggregation(&config).await?;
    info!(
        "Aggregated {} events across {} months",
        doc.stats.total_events,
        doc.timeline.months.len()
    );

    persist::persist_summary(&doc, &config.output)?;
    info!("Summary written to {}", config.output.display());

    Ok(())
}
