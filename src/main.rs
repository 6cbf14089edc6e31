mod batch;
mod config;
mod reddit;

use anyhow::Result;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "comment_checker=info".into()),
        )
        .init();

    info!("Loading configuration...");
    let config = config::AppConfig::load()?;

    let client = reddit::RedditClient::new(&config.reddit)?;
    if config.reddit.request_timeout().is_none() {
        info!("No request timeout configured; a stalled request blocks the batch");
    }

    let runner = batch::BatchRunner::new(client, &config.batch);
    let summary = runner.run().await?;
    if summary.failed > 0 {
        warn!("{} rows failed and have no output line", summary.failed);
    }

    Ok(())
}
