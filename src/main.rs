use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bili_feed_export::config::Config;
use bili_feed_export::host::{ChromiumHost, TokioClock};
use bili_feed_export::session::{collect_yesterday, RunContext, RunOutcome, Session};
use bili_feed_export::sink::FileSink;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    info!("Starting bili-feed-export");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(feed_url = %config.feed_url, output_dir = %config.output_dir.display(), "Configuration loaded");

    let host = ChromiumHost::launch(&config.host_config())
        .await
        .context("Failed to open feed page")?;

    let sink = FileSink::new(&config.output_dir, config.assume_yes);
    let settings = config.scroll_settings();
    let session = Session::new();
    let ctx = RunContext {
        host: &host,
        clock: &TokioClock,
        sink: &sink,
        settings: &settings,
        today: chrono::Local::now().date_naive(),
    };

    let result = collect_yesterday(&session, &ctx).await;
    host.shutdown().await;

    match result.context("Collection failed")? {
        RunOutcome::Delivered { collected, path } => {
            info!(collected, path = %path.display(), "Export complete");
        }
        RunOutcome::Declined { collected } => {
            info!(collected, "Export cancelled");
        }
        RunOutcome::AlreadyRunning => {}
    }

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bili_feed_export=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}
