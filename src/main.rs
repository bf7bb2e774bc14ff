use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use quotawatch::check;
use quotawatch::config::{Command, Config};
use quotawatch::web::WebServer;
use quotawatch_core::config::Settings;
use quotawatch_core::report::LogBalanceSink;
use quotawatch_core::{Aggregator, CredentialStore, FileStore, UsageFetcher};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Config::parse_args();

    // Setup logging
    setup_logging(cli.debug);

    // Load settings
    let mut settings = Settings::load(cli.config.as_ref())?;
    cli.apply_to(&mut settings);
    settings.validate();

    // Wire the engine: store -> fetcher -> aggregator
    let store: Arc<dyn CredentialStore> = Arc::new(
        FileStore::open(settings.store.resolve_path())
            .context("Failed to open credential store")?,
    );
    let fetcher = UsageFetcher::new(
        settings.fetch.endpoint.clone(),
        Duration::from_secs(settings.fetch.timeout_secs),
    );
    let aggregator = Arc::new(Aggregator::new(
        fetcher,
        settings.fetch.max_concurrent,
        Arc::new(LogBalanceSink),
    ));

    match cli.command {
        Some(Command::Check) => check::run(store.as_ref(), &aggregator).await,
        None => {
            if !settings.web.enabled {
                anyhow::bail!("web server is disabled in config; nothing to do");
            }
            let port = settings.web.port;
            let server = WebServer::new(settings, store, aggregator);
            let handle = server.start();
            tracing::info!("dashboard available on http://localhost:{}", port);
            handle.await.context("web server task failed")?
        }
    }
}

fn setup_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("quotawatch=debug,quotawatch_core=debug")
    } else {
        EnvFilter::new("quotawatch=info,quotawatch_core=info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
