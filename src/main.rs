//! Gatekeeper entrypoint.
//!
//! Startup order matters: the first credential load is fatal on failure,
//! because serving with zero credentials would leave every private route
//! unreachable or, worse, ambiguously open.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gatekeeper::config::{load_config, GatekeeperConfig};
use gatekeeper::credentials::{spawn_refresh, CredentialCache};
use gatekeeper::http::HttpServer;
use gatekeeper::lifecycle::{signals, Shutdown};
use gatekeeper::observability::metrics;
use gatekeeper::store::CredentialStore;

#[derive(Parser, Debug)]
#[command(name = "gatekeeper", version, about = "HTTP admission gatekeeper")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "gatekeeper.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = if args.config.exists() {
        load_config(&args.config)?
    } else {
        GatekeeperConfig::default()
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!(
                    "gatekeeper={}",
                    config.observability.log_level
                ))
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        name = %config.app.name,
        version = env!("CARGO_PKG_VERSION"),
        config = %args.config.display(),
        "gatekeeper starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Store bootstrap: schema, then a loopback-bound credential when empty.
    let store = CredentialStore::connect(&config.store.database_url).await?;
    store.ensure_schema().await?;
    store.ensure_initial_credential().await?;

    // First load is fatal; refuse to serve with no credentials.
    let cache = Arc::new(CredentialCache::new(store));
    let count = cache.reload().await?;
    if count == 0 {
        return Err("no credentials loaded, refusing to start".into());
    }

    let shutdown = Arc::new(Shutdown::new());

    let signal_task = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            signals::wait_for_signal().await;
            shutdown.trigger();
        }
    });

    let refresh_handle = spawn_refresh(
        cache.clone(),
        Duration::from_secs(config.cache.refresh_interval_secs),
        shutdown.subscribe(),
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config, cache.clone());
    server.run(listener, shutdown.subscribe()).await?;

    // Stop the refresh timer before touching the store connection.
    shutdown.trigger();
    let _ = refresh_handle.await;
    cache.store().close().await;
    signal_task.abort();

    tracing::info!("Shutdown complete");
    Ok(())
}
