use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use grosir_api::cache::{MemorySessionCache, RedisSessionCache, SessionCache};
use grosir_api::config::{self, CacheBackend};
use grosir_api::database::Store;
use grosir_api::identity::CognitoGateway;
use grosir_api::{router, AppState, Settings};

#[derive(Parser, Debug)]
#[command(name = "grosir-api", version, about = "Grocery marketplace API server")]
struct Args {
    /// Listen port (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Start without applying pending migrations
    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so local runs pick up DATABASE_URL, CLIENT_ID, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("grosir_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let config = config::config();
    tracing::info!("Starting grosir-api {} in {:?} mode", config.server.version, config.environment);

    let store = Store::connect(&config.database)
        .await
        .context("connecting to database")?;

    if config.database.migrate && !args.skip_migrations {
        store.migrate().await.context("applying migrations")?;
    }

    let sessions: Arc<dyn SessionCache> = match config.cache.backend {
        CacheBackend::Redis => {
            let url = config.cache.redis_url()?;
            Arc::new(
                RedisSessionCache::connect(&url, config.cache.timeout())
                    .await
                    .context("connecting to session cache")?,
            )
        }
        CacheBackend::Memory => {
            tracing::warn!("Using in-process session cache; sessions are lost on restart");
            Arc::new(MemorySessionCache::new())
        }
    };

    let identity = Arc::new(CognitoGateway::new(&config.identity).context("configuring identity provider")?);

    let state = AppState::new(store.clone(), sessions, identity, Settings::from_config(config));
    let app = router(state);

    let port = args.port.unwrap_or(config.server.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    store.close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
