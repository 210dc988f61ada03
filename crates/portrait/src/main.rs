//! Portrait - account and profile photo service

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::Config;
use portrait_api::{AppState, UploadLimits, create_router};
use portrait_auth::{JwtManager, SubjectCipher};
use portrait_db::Database;
use portrait_storage::LocalStorage;

/// Portrait - user accounts with a single profile photo each
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "PORTRAIT_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "PORTRAIT_PORT")]
    port: Option<u16>,

    /// Token signing secret
    #[arg(long, env = "PORTRAIT_JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Token subject encryption key
    #[arg(long, env = "PORTRAIT_ENCRYPTION_KEY", hide_env_values = true)]
    encryption_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config)?;
    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(secret) = args.jwt_secret {
        config.auth.jwt_secret = secret;
    }
    if let Some(key) = args.encryption_key {
        config.auth.encryption_key = key;
    }

    init_logging(&config.logging.level, &config.logging.format);
    config.validate();

    info!("Starting Portrait v{}", env!("CARGO_PKG_VERSION"));

    // Metrics recorder must be installed before any counter fires
    let metrics_handle = if config.metrics.enabled {
        match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => Some(Arc::new(handle)),
            Err(e) => {
                warn!("Failed to install metrics recorder: {}", e);
                None
            }
        }
    } else {
        None
    };

    // Create data directories
    if let Some(parent) = Path::new(&config.database.path).parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::create_dir_all(&config.storage.path).await?;

    // Initialize database
    let db_url = format!("sqlite:{}?mode=rwc", config.database.path);
    let db = Database::new(&db_url).await?;

    // Initialize storage backend
    let storage = Arc::new(LocalStorage::new(&config.storage.path).await?);

    // Initialize token issuer
    let jwt = Arc::new(JwtManager::new(
        &config.auth.jwt_secret,
        SubjectCipher::new(&config.auth.encryption_key),
        config.auth.token_ttl_secs,
    ));

    let state = AppState::new(
        db,
        storage,
        jwt,
        UploadLimits {
            max_file_size: config.upload.max_file_size,
        },
    );

    let app = create_router(state, &config.storage.path, metrics_handle)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr =
        format!("{}:{}", config.server.bind_address, config.server.port).parse()?;

    info!("Listening on {}", addr);
    info!("Serving photos from {}", config.storage.path);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
