//! Hospital administration API server binary.
//!
//! Loads `.env`, reads configuration from the environment and the command
//! line, prepares storage and serves the REST API until Ctrl-C.

use std::sync::Arc;

use clap::{Parser, ValueEnum};
use hospital_api::AppState;
use hospital_api::config::ApiConfig;
use hospital_core::store::{MemoryStore, PgStore};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,hospital_api=debug,hospital_core=debug";

/// Storage backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum StorageKind {
    /// PostgreSQL at `--database-url`, migrated on startup.
    Postgres,
    /// Process-local maps; everything is lost on exit.
    Memory,
}

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "hospital_api_server", about = "Hospital administration API server")]
struct Args {
    /// Address to listen on. Overrides `BIND_ADDR`.
    #[arg(long, env = "BIND_ADDR")]
    bind_addr: Option<String>,

    /// PostgreSQL connection URL. Overrides `DATABASE_URL`.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    #[arg(long, value_enum, env = "STORAGE", default_value_t = StorageKind::Postgres)]
    storage: StorageKind,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env()?;
    if let Some(bind_addr) = args.bind_addr {
        config.bind_addr = bind_addr;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }

    info!(
        version = hospital_core::version(),
        bind_addr = %config.bind_addr,
        environment = ?config.environment,
        records_access = ?config.records_access,
        storage = ?args.storage,
        "starting hospital_api_server"
    );

    let state = match args.storage {
        StorageKind::Postgres => {
            info!(max_connections = args.max_connections, "configuring connection pool");
            let pool = PgPoolOptions::new()
                .max_connections(args.max_connections)
                .acquire_timeout(std::time::Duration::from_secs(30))
                .connect(&config.database_url)
                .await?;

            info!("running database migrations");
            hospital_core::migrate::migrate(&pool).await?;

            AppState::new(Arc::new(PgStore::new(pool)), config)
        }
        StorageKind::Memory => {
            warn!("using in-memory storage, data will not survive a restart");
            AppState::new(Arc::new(MemoryStore::new()), config)
        }
    };

    let listener = tokio::net::TcpListener::bind(&state.config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    let app = hospital_api::router(state);

    info!(addr = %local_addr, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
