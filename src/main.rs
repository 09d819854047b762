use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use civic_portal::config::{Config, DEFAULT_CONFIG_FILE};
use civic_portal::rpc::RpcServer;
use civic_portal::storage::{Database, DatabaseError};

#[derive(Parser, Debug)]
#[command(
    name = "civic-portal",
    version,
    about = "Content backend for a public information portal"
)]
struct Args {
    /// Config file (TOML)
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// SQLite database file, overrides `database.path`
    #[arg(long, value_name = "FILE")]
    database: Option<String>,

    /// Listen port, overrides `server.port`
    #[arg(long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Listen address, overrides `server.host`
    #[arg(long)]
    host: Option<String>,

    /// Reset database (delete and recreate)
    #[arg(long)]
    reset_db: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    if let Some(path) = args.database {
        config.database.path = path;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }

    if args.reset_db && config.database.path != ":memory:" {
        let db_path = Path::new(&config.database.path);
        if db_path.exists() {
            std::fs::remove_file(db_path).context("Failed to delete database")?;
            tracing::info!(path = %db_path.display(), "Database reset");
        }
    }

    let db = match Database::open_with_options(
        &config.database.path,
        config.database.max_connections,
    )
    .await
    {
        Ok(db) => db,
        Err(DatabaseError::InstanceLocked) => {
            eprintln!(
                "Error: The database at {} is locked by another process. Stop it and try again.",
                config.database.path
            );
            std::process::exit(1);
        }
        Err(e) => {
            return Err(anyhow::anyhow!("Failed to open database: {}", e));
        }
    };

    let server = RpcServer::new(config.server.clone(), db.clone());
    let served = server.serve().await.context("RPC server failed");

    db.close().await;
    served
}
