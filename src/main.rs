//! Kickabout - pickup football organizer backend
//! Mission: Fill the pitch, split the bill to the grosz, keep every balance honest

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use kickabout_backend::{
    api::create_router, auth::credentials::ensure_default_admin, auth::JwtHandler,
    models::Config, LedgerStore,
};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "kickabout")]
#[command(about = "Pickup football schedules, signups and settlement API")]
struct Args {
    /// SQLite database path (overrides DATABASE_PATH)
    #[arg(long)]
    database_path: Option<String>,

    /// Listen port (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Bind address
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let args = Args::parse();
    let mut config = Config::from_env()?;
    if let Some(path) = args.database_path {
        config.database_path = path;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    info!("⚽ Kickabout backend starting");

    let store = LedgerStore::new(&config.database_path)
        .with_context(|| format!("Failed to open ledger at {}", config.database_path))?;

    ensure_default_admin(
        &store,
        &config.default_admin_email,
        &config.default_admin_password,
    )?;

    let drifts = store.verify_balances().context("Balance check failed")?;
    if !drifts.is_empty() {
        warn!(
            "⚠️  {} player balances disagree with the ledger, run `ledger_admin repair`",
            drifts.len()
        );
    }

    let jwt_handler = Arc::new(
        JwtHandler::new(config.jwt_secret.clone())
            .with_expiration_hours(config.jwt_expiration_hours),
    );
    info!("🔐 Authentication initialized");

    let app = create_router(store, jwt_handler);

    let addr = format!("{}:{}", args.bind, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Initialize tracing
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kickabout_backend=debug,kickabout=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try the crate's own .env when launched from elsewhere
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let candidate = manifest_dir.join(".env");
    if candidate.exists() {
        let _ = dotenv::from_path(&candidate);
    }
}
