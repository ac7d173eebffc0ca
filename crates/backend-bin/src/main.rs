use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use backend_lib::{config::Settings, router, storage::FlatFileStore, AppState};
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "recipeshare-backend",
    about = "Session-authenticated recipe-sharing API server"
)]
struct Cli {
    /// Path to a TOML config file; defaults plus RECIPESHARE_* env otherwise
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    // RUST_LOG wins; the configured level is the fallback
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    let storage = FlatFileStore::new(&settings.data_dir)?;
    let bind_addr = settings.bind_addr;

    let state = Arc::new(AppState::new(storage, settings));
    let app = router::create_router(state);

    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!(%bind_addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
