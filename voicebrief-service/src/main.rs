use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

mod api;
mod config;
mod error;
mod extract;
mod pages;
mod pipeline;
mod sarvam;
mod summarize;

use crate::api::AppState;
use crate::config::StaticConfig;

// Re-export config crate types to avoid namespace collision
use ::config::{Config as ConfigBuilder, Environment, File};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    init_logging();

    info!(
        "Starting Voicebrief service v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load static configuration; missing API keys fail here, before binding
    let static_config: StaticConfig = ConfigBuilder::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(
            Environment::with_prefix("VOICEBRIEF")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    info!(
        host = %static_config.server.host,
        port = static_config.server.port,
        "Static configuration loaded"
    );

    // Ensure scratch directories exist
    std::fs::create_dir_all(&static_config.storage.upload_dir)?;
    std::fs::create_dir_all(&static_config.storage.audio_dir)?;

    let addr = format!(
        "{}:{}",
        static_config.server.host, static_config.server.port
    );

    let state = Arc::new(AppState::new(static_config)?);
    let app = api::router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let format = fmt::format()
        .with_target(true)
        .with_thread_ids(true)
        .compact();

    // Use RUST_LOG if set, otherwise default to info level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("voicebrief_service=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().event_format(format))
        .with(filter)
        .init();
}
