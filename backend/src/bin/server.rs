//! Crop Coverage HTTP Server Binary
//!
//! # Usage
//!
//! ```bash
//! EE_PROJECT=my-project EE_AUTH_METHOD=token \
//!   EE_ACCESS_TOKEN=$(gcloud auth print-access-token) \
//!   cargo run --bin crop-coverage-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 5000)
//! - `STATIC_DIR`: Frontend build directory (default: ../frontend/dist)
//! - `EE_PROJECT`: Cloud project for Earth Engine requests (required)
//! - `EE_AUTH_METHOD`: `metadata` (default) or `token`
//! - `EE_ACCESS_TOKEN`: Bearer token when `EE_AUTH_METHOD=token`
//! - `RUST_LOG`: Log level (default: info)
//!
//! Settings may also come from `crop-coverage.toml`; environment wins.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crop_coverage::config::AppConfig;
use crop_coverage::earthengine::{RestClient, TokenProvider};
use crop_coverage::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting Crop Coverage HTTP Server");

    let config = AppConfig::load()?;
    let ee = &config.earthengine;
    let tokens = TokenProvider::with_metadata_url(ee.auth_method()?, ee.metadata_url.clone());
    let engine = RestClient::new(ee.api_base_url.clone(), ee.project.clone(), tokens, ee.timeout())?;
    info!(
        "Earth Engine client ready (project {}, auth {})",
        engine.project(),
        ee.auth
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Serving frontend from {}", config.server.static_dir.display());

    let state = AppState::new(Arc::new(engine), config);
    let app = create_router(state);

    info!("Server listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
