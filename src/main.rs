//! # Chunk Relay Backend - Main Application Entry Point
//!
//! HTTP relay between a browser tab-audio extension and the Deepgram
//! speech-to-text API. The browser uploads short MediaRecorder chunks;
//! the relay patches their WebM headers when needed, forwards them to
//! Deepgram, and returns the transcript (or a structured error) as JSON.
//!
//! ## Application Architecture:
//! - **config**: Layered configuration (defaults + config.toml + environment)
//! - **state**: Shared per-process state (config, Deepgram client, metrics)
//! - **audio**: WebM header repair and mimetype detection
//! - **transcription**: Deepgram prerecorded API client
//! - **handlers**: The two relay endpoints (`/transcribe_chunk`, `/health_ping`)
//! - **health**: Local observability endpoints (`/health`, `/metrics`)
//! - **middleware**: Request logging and metrics collection
//! - **error**: The two-tier (provider vs. handler) failure classification

mod audio;
mod config;
mod error;
mod handlers;
mod health;
mod middleware;
mod state;
mod transcription;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Result;
use config::AppConfig;
use state::AppState;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transcription::DeepgramClient;

/// Global shutdown flag set by the signal handler task and polled by the
/// main task to stop the server gracefully.
static SHUTDOWN_SIGNAL: AtomicBool = AtomicBool::new(false);

/// The main application entry point.
///
/// ## Startup sequence:
/// 1. Load `.env` and initialize structured logging
/// 2. Load and validate configuration — a missing `DEEPGRAM_API_KEY`
///    aborts startup here, not on the first request
/// 3. Construct the Deepgram client once and share it via [`AppState`]
/// 4. Serve the relay routes with permissive CORS (the endpoints are
///    called directly from browser extension contexts)
/// 5. Stop gracefully on SIGINT/SIGTERM
#[actix_web::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    init_tracing()?;

    let config = AppConfig::load()?;
    config.validate()?;

    info!("Starting chunk-relay-backend v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded: {}:{}", config.server.host, config.server.port);
    info!("Provider endpoint: {}", config.provider.base_url);

    let deepgram = DeepgramClient::new(
        config.provider.api_key.clone(),
        config.provider.base_url.clone(),
    );
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let app_state = AppState::new(config, deepgram);

    setup_signal_handlers();

    info!("Starting HTTP server on {}", bind_addr);

    let server = HttpServer::new(move || {
        // The browser extension posts from arbitrary page origins
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["POST", "GET", "OPTIONS"])
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(middleware::RequestTelemetry)
            .route("/transcribe_chunk", web::post().to(handlers::transcribe_chunk))
            .route("/health_ping", web::post().to(handlers::health_ping))
            .route("/health", web::get().to(health::health_check))
            .route("/metrics", web::get().to(health::detailed_metrics))
    })
    .bind(&bind_addr)?
    .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    tokio::select! {
        result = server_task => {
            match result {
                Ok(server_result) => {
                    if let Err(e) = server_result {
                        error!("Server error: {}", e);
                    }
                }
                Err(e) => {
                    error!("Server task error: {}", e);
                }
            }
        }
        _ = wait_for_shutdown() => {
            info!("Shutdown signal received, stopping server...");
            server_handle.stop(true).await;
        }
    }

    info!("Server stopped gracefully");
    Ok(())
}

/// Initialize tracing with an env-filter; `RUST_LOG` overrides the default
/// of debug for the relay and info for actix.
fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chunk_relay_backend=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}

/// Listen for SIGTERM/SIGINT and flip the global shutdown flag.
fn setup_signal_handlers() {
    tokio::spawn(async {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler");
        let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
            .expect("Failed to install SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
            }
        }

        SHUTDOWN_SIGNAL.store(true, Ordering::SeqCst);
    });
}

/// Poll the shutdown flag without busy-waiting.
async fn wait_for_shutdown() {
    while !SHUTDOWN_SIGNAL.load(Ordering::SeqCst) {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }
}
