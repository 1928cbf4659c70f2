//! Application entry point and server initialization
//!
//! This module contains the main function that:
//! - Loads environment configuration
//! - Initializes the database and upload directory
//! - Starts the HTTP server with graceful shutdown support

use std::sync::Arc;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

// Module declarations
mod config;
mod database;
mod error;
mod handler;
mod image;
mod inquiry;
mod middleware;
mod model;
mod query;
mod route;

use config::AppConfig;
use database::{init_db, AppState};
use route::create_app;

/// Application entry point
///
/// 1. Loads environment variables from .env file if present
/// 2. Builds the explicit application configuration
/// 3. Initializes the embedded database and upload directory
/// 4. Creates the application state and router
/// 5. Starts the HTTP server with graceful shutdown handling
#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter("realty=debug,tower_http=debug")
        .init();

    let config = AppConfig::from_env();

    let db = init_db(&config.db_path).expect("Failed to initialize database");

    std::fs::create_dir_all(&config.upload_dir).expect("Failed to create upload directory");

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(
        port = config.port,
        db = %config.db_path,
        uploads = %config.upload_dir.display(),
        "starting server"
    );

    let state = AppState {
        db: Arc::new(db),
        config: Arc::new(config),
    };

    let app = create_app(state).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&addr).await.unwrap();

    // The server keeps running until it receives SIGTERM or SIGINT.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

/// Handles graceful shutdown signals
///
/// Returns when SIGINT (Ctrl+C) or, on Unix, SIGTERM is received. Open
/// connections are allowed to complete and pending database transactions
/// close cleanly before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, stopping server");
}
