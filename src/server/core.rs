//! Server core functionality
//!
//! Builds the router, binds the listener, and serves requests.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use log::{error, info, warn};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::server::handlers;

pub struct Server {
    listener: TcpListener,
    router: Router,
}

impl Server {
    pub async fn new(config: ServerConfig) -> Self {
        let addr = config.socket_addr();

        let listener = match TcpListener::bind(&addr).await {
            Ok(listener) => {
                info!("Server bound to {}", addr);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", addr, e);
                panic!("Server startup failed on socket {}: {}", addr, e);
            }
        };

        if let Err(e) = std::fs::create_dir_all(&config.storage_root) {
            warn!("Failed to create storage root directory: {}", e);
        } else {
            info!("Storage root: {}", config.storage_root.display());
        }

        info!(
            "API key: {}",
            if config.api_key.is_empty() {
                "NOT SET (explicit-path retrieval locked)"
            } else {
                "set"
            }
        );

        Self {
            router: build_router(Arc::new(config)),
            listener,
        }
    }

    pub async fn start(self) {
        info!("Starting daydrop server");

        if let Err(e) = axum::serve(self.listener, self.router).await {
            error!("Server error: {}", e);
        }
    }
}

/// Assemble the application router over shared configuration.
pub fn build_router(config: Arc<ServerConfig>) -> Router {
    let body_limit = config.max_upload_bytes() as usize;

    Router::new()
        .route("/", get(handlers::home))
        .route("/api/health", get(handlers::health))
        .route("/api/upload", post(handlers::upload))
        .route(
            "/api/download",
            get(handlers::download_today).post(handlers::download_today),
        )
        .route("/api/list-files", get(handlers::list_files))
        .route("/api/file/*path", get(handlers::get_file))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(config)
}
