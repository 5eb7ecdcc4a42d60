//! Daydrop Server - Entry Point
//!
//! A date-bucketed HTTP file-storage service: uploads land in
//! `MM-DD-YY` directories, retrieval resolves today's bucket or an
//! explicit key-gated path.

use log::info;

use daydrop_server::Server;
use daydrop_server::config::ServerConfig;

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    info!("Launching daydrop server...");

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => panic!("Failed to load configuration: {}", e),
    };

    let server = Server::new(config).await;
    server.start().await;
}
