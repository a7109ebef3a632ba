//! Drive Explorer - Entry Point
//!
//! Serves a fixed set of host directories over an authenticated HTTP API.

use log::{error, info};

use drive_explorer::config::ServerConfig;
use drive_explorer::{AppState, Server};

#[tokio::main]
async fn main() {
    // RUST_LOG overrides the default level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Launching drive explorer...");

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let server = Server::new(AppState::new(config));
    if let Err(e) = server.start().await {
        error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}
