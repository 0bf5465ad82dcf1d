use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

mod backend;
mod config;
mod session;
mod util;
mod web;

use crate::backend::http::HttpBackend;
use crate::config::{AppConfig, CliArgs};
use crate::util::logging::init_tracing;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    init_tracing();

    // Parse command line arguments
    let args = CliArgs::parse();

    // Load configuration
    let config = match AppConfig::new(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Build the HTTP client for the text-to-SQL backend
    info!(
        "Default backend URL: {} (timeout {}s)",
        config.backend.default_url, config.backend.timeout_secs
    );
    let generator = Arc::new(HttpBackend::new(&config.backend)?);

    // Create application state
    let app_state = Arc::new(AppState::new(config.clone(), generator));

    // Start the web server
    info!(
        "Starting text2sql-studio on {}:{}",
        config.web.host, config.web.port
    );
    match web::run_server(config.web, app_state).await {
        Ok(_) => info!("Server stopped gracefully"),
        Err(e) => {
            error!("Server error: {}", e);
            return Err(std::io::Error::other(e.to_string()).into());
        }
    }

    Ok(())
}
