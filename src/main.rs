//! Content Guard binary entry point.
//!
//! Serves the guard over MCP stdio. Logs go to stderr because stdout carries
//! JSON-RPC. Configuration is read before the subscriber is installed so a
//! `LOG_LEVEL` set in `.env` takes effect.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use content_guard::config::{Config, DEFAULT_LOG_LEVEL};
use content_guard::server::McpServer;
use tracing_subscriber::filter::EnvFilter;

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() {
    let loaded = Config::from_env();
    init_tracing(
        loaded
            .as_ref()
            .map_or(DEFAULT_LOG_LEVEL, |config| config.log_level.as_str()),
    );

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    tracing::info!(
        database = %config.database_path,
        window_ms = config.rate_limit_window_ms,
        max_requests = config.rate_limit_max_requests,
        audit_capacity = config.audit_log_capacity,
        "content-guard starting"
    );

    let server = McpServer::new(config);
    tokio::select! {
        result = server.run_stdio() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Server error");
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted");
        }
    }

    tracing::info!("content-guard stopped");
}
