//! Server types and shared state.

use std::sync::Arc;

use crate::config::Config;
use crate::guard::Guard;
use crate::traits::{BlobStore, TimeProvider};

/// Shared application state for all tool handlers.
#[derive(Clone)]
pub struct AppState {
    /// Guard serving every tool call.
    pub guard: Arc<Guard>,
    /// Server configuration.
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `store` - Blob store for the audit log
    /// * `clock` - Time source for rate limiting and audit timestamps
    #[must_use]
    pub fn new(config: Config, store: Arc<dyn BlobStore>, clock: Arc<dyn TimeProvider>) -> Self {
        let guard = Guard::new(&config, store, clock);
        Self {
            guard: Arc::new(guard),
            config: Arc::new(config),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
