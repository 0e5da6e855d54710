//! Stub State
//!
//! Shared state accessible by all stub handlers, wrapped in `Arc`.

use std::time::Instant;
use tokio::sync::RwLock;

use crate::config::StubConfig;
use crate::stub::store::Store;

/// Shared state of the stub server
pub struct StubState {
    pub store: RwLock<Store>,
    pub config: StubConfig,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl StubState {
    pub fn new(config: StubConfig) -> Self {
        let store = Store::new(&config, config.public_url());
        Self {
            store: RwLock::new(store),
            config,
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
