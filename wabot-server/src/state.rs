//! Shared server state

use std::sync::Arc;

use chrono::{DateTime, Utc};

use wabot_core::{Config, StatusStore};

pub type SharedState = Arc<AppState>;

/// Shared application state
pub struct AppState {
    /// Settings loaded at startup
    pub config: Arc<Config>,

    /// Link status, also written by the messaging client callbacks
    pub status: Arc<StatusStore>,

    /// Process start time
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: Arc<Config>, status: Arc<StatusStore>) -> Self {
        Self {
            config,
            status,
            started_at: Utc::now(),
        }
    }

    /// Whole seconds since startup
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
