//! Application state
//!
//! Everything handlers share. The configuration and volume table are
//! immutable; only sessions and the login limiter change at runtime.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

use crate::auth::{SessionRegistry, SharedSessions};
use crate::config::ServerConfig;
use crate::middleware::RateLimiter;
use crate::usage::{DfReporter, UsageReporter};
use crate::volume::VolumeRegistry;

const LOGIN_WINDOW: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub volumes: Arc<VolumeRegistry>,
    pub sessions: SharedSessions,
    pub usage: Arc<dyn UsageReporter>,
    pub login_limiter: Arc<Mutex<RateLimiter>>,
}

impl AppState {
    /// State backed by the real `df` reporter
    pub fn new(config: ServerConfig) -> Self {
        let usage = Arc::new(DfReporter::new(config.usage_timeout()));
        Self::with_usage_reporter(config, usage)
    }

    pub fn with_usage_reporter(config: ServerConfig, usage: Arc<dyn UsageReporter>) -> Self {
        let volumes = VolumeRegistry::from_config(&config);
        let sessions = SessionRegistry::new(config.session_ttl());
        let limiter = RateLimiter::new(config.login_attempts_per_minute, LOGIN_WINDOW);

        Self {
            config: Arc::new(config),
            volumes: Arc::new(volumes),
            sessions: Arc::new(RwLock::new(sessions)),
            usage,
            login_limiter: Arc::new(Mutex::new(limiter)),
        }
    }
}
