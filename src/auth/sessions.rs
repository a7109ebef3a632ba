//! Session registry
//!
//! Tracks the tokens issued on successful login.

use rand::RngCore;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session";

/// Thread-safe session registry wrapper
pub type SharedSessions = Arc<RwLock<SessionRegistry>>;

/// Registry of live session tokens and when they were issued
pub struct SessionRegistry {
    sessions: HashMap<String, Instant>,
    ttl: Duration,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl,
        }
    }

    /// Issues a fresh random token, dropping expired ones on the way.
    pub fn issue(&mut self) -> String {
        self.prune();
        let token = new_token();
        self.sessions.insert(token.clone(), Instant::now());
        token
    }

    pub fn is_valid(&self, token: &str) -> bool {
        self.sessions
            .get(token)
            .is_some_and(|issued| issued.elapsed() < self.ttl)
    }

    /// Returns whether the token was live
    pub fn revoke(&mut self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    pub fn prune(&mut self) {
        let ttl = self.ttl;
        self.sessions.retain(|_, issued| issued.elapsed() < ttl);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// 32 random bytes, hex encoded
fn new_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
