//! Rate limiting middleware
//!
//! Sliding-window limiter used to slow down password guessing.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Simple rate limiter
pub struct RateLimiter {
    requests: HashMap<String, Vec<Instant>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            requests: HashMap::new(),
            max_requests,
            window,
        }
    }

    pub fn is_allowed(&mut self, client_id: &str) -> bool {
        let now = Instant::now();
        let window = self.window;

        // Forget clients whose attempts have all aged out
        self.requests.retain(|_, times| {
            times.retain(|&time| now.duration_since(time) <= window);
            !times.is_empty()
        });

        let entry = self.requests.entry(client_id.to_string()).or_default();
        if entry.len() < self.max_requests {
            entry.push(now);
            true
        } else {
            false
        }
    }
}
