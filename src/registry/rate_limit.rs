use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::config::RateLimitConfig;

/// Trailing-window submission throttle keyed by client address.
///
/// Each key may submit at most `max_hits` times inside any trailing window;
/// older hits fall out as time advances.
pub struct SubmissionRateLimiter {
    max_hits: u32,
    window: Duration,
    hits: Mutex<HashMap<String, Vec<DateTime<Utc>>>>,
}

impl SubmissionRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            max_hits: config.max_submissions,
            window: Duration::minutes(config.window_minutes),
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Record an attempt for `key` at `now`; false means over the limit and
    /// the attempt is not counted.
    pub fn allow(&self, key: &str, now: DateTime<Utc>) -> bool {
        let cutoff = now - self.window;
        let mut guard = self
            .hits
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // Hits are appended in time order, so a key whose newest hit predates
        // the cutoff holds nothing but stale entries. Dropping those keys here
        // keeps the map bounded even when every request forges a fresh
        // x-forwarded-for value.
        guard.retain(|_, hits| hits.last().map_or(false, |seen| *seen > cutoff));
        let entries = guard.entry(key.to_string()).or_default();
        entries.retain(|seen| *seen > cutoff);

        if entries.len() as u32 >= self.max_hits {
            return false;
        }

        entries.push(now);
        true
    }
}
