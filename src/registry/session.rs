use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;

/// Issues and checks opaque admin session tokens.
///
/// Each successful login mints a fresh random token with its own expiry, so a
/// leaked token ages out instead of living forever like a shared secret
/// would. Expired entries are pruned lazily on the next authorization check.
pub struct AdminSessions {
    ttl: Duration,
    tokens: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl AdminSessions {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            tokens: Mutex::new(HashMap::new()),
        }
    }

    /// Mint a token expiring `ttl` from `now`.
    pub fn issue(&self, now: DateTime<Utc>) -> String {
        let token = random_token();
        let mut guard = self
            .tokens
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.insert(token.clone(), now + self.ttl);
        token
    }

    /// True iff the token exists and has not expired at `now`.
    pub fn authorize(&self, token: &str, now: DateTime<Utc>) -> bool {
        let mut guard = self
            .tokens
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.retain(|_, expires_at| *expires_at > now);
        guard.contains_key(token)
    }
}

fn random_token() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);

    let mut token = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(token, "{byte:02x}");
    }
    token
}
