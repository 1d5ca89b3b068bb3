//! Access token value
//!
//! A token is valid until `expires_at`, an absolute unix timestamp in
//! milliseconds. The server reports lifetimes as a delta in seconds; the
//! conversion happens once, in `Token::from_lifetime`, at the moment the
//! refresh reply is handled.
//!
//! This crate never decides when to refresh. `is_expired` and
//! `expires_within` exist so the caller can.

use std::time::Duration;

use common::Secret;
use serde::Deserialize;

use crate::error::{Error, Result};

/// OAuth token pair held by the credential store.
#[derive(Debug, Clone, Deserialize)]
pub struct Token {
    pub access_token: Secret<String>,
    pub refresh_token: Secret<String>,
    /// Expiration as unix timestamp in milliseconds
    #[serde(default)]
    pub expires_at: u64,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Token {
    /// Build a token whose expiry is now + `expires_in_secs`.
    ///
    /// Rejects negative lifetimes; a zero lifetime yields an already-expired
    /// token.
    pub fn from_lifetime(
        access_token: String,
        refresh_token: String,
        expires_in_secs: i64,
        token_type: String,
    ) -> Result<Self> {
        let lifetime = u64::try_from(expires_in_secs).map_err(|_| {
            Error::InvalidToken(format!("negative lifetime: {expires_in_secs}s"))
        })?;
        Ok(Self {
            access_token: Secret::new(access_token),
            refresh_token: Secret::new(refresh_token),
            expires_at: now_millis().saturating_add(lifetime.saturating_mul(1000)),
            token_type,
        })
    }

    /// Whether the access token must no longer be used.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= now_millis()
    }

    /// Whether the access token expires within `threshold` from now.
    pub fn expires_within(&self, threshold: Duration) -> bool {
        let threshold_millis = u64::try_from(threshold.as_millis()).unwrap_or(u64::MAX);
        self.expires_at <= now_millis().saturating_add(threshold_millis)
    }

    /// Remaining lifetime, zero once expired.
    pub fn remaining(&self) -> Duration {
        Duration::from_millis(self.expires_at.saturating_sub(now_millis()))
    }
}

/// Current wall-clock time as unix milliseconds.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
