//! Session identity and the credential store
//!
//! `ConnectionInfo` is the identity a session authenticates with: environment
//! mode, application client id/secret, trading account id, and the current
//! token. `CredentialStore` wraps it in a tokio Mutex so the session and the
//! host can share it. The token is replaced as a whole value after a
//! successful refresh, never field by field.
//!
//! Nothing here touches the filesystem; persisting refreshed tokens is the
//! host's concern.

use std::time::Duration;

use common::Secret;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::constants::{DEMO_HOST, DEFAULT_TIMEOUT_SECS, LIVE_HOST};
use crate::error::{Error, Result};
use crate::token::Token;

/// Trading environment the session connects to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Live,
    #[default]
    Demo,
}

impl Mode {
    pub fn host(self) -> &'static str {
        match self {
            Mode::Live => LIVE_HOST,
            Mode::Demo => DEMO_HOST,
        }
    }
}

/// Identity and settings for one session.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionInfo {
    #[serde(default)]
    pub mode: Mode,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Secret<String>,
    pub account_id: i64,
    #[serde(default)]
    pub token: Option<Token>,
    /// Per-request deadline in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

pub(crate) fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ConnectionInfo {
    pub fn new(
        mode: Mode,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        account_id: i64,
    ) -> Self {
        Self {
            mode,
            client_id: client_id.into(),
            client_secret: Secret::new(client_secret.into()),
            account_id,
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Shared holder of a session's `ConnectionInfo`.
///
/// Reads clone out of the lock so no caller holds it across an await on the
/// network.
pub struct CredentialStore {
    state: Mutex<ConnectionInfo>,
}

impl CredentialStore {
    pub fn new(info: ConnectionInfo) -> Self {
        Self {
            state: Mutex::new(info),
        }
    }

    /// Clone of the full connection info.
    pub async fn snapshot(&self) -> ConnectionInfo {
        self.state.lock().await.clone()
    }

    pub async fn account_id(&self) -> i64 {
        self.state.lock().await.account_id
    }

    pub async fn mode(&self) -> Mode {
        self.state.lock().await.mode
    }

    pub async fn timeout(&self) -> Duration {
        self.state.lock().await.timeout()
    }

    /// Client id and secret for application-level auth.
    pub async fn client_credentials(&self) -> (String, Secret<String>) {
        let state = self.state.lock().await;
        (state.client_id.clone(), state.client_secret.clone())
    }

    /// Clone of the current token, if any.
    pub async fn token(&self) -> Option<Token> {
        self.state.lock().await.token.clone()
    }

    /// Access token for account-level auth.
    pub async fn access_token(&self) -> Result<Secret<String>> {
        let state = self.state.lock().await;
        state
            .token
            .as_ref()
            .map(|t| t.access_token.clone())
            .ok_or(Error::MissingToken(state.account_id))
    }

    /// Refresh token for the refresh exchange.
    pub async fn refresh_token(&self) -> Result<Secret<String>> {
        let state = self.state.lock().await;
        state
            .token
            .as_ref()
            .map(|t| t.refresh_token.clone())
            .ok_or(Error::MissingToken(state.account_id))
    }

    /// Replace the stored token after a completed refresh or logon.
    pub async fn update_token(&self, token: Token) {
        let mut state = self.state.lock().await;
        debug!(
            account_id = state.account_id,
            expires_at = token.expires_at,
            "updated token"
        );
        state.token = Some(token);
    }

    /// Drop the stored token, e.g. after the server revokes it.
    pub async fn clear_token(&self) -> Option<Token> {
        let mut state = self.state.lock().await;
        debug!(account_id = state.account_id, "cleared token");
        state.token.take()
    }
}
