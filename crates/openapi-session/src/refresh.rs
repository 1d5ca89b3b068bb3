//! Proactive background token refresh
//!
//! Optional helper for hosts: a periodic task that refreshes the session's
//! token before it expires and stores the result. The session itself never
//! writes to the credential store; this task is the caller that does.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::session::Session;

/// What one refresh cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// No token stored, nothing to refresh
    NoToken,
    /// Token is not expiring within the threshold
    NotDue,
    /// New token stored
    Refreshed,
    /// Server returned no access token; stored token left untouched
    Empty,
    /// Refresh failed; the next cycle will retry
    Failed,
}

/// Spawn a background task that proactively refreshes the session's token.
///
/// Runs every `interval` and refreshes when the stored token expires within
/// `threshold`. Failures are logged and retried on the next tick.
///
/// Returns a `JoinHandle` for the spawned task.
pub fn spawn_refresh_task(
    session: Arc<Session>,
    interval: Duration,
    threshold: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // Skip the immediate first tick, the token was just loaded
        ticker.tick().await;

        loop {
            ticker.tick().await;
            refresh_cycle(&session, threshold).await;
        }
    })
}

/// Run one refresh cycle.
pub async fn refresh_cycle(session: &Session, threshold: Duration) -> RefreshOutcome {
    let store = session.credentials();
    let account_id = store.account_id().await;

    let Some(token) = store.token().await else {
        debug!(account_id, "no token stored, skipping refresh");
        return RefreshOutcome::NoToken;
    };

    if !token.expires_within(threshold) {
        return RefreshOutcome::NotDue;
    }

    debug!(
        account_id,
        remaining_secs = token.remaining().as_secs(),
        "token expiring within threshold, refreshing"
    );

    match session.refresh_token(&CancelToken::new()).await {
        Ok(Some(fresh)) => {
            store.update_token(fresh).await;
            info!(account_id, "background token refresh succeeded");
            RefreshOutcome::Refreshed
        }
        Ok(None) => {
            warn!(account_id, "refresh returned no access token, keeping stored token");
            RefreshOutcome::Empty
        }
        Err(e) => {
            warn!(account_id, error = %e, "background refresh failed, will retry next cycle");
            RefreshOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use crate::transport::MemoryTransport;
    use openapi_auth::{ConnectionInfo, CredentialStore, Mode, Token};
    use openapi_proto::{PayloadType, ProtoOaRefreshTokenRes, type_of};

    const TIMEOUT: Duration = Duration::from_secs(10);
    const THRESHOLD: Duration = Duration::from_secs(900);

    fn store_with_lifetime(secs: i64) -> Arc<CredentialStore> {
        let token = Token::from_lifetime("at_old".into(), "rt_old".into(), secs, "bearer".into())
            .unwrap();
        Arc::new(CredentialStore::new(
            ConnectionInfo::new(Mode::Demo, "client-1", "secret-1", ACCOUNT_ID).with_token(token),
        ))
    }

    #[tokio::test]
    async fn cycle_skips_valid_tokens() {
        let transport = healthy_transport();
        let session = Session::new(transport.clone(), store_with_lifetime(7200), TIMEOUT);

        assert_eq!(refresh_cycle(&session, THRESHOLD).await, RefreshOutcome::NotDue);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn cycle_skips_missing_token() {
        let transport = healthy_transport();
        let session = Session::new(transport.clone(), store_without_token(), TIMEOUT);

        assert_eq!(refresh_cycle(&session, THRESHOLD).await, RefreshOutcome::NoToken);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn cycle_refreshes_and_stores_expiring_token() {
        let transport = healthy_transport();
        let store = store_with_lifetime(60);
        let session = Session::new(transport.clone(), store.clone(), TIMEOUT);

        assert_eq!(refresh_cycle(&session, THRESHOLD).await, RefreshOutcome::Refreshed);

        let token = store.token().await.unwrap();
        assert_eq!(token.access_token.expose(), "abc");
        assert_eq!(token.refresh_token.expose(), "def");
        assert!(!token.expires_within(THRESHOLD));
    }

    #[tokio::test]
    async fn empty_reply_keeps_stored_token() {
        let transport = Arc::new(MemoryTransport::connected().with_responder(|req| {
            match type_of(req) {
                Some(PayloadType::ProtoOaRefreshTokenReq) => {
                    vec![reply(&ProtoOaRefreshTokenRes::default())]
                }
                _ => healthy_server(req),
            }
        }));
        let store = store_with_lifetime(60);
        let session = Session::new(transport, store.clone(), TIMEOUT);

        assert_eq!(refresh_cycle(&session, THRESHOLD).await, RefreshOutcome::Empty);
        assert_eq!(store.token().await.unwrap().access_token.expose(), "at_old");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refresh_keeps_stored_token() {
        let transport = Arc::new(MemoryTransport::connected());
        let store = store_with_lifetime(60);
        let session = Session::new(transport, store.clone(), TIMEOUT);

        assert_eq!(refresh_cycle(&session, THRESHOLD).await, RefreshOutcome::Failed);
        assert_eq!(store.token().await.unwrap().access_token.expose(), "at_old");
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_task_refreshes_after_first_interval() {
        let transport = healthy_transport();
        let store = store_with_lifetime(60);
        let session = Arc::new(Session::new(transport.clone(), store.clone(), TIMEOUT));

        let handle = spawn_refresh_task(session, Duration::from_secs(30), THRESHOLD);

        // First tick is skipped
        tokio::task::yield_now().await;
        assert!(transport.sent().is_empty());

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(store.token().await.unwrap().access_token.expose(), "abc");

        handle.abort();
    }
}
