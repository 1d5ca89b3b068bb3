//! Session controller
//!
//! A `Session` sequences the authentication steps over one transport and
//! tracks where it is in them:
//!
//! ```text
//! Unauthenticated --app auth--> ApplicationAuthenticated --account auth--> AccountAuthenticated
//!        ^                                                                      |
//!        +------------------------------- logout ------------------------------+
//! any failed step --> Faulted (error kept in last_fault)
//! ```
//!
//! Each step waits for the previous reply before it is sent. A token refresh
//! re-authorizes the application on the connection but is not a logon step:
//! it leaves the state and `last_fault` as they were. A session never writes
//! to the credential store; a refreshed token is handed back to the caller,
//! who decides whether to store it.

use std::sync::Arc;
use std::time::Duration;

use openapi_auth::{CredentialStore, Token};
use openapi_proto::{
    Envelope, ProtoOaAccountAuthReq, ProtoOaAccountAuthRes, ProtoOaAccountLogoutReq,
    ProtoOaApplicationAuthReq, ProtoOaApplicationAuthRes, ProtoOaRefreshTokenReq,
    ProtoOaRefreshTokenRes, Request, Response,
};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::cancel::CancelToken;
use crate::correlation::Correlator;
use crate::error::{Error, Result};
use crate::state::{SessionEvent, SessionState, transition};
use crate::transport::Transport;

/// Authenticated context for one trading account on one connection.
pub struct Session {
    transport: Arc<dyn Transport>,
    credentials: Arc<CredentialStore>,
    correlator: Correlator,
    state: RwLock<SessionState>,
    last_fault: RwLock<Option<Error>>,
    /// Held for the whole of a refresh so two refreshes never interleave
    refresh_lock: Mutex<()>,
}

impl Session {
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Arc<CredentialStore>,
        timeout: Duration,
    ) -> Self {
        let correlator = Correlator::new(transport.clone(), credentials.clone(), timeout);
        Self {
            transport,
            credentials,
            correlator,
            state: RwLock::new(SessionState::Unauthenticated),
            last_fault: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Build a session using the request timeout from the credential store.
    pub async fn from_store(
        transport: Arc<dyn Transport>,
        credentials: Arc<CredentialStore>,
    ) -> Self {
        let timeout = credentials.timeout().await;
        Self::new(transport, credentials, timeout)
    }

    pub async fn state(&self) -> SessionState {
        *self.state.read().await
    }

    /// Error of the logon step that last faulted the session.
    pub async fn last_fault(&self) -> Option<Error> {
        self.last_fault.read().await.clone()
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    /// Authorize the application, then the trading account.
    ///
    /// Stops at the first failed step. The failure is returned, kept in
    /// `last_fault`, and leaves the session `Faulted`.
    pub async fn logon(&self, cancel: &CancelToken) -> Result<()> {
        match self.run_logon(cancel).await {
            Ok(()) => {
                *self.last_fault.write().await = None;
                let account_id = self.credentials.account_id().await;
                info!(account_id, "logon complete");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "logon failed");
                self.fault(&err).await;
                Err(err)
            }
        }
    }

    async fn run_logon(&self, cancel: &CancelToken) -> Result<()> {
        self.ensure_connected().await?;

        let account_id = self.credentials.account_id().await;
        let access_token = self.credentials.access_token().await?;

        self.authorize_application(cancel).await?;
        self.apply(SessionEvent::ApplicationAuthorized).await;

        let _: ProtoOaAccountAuthRes = self
            .correlator
            .send(
                ProtoOaAccountAuthReq {
                    ctid_trader_account_id: account_id,
                    access_token: access_token.expose().clone(),
                },
                cancel,
            )
            .await?;
        self.apply(SessionEvent::AccountAuthorized).await;

        Ok(())
    }

    /// Exchange the stored refresh token for a new token.
    ///
    /// Returns `Ok(None)` when the server answers without an access token;
    /// there is nothing to store in that case. The new token is not written
    /// back to the credential store, and the session state is not touched.
    pub async fn refresh_token(&self, cancel: &CancelToken) -> Result<Option<Token>> {
        let _guard = self.refresh_lock.lock().await;
        self.run_refresh(cancel).await.inspect_err(|err| {
            error!(error = %err, "token refresh failed");
        })
    }

    async fn run_refresh(&self, cancel: &CancelToken) -> Result<Option<Token>> {
        self.ensure_connected().await?;

        let refresh_token = self.credentials.refresh_token().await?;

        self.authorize_application(cancel).await?;

        let res: ProtoOaRefreshTokenRes = self
            .correlator
            .send(
                ProtoOaRefreshTokenReq {
                    refresh_token: refresh_token.expose().clone(),
                },
                cancel,
            )
            .await?;

        let Some(access_token) = res.access_token.filter(|t| !t.is_empty()) else {
            info!("refresh reply carried no access token");
            return Ok(None);
        };

        // Keep the current refresh token when the server does not rotate it
        let next_refresh = res
            .refresh_token
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| refresh_token.expose().clone());

        let token = Token::from_lifetime(
            access_token,
            next_refresh,
            res.expires_in.unwrap_or_default(),
            res.token_type.unwrap_or_else(|| "bearer".to_string()),
        )?;

        let account_id = self.credentials.account_id().await;
        info!(account_id, expires_at = token.expires_at, "token refreshed");
        Ok(Some(token))
    }

    /// Best-effort logout. Never fails.
    ///
    /// The logout request is written without waiting for a reply, and only
    /// when the transport is still connected.
    pub async fn logout(&self) {
        if self.transport.is_connected() {
            let request = ProtoOaAccountLogoutReq {
                ctid_trader_account_id: self.credentials.account_id().await,
            };
            match Envelope::from_message(&request) {
                Ok(envelope) => {
                    if let Err(e) = self.transport.send_message(envelope).await {
                        warn!(error = %e, "failed to send logout request");
                    }
                }
                Err(e) => warn!(error = %e, "failed to build logout request"),
            }
        } else {
            debug!("transport not connected, skipping logout request");
        }
        self.apply(SessionEvent::LoggedOut).await;
    }

    /// Typed request/reply over this session's transport.
    pub async fn send<Req: Request, Resp: Response>(
        &self,
        request: Req,
        cancel: &CancelToken,
    ) -> Result<Resp> {
        self.correlator.send(request, cancel).await
    }

    /// Log out, then release the transport unless it is already terminated.
    ///
    /// Safe to call whether or not logon ever succeeded.
    pub async fn dispose(&self) {
        self.logout().await;
        if !self.transport.is_terminated() {
            self.transport.dispose();
        }
        info!("session disposed");
    }

    async fn ensure_connected(&self) -> Result<()> {
        if self.transport.is_connected() {
            return Ok(());
        }
        debug!("connecting transport");
        self.transport.connect().await.map_err(Error::Connection)
    }

    async fn authorize_application(&self, cancel: &CancelToken) -> Result<()> {
        let (client_id, client_secret) = self.credentials.client_credentials().await;
        let _: ProtoOaApplicationAuthRes = self
            .correlator
            .send(
                ProtoOaApplicationAuthReq {
                    client_id,
                    client_secret: client_secret.expose().clone(),
                },
                cancel,
            )
            .await?;
        Ok(())
    }

    async fn apply(&self, event: SessionEvent) -> SessionState {
        let mut state = self.state.write().await;
        let next = transition(*state, event);
        if next != *state {
            debug!(from = %*state, to = %next, ?event, "session state changed");
            *state = next;
        }
        next
    }

    async fn fault(&self, err: &Error) {
        *self.last_fault.write().await = Some(err.clone());
        self.apply(SessionEvent::StepFailed).await;
    }
}
