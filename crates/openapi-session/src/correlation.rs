//! Request/response correlation
//!
//! The protocol carries no request id the server is obliged to echo, so a
//! request is matched to its reply by payload type alone: the first inbound
//! message whose type equals the reply type of the request completes it.
//! Heartbeats never match.
//!
//! Each `send` follows the same path:
//!
//! 1. Refuse if the transport is not connected.
//! 2. Resolve the request and reply payload types by message name.
//! 3. Stamp the session's account id onto the request, if it has the field.
//! 4. Subscribe to the inbound stream, then write the envelope.
//! 5. Race the first matching reply against the deadline and the caller's
//!    cancel token.
//!
//! The subscription is dropped on every exit path. Two concurrent requests
//! with the same reply type both observe the same first reply; callers that
//! need distinct replies must serialize such requests.

use std::sync::Arc;
use std::time::Duration;

use openapi_auth::CredentialStore;
use openapi_proto::{
    Envelope, PayloadType, Request, Response, resolve, stamp_account_id, type_of,
};
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::cancel::CancelToken;
use crate::completion::{Completion, completion};
use crate::error::{Error, Result};
use crate::metrics;
use crate::stream::{InboundStream, StreamEvent, Subscription};
use crate::transport::Transport;

/// Sends requests over a transport and awaits their correlated replies.
pub struct Correlator {
    transport: Arc<dyn Transport>,
    credentials: Arc<CredentialStore>,
    timeout: Duration,
}

impl Correlator {
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Arc<CredentialStore>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            credentials,
            timeout,
        }
    }

    /// Per-request deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send `request` and wait for the first inbound `Resp`.
    ///
    /// Every failure is logged before it is returned.
    pub async fn send<Req: Request, Resp: Response>(
        &self,
        request: Req,
        cancel: &CancelToken,
    ) -> Result<Resp> {
        let started = Instant::now();
        let result = self.dispatch::<Req, Resp>(request, cancel).await;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(err @ Error::RequestTimeout { timeout, .. }) => {
                warn!(
                    request = Req::NAME,
                    timeout_ms = timeout.as_millis() as u64,
                    error = %err,
                    "request timed out"
                );
                err.kind()
            }
            Err(err @ Error::RequestCancelled { .. }) => {
                info!(request = Req::NAME, "request cancelled");
                err.kind()
            }
            Err(err @ Error::StreamClosed) => {
                info!(request = Req::NAME, "inbound stream completed before a reply");
                err.kind()
            }
            Err(err) => {
                error!(request = Req::NAME, error = %err, "request failed");
                err.kind()
            }
        };
        metrics::record_request(Req::NAME, outcome, started.elapsed());

        result
    }

    async fn dispatch<Req: Request, Resp: Response>(
        &self,
        mut request: Req,
        cancel: &CancelToken,
    ) -> Result<Resp> {
        if !self.transport.is_connected() {
            return Err(Error::NotConnected);
        }

        let request_type = resolve(Req::NAME)?;
        let response_type = resolve(Resp::NAME)?;

        let account_id = self.credentials.account_id().await;
        stamp_account_id(&mut request, account_id)?;

        let client_msg_id = Uuid::new_v4().to_string();
        let envelope =
            Envelope::wrap(request_type, &request).with_client_msg_id(client_msg_id.as_str());

        if cancel.is_cancelled() {
            return Err(Error::RequestCancelled {
                request: Req::NAME,
            });
        }

        // Replies may be published before send_message returns
        let pending = PendingCall::<Resp>::open(
            &self.transport.inbound(),
            Req::NAME,
            response_type,
            self.timeout,
        );

        debug!(
            request = %request_type,
            expects = %response_type,
            client_msg_id = %client_msg_id,
            "sending request"
        );
        self.transport
            .send_message(envelope)
            .await
            .map_err(Error::Connection)?;

        pending.wait(cancel).await
    }
}

/// One in-flight request.
struct PendingCall<R> {
    request: &'static str,
    expected: PayloadType,
    timeout: Duration,
    deadline: Instant,
    subscription: Subscription,
    completion: Completion<Result<R>>,
    outcome: oneshot::Receiver<Result<R>>,
}

impl<R: Response> PendingCall<R> {
    fn open(
        stream: &InboundStream,
        request: &'static str,
        expected: PayloadType,
        timeout: Duration,
    ) -> Self {
        let (completion, outcome) = completion();
        debug!(request, expects = %expected, "subscription opened");
        Self {
            request,
            expected,
            timeout,
            deadline: Instant::now() + timeout,
            subscription: stream.subscribe(),
            completion,
            outcome,
        }
    }

    /// Race the reply against the deadline and `cancel`. Whichever arm
    /// finishes first resolves the slot; the subscription is released
    /// before the outcome is read.
    async fn wait(self, cancel: &CancelToken) -> Result<R> {
        let PendingCall {
            request,
            expected,
            timeout,
            deadline,
            mut subscription,
            mut completion,
            outcome,
        } = self;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                completion.resolve(Err(Error::RequestCancelled { request }));
            }
            matched = tokio::time::timeout_at(deadline, next_match::<R>(&mut subscription, expected)) => {
                completion.resolve(
                    matched.unwrap_or_else(|_| Err(Error::RequestTimeout { request, timeout })),
                );
            }
        }

        drop(subscription);
        drop(completion);
        // An unresolved slot closes the receiver
        outcome.await.unwrap_or(Err(Error::StreamClosed))
    }
}

/// First inbound message of type `expected` that decodes as `R`.
async fn next_match<R: Response>(
    subscription: &mut Subscription,
    expected: PayloadType,
) -> Result<R> {
    while let Some(event) = subscription.recv().await {
        let envelope = match event {
            StreamEvent::Message(envelope) => envelope,
            StreamEvent::Failed(err) => return Err(Error::StreamFailure(err)),
        };

        match type_of(&envelope) {
            Some(kind) if kind == expected && !kind.is_heartbeat() => {}
            _ => continue,
        }

        match envelope.decode_payload::<R>() {
            Ok(response) => return Ok(response),
            Err(err) => warn!(expected = %expected, error = %err, "skipping undecodable reply"),
        }
    }
    Err(Error::StreamClosed)
}
