//! In-process transport
//!
//! Records every outbound envelope and answers through an optional scripted
//! responder. Replies are published to the inbound stream while
//! `send_message` is still running, which is the tightest ordering a real
//! connection can produce: the reply lands before the sender regains
//! control.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use openapi_proto::{Envelope, PayloadType, ProtoMessage, type_of};
use tracing::debug;

use super::{Transport, TransportError, TransportFuture};
use crate::stream::InboundStream;

type Responder = Box<dyn Fn(&Envelope) -> Vec<Envelope> + Send + Sync>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub struct MemoryTransport {
    connected: AtomicBool,
    terminated: AtomicBool,
    connect_calls: AtomicUsize,
    connect_error: Mutex<Option<TransportError>>,
    send_error: Mutex<Option<TransportError>>,
    responder: Mutex<Option<Responder>>,
    sent: Mutex<Vec<Envelope>>,
    inbound: InboundStream,
}

impl MemoryTransport {
    /// A transport that has not connected yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that is already connected.
    pub fn connected() -> Self {
        let transport = Self::default();
        transport.connected.store(true, Ordering::SeqCst);
        transport
    }

    /// Answer each outbound envelope with the envelopes `responder` returns.
    pub fn with_responder(
        self,
        responder: impl Fn(&Envelope) -> Vec<Envelope> + Send + Sync + 'static,
    ) -> Self {
        self.set_responder(responder);
        self
    }

    pub fn set_responder(
        &self,
        responder: impl Fn(&Envelope) -> Vec<Envelope> + Send + Sync + 'static,
    ) {
        *lock(&self.responder) = Some(Box::new(responder));
    }

    /// Make every subsequent `connect` fail with `error`.
    pub fn fail_connect_with(&self, error: TransportError) {
        *lock(&self.connect_error) = Some(error);
    }

    /// Make every subsequent `send_message` fail with `error`.
    pub fn fail_send_with(&self, error: TransportError) {
        *lock(&self.send_error) = Some(error);
    }

    /// Publish an inbound envelope. Returns how many subscribers saw it.
    pub fn push(&self, envelope: Envelope) -> usize {
        self.inbound.publish(envelope)
    }

    /// Publish a registry message as an inbound envelope.
    pub fn push_message<M: ProtoMessage>(&self, message: &M) -> openapi_proto::Result<usize> {
        Ok(self.push(Envelope::from_message(message)?))
    }

    /// Complete the inbound stream with a failure.
    pub fn fail_stream(&self, error: TransportError) {
        self.inbound.fail(error);
    }

    /// Complete the inbound stream normally.
    pub fn close_stream(&self) {
        self.inbound.close();
    }

    /// Every envelope written so far, oldest first.
    pub fn sent(&self) -> Vec<Envelope> {
        lock(&self.sent).clone()
    }

    /// Payload types of every envelope written so far.
    pub fn sent_types(&self) -> Vec<Option<PayloadType>> {
        lock(&self.sent).iter().map(type_of).collect()
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }
}

impl Transport for MemoryTransport {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst) && !self.is_terminated()
    }

    fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    fn connect(&self) -> TransportFuture<'_> {
        Box::pin(async move {
            self.connect_calls.fetch_add(1, Ordering::SeqCst);
            if self.is_terminated() {
                return Err(TransportError::Terminated);
            }
            if let Some(err) = lock(&self.connect_error).clone() {
                return Err(err);
            }
            self.connected.store(true, Ordering::SeqCst);
            Ok(())
        })
    }

    fn send_message(&self, envelope: Envelope) -> TransportFuture<'_> {
        Box::pin(async move {
            if self.is_terminated() {
                return Err(TransportError::Terminated);
            }
            if !self.is_connected() {
                return Err(TransportError::Send("not connected".into()));
            }
            if let Some(err) = lock(&self.send_error).clone() {
                return Err(err);
            }

            lock(&self.sent).push(envelope.clone());

            let replies = match lock(&self.responder).as_ref() {
                Some(responder) => responder(&envelope),
                None => Vec::new(),
            };
            for reply in replies {
                let delivered = self.inbound.publish(reply);
                debug!(delivered, "memory transport published reply");
            }
            Ok(())
        })
    }

    fn inbound(&self) -> InboundStream {
        self.inbound.clone()
    }

    fn dispose(&self) {
        self.terminated.store(true, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
        self.inbound.close();
    }
}
