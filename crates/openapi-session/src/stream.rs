//! Inbound message fan-out
//!
//! A transport publishes every decoded envelope to an `InboundStream`, and
//! each subscriber gets its own unbounded queue of `StreamEvent`s. Events
//! reach every subscriber in publication order. A stream completes once:
//! either with a failure, delivered to each subscriber as a final
//! `StreamEvent::Failed`, or by closing, after which `Subscription::recv`
//! yields `None`.
//!
//! Dropping a `Subscription` unregisters it, so a finished request leaves no
//! observer behind.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use openapi_proto::Envelope;
use tokio::sync::mpsc;
use tracing::debug;

use crate::transport::TransportError;

/// One item delivered to a subscriber.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Message(Envelope),
    Failed(TransportError),
}

#[derive(Default)]
struct Observers {
    completed: bool,
    senders: HashMap<u64, mpsc::UnboundedSender<StreamEvent>>,
}

#[derive(Default)]
struct Shared {
    next_id: AtomicU64,
    observers: Mutex<Observers>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Observers> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Multi-subscriber stream of inbound envelopes.
///
/// Cloning yields another handle onto the same subscriber set.
#[derive(Clone, Default)]
pub struct InboundStream {
    shared: Arc<Shared>,
}

impl InboundStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new observer.
    ///
    /// Subscribing to a completed stream yields a subscription that reports
    /// completion on its first `recv`.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let mut observers = self.shared.lock();
        if !observers.completed {
            observers.senders.insert(id, tx);
        }
        Subscription {
            id,
            rx,
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Deliver an envelope to every current subscriber. Returns how many
    /// received it.
    pub fn publish(&self, envelope: Envelope) -> usize {
        let observers = self.shared.lock();
        if observers.completed {
            return 0;
        }
        observers
            .senders
            .values()
            .filter(|tx| tx.send(StreamEvent::Message(envelope.clone())).is_ok())
            .count()
    }

    /// Complete the stream with a failure.
    pub fn fail(&self, error: TransportError) {
        let mut observers = self.shared.lock();
        if observers.completed {
            return;
        }
        debug!(error = %error, subscribers = observers.senders.len(), "inbound stream failed");
        for tx in observers.senders.values() {
            let _ = tx.send(StreamEvent::Failed(error.clone()));
        }
        observers.senders.clear();
        observers.completed = true;
    }

    /// Complete the stream normally.
    pub fn close(&self) {
        let mut observers = self.shared.lock();
        if observers.completed {
            return;
        }
        debug!(subscribers = observers.senders.len(), "inbound stream closed");
        observers.senders.clear();
        observers.completed = true;
    }

    pub fn is_completed(&self) -> bool {
        self.shared.lock().completed
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.lock().senders.len()
    }
}

/// A registered observer of an `InboundStream`.
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<StreamEvent>,
    shared: Weak<Shared>,
}

impl Subscription {
    /// Next event, or `None` once the stream has completed and the queue is
    /// drained.
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.lock().senders.remove(&self.id);
        }
    }
}
