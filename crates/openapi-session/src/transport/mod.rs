//! Transport abstraction
//!
//! The session never touches sockets. It drives a `Transport`, which owns the
//! connection lifecycle, frames and writes outbound envelopes, and publishes
//! every inbound envelope to an `InboundStream`. Heartbeat emission and
//! reconnect policy live in the transport implementation.

pub mod memory;

pub use memory::MemoryTransport;

use std::future::Future;
use std::pin::Pin;

use openapi_proto::Envelope;

use crate::stream::InboundStream;

/// Failures reported by a transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    Connect(String),

    #[error("send failed: {0}")]
    Send(String),

    #[error("transport terminated")]
    Terminated,

    #[error("upstream failure: {0}")]
    Upstream(String),
}

/// Boxed future returned by transport operations.
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'a>>;

/// Connection to the Open API endpoint.
///
/// Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility (`Arc<dyn Transport>`).
pub trait Transport: Send + Sync {
    fn is_connected(&self) -> bool;

    /// A terminated transport cannot be reconnected.
    fn is_terminated(&self) -> bool;

    /// Open the connection. Connecting an already connected transport is a
    /// no-op.
    fn connect(&self) -> TransportFuture<'_>;

    /// Frame and write one envelope.
    fn send_message(&self, envelope: Envelope) -> TransportFuture<'_>;

    /// Handle onto the inbound message stream.
    fn inbound(&self) -> InboundStream;

    /// Close the connection and complete the inbound stream.
    fn dispose(&self);
}
