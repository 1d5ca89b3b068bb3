//! Open API session core
//!
//! Request/response correlation and authentication sequencing over an
//! abstract transport. The protocol has no request id the server must echo,
//! so every request is matched to the first inbound reply of its expected
//! payload type.
//!
//! Session lifecycle:
//! 1. Host builds a `Transport` and a shared `CredentialStore`
//! 2. `Session::logon` connects, authorizes the application, then the account
//! 3. `Session::send` issues typed requests stamped with the account id
//! 4. `Session::refresh_token` returns a new `Token`; the host (or
//!    `spawn_refresh_task`) stores it
//! 5. `Session::dispose` logs out and releases the transport

pub mod cancel;
pub mod completion;
pub mod correlation;
pub mod error;
pub mod metrics;
pub mod refresh;
pub mod session;
pub mod state;
pub mod stream;
pub mod transport;

#[cfg(test)]
mod testing;

pub use cancel::CancelToken;
pub use correlation::Correlator;
pub use error::{Error, Result};
pub use refresh::{RefreshOutcome, refresh_cycle, spawn_refresh_task};
pub use session::Session;
pub use state::{SessionEvent, SessionState, transition};
pub use stream::{InboundStream, StreamEvent, Subscription};
pub use transport::{MemoryTransport, Transport, TransportError, TransportFuture};
