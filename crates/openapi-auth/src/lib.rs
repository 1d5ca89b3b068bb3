//! Open API session credentials
//!
//! Holds the identity a session authenticates with and the token it
//! refreshes. This crate has no dependency on the transport or the session
//! core, so hosts can load and inspect credentials on their own.
//!
//! Credential flow:
//! 1. Host loads `ConnectionInfo` via `ConnectionInfo::load()` (or builds it)
//! 2. Host wraps it in a `CredentialStore` shared with the session
//! 3. Session reads client id/secret, account id and access token at logon
//! 4. Session refresh produces a new `Token` from the server-declared lifetime
//! 5. Host (or the background refresh task) stores it via `update_token()`

pub mod config;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod token;

pub use constants::*;
pub use credentials::{ConnectionInfo, CredentialStore, Mode};
pub use error::{Error, Result};
pub use token::{Token, now_millis};
