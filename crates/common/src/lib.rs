//! Common types shared by the Open API session crates

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
