//! Open API protocol registry
//!
//! The subset of the Open API message schema the session layer exchanges:
//! payload type identifiers, the protobuf message structs, the outer
//! `Envelope` frame, and an explicit per-message field table used to stamp
//! account identifiers onto outgoing requests.
//!
//! Message structs are declared by hand with `prost` derives rather than
//! generated by a build script, so the crate has no protoc dependency.

pub mod envelope;
pub mod error;
pub mod field;
pub mod messages;
pub mod payload;

pub use envelope::Envelope;
pub use error::{ProtoError, Result};
pub use field::{ACCOUNT_ID_FIELD, FieldAccess, FieldKind, FieldValue, stamp_account_id};
pub use messages::*;
pub use payload::{PayloadType, resolve, type_of};

/// A protobuf message that belongs to the protocol registry.
///
/// `NAME` is the message name as declared in the protocol schema. It is the
/// key the payload resolver uses to find the wire identifier.
pub trait ProtoMessage: prost::Message + Default + Clone + 'static {
    const NAME: &'static str;
}

/// A message the client sends and expects a correlated reply to.
pub trait Request: ProtoMessage + FieldAccess {}

/// A message that arrives on the inbound stream (responses and events).
pub trait Response: ProtoMessage {}
