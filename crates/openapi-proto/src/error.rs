//! Error types for protocol registry operations

use crate::field::FieldKind;

/// Errors from payload resolution, field injection, and payload decoding.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProtoError {
    #[error("unknown payload type: {0}")]
    UnknownPayloadType(String),

    #[error("field {field} expects {expected}, got {found}")]
    FieldTypeMismatch {
        field: String,
        expected: FieldKind,
        found: FieldKind,
    },

    #[error("failed to decode {message}: {source}")]
    Decode {
        message: &'static str,
        #[source]
        source: prost::DecodeError,
    },
}

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtoError>;
