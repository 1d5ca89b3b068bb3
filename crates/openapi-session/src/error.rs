//! Error types for session operations
//!
//! Timeouts and cancellations are kept apart from protocol faults so callers
//! can decide to retry (`is_retryable`) or give up.

use std::time::Duration;

use openapi_proto::{FieldKind, ProtoError};

use crate::transport::TransportError;

/// Errors from request correlation and session sequencing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("transport is not connected")]
    NotConnected,

    #[error("unknown payload type: {0}")]
    UnknownPayloadType(String),

    #[error("field {field} expects {expected}, got {found}")]
    FieldTypeMismatch {
        field: String,
        expected: FieldKind,
        found: FieldKind,
    },

    #[error("request {request} timed out after {timeout:?}")]
    RequestTimeout {
        request: &'static str,
        timeout: Duration,
    },

    #[error("request {request} was cancelled")]
    RequestCancelled { request: &'static str },

    #[error("inbound stream failed: {0}")]
    StreamFailure(#[source] TransportError),

    #[error("inbound stream completed before a response arrived")]
    StreamClosed,

    #[error("connection error: {0}")]
    Connection(#[source] TransportError),

    #[error("no token stored for account {0}")]
    MissingToken(i64),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// A payload that failed to decode, converted from `ProtoError::Decode`.
    /// `send` skips undecodable replies, so this only reaches callers that
    /// decode envelopes from an `InboundStream` subscription themselves.
    #[error("failed to decode {message}: {source}")]
    Decode {
        message: &'static str,
        #[source]
        source: prost::DecodeError,
    },
}

impl Error {
    /// Whether re-issuing the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::RequestTimeout { .. } | Error::RequestCancelled { .. }
        )
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotConnected => "not_connected",
            Error::UnknownPayloadType(_) => "unknown_payload_type",
            Error::FieldTypeMismatch { .. } => "field_type_mismatch",
            Error::RequestTimeout { .. } => "timeout",
            Error::RequestCancelled { .. } => "cancelled",
            Error::StreamFailure(_) => "stream_failure",
            Error::StreamClosed => "stream_closed",
            Error::Connection(_) => "connection",
            Error::MissingToken(_) => "missing_token",
            Error::InvalidToken(_) => "invalid_token",
            Error::Decode { .. } => "decode",
        }
    }
}

impl From<ProtoError> for Error {
    fn from(err: ProtoError) -> Self {
        match err {
            ProtoError::UnknownPayloadType(name) => Error::UnknownPayloadType(name),
            ProtoError::FieldTypeMismatch {
                field,
                expected,
                found,
            } => Error::FieldTypeMismatch {
                field,
                expected,
                found,
            },
            ProtoError::Decode { message, source } => Error::Decode { message, source },
        }
    }
}

impl From<openapi_auth::Error> for Error {
    fn from(err: openapi_auth::Error) -> Self {
        match err {
            openapi_auth::Error::MissingToken(account_id) => Error::MissingToken(account_id),
            openapi_auth::Error::InvalidToken(msg) => Error::InvalidToken(msg),
        }
    }
}

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;
