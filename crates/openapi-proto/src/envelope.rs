//! Outer wire frame
//!
//! Every message on the connection travels inside an `Envelope` (the
//! protocol's `ProtoMessage`): a payload type identifier, the encoded inner
//! message, and an optional client-chosen message id the server echoes back.

use prost::Message;

use crate::error::{ProtoError, Result};
use crate::payload::{PayloadType, resolve};
use crate::ProtoMessage;

#[derive(Clone, PartialEq, Message)]
pub struct Envelope {
    #[prost(uint32, tag = "1")]
    pub payload_type: u32,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub payload: Option<Vec<u8>>,
    #[prost(string, optional, tag = "3")]
    pub client_msg_id: Option<String>,
}

impl Envelope {
    /// Wrap a message under an already-resolved payload type.
    pub fn wrap<M: ProtoMessage>(payload_type: PayloadType, message: &M) -> Self {
        Self {
            payload_type: payload_type.id(),
            payload: Some(message.encode_to_vec()),
            client_msg_id: None,
        }
    }

    /// Wrap a message, resolving its payload type from the registry.
    pub fn from_message<M: ProtoMessage>(message: &M) -> Result<Self> {
        let payload_type = resolve(M::NAME)?;
        Ok(Self::wrap(payload_type, message))
    }

    pub fn with_client_msg_id(mut self, id: impl Into<String>) -> Self {
        self.client_msg_id = Some(id.into());
        self
    }

    /// Decode the inner message. A missing payload decodes as the default
    /// message, matching proto2 semantics for empty bodies.
    pub fn decode_payload<M: ProtoMessage>(&self) -> Result<M> {
        let bytes = self.payload.as_deref().unwrap_or_default();
        M::decode(bytes).map_err(|source| ProtoError::Decode {
            message: M::NAME,
            source,
        })
    }

    /// Encode the whole frame.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode_to_vec()
    }

    /// Decode a whole frame.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Envelope::decode(bytes).map_err(|source| ProtoError::Decode {
            message: "ProtoMessage",
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{ProtoHeartbeatEvent, ProtoOaAccountAuthRes, ProtoOaVersionRes};

    #[test]
    fn from_message_resolves_payload_type() {
        let env = Envelope::from_message(&ProtoOaVersionRes {
            version: "88".into(),
        })
        .unwrap();
        assert_eq!(env.payload_type, PayloadType::ProtoOaVersionRes.id());
        let inner: ProtoOaVersionRes = env.decode_payload().unwrap();
        assert_eq!(inner.version, "88");
    }

    #[test]
    fn missing_payload_decodes_as_default() {
        let env = Envelope {
            payload_type: PayloadType::ProtoHeartbeatEvent.id(),
            payload: None,
            client_msg_id: None,
        };
        let inner: ProtoHeartbeatEvent = env.decode_payload().unwrap();
        assert_eq!(inner, ProtoHeartbeatEvent {});
    }

    #[test]
    fn malformed_payload_reports_message_name() {
        let env = Envelope {
            payload_type: PayloadType::ProtoOaAccountAuthRes.id(),
            payload: Some(vec![0xff, 0xff, 0xff]),
            client_msg_id: None,
        };
        let err = env.decode_payload::<ProtoOaAccountAuthRes>().unwrap_err();
        assert!(
            err.to_string().contains("ProtoOAAccountAuthRes"),
            "got: {err}"
        );
    }

    #[test]
    fn frame_bytes_keep_client_msg_id() {
        let env = Envelope::from_message(&ProtoOaAccountAuthRes {
            ctid_trader_account_id: 12345,
        })
        .unwrap()
        .with_client_msg_id("req-1");
        let decoded = Envelope::from_bytes(&env.to_bytes()).unwrap();
        assert_eq!(decoded, env);
        assert_eq!(decoded.client_msg_id.as_deref(), Some("req-1"));
    }
}
