//! Payload type registry
//!
//! Maps a message's schema name to its wire-level payload identifier, and an
//! inbound envelope's identifier back to its runtime type for dispatch.
//!
//! Registry keys use the protocol enumeration's spelling
//! (`ProtoOaApplicationAuthReq`) while message schema names use the upper-case
//! acronym (`ProtoOAApplicationAuthReq`). Resolution is case-insensitive so the
//! two spellings meet.

use std::fmt;

use crate::envelope::Envelope;
use crate::error::{ProtoError, Result};

/// Wire-level payload identifiers known to the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum PayloadType {
    ProtoErrorRes = 50,
    ProtoHeartbeatEvent = 51,
    ProtoOaApplicationAuthReq = 2100,
    ProtoOaApplicationAuthRes = 2101,
    ProtoOaAccountAuthReq = 2102,
    ProtoOaAccountAuthRes = 2103,
    ProtoOaVersionReq = 2104,
    ProtoOaVersionRes = 2105,
    ProtoOaTraderReq = 2121,
    ProtoOaTraderRes = 2122,
    ProtoOaErrorRes = 2142,
    ProtoOaClientDisconnectEvent = 2148,
    ProtoOaAccountLogoutReq = 2162,
    ProtoOaAccountLogoutRes = 2163,
    ProtoOaAccountDisconnectEvent = 2164,
    ProtoOaRefreshTokenReq = 2173,
    ProtoOaRefreshTokenRes = 2174,
}

impl PayloadType {
    /// Every registered payload type, in identifier order.
    pub const ALL: [PayloadType; 17] = [
        PayloadType::ProtoErrorRes,
        PayloadType::ProtoHeartbeatEvent,
        PayloadType::ProtoOaApplicationAuthReq,
        PayloadType::ProtoOaApplicationAuthRes,
        PayloadType::ProtoOaAccountAuthReq,
        PayloadType::ProtoOaAccountAuthRes,
        PayloadType::ProtoOaVersionReq,
        PayloadType::ProtoOaVersionRes,
        PayloadType::ProtoOaTraderReq,
        PayloadType::ProtoOaTraderRes,
        PayloadType::ProtoOaErrorRes,
        PayloadType::ProtoOaClientDisconnectEvent,
        PayloadType::ProtoOaAccountLogoutReq,
        PayloadType::ProtoOaAccountLogoutRes,
        PayloadType::ProtoOaAccountDisconnectEvent,
        PayloadType::ProtoOaRefreshTokenReq,
        PayloadType::ProtoOaRefreshTokenRes,
    ];

    /// Numeric identifier carried in `Envelope::payload_type`.
    pub fn id(self) -> u32 {
        self as u32
    }

    /// Registry key for this payload type.
    pub fn name(self) -> &'static str {
        match self {
            PayloadType::ProtoErrorRes => "ProtoErrorRes",
            PayloadType::ProtoHeartbeatEvent => "ProtoHeartbeatEvent",
            PayloadType::ProtoOaApplicationAuthReq => "ProtoOaApplicationAuthReq",
            PayloadType::ProtoOaApplicationAuthRes => "ProtoOaApplicationAuthRes",
            PayloadType::ProtoOaAccountAuthReq => "ProtoOaAccountAuthReq",
            PayloadType::ProtoOaAccountAuthRes => "ProtoOaAccountAuthRes",
            PayloadType::ProtoOaVersionReq => "ProtoOaVersionReq",
            PayloadType::ProtoOaVersionRes => "ProtoOaVersionRes",
            PayloadType::ProtoOaTraderReq => "ProtoOaTraderReq",
            PayloadType::ProtoOaTraderRes => "ProtoOaTraderRes",
            PayloadType::ProtoOaErrorRes => "ProtoOaErrorRes",
            PayloadType::ProtoOaClientDisconnectEvent => "ProtoOaClientDisconnectEvent",
            PayloadType::ProtoOaAccountLogoutReq => "ProtoOaAccountLogoutReq",
            PayloadType::ProtoOaAccountLogoutRes => "ProtoOaAccountLogoutRes",
            PayloadType::ProtoOaAccountDisconnectEvent => "ProtoOaAccountDisconnectEvent",
            PayloadType::ProtoOaRefreshTokenReq => "ProtoOaRefreshTokenReq",
            PayloadType::ProtoOaRefreshTokenRes => "ProtoOaRefreshTokenRes",
        }
    }

    /// Look up a payload type by its numeric identifier.
    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.id() == id)
    }

    /// Keep-alive events never satisfy a pending request.
    pub fn is_heartbeat(self) -> bool {
        self == PayloadType::ProtoHeartbeatEvent
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.id())
    }
}

/// Resolve a message schema name to its payload type.
///
/// Matching ignores ASCII case. Names with no registry entry fail with
/// `UnknownPayloadType`.
// TODO: switch to exact matching once every message NAME uses the registry
// spelling; case folding is what lets `ProtoOA*` meet `ProtoOa*` today.
pub fn resolve(name: &str) -> Result<PayloadType> {
    PayloadType::ALL
        .iter()
        .copied()
        .find(|p| p.name().eq_ignore_ascii_case(name))
        .ok_or_else(|| ProtoError::UnknownPayloadType(name.to_string()))
}

/// Runtime type of an inbound envelope, or `None` for identifiers outside
/// the registry.
pub fn type_of(envelope: &Envelope) -> Option<PayloadType> {
    PayloadType::from_id(envelope.payload_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::*;
    use crate::ProtoMessage;

    #[test]
    fn resolves_schema_names_despite_acronym_case() {
        assert_eq!(
            resolve(ProtoOaApplicationAuthReq::NAME).unwrap(),
            PayloadType::ProtoOaApplicationAuthReq
        );
        assert_eq!(
            resolve(ProtoOaRefreshTokenRes::NAME).unwrap(),
            PayloadType::ProtoOaRefreshTokenRes
        );
        assert_eq!(
            resolve("protooaversionreq").unwrap(),
            PayloadType::ProtoOaVersionReq
        );
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = resolve("ProtoOASymbolsListReq").unwrap_err();
        assert_eq!(
            err,
            ProtoError::UnknownPayloadType("ProtoOASymbolsListReq".into())
        );
        assert_eq!(err.to_string(), "unknown payload type: ProtoOASymbolsListReq");
    }

    #[test]
    fn every_registered_message_resolves() {
        let names = [
            ProtoErrorRes::NAME,
            ProtoHeartbeatEvent::NAME,
            ProtoOaApplicationAuthReq::NAME,
            ProtoOaApplicationAuthRes::NAME,
            ProtoOaAccountAuthReq::NAME,
            ProtoOaAccountAuthRes::NAME,
            ProtoOaVersionReq::NAME,
            ProtoOaVersionRes::NAME,
            ProtoOaTraderReq::NAME,
            ProtoOaTraderRes::NAME,
            ProtoOaErrorRes::NAME,
            ProtoOaClientDisconnectEvent::NAME,
            ProtoOaAccountLogoutReq::NAME,
            ProtoOaAccountLogoutRes::NAME,
            ProtoOaAccountDisconnectEvent::NAME,
            ProtoOaRefreshTokenReq::NAME,
            ProtoOaRefreshTokenRes::NAME,
        ];
        for name in names {
            assert!(resolve(name).is_ok(), "{name} must resolve");
        }
    }

    #[test]
    fn ids_match_protocol_enumeration() {
        assert_eq!(PayloadType::ProtoHeartbeatEvent.id(), 51);
        assert_eq!(PayloadType::ProtoOaApplicationAuthReq.id(), 2100);
        assert_eq!(PayloadType::ProtoOaAccountAuthRes.id(), 2103);
        assert_eq!(PayloadType::ProtoOaRefreshTokenReq.id(), 2173);
        assert_eq!(PayloadType::ProtoOaRefreshTokenRes.id(), 2174);
    }

    #[test]
    fn type_of_maps_known_ids_only() {
        let known = Envelope {
            payload_type: 2101,
            ..Default::default()
        };
        let unknown = Envelope {
            payload_type: 9999,
            ..Default::default()
        };
        assert_eq!(type_of(&known), Some(PayloadType::ProtoOaApplicationAuthRes));
        assert_eq!(type_of(&unknown), None);
    }

    #[test]
    fn only_heartbeat_is_keepalive() {
        let keepalives: Vec<_> = PayloadType::ALL
            .iter()
            .filter(|p| p.is_heartbeat())
            .collect();
        assert_eq!(keepalives, vec![&PayloadType::ProtoHeartbeatEvent]);
    }

    #[test]
    fn display_includes_name_and_id() {
        assert_eq!(
            PayloadType::ProtoOaVersionRes.to_string(),
            "ProtoOaVersionRes(2105)"
        );
    }
}
