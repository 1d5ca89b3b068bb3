//! Protocol messages exchanged by the session layer
//!
//! Field tags follow the Open API schema. Tag 1 (`payloadType`) is omitted
//! from every struct: the identifier travels on the `Envelope` instead.
//! Proto2 optional fields are `Option<_>` so presence is observable.

use crate::field::field_table;
use crate::{ProtoMessage, Request, Response};

macro_rules! registry_message {
    ($ty:ident, $name:literal) => {
        impl ProtoMessage for $ty {
            const NAME: &'static str = $name;
        }
    };
}

// --- Common messages ---

/// Generic error reply from the proxy layer.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoErrorRes {
    #[prost(string, tag = "2")]
    pub error_code: String,
    #[prost(string, optional, tag = "3")]
    pub description: Option<String>,
    #[prost(uint64, optional, tag = "4")]
    pub maintenance_end_timestamp: Option<u64>,
}

/// Keep-alive event emitted periodically by both peers.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoHeartbeatEvent {}

// --- Application auth ---

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoOaApplicationAuthReq {
    #[prost(string, tag = "2")]
    pub client_id: String,
    #[prost(string, tag = "3")]
    pub client_secret: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoOaApplicationAuthRes {}

// --- Account auth ---

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoOaAccountAuthReq {
    #[prost(int64, tag = "2")]
    pub ctid_trader_account_id: i64,
    #[prost(string, tag = "3")]
    pub access_token: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoOaAccountAuthRes {
    #[prost(int64, tag = "2")]
    pub ctid_trader_account_id: i64,
}

// --- Version ---

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoOaVersionReq {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoOaVersionRes {
    #[prost(string, tag = "2")]
    pub version: String,
}

// --- Trader ---

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoOaTraderReq {
    #[prost(int64, tag = "2")]
    pub ctid_trader_account_id: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoOaTraderRes {
    #[prost(int64, tag = "2")]
    pub ctid_trader_account_id: i64,
    #[prost(message, optional, tag = "3")]
    pub trader: Option<ProtoOaTrader>,
}

/// Trading account summary carried by `ProtoOaTraderRes`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoOaTrader {
    #[prost(int64, tag = "1")]
    pub ctid_trader_account_id: i64,
    #[prost(int64, tag = "2")]
    pub balance: i64,
    #[prost(int64, optional, tag = "8")]
    pub deposit_asset_id: Option<i64>,
}

// --- Errors and unsolicited events ---

/// Account-level error reply.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoOaErrorRes {
    #[prost(int64, optional, tag = "2")]
    pub ctid_trader_account_id: Option<i64>,
    #[prost(string, tag = "3")]
    pub error_code: String,
    #[prost(string, optional, tag = "4")]
    pub description: Option<String>,
    #[prost(int64, optional, tag = "5")]
    pub maintenance_end_timestamp: Option<i64>,
}

/// Server is about to close the connection.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoOaClientDisconnectEvent {
    #[prost(string, optional, tag = "2")]
    pub reason: Option<String>,
}

/// An authorized account was disconnected server-side.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoOaAccountDisconnectEvent {
    #[prost(int64, tag = "2")]
    pub ctid_trader_account_id: i64,
}

// --- Logout ---

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoOaAccountLogoutReq {
    #[prost(int64, tag = "2")]
    pub ctid_trader_account_id: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoOaAccountLogoutRes {
    #[prost(int64, tag = "2")]
    pub ctid_trader_account_id: i64,
}

// --- Token refresh ---

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoOaRefreshTokenReq {
    #[prost(string, tag = "2")]
    pub refresh_token: String,
}

/// Reply to a token refresh. `expires_in` is a lifetime in seconds.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoOaRefreshTokenRes {
    #[prost(string, optional, tag = "2")]
    pub access_token: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub token_type: Option<String>,
    #[prost(int64, optional, tag = "4")]
    pub expires_in: Option<i64>,
    #[prost(string, optional, tag = "5")]
    pub refresh_token: Option<String>,
}

registry_message!(ProtoErrorRes, "ProtoErrorRes");
registry_message!(ProtoHeartbeatEvent, "ProtoHeartbeatEvent");
registry_message!(ProtoOaApplicationAuthReq, "ProtoOAApplicationAuthReq");
registry_message!(ProtoOaApplicationAuthRes, "ProtoOAApplicationAuthRes");
registry_message!(ProtoOaAccountAuthReq, "ProtoOAAccountAuthReq");
registry_message!(ProtoOaAccountAuthRes, "ProtoOAAccountAuthRes");
registry_message!(ProtoOaVersionReq, "ProtoOAVersionReq");
registry_message!(ProtoOaVersionRes, "ProtoOAVersionRes");
registry_message!(ProtoOaTraderReq, "ProtoOATraderReq");
registry_message!(ProtoOaTraderRes, "ProtoOATraderRes");
registry_message!(ProtoOaErrorRes, "ProtoOAErrorRes");
registry_message!(ProtoOaClientDisconnectEvent, "ProtoOAClientDisconnectEvent");
registry_message!(ProtoOaAccountDisconnectEvent, "ProtoOAAccountDisconnectEvent");
registry_message!(ProtoOaAccountLogoutReq, "ProtoOAAccountLogoutReq");
registry_message!(ProtoOaAccountLogoutRes, "ProtoOAAccountLogoutRes");
registry_message!(ProtoOaRefreshTokenReq, "ProtoOARefreshTokenReq");
registry_message!(ProtoOaRefreshTokenRes, "ProtoOARefreshTokenRes");

field_table!(ProtoOaApplicationAuthReq {
    client_id,
    client_secret
});
field_table!(ProtoOaAccountAuthReq {
    ctid_trader_account_id,
    access_token
});
field_table!(ProtoOaVersionReq {});
field_table!(ProtoOaTraderReq {
    ctid_trader_account_id
});
field_table!(ProtoOaAccountLogoutReq {
    ctid_trader_account_id
});
field_table!(ProtoOaRefreshTokenReq { refresh_token });

impl Request for ProtoOaApplicationAuthReq {}
impl Request for ProtoOaAccountAuthReq {}
impl Request for ProtoOaVersionReq {}
impl Request for ProtoOaTraderReq {}
impl Request for ProtoOaAccountLogoutReq {}
impl Request for ProtoOaRefreshTokenReq {}

impl Response for ProtoErrorRes {}
impl Response for ProtoHeartbeatEvent {}
impl Response for ProtoOaApplicationAuthRes {}
impl Response for ProtoOaAccountAuthRes {}
impl Response for ProtoOaVersionRes {}
impl Response for ProtoOaTraderRes {}
impl Response for ProtoOaErrorRes {}
impl Response for ProtoOaClientDisconnectEvent {}
impl Response for ProtoOaAccountDisconnectEvent {}
impl Response for ProtoOaAccountLogoutRes {}
impl Response for ProtoOaRefreshTokenRes {}
