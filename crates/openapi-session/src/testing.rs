//! Shared fixtures for session tests

use std::sync::Arc;

use openapi_auth::{ConnectionInfo, CredentialStore, Mode, Token};
use openapi_proto::*;

use crate::transport::MemoryTransport;

pub const ACCOUNT_ID: i64 = 12345;

pub fn token(access: &str, refresh: &str) -> Token {
    Token::from_lifetime(access.into(), refresh.into(), 3600, "bearer".into()).unwrap()
}

pub fn store() -> Arc<CredentialStore> {
    Arc::new(CredentialStore::new(
        ConnectionInfo::new(Mode::Demo, "client-1", "secret-1", ACCOUNT_ID)
            .with_token(token("at_old", "rt_old")),
    ))
}

pub fn store_without_token() -> Arc<CredentialStore> {
    Arc::new(CredentialStore::new(ConnectionInfo::new(
        Mode::Demo,
        "client-1",
        "secret-1",
        ACCOUNT_ID,
    )))
}

pub fn reply<M: ProtoMessage>(message: &M) -> Envelope {
    Envelope::from_message(message).unwrap()
}

/// Answers auth, version, trader, and refresh requests the way a healthy
/// server does.
pub fn healthy_server(request: &Envelope) -> Vec<Envelope> {
    match type_of(request) {
        Some(PayloadType::ProtoOaApplicationAuthReq) => vec![reply(&ProtoOaApplicationAuthRes {})],
        Some(PayloadType::ProtoOaAccountAuthReq) => {
            let req: ProtoOaAccountAuthReq = request.decode_payload().unwrap();
            vec![reply(&ProtoOaAccountAuthRes {
                ctid_trader_account_id: req.ctid_trader_account_id,
            })]
        }
        Some(PayloadType::ProtoOaVersionReq) => vec![reply(&ProtoOaVersionRes {
            version: "88".into(),
        })],
        Some(PayloadType::ProtoOaTraderReq) => {
            let req: ProtoOaTraderReq = request.decode_payload().unwrap();
            vec![reply(&ProtoOaTraderRes {
                ctid_trader_account_id: req.ctid_trader_account_id,
                trader: None,
            })]
        }
        Some(PayloadType::ProtoOaRefreshTokenReq) => vec![reply(&ProtoOaRefreshTokenRes {
            access_token: Some("abc".into()),
            token_type: Some("bearer".into()),
            expires_in: Some(3600),
            refresh_token: Some("def".into()),
        })],
        _ => Vec::new(),
    }
}

pub fn healthy_transport() -> Arc<MemoryTransport> {
    Arc::new(MemoryTransport::connected().with_responder(healthy_server))
}

/// Yield until the transport's inbound stream has `count` observers.
pub async fn wait_for_subscribers(transport: &MemoryTransport, count: usize) {
    use crate::transport::Transport;
    while transport.inbound().subscriber_count() < count {
        tokio::task::yield_now().await;
    }
}
