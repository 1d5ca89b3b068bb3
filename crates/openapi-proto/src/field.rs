//! Explicit field tables for outgoing messages
//!
//! Each request type declares the fields that may be set by name through
//! `field_table!`. Setting a field outside the table is a no-op that returns
//! `false`, so callers can stamp a value onto any request and let types that
//! don't carry the field ignore it.
//!
//! Values are coerced to the declared field type through a fixed table:
//! identity, `Int32` <-> `Int64`, and `UInt32` <-> `UInt64`. Narrowing is
//! checked. Every other combination is a `FieldTypeMismatch`.

use std::fmt;

use crate::error::{ProtoError, Result};

/// Field that carries the trading account identifier on account-scoped requests.
pub const ACCOUNT_ID_FIELD: &str = "ctid_trader_account_id";

/// Declared type of a settable message field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int32,
    Int64,
    UInt32,
    UInt64,
    Bool,
    Text,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FieldKind::Int32 => "int32",
            FieldKind::Int64 => "int64",
            FieldKind::UInt32 => "uint32",
            FieldKind::UInt64 => "uint64",
            FieldKind::Bool => "bool",
            FieldKind::Text => "string",
        };
        f.write_str(label)
    }
}

/// A value to assign to a message field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Bool(bool),
    Text(String),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Int32(_) => FieldKind::Int32,
            FieldValue::Int64(_) => FieldKind::Int64,
            FieldValue::UInt32(_) => FieldKind::UInt32,
            FieldValue::UInt64(_) => FieldKind::UInt64,
            FieldValue::Bool(_) => FieldKind::Bool,
            FieldValue::Text(_) => FieldKind::Text,
        }
    }

    /// Convert this value to `target` using the fixed conversion table.
    ///
    /// `field` only labels the error.
    pub fn coerce(self, target: FieldKind, field: &str) -> Result<FieldValue> {
        let found = self.kind();
        let mismatch = || ProtoError::FieldTypeMismatch {
            field: field.to_string(),
            expected: target,
            found,
        };

        match (self, target) {
            (value, target) if value.kind() == target => Ok(value),
            (FieldValue::Int32(v), FieldKind::Int64) => Ok(FieldValue::Int64(i64::from(v))),
            (FieldValue::Int64(v), FieldKind::Int32) => i32::try_from(v)
                .map(FieldValue::Int32)
                .map_err(|_| mismatch()),
            (FieldValue::UInt32(v), FieldKind::UInt64) => Ok(FieldValue::UInt64(u64::from(v))),
            (FieldValue::UInt64(v), FieldKind::UInt32) => u32::try_from(v)
                .map(FieldValue::UInt32)
                .map_err(|_| mismatch()),
            _ => Err(mismatch()),
        }
    }
}

/// Set a named field on a message.
pub trait FieldAccess {
    /// Returns `Ok(false)` when the message has no settable field called
    /// `name`; `Ok(true)` once the coerced value is assigned.
    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<bool>;
}

/// A Rust field type that can receive a `FieldValue`.
pub trait FieldSlot {
    const KIND: FieldKind;

    fn assign(&mut self, value: FieldValue, field: &str) -> Result<()>;
}

macro_rules! impl_field_slot {
    ($ty:ty, $kind:ident) => {
        impl FieldSlot for $ty {
            const KIND: FieldKind = FieldKind::$kind;

            fn assign(&mut self, value: FieldValue, field: &str) -> Result<()> {
                match value.coerce(Self::KIND, field)? {
                    FieldValue::$kind(v) => {
                        *self = v;
                        Ok(())
                    }
                    other => Err(ProtoError::FieldTypeMismatch {
                        field: field.to_string(),
                        expected: Self::KIND,
                        found: other.kind(),
                    }),
                }
            }
        }
    };
}

impl_field_slot!(i32, Int32);
impl_field_slot!(i64, Int64);
impl_field_slot!(u32, UInt32);
impl_field_slot!(u64, UInt64);
impl_field_slot!(bool, Bool);
impl_field_slot!(String, Text);

impl<T: FieldSlot + Default> FieldSlot for Option<T> {
    const KIND: FieldKind = T::KIND;

    fn assign(&mut self, value: FieldValue, field: &str) -> Result<()> {
        let mut inner = T::default();
        inner.assign(value, field)?;
        *self = Some(inner);
        Ok(())
    }
}

/// Implement `FieldAccess` for a message from the list of its settable fields.
macro_rules! field_table {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::field::FieldAccess for $ty {
            #[allow(unused_variables)]
            fn set_field(
                &mut self,
                name: &str,
                value: $crate::field::FieldValue,
            ) -> $crate::error::Result<bool> {
                match name {
                    $(
                        stringify!($field) => {
                            $crate::field::FieldSlot::assign(&mut self.$field, value, name)?;
                            Ok(true)
                        }
                    )*
                    _ => Ok(false),
                }
            }
        }
    };
}

pub(crate) use field_table;

/// Stamp the account identifier onto a request that carries one.
///
/// Returns `Ok(false)` for request types without an account field.
pub fn stamp_account_id<M: FieldAccess + ?Sized>(message: &mut M, account_id: i64) -> Result<bool> {
    message.set_field(ACCOUNT_ID_FIELD, FieldValue::Int64(account_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{
        ProtoOaAccountAuthReq, ProtoOaApplicationAuthReq, ProtoOaRefreshTokenReq,
        ProtoOaVersionReq,
    };

    #[test]
    fn stamps_account_id_when_field_present() {
        let mut req = ProtoOaAccountAuthReq::default();
        assert!(stamp_account_id(&mut req, 12345).unwrap());
        assert_eq!(req.ctid_trader_account_id, 12345);
    }

    #[test]
    fn absent_field_is_a_noop() {
        let mut req = ProtoOaVersionReq::default();
        assert!(!stamp_account_id(&mut req, 12345).unwrap());

        let mut app = ProtoOaApplicationAuthReq {
            client_id: "id".into(),
            client_secret: "secret".into(),
        };
        assert!(!stamp_account_id(&mut app, 12345).unwrap());
        assert_eq!(app.client_id, "id");
    }

    #[test]
    fn field_names_are_case_sensitive() {
        let mut req = ProtoOaAccountAuthReq::default();
        let set = req
            .set_field("CtidTraderAccountId", FieldValue::Int64(7))
            .unwrap();
        assert!(!set);
        assert_eq!(req.ctid_trader_account_id, 0);
    }

    #[test]
    fn int32_widens_into_int64_field() {
        let mut req = ProtoOaAccountAuthReq::default();
        assert!(req.set_field(ACCOUNT_ID_FIELD, FieldValue::Int32(42)).unwrap());
        assert_eq!(req.ctid_trader_account_id, 42);
    }

    #[test]
    fn text_into_integer_field_is_a_mismatch() {
        let mut req = ProtoOaAccountAuthReq::default();
        let err = req
            .set_field(ACCOUNT_ID_FIELD, FieldValue::Text("12345".into()))
            .unwrap_err();
        assert_eq!(
            err,
            ProtoError::FieldTypeMismatch {
                field: ACCOUNT_ID_FIELD.into(),
                expected: FieldKind::Int64,
                found: FieldKind::Text,
            }
        );
    }

    #[test]
    fn string_fields_accept_text() {
        let mut req = ProtoOaRefreshTokenReq::default();
        assert!(req
            .set_field("refresh_token", FieldValue::Text("rt_abc".into()))
            .unwrap());
        assert_eq!(req.refresh_token, "rt_abc");
    }

    #[test]
    fn narrowing_is_checked() {
        assert_eq!(
            FieldValue::Int64(99).coerce(FieldKind::Int32, "f").unwrap(),
            FieldValue::Int32(99)
        );
        assert!(FieldValue::Int64(i64::MAX)
            .coerce(FieldKind::Int32, "f")
            .is_err());
        assert_eq!(
            FieldValue::UInt64(7).coerce(FieldKind::UInt32, "f").unwrap(),
            FieldValue::UInt32(7)
        );
        assert!(FieldValue::UInt64(u64::MAX)
            .coerce(FieldKind::UInt32, "f")
            .is_err());
    }

    #[test]
    fn sign_changes_are_not_in_the_table() {
        let err = FieldValue::Int64(1)
            .coerce(FieldKind::UInt64, "f")
            .unwrap_err();
        assert!(matches!(err, ProtoError::FieldTypeMismatch { .. }));
        assert!(FieldValue::Bool(true).coerce(FieldKind::Int32, "f").is_err());
    }

    #[test]
    fn optional_slot_receives_value() {
        let mut slot: Option<i64> = None;
        slot.assign(FieldValue::Int32(5), "f").unwrap();
        assert_eq!(slot, Some(5));
    }
}
