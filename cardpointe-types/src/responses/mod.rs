//! Wrappers over gateway replies.
//!
//! Every reply is copied into an [`Attributes`] container and its numeric
//! fields are normalized right away, so `amount` reads as minor units no
//! matter how the gateway formatted it. A declined transaction is not an
//! error: check [`Response::success`] and read `resptext` for the reason.

mod settlement;

use std::ops::{Deref, Index};

use serde::{Serialize, Serializer};

use crate::domain::{Attributes, Map, Schema, Value};

pub use settlement::{SettlementResponse, SettlementStatus};

/// The `respstat` value of an approved transaction.
pub const APPROVED: &str = "A";

/// Returns `true` when `respstat` is the approval code.
pub fn is_approved(attrs: &Attributes) -> bool {
    attrs.get_str("respstat") == Some(APPROVED)
}

/// A normalized gateway reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    attrs: Attributes,
    schema: Schema,
}

impl Response {
    /// Wraps `attrs`, normalizing the fields `schema` declares numeric.
    pub fn new(attrs: impl Into<Attributes>, schema: Schema) -> Self {
        let mut attrs = attrs.into();
        schema.normalize(&mut attrs);
        Self { attrs, schema }
    }

    /// Whether the gateway approved the transaction.
    pub fn success(&self) -> bool {
        is_approved(&self.attrs)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.attrs.get_str(key)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.attrs.get_i64(key)
    }

    /// Gateway reference id of the transaction.
    pub fn retref(&self) -> Option<&str> {
        self.get_str("retref")
    }

    /// `A` approved, `B` retry, `C` declined.
    pub fn respstat(&self) -> Option<&str> {
        self.get_str("respstat")
    }

    pub fn respcode(&self) -> Option<&str> {
        self.get_str("respcode")
    }

    /// Human-readable status, e.g. the decline reason.
    pub fn resptext(&self) -> Option<&str> {
        self.get_str("resptext")
    }

    pub fn authcode(&self) -> Option<&str> {
        self.get_str("authcode")
    }

    /// Amount in minor units.
    pub fn amount(&self) -> Option<i64> {
        self.get_i64("amount")
    }

    /// Masked account or token returned by the gateway.
    pub fn token(&self) -> Option<&str> {
        self.get_str("token")
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attrs
    }

    pub fn into_attributes(self) -> Attributes {
        self.attrs
    }

    /// A plain map of every field as it is now.
    pub fn to_serializable(&self) -> Map {
        self.schema.serialize(&self.attrs)
    }

    pub fn to_json(&self) -> String {
        Value::Object(self.to_serializable()).to_string()
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attrs
    }
}

impl Index<&str> for Response {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        &self.attrs[key]
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_serializable().serialize(serializer)
    }
}

macro_rules! define_responses {
    ($(
        $(#[$meta:meta])*
        $name:ident { numeric: [$($numeric:literal),* $(,)?] }
    ),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq)]
            pub struct $name(Response);

            impl $name {
                pub const SCHEMA: Schema = Schema {
                    required: &[],
                    casts: &[],
                    numeric: &[$($numeric),*],
                };

                pub fn new(attrs: impl Into<Attributes>) -> Self {
                    Self(Response::new(attrs, Self::SCHEMA))
                }

                pub fn into_inner(self) -> Response {
                    self.0
                }
            }

            impl Deref for $name {
                type Target = Response;

                fn deref(&self) -> &Response {
                    &self.0
                }
            }

            impl From<Map> for $name {
                fn from(map: Map) -> Self {
                    Self::new(map)
                }
            }

            impl Index<&str> for $name {
                type Output = Value;

                fn index(&self, key: &str) -> &Value {
                    &self.0[key]
                }
            }

            impl Serialize for $name {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    self.0.serialize(serializer)
                }
            }
        )*
    };
}

define_responses! {
    /// Reply to an authorization without capture.
    AuthorizationResponse { numeric: ["amount"] },
    /// Reply to a capture, or to an authorization with `capture` set.
    CaptureResponse { numeric: ["amount"] },
    VoidResponse { numeric: ["amount"] },
    RefundResponse { numeric: ["amount"] },
    /// Current state of a single transaction.
    InquireResponse { numeric: ["amount"] },
    /// One transaction inside a settlement batch.
    SettlementTransaction { numeric: ["setlamount"] },
}

/// Outcome of an authorization.
///
/// Which variant comes back is decided by the request's `capture` flag,
/// not by the gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthorizationResult {
    Authorized(AuthorizationResponse),
    Captured(CaptureResponse),
}

impl AuthorizationResult {
    /// The reply, whichever shape it has.
    pub fn response(&self) -> &Response {
        match self {
            AuthorizationResult::Authorized(res) => &res.0,
            AuthorizationResult::Captured(res) => &res.0,
        }
    }

    pub fn success(&self) -> bool {
        self.response().success()
    }

    pub fn retref(&self) -> Option<&str> {
        self.response().retref()
    }

    pub fn is_captured(&self) -> bool {
        matches!(self, AuthorizationResult::Captured(_))
    }
}

impl Serialize for AuthorizationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.response().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn approved_auth() -> Map {
        object(json!({
            "respstat": "A",
            "retref": "343005123105",
            "account": "9418594164541111",
            "token": "9418594164541111",
            "amount": "5.00",
            "merchid": "496160873888",
            "respcode": "00",
            "resptext": "Approval",
            "authcode": "PPS568",
            "commcard": "N"
        }))
    }

    #[test]
    fn test_amount_normalized() {
        let res = AuthorizationResponse::new(approved_auth());
        assert_eq!(res.amount(), Some(500));
        assert_eq!(res["amount"], json!(500));
    }

    #[test]
    fn test_integer_amount_unchanged() {
        let mut map = approved_auth();
        map.insert("amount".into(), json!(1234));
        let res = CaptureResponse::new(map);
        assert_eq!(res.amount(), Some(1234));
    }

    #[test]
    fn test_success_on_approval() {
        let res = AuthorizationResponse::new(approved_auth());
        assert!(res.success());
        assert_eq!(res.retref(), Some("343005123105"));
        assert_eq!(res.authcode(), Some("PPS568"));
    }

    #[test]
    fn test_decline_is_not_success() {
        let mut map = approved_auth();
        map.insert("respstat".into(), json!("C"));
        map.insert("resptext".into(), json!("Insufficient funds"));
        let res = AuthorizationResponse::new(map);
        assert!(!res.success());
        assert_eq!(res.resptext(), Some("Insufficient funds"));
    }

    #[test]
    fn test_missing_respstat_is_not_success() {
        let res = VoidResponse::new(Map::new());
        assert!(!res.success());
    }

    #[test]
    fn test_non_numeric_fields_untouched() {
        let res = AuthorizationResponse::new(approved_auth());
        assert_eq!(res["account"], json!("9418594164541111"));
        assert_eq!(res["respcode"], json!("00"));
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let res = RefundResponse::new(approved_auth());
        let reparsed: Value = serde_json::from_str(&res.to_json()).unwrap();

        assert_eq!(reparsed["amount"], json!(500));
        assert_eq!(reparsed["retref"], json!("343005123105"));
        assert_eq!(reparsed["commcard"], json!("N"));

        let again = RefundResponse::new(object(reparsed));
        assert_eq!(again, res);
    }

    #[test]
    fn test_authorization_result_variants() {
        let authorized = AuthorizationResult::Authorized(AuthorizationResponse::new(approved_auth()));
        let captured = AuthorizationResult::Captured(CaptureResponse::new(approved_auth()));

        assert!(!authorized.is_captured());
        assert!(captured.is_captured());
        assert!(authorized.success() && captured.success());
        assert_eq!(captured.retref(), Some("343005123105"));
    }
}
