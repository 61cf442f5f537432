//! Settlement batch summaries.

use std::ops::{Deref, Index};

use serde::{Serialize, Serializer};

use super::{Response, SettlementTransaction};
use crate::domain::{Attributes, Map, Schema, Value};

/// One settlement batch for a business day.
///
/// The `txns` list is decomposed into typed, normalized
/// [`SettlementTransaction`] entries. The normalized entries are written
/// back in place under `txns` so serializing the batch shows them too.
/// Entries that are not objects stay where they were, and a `txns` that is
/// not a list is left untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementResponse {
    inner: Response,
    txns: Vec<SettlementTransaction>,
}

impl SettlementResponse {
    pub const SCHEMA: Schema = Schema {
        required: &[],
        casts: &[],
        numeric: &["refundtotal", "chargetotal"],
    };

    pub fn new(attrs: impl Into<Attributes>) -> Self {
        let mut inner = Response::new(attrs, Self::SCHEMA);

        let entries = match inner.get("txns") {
            Some(Value::Array(entries)) => Some(entries.clone()),
            _ => None,
        };

        let mut txns = Vec::new();
        if let Some(entries) = entries {
            let mut normalized = Vec::with_capacity(entries.len());
            for entry in entries {
                match entry {
                    Value::Object(map) => {
                        let txn = SettlementTransaction::new(map);
                        normalized.push(Value::Object(txn.to_serializable()));
                        txns.push(txn);
                    }
                    other => {
                        tracing::warn!(entry = %other, "non-object settlement transaction left as is");
                        normalized.push(other);
                    }
                }
            }
            inner.attributes_mut().set("txns", normalized);
        }

        Self { inner, txns }
    }

    /// Transactions in the order the gateway listed them.
    pub fn transactions(&self) -> &[SettlementTransaction] {
        &self.txns
    }

    /// Batch id assigned by the gateway.
    pub fn batchid(&self) -> Option<&str> {
        self.get_str("batchid")
    }

    /// Whether the processor accepted the batch.
    pub fn host_accepted(&self) -> bool {
        self.get_str("hoststat") == Some("GB")
    }

    pub fn chargetotal(&self) -> Option<i64> {
        self.get_i64("chargetotal")
    }

    pub fn refundtotal(&self) -> Option<i64> {
        self.get_i64("refundtotal")
    }

    pub fn into_inner(self) -> Response {
        self.inner
    }
}

impl SettlementTransaction {
    pub fn setlamount(&self) -> Option<i64> {
        self.get_i64("setlamount")
    }

    /// Settlement status of this transaction, e.g. `Y` settled or `N` rejected.
    pub fn setlstat(&self) -> Option<&str> {
        self.get_str("setlstat")
    }
}

impl Deref for SettlementResponse {
    type Target = Response;

    fn deref(&self) -> &Response {
        &self.inner
    }
}

impl From<Map> for SettlementResponse {
    fn from(map: Map) -> Self {
        Self::new(map)
    }
}

impl Index<&str> for SettlementResponse {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        &self.inner[key]
    }
}

impl Serialize for SettlementResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.inner.serialize(serializer)
    }
}

/// Result of a settlement status query for one day.
#[derive(Debug, Clone, PartialEq)]
pub enum SettlementStatus {
    /// The gateway has no batches for the day.
    NoBatches,
    /// Batches in the order the gateway listed them.
    Batches(Vec<SettlementResponse>),
}

impl SettlementStatus {
    /// The batches, or `None` when there were none.
    pub fn batches(&self) -> Option<&[SettlementResponse]> {
        match self {
            SettlementStatus::NoBatches => None,
            SettlementStatus::Batches(batches) => Some(batches),
        }
    }

    pub fn is_no_batches(&self) -> bool {
        matches!(self, SettlementStatus::NoBatches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn batch() -> Map {
        json!({
            "respproc": "FNOR",
            "refundtotal": "1.00",
            "batchid": "1900942291",
            "chargetotal": "12.34",
            "hoststat": "GB",
            "hostbatch": "1900942291",
            "merchid": "496160873888",
            "txns": [
                {"setlamount": "5.00", "setlstat": "Y", "salesdoc": "1", "retref": "343005123105"},
                {"setlamount": "7.34", "setlstat": "Y", "salesdoc": "2", "retref": "343005123106"}
            ]
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn test_totals_normalized() {
        let res = SettlementResponse::new(batch());
        assert_eq!(res.chargetotal(), Some(1234));
        assert_eq!(res.refundtotal(), Some(100));
        assert_eq!(res.batchid(), Some("1900942291"));
        assert!(res.host_accepted());
    }

    #[test]
    fn test_transactions_typed_and_ordered() {
        let res = SettlementResponse::new(batch());
        let txns = res.transactions();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].setlamount(), Some(500));
        assert_eq!(txns[1].setlamount(), Some(734));
        assert_eq!(txns[1].retref(), Some("343005123106"));
        assert_eq!(txns[0].setlstat(), Some("Y"));
    }

    #[test]
    fn test_serialized_txns_are_normalized() {
        let res = SettlementResponse::new(batch());
        let json: Value = serde_json::to_value(&res).unwrap();
        assert_eq!(json["txns"][0]["setlamount"], json!(500));
        assert_eq!(json["chargetotal"], json!(1234));
    }

    #[test]
    fn test_round_trip() {
        let res = SettlementResponse::new(batch());
        let reparsed: Value = serde_json::from_str(&res.to_json()).unwrap();
        let again = SettlementResponse::new(reparsed.as_object().cloned().unwrap());
        assert_eq!(again, res);
    }

    #[test]
    fn test_missing_txns() {
        let mut map = batch();
        map.remove("txns");
        let res = SettlementResponse::new(map);
        assert!(res.transactions().is_empty());
        assert!(!res.attributes().contains("txns"));
    }

    #[test]
    fn test_null_txns_left_untouched() {
        let mut map = batch();
        map.insert("txns".to_string(), Value::Null);
        let res = SettlementResponse::new(map);
        assert!(res.transactions().is_empty());

        let json: Value = serde_json::to_value(&res).unwrap();
        assert_eq!(json["txns"], Value::Null);
        assert!(json.as_object().unwrap().contains_key("txns"));
    }

    #[test]
    fn test_non_object_txns_kept_in_place() {
        let mut map = batch();
        map.insert(
            "txns".to_string(),
            json!([{"setlamount": "1.00"}, "garbage", {"setlamount": "2.00"}]),
        );
        let res = SettlementResponse::new(map);
        assert_eq!(res.transactions().len(), 2);
        assert_eq!(res.transactions()[1].setlamount(), Some(200));

        let json: Value = serde_json::to_value(&res).unwrap();
        assert_eq!(
            json["txns"],
            json!([{"setlamount": 100}, "garbage", {"setlamount": 200}])
        );

        let reparsed: Value = serde_json::from_str(&res.to_json()).unwrap();
        let again = SettlementResponse::new(reparsed.as_object().cloned().unwrap());
        assert_eq!(again, res);
    }

    #[test]
    fn test_status_helpers() {
        assert!(SettlementStatus::NoBatches.is_no_batches());
        assert_eq!(SettlementStatus::NoBatches.batches(), None);

        let status = SettlementStatus::Batches(vec![SettlementResponse::new(batch())]);
        assert!(!status.is_no_batches());
        assert_eq!(status.batches().map(<[_]>::len), Some(1));
    }
}
