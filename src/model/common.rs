//! Shared value types and the payload shaping behind every `save`.
//!
//! # Module Structure
//! - [`Money`] and [`UnixTime`]: wire-exact value types
//! - [`Ident`] and [`ProcessingStatus`]: envelopes shared by entities
//! - `entity_payload()`: serializes an entity into a create or update body

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// JSON object payloads exchanged with the API.
pub(crate) type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Builds a payload from string fields.
pub(crate) fn params(fields: &[(&str, &str)]) -> JsonObject {
    fields
        .iter()
        .map(|(key, value)| ((*key).to_string(), serde_json::Value::from(*value)))
        .collect()
}

/// An amount of money in a given currency.
///
/// `amount` is in cents: 120 for 1.20 EUR. Amounts stay integral so JSON
/// round-trips are exact.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Money {
    pub currency: String,
    pub amount: i64,
}

impl Money {
    pub fn new(currency: impl Into<String>, amount: i64) -> Self {
        Money {
            currency: currency.into(),
            amount,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.amount < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}.{:02} {}",
            sign,
            (self.amount / 100).unsigned_abs(),
            (self.amount % 100).unsigned_abs(),
            self.currency
        )
    }
}

/// A server-side timestamp in Unix seconds.
///
/// The service encodes timestamps as JSON numbers and occasionally emits
/// them in scientific notation (`1.419864482e9`), so deserialization
/// accepts integer and float forms alike; serialization always writes a
/// plain integer. Dates the server never set are zero, or `null` on the
/// wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UnixTime(pub i64);

impl UnixTime {
    /// True for timestamps the service has never set.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Serialize for UnixTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

struct UnixTimeVisitor;

impl Visitor<'_> for UnixTimeVisitor {
    type Value = UnixTime;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a Unix timestamp as an integer or float")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<UnixTime, E> {
        Ok(UnixTime(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<UnixTime, E> {
        Ok(UnixTime(value as i64))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> std::result::Result<UnixTime, E> {
        Ok(UnixTime(value as i64))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<UnixTime, E> {
        Ok(UnixTime(0))
    }
}

impl<'de> Deserialize<'de> for UnixTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(UnixTimeVisitor)
    }
}

impl fmt::Display for UnixTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("never");
        }
        match chrono::DateTime::from_timestamp(self.0, 0) {
            Some(moment) => write!(f, "{}", moment.to_rfc3339()),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Identity fields shared by every persisted entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Ident {
    pub id: String,
    pub tag: String,
    pub creation_date: UnixTime,
}

impl Ident {
    /// True until the entity has been persisted once.
    pub fn is_transient(&self) -> bool {
        self.id.is_empty()
    }
}

/// Reply envelope shared by transactional entities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProcessingStatus {
    #[serde(flatten)]
    pub ident: Ident,
    pub status: String,
    pub result_code: String,
    pub result_message: String,
    pub execution_date: UnixTime,
}

impl ProcessingStatus {
    /// True when the service reports the transaction as rejected.
    pub fn failed(&self) -> bool {
        self.status == "FAILED"
    }
}

/// Codes reported in `ResultCode` on failed transactions.
///
/// See <https://docs.mangopay.com/api-references/error-codes/>.
pub mod result_code {
    // Web pay-in errors
    pub const USER_NOT_REDIRECTED: &str = "001031";
    pub const USER_CANCELLED_PAYMENT: &str = "001031";
    pub const USER_FILLING_PAYMENT_CARD_DETAILS: &str = "001032";
    pub const USER_NOT_REDIRECTED_PAYMENT_SESSION_EXPIRED: &str = "001033";
    pub const USER_LET_PAYMENT_SESSION_EXPIRE_WITHOUT_PAYING: &str = "001034";

    // Generic transaction errors
    pub const USER_NOT_COMPLETE_TRANSACTION: &str = "101001";
    pub const TRANSACTION_CANCELLED_BY_USER: &str = "101002";
    pub const TRANSACTION_AMOUNT_TOO_HIGH: &str = "001011";

    // 3-D Secure errors
    pub const SECURE_MODE_NOT_AVAILABLE: &str = "101399";
    pub const SECURE_MODE_SESSION_EXPIRED: &str = "101304";
    pub const SECURE_MODE_CARD_NOT_COMPATIBLE: &str = "101303";
    pub const SECURE_MODE_CARD_NOT_ENROLLED: &str = "101302";
    pub const SECURE_MODE_AUTHENTICATION_FAILED: &str = "101301";
}

/// Whether `save` hits the create or the update route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SaveMode {
    Create,
    Update,
}

/// Fields the server owns on every resource; they never belong in a
/// request payload.
const SERVER_OWNED: &[&str] = &[
    "CreationDate",
    "ExecutionDate",
    "ResultCode",
    "ResultMessage",
    "Status",
];

/// Serializes `entity` into the payload for a create or update call.
///
/// Server-owned fields and the per-entity `strip` list are always removed,
/// `Id` is removed on create, and updates additionally drop every
/// zero-valued field so they stay sparse.
pub(crate) fn entity_payload<T: Serialize>(entity: &T, mode: SaveMode, strip: &[&str]) -> Result<JsonObject> {
    let serde_json::Value::Object(mut data) = serde_json::to_value(entity)? else {
        return Err(Error::Validation("entity did not serialize to a JSON object".into()));
    };
    if mode == SaveMode::Create {
        data.remove("Id");
    }
    for field in SERVER_OWNED.iter().chain(strip) {
        data.remove(*field);
    }
    if mode == SaveMode::Update {
        data.retain(|_, value| !is_zero_value(value));
    }
    Ok(data)
}

/// Zero values never make it into update payloads, so settled server-side
/// fields are not overwritten with blanks.
fn is_zero_value(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::String(text) => text.is_empty(),
        serde_json::Value::Number(number) => number.as_f64() == Some(0.0),
        _ => false,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "PascalCase")]
    struct Fixture {
        id: String,
        tag: String,
        creation_date: i64,
        status: String,
        description: String,
        count: i64,
    }

    fn fixture() -> Fixture {
        Fixture {
            id: "F1".into(),
            tag: "".into(),
            creation_date: 1419864482,
            status: "CREATED".into(),
            description: "".into(),
            count: 0,
        }
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new("EUR", 120).to_string(), "1.20 EUR");
        assert_eq!(Money::new("EUR", 5).to_string(), "0.05 EUR");
        assert_eq!(Money::new("USD", 0).to_string(), "0.00 USD");
        assert_eq!(Money::new("GBP", -1250).to_string(), "-12.50 GBP");
        assert_eq!(Money::new("JPY", i64::MIN).to_string(), "-92233720368547758.08 JPY");
    }

    #[test]
    fn test_money_wire_casing() {
        let encoded = serde_json::to_value(Money::new("EUR", 120)).unwrap();
        assert_eq!(encoded, json!({"Currency": "EUR", "Amount": 120}));
    }

    #[test]
    fn test_unix_time_accepts_scientific_notation() {
        let time: UnixTime = serde_json::from_str("1.419864482e9").unwrap();
        assert_eq!(time, UnixTime(1419864482));
    }

    #[test]
    fn test_unix_time_accepts_null() {
        let time: UnixTime = serde_json::from_str("null").unwrap();
        assert!(time.is_zero());
    }

    #[test]
    fn test_unix_time_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&UnixTime(1419864482)).unwrap(), "1419864482");
    }

    #[test]
    fn test_unix_time_display() {
        assert_eq!(UnixTime(0).to_string(), "never");
        assert_eq!(UnixTime(1419864482).to_string(), "2014-12-29T14:48:02+00:00");
    }

    #[test]
    fn test_create_payload_strips_id_and_server_fields() {
        let payload = entity_payload(&fixture(), SaveMode::Create, &[]).unwrap();
        assert!(!payload.contains_key("Id"));
        assert!(!payload.contains_key("CreationDate"));
        assert!(!payload.contains_key("Status"));
        // empty fields still travel on create
        assert_eq!(payload.get("Tag"), Some(&json!("")));
        assert_eq!(payload.get("Count"), Some(&json!(0)));
    }

    #[test]
    fn test_update_payload_is_sparse() {
        let payload = entity_payload(&fixture(), SaveMode::Update, &[]).unwrap();
        assert_eq!(payload.get("Id"), Some(&json!("F1")));
        assert!(!payload.contains_key("Tag"));
        assert!(!payload.contains_key("Description"));
        assert!(!payload.contains_key("Count"));
        assert!(!payload.contains_key("Status"));
    }

    #[test]
    fn test_extra_strip_list_applies() {
        let payload = entity_payload(&fixture(), SaveMode::Create, &["Count"]).unwrap();
        assert!(!payload.contains_key("Count"));
        assert!(payload.contains_key("Description"));
    }

    #[test]
    fn test_zero_value_classification() {
        assert!(is_zero_value(&json!(null)));
        assert!(is_zero_value(&json!("")));
        assert!(is_zero_value(&json!(0)));
        assert!(is_zero_value(&json!(0.0)));
        assert!(!is_zero_value(&json!("x")));
        assert!(!is_zero_value(&json!(1)));
        assert!(!is_zero_value(&json!(false)));
        assert!(!is_zero_value(&json!([])));
        assert!(!is_zero_value(&json!({})));
    }

    #[test]
    fn test_params_builder() {
        let payload = params(&[("Id", "W1"), ("UserId", "U1")]);
        assert_eq!(payload.get("Id"), Some(&json!("W1")));
        assert_eq!(payload.get("UserId"), Some(&json!("U1")));
        assert_eq!(payload.len(), 2);
    }

    #[test]
    fn test_processing_status_failed() {
        let mut processing = ProcessingStatus::default();
        assert!(!processing.failed());
        processing.status = "FAILED".into();
        assert!(processing.failed());
    }
}
