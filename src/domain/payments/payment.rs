use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

pub const EVENT_PAYMENT_SUCCEEDED: &str = "payment.succeeded";
pub const STATUS_SUCCEEDED: &str = "succeeded";

#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub order_id: i64,
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
    pub return_url: String,
    pub idempotence_key: String,
}

#[derive(Debug, Clone)]
pub struct CreatedPayment {
    pub id: String,
    pub status: String,
    pub confirmation_url: Option<String>,
}

/// Payment state as reported by the provider.
#[derive(Debug, Clone)]
pub struct ProviderPayment {
    pub id: String,
    pub status: String,
    pub paid: bool,
    pub order_id: Option<i64>,
}

/// Webhook delivery from the payment provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentNotification {
    pub event: String,
    pub payment_id: String,
    pub status: String,
    pub order_id: Option<i64>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NotificationError {
    #[error("malformed notification body")]
    Malformed,
    #[error("notification has no payment object id")]
    MissingPaymentId,
    #[error("metadata.order_id is not a valid order id")]
    InvalidOrderId,
}

#[derive(Deserialize)]
struct RawNotification {
    #[serde(default)]
    event: String,
    object: RawObject,
}

#[derive(Deserialize)]
struct RawObject {
    #[serde(default)]
    id: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    metadata: Option<Value>,
}

impl PaymentNotification {
    pub fn parse(body: &[u8]) -> Result<Self, NotificationError> {
        let raw: RawNotification =
            serde_json::from_slice(body).map_err(|_| NotificationError::Malformed)?;
        if raw.object.id.trim().is_empty() {
            return Err(NotificationError::MissingPaymentId);
        }
        let order_id = match raw.object.metadata.as_ref().and_then(|m| m.get("order_id")) {
            None | Some(Value::Null) => None,
            Some(v) => Some(order_id_from_metadata(v).ok_or(NotificationError::InvalidOrderId)?),
        };
        Ok(Self {
            event: raw.event,
            payment_id: raw.object.id,
            status: raw.object.status,
            order_id,
        })
    }

    pub fn is_success(&self) -> bool {
        self.event == EVENT_PAYMENT_SUCCEEDED && self.status == STATUS_SUCCEEDED
    }
}

/// Metadata values come back from the provider as strings, but numbers are accepted too.
pub fn order_id_from_metadata(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_order_id() {
        let body = br#"{"type":"notification","event":"payment.succeeded",
            "object":{"id":"2d1f-000f","status":"succeeded","paid":true,
            "metadata":{"order_id":"42"}}}"#;
        let n = PaymentNotification::parse(body).unwrap();
        assert_eq!(n.payment_id, "2d1f-000f");
        assert_eq!(n.order_id, Some(42));
        assert!(n.is_success());
    }

    #[test]
    fn parses_numeric_order_id_and_other_events() {
        let body = br#"{"event":"payment.canceled","object":{"id":"p1","status":"canceled","metadata":{"order_id":7}}}"#;
        let n = PaymentNotification::parse(body).unwrap();
        assert_eq!(n.order_id, Some(7));
        assert!(!n.is_success());
    }

    #[test]
    fn rejects_bad_bodies() {
        assert_eq!(
            PaymentNotification::parse(b"not json"),
            Err(NotificationError::Malformed)
        );
        assert_eq!(
            PaymentNotification::parse(br#"{"event":"payment.succeeded","object":{"id":""}}"#),
            Err(NotificationError::MissingPaymentId)
        );
        assert_eq!(
            PaymentNotification::parse(
                br#"{"event":"payment.succeeded","object":{"id":"p","metadata":{"order_id":"abc"}}}"#
            ),
            Err(NotificationError::InvalidOrderId)
        );
    }
}
