//! Inbound notification envelope and payload models.
//!
//! The envelope keeps the raw transport body byte-for-byte as received:
//! the signature covers those exact bytes, and any re-serialization would
//! silently break verification. Parsing into [`Notification`] happens only
//! after the signature has been checked.

use crate::modules::gateway::models::api_types::{OrderStatus, RefundStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;

/// One inbound webhook request: exact raw body plus headers.
///
/// Header lookup is case-insensitive; keys are lowercased on construction.
#[derive(Debug, Clone)]
pub struct CallbackEnvelope {
    raw_body: Option<Vec<u8>>,
    headers: HashMap<String, String>,
}

impl CallbackEnvelope {
    pub fn new(
        raw_body: Option<Vec<u8>>,
        headers: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        CallbackEnvelope {
            raw_body,
            headers: headers
                .into_iter()
                .map(|(name, value)| (name.to_lowercase(), value))
                .collect(),
        }
    }

    pub fn raw_body(&self) -> Option<&[u8]> {
        self.raw_body.as_deref()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Parse the body into a [`Notification`]. Only call after the
    /// envelope passed signature verification.
    pub fn notification(&self) -> crate::core::Result<Notification> {
        let body = self
            .raw_body()
            .ok_or(crate::core::CallbackError::MissingBody)?;
        Ok(serde_json::from_slice(body)?)
    }
}

/// A verified gateway notification. Exactly one of `order` / `refund` is
/// present per notification; if both ever appear, the order branch wins.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(default)]
    pub order: Option<OrderNotice>,
    #[serde(default)]
    pub refund: Option<RefundNotice>,
    #[serde(default)]
    pub local_receipt_date_time: Option<String>,
    #[serde(default)]
    pub properties: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNotice {
    #[serde(default, deserialize_with = "lenient_string")]
    pub order_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ext_order_id: Option<String>,
    /// Unknown status strings degrade to `None` (informational no-op)
    #[serde(default, deserialize_with = "lenient_order_status")]
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundNotice {
    #[serde(default, deserialize_with = "lenient_string")]
    pub refund_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ext_refund_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_refund_status")]
    pub status: Option<RefundStatus>,
    /// Refunded amount in minor units, as the gateway sends it
    #[serde(default, deserialize_with = "lenient_minor_units")]
    pub amount: Option<i64>,
}

impl RefundNotice {
    /// Refunded amount in major units. Missing amounts read as zero, as
    /// they did on the wire.
    pub fn amount_major(&self) -> Decimal {
        Decimal::new(self.amount.unwrap_or(0), 2)
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

fn lenient_order_status<'de, D>(deserializer: D) -> Result<Option<OrderStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok()))
}

fn lenient_refund_status<'de, D>(deserializer: D) -> Result<Option<RefundStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok()))
}

fn lenient_minor_units<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }))
}
