use crate::core::Currency;
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Order lifecycle statuses reported by the gateway. Never set locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,
    Pending,
    Canceled,
    Completed,
    WaitingForConfirmation,
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(OrderStatus::New),
            "PENDING" => Ok(OrderStatus::Pending),
            "CANCELED" => Ok(OrderStatus::Canceled),
            "COMPLETED" => Ok(OrderStatus::Completed),
            "WAITING_FOR_CONFIRMATION" => Ok(OrderStatus::WaitingForConfirmation),
            other => Err(format!("unknown order status: {}", other)),
        }
    }
}

/// Refund lifecycle statuses reported by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundStatus {
    Pending,
    Finalized,
    Canceled,
}

impl FromStr for RefundStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(RefundStatus::Pending),
            "FINALIZED" => Ok(RefundStatus::Finalized),
            "CANCELED" => Ok(RefundStatus::Canceled),
            other => Err(format!("unknown refund status: {}", other)),
        }
    }
}

/// Request-level status codes returned in the `status` envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStatus {
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "WARNING_CONTINUE_REDIRECT")]
    WarningContinueRedirect,
    #[serde(rename = "WARNING_CONTINUE_3DS")]
    WarningContinue3ds,
    #[serde(rename = "WARNING_CONTINUE_CVV")]
    WarningContinueCvv,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusObj {
    pub status_code: ResponseStatus,
    #[serde(default)]
    pub status_desc: Option<String>,
}

impl StatusObj {
    pub fn is_success(&self) -> bool {
        self.status_code == ResponseStatus::Success
    }
}

/// One product line sent with an order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductData {
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_product: Option<bool>,
}

/// Buyer contact subset forwarded to the gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Parameters for registering a new order
#[derive(Debug, Clone)]
pub struct NewOrderRequest {
    pub ext_order_id: String,
    pub currency: Currency,
    pub total_amount: Decimal,
    pub customer_ip: Option<String>,
    pub description: Option<String>,
    pub products: Vec<ProductData>,
    pub buyer: Option<BuyerData>,
    pub notify_url: Option<String>,
    pub continue_url: Option<String>,
    pub validity_time: Option<u64>,
    pub visible_description: Option<String>,
    pub additional_description: Option<String>,
    pub statement_description: Option<String>,
    pub card_on_file: Option<String>,
    pub recurring: Option<String>,
    pub pay_methods: Option<Value>,
    pub settings: Option<Value>,
    /// Extra top-level fields, passed through verbatim for forward
    /// compatibility with gateway API additions
    pub extra: Map<String, Value>,
}

impl NewOrderRequest {
    pub fn new(ext_order_id: impl Into<String>, currency: Currency, total_amount: Decimal) -> Self {
        NewOrderRequest {
            ext_order_id: ext_order_id.into(),
            currency,
            total_amount,
            customer_ip: None,
            description: None,
            products: Vec::new(),
            buyer: None,
            notify_url: None,
            continue_url: None,
            validity_time: None,
            visible_description: None,
            additional_description: None,
            statement_description: None,
            card_on_file: None,
            recurring: None,
            pay_methods: None,
            settings: None,
            extra: Map::new(),
        }
    }
}

/// Parameters for requesting a refund. The order id is path-scoped and
/// deliberately absent here.
#[derive(Debug, Clone, Default)]
pub struct RefundRequest {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub ext_refund_id: Option<String>,
    pub currency_code: Option<Currency>,
    pub bank_description: Option<String>,
    pub refund_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderResponse {
    #[serde(default)]
    pub status: Option<StatusObj>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub ext_order_id: Option<String>,
    #[serde(default)]
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRecord {
    #[serde(default)]
    pub refund_id: Option<String>,
    #[serde(default)]
    pub ext_refund_id: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub currency_code: Option<Currency>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub creation_date_time: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub status: Option<RefundStatus>,
    #[serde(default)]
    pub status_date_time: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundResponse {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub refund: Option<RefundRecord>,
    #[serde(default)]
    pub status: Option<StatusObj>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationResponse {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub ext_order_id: Option<String>,
    #[serde(default)]
    pub status: Option<StatusObj>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeResponse {
    #[serde(default)]
    pub status: Option<StatusObj>,
}

/// One order as returned by the order-info endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderData {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub ext_order_id: Option<String>,
    #[serde(default)]
    pub order_create_date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub notify_url: Option<String>,
    #[serde(default)]
    pub customer_ip: Option<String>,
    #[serde(default)]
    pub merchant_pos_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub currency_code: Option<Currency>,
    #[serde(default)]
    pub total_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_order_status")]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub buyer: Option<Value>,
    #[serde(default)]
    pub products: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInfoResponse {
    #[serde(default)]
    pub orders: Vec<OrderData>,
    #[serde(default)]
    pub status: Option<StatusObj>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopBalance {
    #[serde(default)]
    pub currency_code: Option<Currency>,
    #[serde(default)]
    pub total: Option<Decimal>,
    #[serde(default)]
    pub available: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopInfoResponse {
    #[serde(default)]
    pub shop_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub currency_code: Option<Currency>,
    #[serde(default)]
    pub balance: Option<ShopBalance>,
}

/// Parameters for creating a payout. Amount stays in minor units: the
/// payout endpoints are not centified by the gateway.
#[derive(Debug, Clone, Default)]
pub struct PayoutRequest {
    pub shop_id: String,
    pub amount: Option<i64>,
    pub description: Option<String>,
    pub ext_payout_id: Option<String>,
}

/// Statuses are compared leniently: an unknown status string degrades to
/// `None` instead of failing the whole response, matching how notification
/// payloads are treated.
fn lenient_order_status<'de, D>(deserializer: D) -> Result<Option<OrderStatus>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok()))
}
