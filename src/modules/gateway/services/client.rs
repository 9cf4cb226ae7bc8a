//! Typed client for the PayU REST API.
//!
//! Holds the OAuth2 bearer token and its expiry; every authenticated call
//! re-acquires the token when it is absent or about to expire. Amount
//! fields are centified on the way out and normalized back to decimals on
//! the way in, except for the endpoints the gateway leaves un-centified.

use crate::config::PayuConfig;
use crate::modules::gateway::models::api_types::{
    CancellationResponse, ChargeResponse, NewOrderRequest, NewOrderResponse, OrderInfoResponse,
    PayoutRequest, ProductData, RefundRequest, RefundResponse, ShopInfoResponse,
};
use crate::modules::gateway::services::minor_units::{to_major_units, to_minor_units};
use crate::modules::gateway::services::transport::{
    RequestBody, Transport, TransportRequest, TransportResponse,
};
use crate::core::{Error, Result};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Tokens expiring within this margin are refreshed before use
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
struct CachedToken {
    /// Full `Authorization` header value, e.g. `Bearer abc123`
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct OAuthGrant {
    access_token: String,
    token_type: String,
    expires_in: u64,
}

pub struct PayuClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    pos_id: u64,
    oauth_client_id: String,
    oauth_client_secret: String,
    token: Mutex<Option<CachedToken>>,
}

impl PayuClient {
    pub fn new(config: &PayuConfig, transport: Arc<dyn Transport>) -> Self {
        PayuClient {
            transport,
            base_url: config.effective_base_url(),
            pos_id: config.pos_id,
            oauth_client_id: config.oauth_client_id.clone(),
            oauth_client_secret: config.oauth_client_secret.clone(),
            token: Mutex::new(None),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn cached_token(&self) -> Option<String> {
        let guard = self
            .token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard
            .as_ref()
            .filter(|token| token.expires_at > Instant::now() + TOKEN_REFRESH_MARGIN)
            .map(|token| token.value.clone())
    }

    /// Obtain an OAuth2 access token via the client-credentials grant.
    ///
    /// Concurrent refreshes may race; re-acquiring a token is idempotent,
    /// so the last writer simply wins.
    async fn authorize(&self) -> Result<String> {
        let response = self
            .transport
            .send(TransportRequest {
                method: Method::POST,
                url: self.url("/oauth/authorize"),
                authorization: None,
                body: Some(RequestBody::Form(vec![
                    ("grant_type".to_string(), "client_credentials".to_string()),
                    ("client_id".to_string(), self.oauth_client_id.clone()),
                    ("client_secret".to_string(), self.oauth_client_secret.clone()),
                ])),
            })
            .await?;

        if response.status != 200 {
            return Err(Error::Credentials {
                raw: response.into_raw(),
            });
        }

        let grant: OAuthGrant = serde_json::from_str(&response.body)?;
        let value = format!("{} {}", capitalize(&grant.token_type), grant.access_token);
        let cached = CachedToken {
            value: value.clone(),
            expires_at: Instant::now() + Duration::from_secs(grant.expires_in),
        };

        let mut guard = self
            .token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(cached);

        Ok(value)
    }

    async fn bearer_token(&self) -> Result<String> {
        if let Some(token) = self.cached_token() {
            return Ok(token);
        }
        self.authorize().await
    }

    async fn send_authorized(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
    ) -> Result<TransportResponse> {
        let authorization = self.bearer_token().await?;
        self.transport
            .send(TransportRequest {
                method,
                url: self.url(path),
                authorization: Some(authorization),
                body,
            })
            .await
    }

    /// Normalize a successful JSON response and deserialize it
    fn decode<T: serde::de::DeserializeOwned>(&self, response: &TransportResponse) -> Result<T> {
        let normalized = to_major_units(&response.json()?)?;
        Ok(serde_json::from_value(normalized)?)
    }

    /// Register a new order.
    ///
    /// 302 is a success: it signals the redirect-based checkout flow and
    /// must not be treated as an error (redirects are never followed by
    /// the transport).
    pub async fn new_order(&self, request: NewOrderRequest) -> Result<NewOrderResponse> {
        let products = if request.products.is_empty() {
            // The gateway requires at least one product line
            vec![ProductData {
                name: "Total order".to_string(),
                unit_price: request.total_amount,
                quantity: 1,
                virtual_product: None,
            }]
        } else {
            request.products.clone()
        };

        let mut body = json!({
            "extOrderId": request.ext_order_id,
            "customerIp": request.customer_ip.as_deref().unwrap_or("127.0.0.1"),
            "merchantPosId": self.pos_id.to_string(),
            "description": request.description.as_deref().unwrap_or("Payment order"),
            "currencyCode": request.currency,
            "totalAmount": request.total_amount,
            "products": products,
        });

        let optional_fields = [
            ("notifyUrl", request.notify_url.map(Value::from)),
            ("continueUrl", request.continue_url.map(Value::from)),
            ("validityTime", request.validity_time.map(Value::from)),
            (
                "visibleDescription",
                request.visible_description.map(Value::from),
            ),
            (
                "additionalDescription",
                request.additional_description.map(Value::from),
            ),
            (
                "statementDescription",
                request.statement_description.map(Value::from),
            ),
            ("cardOnFile", request.card_on_file.map(Value::from)),
            ("recurring", request.recurring.map(Value::from)),
            ("payMethods", request.pay_methods),
            ("settings", request.settings),
        ];
        if let Value::Object(fields) = &mut body {
            for (key, value) in optional_fields {
                if let Some(value) = value {
                    fields.insert(key.to_string(), value);
                }
            }
            if let Some(buyer) = &request.buyer {
                fields.insert("buyer".to_string(), serde_json::to_value(buyer)?);
            }
            for (key, value) in &request.extra {
                fields.insert(key.clone(), value.clone());
            }
        }

        let body = to_minor_units(&body)?;
        let response = self
            .send_authorized(Method::POST, "/api/v2_1/orders", Some(RequestBody::Json(body)))
            .await?;

        match response.status {
            200 | 201 | 302 => self.decode(&response),
            _ => Err(Error::Lock {
                raw: response.into_raw(),
            }),
        }
    }

    /// Request a refund for an existing order. The order id scopes the
    /// path and is never part of the body.
    pub async fn refund(&self, order_id: &str, request: RefundRequest) -> Result<RefundResponse> {
        let mut refund = json!({
            "description": request.description.as_deref().unwrap_or("Refund"),
        });
        if let Value::Object(fields) = &mut refund {
            if let Some(amount) = request.amount {
                fields.insert("amount".to_string(), serde_json::to_value(amount)?);
            }
            if let Some(ext_refund_id) = request.ext_refund_id {
                fields.insert("extRefundId".to_string(), Value::from(ext_refund_id));
            }
            if let Some(currency_code) = request.currency_code {
                fields.insert(
                    "currencyCode".to_string(),
                    serde_json::to_value(currency_code)?,
                );
            }
            if let Some(bank_description) = request.bank_description {
                fields.insert("bankDescription".to_string(), Value::from(bank_description));
            }
            if let Some(refund_type) = request.refund_type {
                fields.insert("type".to_string(), Value::from(refund_type));
            }
        }

        let body = json!({ "refund": to_minor_units(&refund)? });
        let response = self
            .send_authorized(
                Method::POST,
                &format!("/api/v2_1/orders/{}/refunds", order_id),
                Some(RequestBody::Json(body)),
            )
            .await?;

        match response.status {
            200 => self.decode(&response),
            _ => Err(Error::Refund {
                raw: response.into_raw(),
            }),
        }
    }

    /// Cancel an existing order, releasing any lock it holds
    pub async fn cancel_order(&self, order_id: &str) -> Result<CancellationResponse> {
        let response = self
            .send_authorized(
                Method::DELETE,
                &format!("/api/v2_1/orders/{}", order_id),
                None,
            )
            .await?;

        match response.status {
            200 => self.decode(&response),
            _ => Err(Error::communication("cancelling order", response.into_raw())),
        }
    }

    /// Capture (charge) a previously authorized order
    pub async fn capture(&self, order_id: &str) -> Result<ChargeResponse> {
        let response = self
            .send_authorized(
                Method::POST,
                &format!("/api/v2_1/orders/{}/captures", order_id),
                None,
            )
            .await?;

        match response.status {
            200 => self.decode(&response),
            _ => Err(Error::Charge {
                raw: response.into_raw(),
            }),
        }
    }

    /// Retrieve order details
    pub async fn get_order_info(&self, order_id: &str) -> Result<OrderInfoResponse> {
        let response = self
            .send_authorized(Method::GET, &format!("/api/v2_1/orders/{}", order_id), None)
            .await?;

        match response.status {
            200 => self.decode(&response),
            _ => Err(Error::communication(
                "retrieving order info",
                response.into_raw(),
            )),
        }
    }

    /// Retrieve shop information, including balances
    pub async fn get_shop_info(&self, shop_id: &str) -> Result<ShopInfoResponse> {
        let response = self
            .send_authorized(Method::GET, &format!("/api/v2_1/shops/{}", shop_id), None)
            .await?;

        match response.status {
            200 => self.decode(&response),
            _ => Err(Error::communication(
                "retrieving shop info",
                response.into_raw(),
            )),
        }
    }

    /// Retrieve available payment methods. Returned as received: the
    /// gateway does not centify this response.
    pub async fn get_payment_methods(&self, lang: Option<&str>) -> Result<Value> {
        let path = match lang {
            Some(lang) => format!("/api/v2_1/paymethods?lang={}", lang),
            None => "/api/v2_1/paymethods".to_string(),
        };
        let response = self.send_authorized(Method::GET, &path, None).await?;

        match response.status {
            200 => response.json(),
            _ => Err(Error::communication(
                "retrieving payment methods",
                response.into_raw(),
            )),
        }
    }

    /// Retrieve transaction details for an order, as received
    pub async fn get_transaction(&self, order_id: &str) -> Result<Value> {
        let response = self
            .send_authorized(
                Method::GET,
                &format!("/api/v2_1/orders/{}/transactions", order_id),
                None,
            )
            .await?;

        match response.status {
            200 => response.json(),
            _ => Err(Error::communication(
                "retrieving transaction",
                response.into_raw(),
            )),
        }
    }

    /// Retrieve all refunds recorded for an order, as received
    pub async fn get_refunds(&self, order_id: &str) -> Result<Value> {
        let response = self
            .send_authorized(
                Method::GET,
                &format!("/api/v2_1/orders/{}/refunds", order_id),
                None,
            )
            .await?;

        match response.status {
            200 => response.json(),
            _ => Err(Error::communication(
                "retrieving refunds",
                response.into_raw(),
            )),
        }
    }

    /// Retrieve one refund, as received
    pub async fn get_refund(&self, order_id: &str, refund_id: &str) -> Result<Value> {
        let response = self
            .send_authorized(
                Method::GET,
                &format!("/api/v2_1/orders/{}/refunds/{}", order_id, refund_id),
                None,
            )
            .await?;

        match response.status {
            200 => response.json(),
            _ => Err(Error::communication(
                "retrieving refund",
                response.into_raw(),
            )),
        }
    }

    /// Create a payout withdrawing funds from the shop account
    pub async fn create_payout(&self, request: PayoutRequest) -> Result<Value> {
        let mut body = json!({ "shopId": request.shop_id });
        let mut payout = serde_json::Map::new();
        if let Some(amount) = request.amount {
            payout.insert("amount".to_string(), Value::from(amount));
        }
        if let Some(description) = request.description {
            payout.insert("description".to_string(), Value::from(description));
        }
        if let Some(ext_payout_id) = request.ext_payout_id {
            payout.insert("extPayoutId".to_string(), Value::from(ext_payout_id));
        }
        if let (Value::Object(fields), false) = (&mut body, payout.is_empty()) {
            fields.insert("payout".to_string(), Value::Object(payout));
        }

        let response = self
            .send_authorized(
                Method::POST,
                "/api/v2_1/payouts",
                Some(RequestBody::Json(body)),
            )
            .await?;

        match response.status {
            200 => response.json(),
            _ => Err(Error::communication("creating payout", response.into_raw())),
        }
    }

    /// Retrieve payout details, as received
    pub async fn get_payout(&self, payout_id: &str) -> Result<Value> {
        let response = self
            .send_authorized(Method::GET, &format!("/api/v2_1/payouts/{}", payout_id), None)
            .await?;

        match response.status {
            200 => response.json(),
            _ => Err(Error::communication(
                "retrieving payout",
                response.into_raw(),
            )),
        }
    }

    /// Delete a stored payment token
    pub async fn delete_token(&self, token: &str) -> Result<()> {
        let response = self
            .send_authorized(Method::DELETE, &format!("/api/v2_1/tokens/{}", token), None)
            .await?;

        match response.status {
            200 | 204 => Ok(()),
            _ => Err(Error::communication("deleting token", response.into_raw())),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
