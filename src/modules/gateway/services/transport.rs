//! HTTP transport capability.
//!
//! The gateway client never talks to `reqwest` directly; it issues
//! [`TransportRequest`]s through this trait. [`HttpTransport`] is the
//! production implementation, tests substitute a scripted one. Retry,
//! backoff and timeouts are the transport's (or its caller's) concern and
//! are not implemented here.

use crate::core::{RawResponse, Result};
use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::{header, Client, Method};
use serde_json::Value;

#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(Value),
    Form(Vec<(String, String)>),
}

#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    /// Full `Authorization` header value, when the call is authenticated
    pub authorization: Option<String>,
    pub body: Option<RequestBody>,
}

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_str(&self.body)?)
    }

    pub fn into_raw(self) -> RawResponse {
        RawResponse {
            status: self.status,
            body: self.body,
        }
    }
}

/// Sends one request and returns the status code plus raw body
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// `reqwest`-backed transport.
///
/// Redirects are never followed: a 302 on order creation is a success
/// signal that must reach the client, not be chased.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        // Same construction-time panic contract as `Client::new`
        let client = Client::builder()
            .redirect(Policy::none())
            .build()
            .expect("failed to build HTTP client");
        HttpTransport { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let mut builder = self.client.request(request.method, &request.url);

        if let Some(authorization) = request.authorization {
            builder = builder.header(header::AUTHORIZATION, authorization);
        }

        match request.body {
            Some(RequestBody::Json(value)) => builder = builder.json(&value),
            Some(RequestBody::Form(fields)) => builder = builder.form(&fields),
            None => {}
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(TransportResponse { status, body })
    }
}
