//! Shared test fixtures: a hand-rolled host payment machine, a scripted
//! transport, and signing helpers for callback bodies.
#![allow(dead_code)]

use async_trait::async_trait;
use payu_connect::callbacks::{CallbackEnvelope, SignatureAlgorithm};
use payu_connect::config::{Environment, PayuConfig};
use payu_connect::core::traits::payment::{BuyerInfo, OrderItem, PaymentHandle, TransitionEvent};
use payu_connect::core::{Currency, TransitionError};
use payu_connect::gateway::{Transport, TransportRequest, TransportResponse};
use payu_connect::Result;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};

pub const SECOND_KEY: &str = "test-second-key";

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub fn test_config() -> PayuConfig {
    PayuConfig {
        environment: Environment::Sandbox,
        pos_id: 300746,
        second_key: SECOND_KEY.to_string(),
        oauth_client_id: "client-id".to_string(),
        oauth_client_secret: "client-secret".to_string(),
        base_url: None,
        notify_url: None,
        continue_url: None,
        allow_md5_callbacks: false,
    }
}

// --- host payment machine double -----------------------------------------

/// Host-side payment statuses, mimicking a typical orchestration
/// framework's machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeStatus {
    New,
    Prepared,
    PreAuth,
    Partial,
    Paid,
    Failed,
    RefundStarted,
    Refunded,
}

/// Minimal host payment with its own transition table and guards. The
/// adapter under test only ever talks to it through `PaymentHandle`.
#[derive(Debug, Clone)]
pub struct FakePayment {
    pub id: String,
    pub external_id: Option<String>,
    pub status: FakeStatus,
    pub currency: Currency,
    pub description: String,
    pub amount_required: Decimal,
    pub amount_locked: Decimal,
    pub amount_paid: Decimal,
    pub amount_refunded: Decimal,
    pub items: Vec<OrderItem>,
    pub buyer: BuyerInfo,
}

impl FakePayment {
    pub fn new(status: FakeStatus) -> Self {
        FakePayment {
            id: "test-payment-123".to_string(),
            external_id: None,
            status,
            currency: Currency::PLN,
            description: "Test order".to_string(),
            amount_required: dec!(100.00),
            amount_locked: Decimal::ZERO,
            amount_paid: dec!(100.00),
            amount_refunded: Decimal::ZERO,
            items: Vec::new(),
            buyer: BuyerInfo::default(),
        }
    }

    pub fn with_external_id(mut self, external_id: &str) -> Self {
        self.external_id = Some(external_id.to_string());
        self
    }

    fn allowed(&self, event: &TransitionEvent) -> bool {
        use FakeStatus::*;
        match event {
            TransitionEvent::ConfirmPrepared => matches!(self.status, New),
            TransitionEvent::ConfirmLock => matches!(self.status, New | Prepared),
            TransitionEvent::ConfirmPayment => matches!(self.status, New | Prepared | PreAuth),
            TransitionEvent::MarkAsPaid => {
                matches!(self.status, Partial) && self.amount_paid >= self.amount_required
            }
            TransitionEvent::Fail => {
                matches!(self.status, New | Prepared | PreAuth | Partial | RefundStarted)
            }
            TransitionEvent::ConfirmRefund { .. } => {
                matches!(self.status, Paid | RefundStarted | Partial)
            }
            TransitionEvent::CancelRefund => matches!(self.status, RefundStarted),
            TransitionEvent::MarkAsRefunded => {
                matches!(self.status, Partial) && self.amount_refunded >= self.amount_paid
            }
        }
    }
}

impl PaymentHandle for FakePayment {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn external_id(&self) -> Option<String> {
        self.external_id.clone()
    }

    fn set_external_id(&mut self, external_id: String) {
        self.external_id = Some(external_id);
    }

    fn currency(&self) -> Currency {
        self.currency
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn amount_required(&self) -> Decimal {
        self.amount_required
    }

    fn amount_locked(&self) -> Decimal {
        self.amount_locked
    }

    fn amount_paid(&self) -> Decimal {
        self.amount_paid
    }

    fn amount_refunded(&self) -> Decimal {
        self.amount_refunded
    }

    fn is_fully_paid(&self) -> bool {
        self.amount_paid >= self.amount_required
    }

    fn is_fully_refunded(&self) -> bool {
        self.amount_refunded >= self.amount_paid
    }

    fn items(&self) -> Vec<OrderItem> {
        self.items.clone()
    }

    fn buyer(&self) -> BuyerInfo {
        self.buyer.clone()
    }

    fn can_fire(&self, event: &TransitionEvent) -> bool {
        self.allowed(event)
    }

    fn fire(&mut self, event: TransitionEvent) -> std::result::Result<(), TransitionError> {
        if !self.allowed(&event) {
            return Err(TransitionError::Rejected { event });
        }
        match event {
            TransitionEvent::ConfirmPrepared => self.status = FakeStatus::Prepared,
            TransitionEvent::ConfirmLock => self.status = FakeStatus::PreAuth,
            TransitionEvent::ConfirmPayment => self.status = FakeStatus::Partial,
            TransitionEvent::MarkAsPaid => self.status = FakeStatus::Paid,
            TransitionEvent::Fail => self.status = FakeStatus::Failed,
            TransitionEvent::ConfirmRefund { amount } => {
                self.amount_refunded += amount;
                self.status = FakeStatus::Partial;
            }
            TransitionEvent::CancelRefund => self.status = FakeStatus::Partial,
            TransitionEvent::MarkAsRefunded => self.status = FakeStatus::Refunded,
        }
        Ok(())
    }
}

/// Clonable handle over one shared `FakePayment`, for handing the same
/// payment to a webhook endpoint and asserting on it afterwards
#[derive(Clone)]
pub struct SharedPayment(pub Arc<Mutex<FakePayment>>);

impl SharedPayment {
    pub fn new(payment: FakePayment) -> Self {
        SharedPayment(Arc::new(Mutex::new(payment)))
    }

    pub fn status(&self) -> FakeStatus {
        self.0.lock().unwrap().status
    }

    pub fn snapshot(&self) -> FakePayment {
        self.0.lock().unwrap().clone()
    }
}

impl PaymentHandle for SharedPayment {
    fn id(&self) -> String {
        self.0.lock().unwrap().id()
    }

    fn external_id(&self) -> Option<String> {
        self.0.lock().unwrap().external_id()
    }

    fn set_external_id(&mut self, external_id: String) {
        self.0.lock().unwrap().set_external_id(external_id)
    }

    fn currency(&self) -> Currency {
        self.0.lock().unwrap().currency()
    }

    fn description(&self) -> String {
        self.0.lock().unwrap().description()
    }

    fn amount_required(&self) -> Decimal {
        self.0.lock().unwrap().amount_required()
    }

    fn amount_locked(&self) -> Decimal {
        self.0.lock().unwrap().amount_locked()
    }

    fn amount_paid(&self) -> Decimal {
        self.0.lock().unwrap().amount_paid()
    }

    fn amount_refunded(&self) -> Decimal {
        self.0.lock().unwrap().amount_refunded()
    }

    fn is_fully_paid(&self) -> bool {
        self.0.lock().unwrap().is_fully_paid()
    }

    fn is_fully_refunded(&self) -> bool {
        self.0.lock().unwrap().is_fully_refunded()
    }

    fn items(&self) -> Vec<OrderItem> {
        self.0.lock().unwrap().items()
    }

    fn buyer(&self) -> BuyerInfo {
        self.0.lock().unwrap().buyer()
    }

    fn can_fire(&self, event: &TransitionEvent) -> bool {
        self.0.lock().unwrap().can_fire(event)
    }

    fn fire(&mut self, event: TransitionEvent) -> std::result::Result<(), TransitionError> {
        self.0.lock().unwrap().fire(event)
    }
}

// --- scripted transport ---------------------------------------------------

/// Transport double replaying scripted responses and recording every
/// request it saw
pub struct MockTransport {
    requests: Mutex<Vec<TransportRequest>>,
    responses: Mutex<VecDeque<TransportResponse>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(MockTransport {
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(VecDeque::new()),
        })
    }

    pub fn enqueue(&self, status: u16, body: Value) {
        self.responses.lock().unwrap().push_back(TransportResponse {
            status,
            body: body.to_string(),
        });
    }

    /// Queue a standard successful OAuth grant
    pub fn enqueue_oauth(&self) {
        self.enqueue(200, oauth_grant());
    }

    /// Queue an OAuth grant whose token expires within the refresh margin
    pub fn enqueue_short_lived_oauth(&self) {
        self.enqueue(
            200,
            json!({
                "access_token": "short-lived-token",
                "token_type": "bearer",
                "expires_in": 2,
                "grant_type": "client_credentials",
            }),
        );
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, url_fragment: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.url.contains(url_fragment))
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        self.requests.lock().unwrap().push(request);
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted response left for request"))
    }
}

pub fn oauth_grant() -> Value {
    json!({
        "access_token": "test-token-123",
        "token_type": "bearer",
        "expires_in": 43199,
        "grant_type": "client_credentials",
    })
}

// --- callback signing -----------------------------------------------------

pub fn sign(body: &str, key: &str, algorithm: SignatureAlgorithm) -> String {
    algorithm.hex_digest(format!("{}{}", body, key).as_bytes())
}

/// Envelope carrying `body` with a valid signature header
pub fn signed_envelope(body: &str, algorithm_name: &str) -> CallbackEnvelope {
    let algorithm = match algorithm_name {
        "MD5" => SignatureAlgorithm::Md5,
        _ => SignatureAlgorithm::Sha256,
    };
    let signature = sign(body, SECOND_KEY, algorithm);
    CallbackEnvelope::new(
        Some(body.as_bytes().to_vec()),
        vec![(
            "OpenPayu-Signature".to_string(),
            format!(
                "signature={};algorithm={};sender=300746",
                signature, algorithm_name
            ),
        )],
    )
}
