//! End-to-end webhook flow: actix endpoint → verification → reconciliation.

#[path = "../helpers/mod.rs"]
mod helpers;

use actix_web::{test, App};
use async_trait::async_trait;
use helpers::{init_tracing, sign, test_config, FakePayment, FakeStatus, SharedPayment, SECOND_KEY};
use payu_connect::callbacks::{PaymentResolver, SignatureAlgorithm, WebhookController};
use payu_connect::core::traits::payment::PaymentHandle;
use payu_connect::processor::PayuProcessor;
use rust_decimal_macros::dec;
use std::sync::Arc;

/// Resolver double knowing exactly one payment
struct SinglePaymentResolver {
    payment_id: String,
    payment: SharedPayment,
}

#[async_trait]
impl PaymentResolver for SinglePaymentResolver {
    async fn resolve(&self, payment_id: &str) -> Option<Box<dyn PaymentHandle>> {
        (payment_id == self.payment_id).then(|| Box::new(self.payment.clone()) as Box<dyn PaymentHandle>)
    }
}

fn signature_header(body: &str, algorithm: SignatureAlgorithm, name: &str) -> String {
    format!(
        "signature={};algorithm={};sender=300746",
        sign(body, SECOND_KEY, algorithm),
        name
    )
}

async fn send_callback(
    payment: SharedPayment,
    allow_md5: bool,
    path: &str,
    body: &'static str,
    header: Option<String>,
) -> u16 {
    init_tracing();

    let mut config = test_config();
    config.allow_md5_callbacks = allow_md5;
    let transport = helpers::MockTransport::new();
    let processor = Arc::new(PayuProcessor::with_transport(config, transport));
    let resolver = Arc::new(SinglePaymentResolver {
        payment_id: "test-payment-123".to_string(),
        payment,
    });

    let app = test::init_service(App::new().configure(|cfg| {
        WebhookController::configure(cfg, processor.clone(), resolver.clone());
    }))
    .await;

    let mut request = test::TestRequest::post().uri(path).set_payload(body);
    if let Some(header) = header {
        request = request.insert_header(("OpenPayu-Signature", header));
    }

    let response = test::call_service(&app, request.to_request()).await;
    response.status().as_u16()
}

#[actix_web::test]
async fn test_signed_order_notification_is_reconciled() {
    let body = r#"{"order":{"status":"COMPLETED"}}"#;
    let payment = SharedPayment::new(FakePayment::new(FakeStatus::Prepared));

    let status = send_callback(
        payment.clone(),
        false,
        "/payu/callback/test-payment-123",
        body,
        Some(signature_header(body, SignatureAlgorithm::Sha256, "SHA-256")),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(payment.status(), FakeStatus::Paid);
}

#[actix_web::test]
async fn test_duplicate_delivery_stays_accepted() {
    let body = r#"{"order":{"status":"COMPLETED"}}"#;
    let payment = SharedPayment::new(FakePayment::new(FakeStatus::Prepared));
    let header = signature_header(body, SignatureAlgorithm::Sha256, "SHA-256");

    for _ in 0..2 {
        let status = send_callback(
            payment.clone(),
            false,
            "/payu/callback/test-payment-123",
            body,
            Some(header.clone()),
        )
        .await;
        assert_eq!(status, 200);
    }

    assert_eq!(payment.status(), FakeStatus::Paid);
}

#[actix_web::test]
async fn test_refund_notification_applies_decoded_amount() {
    let body = r#"{"refund":{"refundId":"R-1","status":"FINALIZED","amount":5000}}"#;
    let mut fake = FakePayment::new(FakeStatus::RefundStarted);
    fake.amount_paid = dec!(100.00);
    let payment = SharedPayment::new(fake);

    let status = send_callback(
        payment.clone(),
        false,
        "/payu/callback/test-payment-123",
        body,
        Some(signature_header(body, SignatureAlgorithm::Sha256, "SHA-256")),
    )
    .await;

    assert_eq!(status, 200);
    let snapshot = payment.snapshot();
    assert_eq!(snapshot.status, FakeStatus::Partial);
    assert_eq!(snapshot.amount_refunded, dec!(50.00));
}

#[actix_web::test]
async fn test_tampered_signature_is_rejected() {
    let body = r#"{"order":{"status":"COMPLETED"}}"#;
    let payment = SharedPayment::new(FakePayment::new(FakeStatus::Prepared));

    let status = send_callback(
        payment.clone(),
        false,
        "/payu/callback/test-payment-123",
        body,
        Some("signature=deadbeef;algorithm=SHA-256;sender=300746".to_string()),
    )
    .await;

    // Non-2xx makes the gateway redeliver
    assert_eq!(status, 401);
    assert_eq!(payment.status(), FakeStatus::Prepared);
}

#[actix_web::test]
async fn test_missing_signature_is_rejected() {
    let body = r#"{"order":{"status":"COMPLETED"}}"#;
    let payment = SharedPayment::new(FakePayment::new(FakeStatus::Prepared));

    let status = send_callback(
        payment.clone(),
        false,
        "/payu/callback/test-payment-123",
        body,
        None,
    )
    .await;

    assert_eq!(status, 401);
    assert_eq!(payment.status(), FakeStatus::Prepared);
}

#[actix_web::test]
async fn test_legacy_md5_rejected_unless_enabled() {
    let body = r#"{"order":{"status":"COMPLETED"}}"#;
    let payment = SharedPayment::new(FakePayment::new(FakeStatus::Prepared));
    let header = signature_header(body, SignatureAlgorithm::Md5, "MD5");

    let status = send_callback(
        payment.clone(),
        false,
        "/payu/callback/test-payment-123",
        body,
        Some(header.clone()),
    )
    .await;
    assert_eq!(status, 401);
    assert_eq!(payment.status(), FakeStatus::Prepared);

    let status = send_callback(
        payment.clone(),
        true,
        "/payu/callback/test-payment-123",
        body,
        Some(header),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(payment.status(), FakeStatus::Paid);
}

#[actix_web::test]
async fn test_unknown_payment_answers_not_found() {
    let body = r#"{"order":{"status":"COMPLETED"}}"#;
    let payment = SharedPayment::new(FakePayment::new(FakeStatus::Prepared));

    let status = send_callback(
        payment.clone(),
        false,
        "/payu/callback/someone-else",
        body,
        Some(signature_header(body, SignatureAlgorithm::Sha256, "SHA-256")),
    )
    .await;

    assert_eq!(status, 404);
    assert_eq!(payment.status(), FakeStatus::Prepared);
}
