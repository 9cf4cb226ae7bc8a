//! Webhook boundary for gateway notifications.
//!
//! The handler threads the raw request bytes into the envelope untouched:
//! the signature covers the exact transport body, so any re-serialization
//! here would break verification. Rejected notifications answer non-2xx,
//! which makes the gateway retry delivery.

use crate::core::traits::payment::PaymentHandle;
use crate::core::Error;
use crate::modules::callbacks::models::notification::CallbackEnvelope;
use crate::modules::processor::services::processor::PayuProcessor;
use actix_web::{post, web, HttpRequest, HttpResponse};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Host capability resolving a payment id from the notification URL to a
/// live payment handle. Returning `None` answers 404.
#[async_trait]
pub trait PaymentResolver: Send + Sync {
    async fn resolve(&self, payment_id: &str) -> Option<Box<dyn PaymentHandle>>;
}

/// Mounts the gateway notification endpoint
pub struct WebhookController {
    processor: Arc<PayuProcessor>,
    payments: Arc<dyn PaymentResolver>,
}

impl WebhookController {
    pub fn new(processor: Arc<PayuProcessor>, payments: Arc<dyn PaymentResolver>) -> Self {
        WebhookController {
            processor,
            payments,
        }
    }

    /// Configure webhook routes
    pub fn configure(
        cfg: &mut web::ServiceConfig,
        processor: Arc<PayuProcessor>,
        payments: Arc<dyn PaymentResolver>,
    ) {
        let controller = web::Data::new(Self::new(processor, payments));

        cfg.service(
            web::scope("/payu")
                .app_data(controller)
                .service(receive_callback),
        );
    }
}

/// Receive one gateway notification for a payment.
///
/// POST /payu/callback/{payment_id}
///
/// * `200 OK` — verified and reconciled
/// * `401 Unauthorized` — verification failed; the gateway will redeliver
/// * `404 Not Found` — unknown payment id
/// * `500 Internal Server Error` — reconciliation failed
#[post("/callback/{payment_id}")]
async fn receive_callback(
    req: HttpRequest,
    body: web::Bytes,
    path: web::Path<String>,
    controller: web::Data<WebhookController>,
) -> HttpResponse {
    let payment_id = path.into_inner();
    let correlation_id = Uuid::new_v4();

    info!(
        %correlation_id,
        payment_id = %payment_id,
        "received gateway notification"
    );

    let headers = req.headers().iter().filter_map(|(name, value)| {
        value
            .to_str()
            .ok()
            .map(|v| (name.as_str().to_string(), v.to_string()))
    });
    let envelope = CallbackEnvelope::new(Some(body.to_vec()), headers);

    let Some(mut payment) = controller.payments.resolve(&payment_id).await else {
        warn!(%correlation_id, payment_id = %payment_id, "notification for unknown payment");
        return HttpResponse::NotFound().finish();
    };

    match controller
        .processor
        .handle_callback(payment.as_mut(), &envelope)
        .await
    {
        Ok(()) => {
            info!(%correlation_id, payment_id = %payment_id, "notification reconciled");
            HttpResponse::Ok().finish()
        }
        Err(Error::InvalidCallback(err)) => {
            warn!(
                %correlation_id,
                payment_id = %payment_id,
                error = %err,
                "notification rejected"
            );
            HttpResponse::Unauthorized().finish()
        }
        Err(err) => {
            error!(
                %correlation_id,
                payment_id = %payment_id,
                error = %err,
                "notification processing failed"
            );
            HttpResponse::InternalServerError().finish()
        }
    }
}
