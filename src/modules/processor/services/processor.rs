//! Facade satisfying the host framework's payment-processor contract.
//!
//! Orchestrates the gateway client, the callback verifier and the
//! lifecycle mapping. All state lives in the payment handles the host
//! supplies per call; the facade itself only holds configuration and the
//! shared gateway client.

use crate::config::PayuConfig;
use crate::core::traits::payment::PaymentHandle;
use crate::core::{Error, Result};
use crate::modules::callbacks::models::notification::CallbackEnvelope;
use crate::modules::callbacks::services::lifecycle::{apply_notification, poll_transition};
use crate::modules::callbacks::services::signature::CallbackVerifier;
use crate::modules::gateway::models::api_types::{
    BuyerData, NewOrderRequest, ProductData, RefundRequest,
};
use crate::modules::gateway::services::client::PayuClient;
use crate::modules::gateway::services::transport::{HttpTransport, Transport};
use crate::modules::processor::models::outcomes::{
    ChargeOutcome, PaymentStatusPoll, TransactionResult,
};
use reqwest::Method;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::warn;

pub struct PayuProcessor {
    client: PayuClient,
    verifier: CallbackVerifier,
    notify_url: Option<String>,
    continue_url: Option<String>,
}

impl PayuProcessor {
    pub fn new(config: PayuConfig) -> Self {
        Self::with_transport(config, Arc::new(HttpTransport::new()))
    }

    /// Build the processor on a caller-supplied transport
    pub fn with_transport(config: PayuConfig, transport: Arc<dyn Transport>) -> Self {
        let client = PayuClient::new(&config, transport);
        let verifier = CallbackVerifier::new(config.second_key.clone(), config.allow_md5_callbacks);
        PayuProcessor {
            client,
            verifier,
            notify_url: config.notify_url,
            continue_url: config.continue_url,
        }
    }

    pub fn client(&self) -> &PayuClient {
        &self.client
    }

    fn resolve_url(template: &str, payment_id: &str) -> String {
        template.replace("{payment_id}", payment_id)
    }

    fn require_external_id(payment: &dyn PaymentHandle) -> Result<String> {
        payment
            .external_id()
            .ok_or_else(|| Error::validation("payment has no gateway order id yet"))
    }

    fn build_order_request(
        &self,
        payment: &dyn PaymentHandle,
        customer_ip: Option<String>,
    ) -> NewOrderRequest {
        let payment_id = payment.id();

        let products = payment
            .items()
            .into_iter()
            .map(|item| ProductData {
                name: item.name,
                unit_price: item.unit_price,
                quantity: item.quantity,
                virtual_product: None,
            })
            .collect();

        let buyer = payment.buyer();
        let buyer = (!buyer.is_empty()).then(|| BuyerData {
            email: buyer.email,
            first_name: buyer.first_name,
            last_name: buyer.last_name,
            phone: buyer.phone,
        });

        let mut request =
            NewOrderRequest::new(payment_id.clone(), payment.currency(), payment.amount_required());
        request.customer_ip = customer_ip;
        request.description = Some(payment.description());
        request.products = products;
        request.buyer = buyer;
        request.notify_url = self
            .notify_url
            .as_deref()
            .map(|template| Self::resolve_url(template, &payment_id));
        request.continue_url = self
            .continue_url
            .as_deref()
            .map(|template| Self::resolve_url(template, &payment_id));
        request
    }

    /// Register the payment with the gateway and hand back the redirect.
    ///
    /// The gateway order id is recorded on first success only; an id the
    /// payment already carries is never overwritten.
    pub async fn prepare_transaction(
        &self,
        payment: &mut dyn PaymentHandle,
        customer_ip: Option<String>,
    ) -> Result<TransactionResult> {
        let request = self.build_order_request(payment, customer_ip);
        let response = self.client.new_order(request).await?;

        if payment.external_id().is_none() {
            if let Some(order_id) = response.order_id.clone() {
                payment.set_external_id(order_id);
            }
        }

        Ok(TransactionResult {
            redirect_url: response.redirect_uri,
            method: Method::GET,
        })
    }

    /// Verify an inbound notification and apply the transition it licenses.
    ///
    /// Verification failures abort before any state is touched; they must
    /// be answered non-2xx so the gateway retries delivery.
    pub async fn handle_callback(
        &self,
        payment: &mut dyn PaymentHandle,
        envelope: &CallbackEnvelope,
    ) -> Result<()> {
        self.verifier.verify(envelope)?;
        let notification = envelope.notification()?;
        apply_notification(payment, &notification)?;
        Ok(())
    }

    /// PULL flow: poll the gateway for the order status and report which
    /// transition it calls for, without firing it
    pub async fn fetch_payment_status(
        &self,
        payment: &dyn PaymentHandle,
    ) -> Result<PaymentStatusPoll> {
        let external_id = Self::require_external_id(payment)?;
        let response = self.client.get_order_info(&external_id).await?;
        let order_status = response.orders.first().and_then(|order| order.status);

        Ok(PaymentStatusPoll {
            order_status,
            transition: poll_transition(order_status),
        })
    }

    /// Capture a pre-authorized (locked) payment
    pub async fn charge(
        &self,
        payment: &dyn PaymentHandle,
        amount: Option<Decimal>,
    ) -> Result<ChargeOutcome> {
        let external_id = Self::require_external_id(payment)?;
        let response = self.client.capture(&external_id).await?;
        let success = response
            .status
            .map(|status| status.is_success())
            .unwrap_or(false);

        Ok(ChargeOutcome {
            amount_charged: amount.unwrap_or_else(|| payment.amount_locked()),
            success,
        })
    }

    /// Release a pre-authorization by cancelling the order.
    ///
    /// Returns the released amount; zero when the gateway did not report
    /// success. Zero is a reported zero-effect outcome, not an error.
    pub async fn release_lock(&self, payment: &dyn PaymentHandle) -> Result<Decimal> {
        let external_id = Self::require_external_id(payment)?;
        let response = self.client.cancel_order(&external_id).await?;
        let success = response
            .status
            .map(|status| status.is_success())
            .unwrap_or(false);

        if success {
            Ok(payment.amount_locked())
        } else {
            warn!(
                payment_id = %payment.id(),
                "cancellation reported no effect; nothing released"
            );
            Ok(Decimal::ZERO)
        }
    }

    /// Start a refund with the gateway. Returns the amount requested, or
    /// the full paid amount when none was given.
    pub async fn start_refund(
        &self,
        payment: &dyn PaymentHandle,
        amount: Option<Decimal>,
        description: Option<String>,
    ) -> Result<Decimal> {
        let external_id = Self::require_external_id(payment)?;
        self.client
            .refund(
                &external_id,
                RefundRequest {
                    amount,
                    description,
                    ..RefundRequest::default()
                },
            )
            .await?;

        Ok(amount.unwrap_or_else(|| payment.amount_paid()))
    }
}
