use crate::core::traits::payment::TransitionEvent;
use crate::modules::gateway::models::api_types::OrderStatus;
use reqwest::Method;
use rust_decimal::Decimal;

/// Result of preparing a transaction: where to send the customer next
#[derive(Debug, Clone)]
pub struct TransactionResult {
    pub redirect_url: Option<String>,
    /// How the customer should follow `redirect_url`
    pub method: Method,
}

/// Result of a status poll.
///
/// Carries the transition the polled status calls for; firing it (with the
/// usual guard discipline) is the caller's decision.
#[derive(Debug, Clone)]
pub struct PaymentStatusPoll {
    pub order_status: Option<OrderStatus>,
    pub transition: Option<TransitionEvent>,
}

/// Outcome of a capture attempt
#[derive(Debug, Clone)]
pub struct ChargeOutcome {
    pub amount_charged: Decimal,
    pub success: bool,
}
