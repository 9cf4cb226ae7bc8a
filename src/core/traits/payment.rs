use crate::core::currency::Currency;
use crate::core::error::TransitionError;
use rust_decimal::Decimal;
use std::fmt;
use tracing::debug;

/// Payment-state transition events this adapter may ask the host machine to
/// perform. The host owns the transition table and all guards; the adapter
/// only chooses which event a gateway notification or poll result licenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEvent {
    ConfirmPrepared,
    ConfirmLock,
    ConfirmPayment,
    MarkAsPaid,
    Fail,
    ConfirmRefund { amount: Decimal },
    CancelRefund,
    MarkAsRefunded,
}

impl fmt::Display for TransitionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransitionEvent::ConfirmPrepared => "confirm_prepared",
            TransitionEvent::ConfirmLock => "confirm_lock",
            TransitionEvent::ConfirmPayment => "confirm_payment",
            TransitionEvent::MarkAsPaid => "mark_as_paid",
            TransitionEvent::Fail => "fail",
            TransitionEvent::ConfirmRefund { .. } => "confirm_refund",
            TransitionEvent::CancelRefund => "cancel_refund",
            TransitionEvent::MarkAsRefunded => "mark_as_refunded",
        };
        f.write_str(name)
    }
}

/// One order line as the host exposes it
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

/// Buyer contact data the host exposes. Only this safe subset is ever
/// forwarded to the gateway.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuyerInfo {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

impl BuyerInfo {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
    }
}

/// Capability handle onto one payment owned by the host framework.
///
/// `fire` must return [`TransitionError::Rejected`] when (and only when) the
/// machine's transition table or a guard refuses the event; any other host
/// failure belongs in [`TransitionError::Host`].
pub trait PaymentHandle: Send {
    fn id(&self) -> String;

    /// Gateway order id. Assigned at most once, on the first successful
    /// order creation; `set_external_id` is never called when this is `Some`.
    fn external_id(&self) -> Option<String>;
    fn set_external_id(&mut self, external_id: String);

    fn currency(&self) -> Currency;
    fn description(&self) -> String;

    fn amount_required(&self) -> Decimal;
    fn amount_locked(&self) -> Decimal;
    fn amount_paid(&self) -> Decimal;
    fn amount_refunded(&self) -> Decimal;

    fn is_fully_paid(&self) -> bool;
    fn is_fully_refunded(&self) -> bool;

    fn items(&self) -> Vec<OrderItem>;
    fn buyer(&self) -> BuyerInfo;

    /// Whether the machine would currently accept `event`
    fn can_fire(&self, event: &TransitionEvent) -> bool;

    /// Perform `event`, mutating the payment's state
    fn fire(&mut self, event: TransitionEvent) -> Result<(), TransitionError>;
}

/// Fire `event` optimistically: a guard rejection by the host machine is
/// expected under at-least-once notification delivery and is swallowed,
/// everything else propagates.
pub fn try_fire(
    payment: &mut dyn PaymentHandle,
    event: TransitionEvent,
) -> Result<(), TransitionError> {
    match payment.fire(event) {
        Err(TransitionError::Rejected { event }) => {
            debug!(
                payment_id = %payment.id(),
                event = %event,
                "optimistic transition rejected by the payment machine"
            );
            Ok(())
        }
        other => other,
    }
}
