//! Maps verified gateway notifications and poll results onto payment-state
//! transition events.
//!
//! The gateway delivers notifications at least once, in any order. Every
//! state-changing event is therefore guarded: non-terminal events are
//! pre-checked with `can_fire`, terminal follow-ups (`mark_as_paid`,
//! `mark_as_refunded`) are fired optimistically through [`try_fire`], which
//! tolerates the host machine's own guard rejecting them. A duplicate
//! notification must never error and never double-apply an amount.

use crate::core::error::TransitionError;
use crate::core::traits::payment::{try_fire, PaymentHandle, TransitionEvent};
use crate::modules::callbacks::models::notification::{Notification, OrderNotice, RefundNotice};
use crate::modules::gateway::models::api_types::{OrderStatus, RefundStatus};
use tracing::debug;

/// Apply one verified notification to the payment it addresses.
///
/// Exactly one of the order/refund branches runs; a notification carrying
/// neither is a no-op (informational).
pub fn apply_notification(
    payment: &mut dyn PaymentHandle,
    notification: &Notification,
) -> Result<(), TransitionError> {
    if let Some(order) = &notification.order {
        apply_order(payment, order)
    } else if let Some(refund) = &notification.refund {
        apply_refund(payment, refund)
    } else {
        debug!(
            payment_id = %payment.id(),
            "notification carries neither order nor refund; ignoring"
        );
        Ok(())
    }
}

fn apply_order(
    payment: &mut dyn PaymentHandle,
    order: &OrderNotice,
) -> Result<(), TransitionError> {
    match order.status {
        Some(OrderStatus::Completed) => {
            if payment.can_fire(&TransitionEvent::ConfirmPayment) {
                payment.fire(TransitionEvent::ConfirmPayment)?;
                try_fire(payment, TransitionEvent::MarkAsPaid)?;
            } else {
                debug!(
                    payment_id = %payment.id(),
                    "cannot confirm payment; duplicate notification ignored"
                );
            }
        }
        Some(OrderStatus::Canceled) => {
            // No pre-guard: a repeated CANCELED against an already failed
            // payment is absorbed by try_fire instead
            try_fire(payment, TransitionEvent::Fail)?;
        }
        Some(OrderStatus::WaitingForConfirmation) => {
            if payment.can_fire(&TransitionEvent::ConfirmLock) {
                payment.fire(TransitionEvent::ConfirmLock)?;
            } else {
                debug!(
                    payment_id = %payment.id(),
                    "already locked; duplicate notification ignored"
                );
            }
        }
        Some(OrderStatus::New) | Some(OrderStatus::Pending) | None => {
            debug!(
                payment_id = %payment.id(),
                status = ?order.status,
                "informational order status; no transition"
            );
        }
    }
    Ok(())
}

fn apply_refund(
    payment: &mut dyn PaymentHandle,
    refund: &RefundNotice,
) -> Result<(), TransitionError> {
    match refund.status {
        Some(RefundStatus::Finalized) => {
            let event = TransitionEvent::ConfirmRefund {
                amount: refund.amount_major(),
            };
            if payment.can_fire(&event) {
                payment.fire(event)?;
                // Guard fails on a partial refund; the payment stays in
                // its partial-refund state
                try_fire(payment, TransitionEvent::MarkAsRefunded)?;
            } else {
                debug!(
                    payment_id = %payment.id(),
                    "cannot confirm refund; duplicate notification ignored"
                );
            }
        }
        Some(RefundStatus::Canceled) => {
            if payment.can_fire(&TransitionEvent::CancelRefund) {
                payment.fire(TransitionEvent::CancelRefund)?;
                try_fire(payment, TransitionEvent::MarkAsPaid)?;
            } else {
                debug!(
                    payment_id = %payment.id(),
                    "cannot cancel refund; duplicate notification ignored"
                );
            }
        }
        Some(RefundStatus::Pending) | None => {
            debug!(
                payment_id = %payment.id(),
                status = ?refund.status,
                "informational refund status; no transition"
            );
        }
    }
    Ok(())
}

/// Pull-path mapping: which transition a polled order status calls for.
///
/// Returns the event without firing it, so the caller can apply the same
/// guard discipline as the push path. Unknown or missing status maps to
/// no action.
pub fn poll_transition(status: Option<OrderStatus>) -> Option<TransitionEvent> {
    match status? {
        OrderStatus::New | OrderStatus::Pending => Some(TransitionEvent::ConfirmPrepared),
        OrderStatus::Canceled => Some(TransitionEvent::Fail),
        OrderStatus::Completed => Some(TransitionEvent::ConfirmPayment),
        OrderStatus::WaitingForConfirmation => Some(TransitionEvent::ConfirmLock),
    }
}
