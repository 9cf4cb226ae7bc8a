pub mod payment;

pub use payment::{try_fire, BuyerInfo, OrderItem, PaymentHandle, TransitionEvent};
