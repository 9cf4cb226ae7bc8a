pub mod webhook_controller;

pub use webhook_controller::{PaymentResolver, WebhookController};
