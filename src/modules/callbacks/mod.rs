pub mod controllers;
pub mod models;
pub mod services;

pub use controllers::webhook_controller::{PaymentResolver, WebhookController};
pub use models::notification::{CallbackEnvelope, Notification, OrderNotice, RefundNotice};
pub use services::lifecycle::{apply_notification, poll_transition};
pub use services::signature::{CallbackVerifier, SignatureAlgorithm};
