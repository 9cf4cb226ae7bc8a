pub mod models;
pub mod services;

pub use models::outcomes::{ChargeOutcome, PaymentStatusPoll, TransactionResult};
pub use services::processor::PayuProcessor;
