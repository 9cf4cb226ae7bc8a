pub mod outcomes;

pub use outcomes::{ChargeOutcome, PaymentStatusPoll, TransactionResult};
