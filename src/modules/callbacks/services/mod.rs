pub mod lifecycle;
pub mod signature;

pub use lifecycle::{apply_notification, poll_transition};
pub use signature::{CallbackVerifier, SignatureAlgorithm};
