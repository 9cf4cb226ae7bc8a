use crate::core::traits::payment::TransitionEvent;

/// Crate-wide Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Raw gateway response kept on business errors for operator diagnostics.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl std::fmt::Display for RawResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.body)
    }
}

/// Main adapter error type
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// OAuth token acquisition failed; the next attempt must re-authenticate
    #[error("cannot authenticate with the gateway ({raw})")]
    Credentials { raw: RawResponse },

    /// Order creation rejected by the gateway
    #[error("error creating order ({raw})")]
    Lock { raw: RawResponse },

    /// Refund request rejected by the gateway
    #[error("error creating refund ({raw})")]
    Refund { raw: RawResponse },

    /// Capture of a locked order rejected by the gateway
    #[error("error charging locked payment ({raw})")]
    Charge { raw: RawResponse },

    /// Non-2xx on a read-only or administrative endpoint
    #[error("gateway communication error while {context} ({raw})")]
    Communication { context: String, raw: RawResponse },

    /// Inbound notification failed verification
    #[error("invalid callback: {0}")]
    InvalidCallback(#[from] CallbackError),

    /// The host payment machine refused a transition for a reason other
    /// than an ordinary guard rejection
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed caller-supplied data
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

// Helper functions for common error scenarios
impl Error {
    pub fn communication(context: impl Into<String>, raw: RawResponse) -> Self {
        Error::Communication {
            context: context.into(),
            raw,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }
}

/// Callback verification failures.
///
/// Every variant is terminal for the notification being verified: the
/// webhook must be answered with a non-2xx status so the gateway retries
/// delivery. None of these ever reach the lifecycle reconciliation step.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CallbackError {
    #[error("no signature")]
    NoSignature,

    #[error("callback carries no raw body to verify")]
    MissingBody,

    #[error("MD5 signatures are disabled; set allow_md5_callbacks to accept legacy callbacks")]
    LegacyAlgorithmDisabled,

    #[error("unsupported hash algorithm: {name}; supported: MD5, SHA-256")]
    UnsupportedAlgorithm { name: String },

    // Both digests are included on purpose: this surfaces in server-side
    // logs only, never in a client-facing response.
    #[error("bad signature: got '{got}', expected '{expected}'")]
    BadSignature { got: String, expected: String },
}

/// Errors surfaced by the host framework's payment state machine.
#[derive(thiserror::Error, Debug)]
pub enum TransitionError {
    /// The machine's transition table or a guard refused the event. This is
    /// the only variant optimistic follow-up transitions may swallow.
    #[error("transition '{event}' rejected by the payment state machine")]
    Rejected { event: TransitionEvent },

    /// Anything else the host machine failed with; always propagated
    #[error("payment state machine failure: {0}")]
    Host(String),
}
