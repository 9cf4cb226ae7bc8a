//! Gateway notification signature verification.
//!
//! The gateway signs each notification with
//! `hex(hash(raw_body || second_key))` and announces the digest in a
//! `key=value;...` header. Verification is a pure function of the exact
//! transport body, the header map, the shared key and the legacy-algorithm
//! policy flag; it performs no I/O.

use crate::core::CallbackError;
use crate::modules::callbacks::models::notification::CallbackEnvelope;
use md5::Md5;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use subtle::ConstantTimeEq;
use tracing::error;

/// Accepted signature header names, in lookup order
pub const SIGNATURE_HEADERS: [&str; 2] = ["openpayu-signature", "x-openpayu-signature"];

/// Hash algorithms the gateway may announce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// Legacy algorithm, accepted only when explicitly allowed
    Md5,
    Sha256,
}

impl SignatureAlgorithm {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "MD5" => Some(SignatureAlgorithm::Md5),
            "SHA-256" | "SHA256" => Some(SignatureAlgorithm::Sha256),
            _ => None,
        }
    }

    pub fn hex_digest(&self, payload: &[u8]) -> String {
        match self {
            SignatureAlgorithm::Md5 => hex::encode(Md5::digest(payload)),
            SignatureAlgorithm::Sha256 => hex::encode(Sha256::digest(payload)),
        }
    }
}

/// Verifies notification signatures against the shared second key.
///
/// Stateless per invocation; safe to share across requests.
#[derive(Debug, Clone)]
pub struct CallbackVerifier {
    second_key: String,
    allow_md5: bool,
}

impl CallbackVerifier {
    pub fn new(second_key: impl Into<String>, allow_md5: bool) -> Self {
        CallbackVerifier {
            second_key: second_key.into(),
            allow_md5,
        }
    }

    /// Verify `envelope` against the shared key.
    ///
    /// Fails closed: a legacy MD5 signature is rejected outright unless
    /// legacy callbacks were explicitly enabled, never silently accepted.
    pub fn verify(&self, envelope: &CallbackEnvelope) -> Result<(), CallbackError> {
        let raw_body = envelope.raw_body().ok_or(CallbackError::MissingBody)?;

        let raw_header = SIGNATURE_HEADERS
            .iter()
            .filter_map(|name| envelope.header(name))
            .find(|value| !value.is_empty())
            .ok_or(CallbackError::NoSignature)?;

        let fields = parse_signature_header(raw_header);

        let default_algorithm = if self.allow_md5 { "MD5" } else { "SHA-256" };
        let algorithm_name = fields
            .get("algorithm")
            .map(|name| name.to_uppercase())
            .unwrap_or_else(|| default_algorithm.to_string());
        let signature = fields.get("signature").copied().unwrap_or_default();

        if signature.is_empty() {
            return Err(CallbackError::NoSignature);
        }

        if algorithm_name == "MD5" && !self.allow_md5 {
            return Err(CallbackError::LegacyAlgorithmDisabled);
        }

        let algorithm = SignatureAlgorithm::parse(&algorithm_name)
            .ok_or(CallbackError::UnsupportedAlgorithm {
                name: algorithm_name,
            })?;

        let mut payload = Vec::with_capacity(raw_body.len() + self.second_key.len());
        payload.extend_from_slice(raw_body);
        payload.extend_from_slice(self.second_key.as_bytes());
        let expected = algorithm.hex_digest(&payload);

        if bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            Ok(())
        } else {
            error!(
                got = %signature,
                expected = %expected,
                "received notification with bad signature"
            );
            Err(CallbackError::BadSignature {
                got: signature.to_string(),
                expected,
            })
        }
    }
}

/// Split a `key=value;key=value` header into fields. Tokens without `=`
/// are ignored.
fn parse_signature_header(raw: &str) -> HashMap<&str, &str> {
    raw.split(';')
        .filter_map(|token| token.split_once('='))
        .collect()
}
