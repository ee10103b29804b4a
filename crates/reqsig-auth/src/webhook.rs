//! Inbound webhook signature verification.
//!
//! Two schemes are supported:
//!
//! - v1: `x-hook-signature` carries `Base64(SHA-512(secret ++ body))`, with the
//!   shared secret and the raw body concatenated before hashing. This is not
//!   HMAC; it is what the sender produces, so it is reproduced as-is.
//! - v2: the signature is RSA-SHA512 over the raw body, checked against the
//!   sender's public key.
//!
//! Both operate on the exact bytes received. Parsing and re-serializing the
//! JSON body before verifying changes the bytes and breaks the signature.
//! A mismatch is an expected outcome and is reported as `false`, never as an
//! error.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use http::HeaderMap;
use reqsig_core::{SharedSecret, SigningAlgorithm};
use rsa::RsaPublicKey;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::digest::sha512_base64;
use crate::signer::verify_rsa;

/// Header carrying the v1 webhook signature.
pub const WEBHOOK_SIGNATURE_HEADER: &str = "x-hook-signature";

/// Compute the v1 signature the sender is expected to present.
#[must_use]
pub fn expected_webhook_signature(shared_secret: &[u8], raw_body: &[u8]) -> String {
    sha512_base64(&[shared_secret, raw_body])
}

/// Verify a v1 webhook signature.
///
/// The comparison runs in constant time with respect to content. A
/// signature of a different length is rejected without comparing bytes,
/// which reveals nothing since the expected length is fixed.
///
/// # Examples
///
/// ```
/// use reqsig_auth::webhook::{expected_webhook_signature, verify_webhook};
///
/// let body = br#"{"webhookEventUid":"1"}"#;
/// let signature = expected_webhook_signature(b"secret", body);
/// assert!(verify_webhook(body, "secret", &signature));
/// assert!(!verify_webhook(body, "other", &signature));
/// ```
#[must_use]
pub fn verify_webhook(raw_body: &[u8], shared_secret: &str, presented_signature: &str) -> bool {
    signature_matches(shared_secret.as_bytes(), raw_body, presented_signature)
}

fn signature_matches(shared_secret: &[u8], raw_body: &[u8], presented_signature: &str) -> bool {
    let expected = expected_webhook_signature(shared_secret, raw_body);
    let matches: bool = expected
        .as_bytes()
        .ct_eq(presented_signature.as_bytes())
        .into();
    if !matches {
        debug!(body_len = raw_body.len(), "Webhook signature mismatch");
    }
    matches
}

/// Verify a v2 webhook signature: RSA-SHA512 over the raw body.
///
/// Malformed base64 is a mismatch.
#[must_use]
pub fn verify_webhook_v2(
    raw_body: &[u8],
    public_key: &RsaPublicKey,
    presented_signature: &str,
) -> bool {
    let matches = BASE64
        .decode(presented_signature.trim())
        .is_ok_and(|raw| verify_rsa(public_key, SigningAlgorithm::RsaSha512, raw_body, &raw));
    if !matches {
        debug!(body_len = raw_body.len(), "Webhook v2 signature mismatch");
    }
    matches
}

/// Verifies v1 webhooks for one shared secret.
#[derive(Debug, Clone)]
pub struct WebhookVerifier {
    secret: SharedSecret,
}

impl WebhookVerifier {
    /// Create a verifier for `secret`.
    #[must_use]
    pub fn new(secret: SharedSecret) -> Self {
        Self { secret }
    }

    /// Verify a received webhook from its headers and raw body.
    ///
    /// A missing or non-ASCII `x-hook-signature` header is a mismatch.
    /// Surrounding whitespace in the header value is ignored.
    #[must_use]
    pub fn verify_request(&self, headers: &HeaderMap, raw_body: &[u8]) -> bool {
        let Some(presented) = headers
            .get(WEBHOOK_SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
        else {
            debug!("Webhook is missing the signature header");
            return false;
        };
        signature_matches(self.secret.as_bytes(), raw_body, presented.trim())
    }
}
