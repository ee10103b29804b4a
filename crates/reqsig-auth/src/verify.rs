//! Inbound message-signature verification.
//!
//! This is the receiving side of [`crate::request`]:
//!
//! 1. Parse the `Authorization` header for the key id, algorithm, signed
//!    component list and signature.
//! 2. Require `(request-target)`, `date` and `digest` among the signed
//!    components.
//! 3. For requests other than GET, check the `Digest` header against the body.
//! 4. Optionally check that `Date` is within the allowed clock skew.
//! 5. Rebuild the signing string from the listed components, in order.
//! 6. Verify the signature with the key registered for the key id.
//!
//! The main entry point is [`verify_message`].

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use reqsig_core::{SigningAlgorithm, SigningConfig};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::canonical::{REQUEST_TARGET, build_request_target, build_signing_string};
use crate::clock::{Clock, SystemClock};
use crate::digest::compute_digest;
use crate::error::AuthError;
use crate::header::parse_authorization_header;
use crate::keystore::PublicKeyProvider;
use crate::signer::verify_signature;

/// Signed components every request must cover, lowercase.
const REQUIRED_COMPONENTS: [&str; 3] = ["(request-target)", "date", "digest"];

/// The result of a successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedMessage {
    /// Key id that signed the request.
    pub key_id: String,
    /// Algorithm the request was signed with.
    pub algorithm: SigningAlgorithm,
    /// Signed component names, in signing order.
    pub signed_headers: Vec<String>,
    /// Bearer token sent alongside the signature, if any.
    pub bearer_token: Option<String>,
}

/// Freshness rules applied to the `Date` header.
#[derive(Clone)]
pub struct VerificationPolicy {
    /// Maximum distance between `Date` and now; `None` disables the check.
    pub max_clock_skew: Option<TimeDelta>,
    /// Time source for the freshness check.
    pub clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for VerificationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationPolicy")
            .field("max_clock_skew", &self.max_clock_skew)
            .finish_non_exhaustive()
    }
}

impl Default for VerificationPolicy {
    fn default() -> Self {
        Self {
            max_clock_skew: skew_from_secs(reqsig_core::DEFAULT_MAX_CLOCK_SKEW_SECS),
            clock: Arc::new(SystemClock),
        }
    }
}

impl VerificationPolicy {
    /// Policy with the configured skew and the system clock. A skew of zero
    /// disables the freshness check.
    #[must_use]
    pub fn from_config(config: &SigningConfig) -> Self {
        Self {
            max_clock_skew: skew_from_secs(config.max_clock_skew_secs),
            clock: Arc::new(SystemClock),
        }
    }
}

fn skew_from_secs(secs: u64) -> Option<TimeDelta> {
    match secs {
        0 => None,
        secs => TimeDelta::try_seconds(i64::try_from(secs).unwrap_or(i64::MAX / 1000)),
    }
}

/// Verify a signed inbound HTTP request.
///
/// `body` must be the raw bytes received, before any parsing.
///
/// # Errors
///
/// Returns an [`AuthError`] if:
/// - The `Authorization` header is missing or malformed
/// - Required components are not signed, or a listed header is absent
/// - The digest does not match the body
/// - The `Date` header is unparseable or outside the allowed skew
/// - The key id is unknown
/// - The signature does not match
pub fn verify_message(
    parts: &http::request::Parts,
    body: &[u8],
    provider: &dyn PublicKeyProvider,
    policy: &VerificationPolicy,
) -> Result<VerifiedMessage, AuthError> {
    let auth_header = parts
        .headers
        .get(http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let parsed = parse_authorization_header(auth_header)?;
    let algorithm = parsed.signing_algorithm()?;

    check_required_components(&parsed.headers)?;

    if parts.method != http::Method::GET {
        let provided = extract_header_value(parts, "digest")?;
        let expected = compute_digest(Some(body));
        if !bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
            debug!(key_id = %parsed.key_id, "Digest mismatch");
            return Err(AuthError::DigestMismatch);
        }
    }

    if let Some(max_skew) = policy.max_clock_skew {
        check_freshness(&extract_header_value(parts, "date")?, max_skew, policy.clock.as_ref())?;
    }

    let path = parts
        .uri
        .path_and_query()
        .map_or("/", http::uri::PathAndQuery::as_str);
    let request_target = build_request_target(parts.method.as_str(), path);

    let mut components = Vec::with_capacity(parsed.headers.len());
    for name in &parsed.headers {
        let value = if name.eq_ignore_ascii_case(REQUEST_TARGET) {
            request_target.clone()
        } else {
            extract_header_value(parts, name)?
        };
        components.push((name.as_str(), value));
    }
    let component_refs: Vec<(&str, &str)> = components
        .iter()
        .map(|(name, value)| (*name, value.as_str()))
        .collect();
    let signing_string = build_signing_string(&component_refs);

    debug!(signing_string = ?signing_string, "Rebuilt signing string");

    let public_key = provider.public_key(&parsed.key_id)?;

    if verify_signature(
        &public_key,
        algorithm,
        signing_string.as_bytes(),
        &parsed.signature,
    ) {
        debug!(key_id = %parsed.key_id, "Message signature verification succeeded");
        Ok(VerifiedMessage {
            key_id: parsed.key_id,
            algorithm,
            signed_headers: parsed.headers,
            bearer_token: parsed.bearer_token,
        })
    } else {
        debug!(key_id = %parsed.key_id, "Message signature mismatch");
        Err(AuthError::SignatureDoesNotMatch)
    }
}

fn check_required_components(headers: &[String]) -> Result<(), AuthError> {
    let lowered: Vec<String> = headers.iter().map(|h| h.to_ascii_lowercase()).collect();
    let mut missing: Vec<String> = REQUIRED_COMPONENTS
        .iter()
        .filter(|required| !lowered.iter().any(|h| h == *required))
        .map(|required| (*required).to_owned())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        missing.sort_unstable();
        Err(AuthError::MissingSignedHeaders(missing))
    }
}

fn check_freshness(date: &str, max_skew: TimeDelta, clock: &dyn Clock) -> Result<(), AuthError> {
    let signed_at = DateTime::parse_from_rfc3339(date)
        .map_err(|_| AuthError::InvalidDate(date.to_owned()))?
        .with_timezone(&Utc);
    let skew = (clock.now() - signed_at).abs();
    if skew > max_skew {
        debug!(date, skew_secs = skew.num_seconds(), "Request date outside window");
        return Err(AuthError::RequestExpired);
    }
    Ok(())
}

/// Extract a header value as a string from the request parts.
fn extract_header_value(parts: &http::request::Parts, name: &str) -> Result<String, AuthError> {
    let lower = name.to_ascii_lowercase();
    parts
        .headers
        .get(lower.as_str())
        .ok_or_else(|| AuthError::MissingHeader(lower.clone()))?
        .to_str()
        .map(ToOwned::to_owned)
        .map_err(|_| AuthError::MissingHeader(lower))
}
