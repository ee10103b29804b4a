//! End-to-end outbound request signing.
//!
//! [`RequestSigner`] sequences the pieces for one request:
//!
//! 1. Take a fresh timestamp from the [`Clock`].
//! 2. Compute the body digest.
//! 3. Build the canonical signing string.
//! 4. Sign it.
//! 5. Assemble the `Authorization` header.
//!
//! The three resulting values must be sent verbatim as the `Date`, `Digest`
//! and `Authorization` headers. Taking a new timestamp afterwards
//! invalidates the signature.

use std::sync::Arc;

use http::HeaderMap;
use http::header::{AUTHORIZATION, DATE, HeaderName, HeaderValue};
use reqsig_core::{AccessToken, KeyId, ReqSigResult, SigningAlgorithm, SigningConfig};
use tracing::debug;

use crate::canonical::build_canonical_string;
use crate::clock::{Clock, SystemClock, format_timestamp};
use crate::digest::compute_digest;
use crate::error::SigningError;
use crate::header::build_authorization_header;
use crate::signer::{MessageSigner, sign};

/// Name of the body digest header.
pub const DIGEST: HeaderName = HeaderName::from_static("digest");

/// Per-key settings the orchestrator needs besides the key itself.
#[derive(Debug, Clone)]
pub struct SignerSettings {
    /// Key id placed in `keyid="..."`.
    pub key_id: KeyId,
    /// OAuth token to prefix, if any.
    pub access_token: Option<AccessToken>,
}

impl SignerSettings {
    /// Take the key id and token from a loaded [`SigningConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the config has no key uid.
    pub fn from_config(config: &SigningConfig) -> ReqSigResult<Self> {
        Ok(Self {
            key_id: config.key_id()?,
            access_token: config.access_token.clone(),
        })
    }
}

/// Header values to attach to a signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    /// `Date` header value, exactly as signed.
    pub date: String,
    /// `Digest` header value; empty when the request has no body.
    pub digest: String,
    /// `Authorization` header value.
    pub authorization: String,
}

impl SignedHeaders {
    /// Convert into an [`http::HeaderMap`] with `Date`, `Digest` and
    /// `Authorization` set.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::InvalidHeaderValue`] if a value contains
    /// characters not allowed in HTTP headers (e.g. a malformed token).
    pub fn to_header_map(&self) -> Result<HeaderMap, SigningError> {
        let mut headers = HeaderMap::with_capacity(3);
        headers.insert(DATE, header_value(&self.date, "Date")?);
        headers.insert(DIGEST, header_value(&self.digest, "Digest")?);
        headers.insert(
            AUTHORIZATION,
            header_value(&self.authorization, "Authorization")?,
        );
        Ok(headers)
    }
}

fn header_value(value: &str, name: &'static str) -> Result<HeaderValue, SigningError> {
    HeaderValue::from_str(value).map_err(|_| SigningError::InvalidHeaderValue(name))
}

/// Signs outbound requests with one key.
///
/// Holds no mutable state; share it behind an `Arc` across tasks.
pub struct RequestSigner {
    settings: SignerSettings,
    signer: Arc<dyn MessageSigner>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("settings", &self.settings)
            .field("algorithm", &self.signer.algorithm())
            .finish_non_exhaustive()
    }
}

impl RequestSigner {
    /// Create a signer using the system clock.
    #[must_use]
    pub fn new(settings: SignerSettings, signer: Arc<dyn MessageSigner>) -> Self {
        Self::with_clock(settings, signer, Arc::new(SystemClock))
    }

    /// Create a signer with an explicit clock.
    #[must_use]
    pub fn with_clock(
        settings: SignerSettings,
        signer: Arc<dyn MessageSigner>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settings,
            signer,
            clock,
        }
    }

    /// Algorithm advertised in produced headers.
    #[must_use]
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.signer.algorithm()
    }

    /// Sign one request.
    ///
    /// `body` must be the exact bytes that will be transmitted.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::InvalidPath`] for absolute or malformed paths
    /// and [`SigningError::Crypto`] if signing fails. On error nothing should
    /// be sent.
    pub fn sign_request(
        &self,
        method: &str,
        path: &str,
        body: Option<&[u8]>,
    ) -> Result<SignedHeaders, SigningError> {
        let date = format_timestamp(self.clock.now());
        let digest = compute_digest(body);
        let canonical = build_canonical_string(method, path, &date, &digest)?;
        let signature = sign(&canonical, self.signer.as_ref())?;
        let authorization = build_authorization_header(
            self.settings.key_id.as_str(),
            self.signer.algorithm(),
            &signature,
            self.settings.access_token.as_ref().map(AccessToken::expose),
        )?;

        debug!(
            method,
            path,
            key_id = %self.settings.key_id,
            date = %date,
            has_body = !digest.is_empty(),
            "Signed outbound request"
        );

        Ok(SignedHeaders {
            date,
            digest,
            authorization,
        })
    }
}

/// One-shot convenience over [`RequestSigner`] using the system clock.
///
/// # Errors
///
/// Same as [`RequestSigner::sign_request`], plus [`SigningError::EmptyKeyId`]
/// for a blank key id.
pub fn sign_request(
    method: &str,
    path: &str,
    body: Option<&[u8]>,
    key_id: &str,
    signer: Arc<dyn MessageSigner>,
    access_token: Option<&str>,
) -> Result<SignedHeaders, SigningError> {
    let settings = SignerSettings {
        key_id: KeyId::new(key_id).map_err(|_| SigningError::EmptyKeyId)?,
        access_token: access_token.map(AccessToken::new),
    };
    RequestSigner::new(settings, signer).sign_request(method, path, body)
}
