//! Error types for signing and verification.
//!
//! Outbound failures are [`SigningError`]; they are always fatal for the
//! request being built and are never retried. Inbound message-signature
//! failures are [`AuthError`]. Webhook verification reports mismatches as a
//! plain `false` and has no error type.

use reqsig_core::SigningAlgorithm;

/// Errors that can occur while signing an outbound request.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    /// The private or public key could not be parsed, or is of an unsupported
    /// type.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The RSA modulus is below the accepted minimum.
    #[error("RSA key is {bits} bits, at least {minimum} are required")]
    KeyTooSmall {
        /// Modulus size of the rejected key.
        bits: usize,
        /// Minimum accepted modulus size.
        minimum: usize,
    },

    /// The key type cannot produce signatures for the requested algorithm.
    #[error("{key} key cannot sign with {algorithm}")]
    KeyAlgorithmMismatch {
        /// Type of the loaded key.
        key: &'static str,
        /// Requested algorithm.
        algorithm: SigningAlgorithm,
    },

    /// The request method is not a valid HTTP token.
    #[error("invalid request method {0:?}")]
    InvalidMethod(String),

    /// The request path is absolute, relative, or otherwise unusable.
    #[error("invalid request path {path:?}: {reason}")]
    InvalidPath {
        /// The rejected path.
        path: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The key id passed to the header assembler is empty.
    #[error("key id must not be empty")]
    EmptyKeyId,

    /// The signature passed to the header assembler is empty.
    #[error("signature must not be empty")]
    EmptySignature,

    /// A computed header value contains characters HTTP does not allow.
    #[error("invalid value for header {0}")]
    InvalidHeaderValue(&'static str),

    /// The underlying signature primitive failed.
    #[error("signing failed: {0}")]
    Crypto(String),
}

impl SigningError {
    /// Whether this failure is a configuration problem (bad key, bad path,
    /// bad parameters) rather than a failure of the crypto primitive itself.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::Crypto(_))
    }
}

/// Errors that can occur while verifying an inbound signed request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The `Authorization` header is missing from the request.
    #[error("Missing Authorization header")]
    MissingAuthHeader,

    /// The `Authorization` header could not be parsed.
    #[error("Invalid Authorization header format")]
    InvalidAuthHeader,

    /// The signing algorithm is not supported.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The `headers` parameter does not cover every required component.
    #[error("Authorization header is missing required signed headers: {}", .0.join(", "))]
    MissingSignedHeaders(Vec<String>),

    /// A header referenced in the `headers` parameter is absent from the request.
    #[error("Missing required header: {0}")]
    MissingHeader(String),

    /// The `Digest` header does not match the request body.
    #[error("Digest does not match payload")]
    DigestMismatch,

    /// The `Date` header could not be parsed.
    #[error("Invalid Date header: {0}")]
    InvalidDate(String),

    /// The `Date` header lies outside the accepted clock skew.
    #[error("Request date is outside the accepted window")]
    RequestExpired,

    /// No public key is registered for the key id.
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// The computed signature does not match the provided signature.
    #[error("Signature does not match")]
    SignatureDoesNotMatch,
}
