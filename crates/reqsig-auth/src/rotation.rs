//! Signature for uploading a replacement API public key.
//!
//! The upload is authorized by a separate rotation key. The signed string
//! covers only the timestamp and the digest of the new key:
//!
//! ```text
//! Date: {timestamp}\n
//! Digest: {digest}
//! ```
//!
//! The resulting signature is formatted like an `Authorization` value without
//! a bearer prefix. Its `headers` parameter still names `(request-target)`
//! because the receiving service expects that literal.

use serde::Serialize;
use tracing::info;

use crate::canonical::build_signing_string;
use crate::clock::{Clock, format_timestamp};
use crate::digest::compute_digest;
use crate::error::SigningError;
use crate::header::build_signature_params;
use crate::keys::PublicKey;
use crate::signer::{MessageSigner, sign};

/// Body of a key-rotation upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRotationUpload {
    /// New public key as base64 SubjectPublicKeyInfo DER.
    pub api_key: String,
    /// `Signature keyid=...` value produced with the rotation key.
    pub upload_signature: String,
    /// Timestamp that was signed.
    pub timestamp: String,
}

/// Sign the upload of `new_public_key` with the rotation key.
///
/// # Errors
///
/// Returns [`SigningError::EmptyKeyId`] for a blank rotation key id,
/// [`SigningError::InvalidKey`] if the new key cannot be encoded, or
/// [`SigningError::Crypto`] if signing fails.
pub fn sign_key_rotation(
    rotation_key_id: &str,
    signer: &dyn MessageSigner,
    new_public_key: &PublicKey,
    clock: &dyn Clock,
) -> Result<KeyRotationUpload, SigningError> {
    if rotation_key_id.trim().is_empty() {
        return Err(SigningError::EmptyKeyId);
    }

    let api_key = new_public_key.to_base64_der()?;
    let timestamp = format_timestamp(clock.now());
    let digest = compute_digest(Some(api_key.as_bytes()));
    let signing_string = build_signing_string(&[("Date", &timestamp), ("Digest", &digest)]);

    let signature = sign(&signing_string, signer)?;
    let upload_signature = build_signature_params(rotation_key_id, signer.algorithm(), &signature)?;

    info!(rotation_key_id, timestamp = %timestamp, "Signed public key rotation upload");

    Ok(KeyRotationUpload {
        api_key,
        upload_signature,
        timestamp,
    })
}
