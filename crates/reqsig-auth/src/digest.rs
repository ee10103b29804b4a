//! Body digest calculation.
//!
//! The `Digest` header carries `Base64(SHA-512(body))` computed over the exact
//! bytes sent on the wire. A request without a payload carries an empty
//! digest; the empty string is a sentinel, not the hash of zero bytes.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use sha2::{Digest, Sha512};

/// Compute the `Digest` header value for a request body.
///
/// `None` and an empty slice both mean "no payload" and yield `""`.
///
/// # Examples
///
/// ```
/// use reqsig_auth::digest::compute_digest;
///
/// assert_eq!(compute_digest(None), "");
/// assert_eq!(compute_digest(Some(b"")), "");
/// assert_eq!(
///     compute_digest(Some(br#"{"a":1}"#)),
///     "77eoKY+QWudD2+IVLhYkFfYqFtLVrFx4gW3NVxFOeldHKbgTmI8dCYTPbzjE/Mmjfqn+w9o1GYNTb3J4XXq3Bw=="
/// );
/// ```
#[must_use]
pub fn compute_digest(body: Option<&[u8]>) -> String {
    match body {
        Some(bytes) if !bytes.is_empty() => hash_base64(bytes),
        _ => String::new(),
    }
}

/// `Base64(SHA-512(parts[0] ++ parts[1] ++ ...))`.
///
/// Shared with the webhook verifier, which hashes the secret and the body
/// back to back without any separator.
pub(crate) fn sha512_base64(parts: &[&[u8]]) -> String {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part);
    }
    BASE64.encode(hasher.finalize())
}

fn hash_base64(bytes: &[u8]) -> String {
    sha512_base64(&[bytes])
}
