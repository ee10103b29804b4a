//! `Authorization` header assembly and parsing.
//!
//! Format:
//! ```text
//! [Bearer {token};]Signature keyid="{keyid}",algorithm="{alg}",headers="(request-target) Date Digest",signature="{b64}"
//! ```

use reqsig_core::SigningAlgorithm;

use crate::canonical::SIGNED_HEADERS;
use crate::error::{AuthError, SigningError};

const SIGNATURE_SCHEME: &str = "Signature ";

/// Build the `Authorization` header value.
///
/// When `access_token` is present the value is prefixed with
/// `Bearer {token};`, composing the bearer scheme with the signature scheme.
///
/// # Errors
///
/// Returns [`SigningError::EmptyKeyId`] or [`SigningError::EmptySignature`].
///
/// # Examples
///
/// ```
/// use reqsig_auth::header::build_authorization_header;
/// use reqsig_core::SigningAlgorithm;
///
/// let header =
///     build_authorization_header("key-1", SigningAlgorithm::RsaSha512, "c2ln", None).unwrap();
/// assert_eq!(
///     header,
///     r#"Signature keyid="key-1",algorithm="rsa-sha512",headers="(request-target) Date Digest",signature="c2ln""#
/// );
/// ```
pub fn build_authorization_header(
    key_id: &str,
    algorithm: SigningAlgorithm,
    signature: &str,
    access_token: Option<&str>,
) -> Result<String, SigningError> {
    let signature_params = build_signature_params(key_id, algorithm, signature)?;
    Ok(match access_token {
        Some(token) => format!("Bearer {token};{signature_params}"),
        None => signature_params,
    })
}

/// Build the bare `Signature keyid=...` value, without any bearer prefix.
///
/// # Errors
///
/// Returns [`SigningError::EmptyKeyId`] or [`SigningError::EmptySignature`].
pub fn build_signature_params(
    key_id: &str,
    algorithm: SigningAlgorithm,
    signature: &str,
) -> Result<String, SigningError> {
    if key_id.trim().is_empty() {
        return Err(SigningError::EmptyKeyId);
    }
    if signature.trim().is_empty() {
        return Err(SigningError::EmptySignature);
    }
    Ok(format!(
        "{SIGNATURE_SCHEME}keyid=\"{key_id}\",algorithm=\"{algorithm}\",headers=\"{SIGNED_HEADERS}\",signature=\"{signature}\""
    ))
}

/// Parsed components of a signature `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAuthorization {
    /// Bearer token, if the header carried one.
    pub bearer_token: Option<String>,
    /// The key id.
    pub key_id: String,
    /// Algorithm as sent on the wire.
    pub algorithm: String,
    /// Signed component names, in signing order, as sent.
    pub headers: Vec<String>,
    /// Base64 signature.
    pub signature: String,
}

impl ParsedAuthorization {
    /// Resolve the wire algorithm name.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UnsupportedAlgorithm`] for names other than
    /// `rsa-sha256`, `rsa-sha512`, `ecdsa-sha256` and `ecdsa-sha512`.
    pub fn signing_algorithm(&self) -> Result<SigningAlgorithm, AuthError> {
        match self.algorithm.to_ascii_lowercase().as_str() {
            "rsa-sha256" => Ok(SigningAlgorithm::RsaSha256),
            "rsa-sha512" => Ok(SigningAlgorithm::RsaSha512),
            "ecdsa-sha256" => Ok(SigningAlgorithm::EcdsaSha256),
            "ecdsa-sha512" => Ok(SigningAlgorithm::EcdsaSha512),
            _ => Err(AuthError::UnsupportedAlgorithm(self.algorithm.clone())),
        }
    }
}

/// Parse an `Authorization` header value produced by
/// [`build_authorization_header`] or by another implementation of the same
/// scheme.
///
/// Parameter names are case-insensitive, surrounding quotes are optional,
/// and unknown parameters are ignored.
///
/// # Errors
///
/// Returns [`AuthError::InvalidAuthHeader`] if the scheme is not `Signature`
/// or a required parameter is missing.
pub fn parse_authorization_header(value: &str) -> Result<ParsedAuthorization, AuthError> {
    let value = value.trim();

    let (bearer_token, signature_part) = match value.split_once(';') {
        Some((bearer, rest)) if bearer.trim_start().starts_with("Bearer ") => {
            let token = bearer.trim_start()["Bearer ".len()..].trim();
            (Some(token.to_owned()), rest.trim_start())
        }
        _ => (None, value),
    };

    let params = signature_part
        .strip_prefix(SIGNATURE_SCHEME)
        .ok_or(AuthError::InvalidAuthHeader)?;

    let mut key_id = None;
    let mut algorithm = None;
    let mut headers = None;
    let mut signature = None;

    for part in params.split(',') {
        let Some((name, raw)) = part.split_once('=') else {
            continue;
        };
        let value = raw.trim().trim_matches('"').to_owned();
        match name.trim().to_ascii_lowercase().as_str() {
            "keyid" => key_id = Some(value),
            "algorithm" => algorithm = Some(value),
            "headers" => headers = Some(value),
            "signature" => signature = Some(value),
            _ => {}
        }
    }

    let key_id = key_id
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::InvalidAuthHeader)?;
    let signature = signature
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::InvalidAuthHeader)?;
    let algorithm = algorithm.ok_or(AuthError::InvalidAuthHeader)?;
    let headers = headers
        .ok_or(AuthError::InvalidAuthHeader)?
        .split_whitespace()
        .map(ToOwned::to_owned)
        .collect();

    Ok(ParsedAuthorization {
        bearer_token,
        key_id,
        algorithm,
        headers,
        signature,
    })
}
