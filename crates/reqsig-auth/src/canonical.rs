//! Canonical signing string construction.
//!
//! The string that gets signed has a fixed layout:
//!
//! ```text
//! (request-target): {method} {path}\n
//! Date: {timestamp}\n
//! Digest: {digest}
//! ```
//!
//! There is no trailing newline. The server rebuilds the same bytes from the
//! request it receives, so the labels, their order, and the separator must
//! match exactly.

use tracing::debug;

use crate::error::SigningError;

/// Pseudo-header naming the lowercase method and the path being requested.
pub const REQUEST_TARGET: &str = "(request-target)";

/// Value of the `headers="..."` parameter: the components of the canonical
/// string, in the order they appear in it.
pub const SIGNED_HEADERS: &str = "(request-target) Date Digest";

/// Build the canonical signing string for an outbound request.
///
/// The method is lowercased; the path is kept byte-for-byte, including case
/// and query string.
///
/// # Errors
///
/// Returns [`SigningError::InvalidMethod`] if `method` is not an HTTP token,
/// or [`SigningError::InvalidPath`] if `path` carries a scheme or host,
/// is not rooted at `/`, or contains characters that are not valid in a
/// request target.
///
/// # Examples
///
/// ```
/// use reqsig_auth::canonical::build_canonical_string;
///
/// let canonical = build_canonical_string(
///     "GET",
///     "/api/v1/abc/account/def",
///     "2024-01-01T00:00:00.000Z",
///     "",
/// )
/// .unwrap();
/// assert_eq!(
///     canonical,
///     "(request-target): get /api/v1/abc/account/def\nDate: 2024-01-01T00:00:00.000Z\nDigest: "
/// );
/// ```
pub fn build_canonical_string(
    method: &str,
    path: &str,
    date: &str,
    digest: &str,
) -> Result<String, SigningError> {
    validate_request_method(method)?;
    validate_request_path(path)?;

    let request_target = build_request_target(method, path);
    let canonical = build_signing_string(&[
        (REQUEST_TARGET, &request_target),
        ("Date", date),
        ("Digest", digest),
    ]);

    debug!(canonical = ?canonical, "Built canonical signing string");

    Ok(canonical)
}

/// Build the `(request-target)` value: lowercase method, a space, the path.
#[must_use]
pub fn build_request_target(method: &str, path: &str) -> String {
    format!("{} {path}", method.to_ascii_lowercase())
}

/// Join `name: value` lines with `\n`, without a trailing newline.
///
/// # Examples
///
/// ```
/// use reqsig_auth::canonical::build_signing_string;
///
/// assert_eq!(
///     build_signing_string(&[("Date", "d"), ("Digest", "x")]),
///     "Date: d\nDigest: x"
/// );
/// ```
#[must_use]
pub fn build_signing_string(components: &[(&str, &str)]) -> String {
    components
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check that `method` is a single HTTP token.
///
/// Extension methods are accepted; separators, whitespace and control
/// characters are not.
///
/// # Errors
///
/// Returns [`SigningError::InvalidMethod`] if `method` is empty or is not a
/// valid token.
pub fn validate_request_method(method: &str) -> Result<(), SigningError> {
    if http::Method::from_bytes(method.as_bytes()).is_err() {
        return Err(SigningError::InvalidMethod(method.to_owned()));
    }
    Ok(())
}

/// Check that `path` is an origin-form request target (`/path?query`).
///
/// # Errors
///
/// Returns [`SigningError::InvalidPath`] describing the first problem found.
pub fn validate_request_path(path: &str) -> Result<(), SigningError> {
    let reject = |reason: &'static str| {
        Err(SigningError::InvalidPath {
            path: path.to_owned(),
            reason,
        })
    };

    if path.is_empty() {
        return reject("path is empty");
    }
    if path.starts_with("//") {
        return reject("network-path reference carries a host");
    }
    if !path.starts_with('/') {
        if path.contains("://") {
            return reject("absolute URL; strip the scheme and host");
        }
        return reject("path must start with '/'");
    }
    if path.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return reject("path contains whitespace or control characters");
    }
    if path.parse::<http::uri::PathAndQuery>().is_err() {
        return reject("not a valid path and query");
    }

    Ok(())
}
