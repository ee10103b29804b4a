//! End-to-end tests for reqsig.
//!
//! These run the signer and the verifiers against each other and against
//! vectors produced independently with OpenSSL, using the PEM fixtures
//! shipped in `crates/reqsig-auth/testdata`. No network access is needed.
//!
//! ```text
//! cargo test -p reqsig-integration
//! ```

use std::sync::{Arc, Once};

use chrono::{DateTime, TimeZone, Utc};
use reqsig_auth::keys::parse_public_key_pem;
use reqsig_auth::{
    FixedClock, RequestSigner, RsaSigner, SignedHeaders, SignerSettings, StaticKeyProvider,
    VerificationPolicy,
};
use reqsig_core::{AccessToken, KeyId, SigningAlgorithm};

static INIT: Once = Once::new();

/// 2048-bit API signing key (PKCS#8).
pub const API_PRIVATE_PEM: &str = include_str!("../../../crates/reqsig-auth/testdata/api-private.pem");
/// The same key in PKCS#1 form.
pub const API_PRIVATE_PKCS1_PEM: &str =
    include_str!("../../../crates/reqsig-auth/testdata/api-private-pkcs1.pem");
/// Public half of [`API_PRIVATE_PEM`].
pub const API_PUBLIC_PEM: &str = include_str!("../../../crates/reqsig-auth/testdata/api-public.pem");
/// 4096-bit API signing key.
pub const API_4096_PRIVATE_PEM: &str =
    include_str!("../../../crates/reqsig-auth/testdata/api-4096-private.pem");
/// 1024-bit key, below the accepted minimum.
pub const WEAK_PRIVATE_PEM: &str =
    include_str!("../../../crates/reqsig-auth/testdata/weak-private.pem");
/// P-256 key for the ECDSA algorithms.
pub const EC_PRIVATE_PEM: &str = include_str!("../../../crates/reqsig-auth/testdata/ec-private.pem");
/// Rotation key pair.
pub const ROTATION_PRIVATE_PEM: &str =
    include_str!("../../../crates/reqsig-auth/testdata/rotation-private.pem");
/// Public half of [`ROTATION_PRIVATE_PEM`].
pub const ROTATION_PUBLIC_PEM: &str =
    include_str!("../../../crates/reqsig-auth/testdata/rotation-public.pem");

/// Key uid used throughout the tests.
pub const KEY_ID: &str = "bbbbbbbb-bbbb-4bbb-bbbb-bbbbbbbbbbbb";

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// 2024-01-01T00:00:00Z.
#[must_use]
pub fn fixed_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(|| panic!("valid fixed instant"))
}

/// Signer for [`API_PRIVATE_PEM`] with a frozen clock.
#[must_use]
pub fn fixed_signer(algorithm: SigningAlgorithm, access_token: Option<&str>) -> RequestSigner {
    init_tracing();

    let key = RsaSigner::from_pem(API_PRIVATE_PEM, algorithm)
        .unwrap_or_else(|e| panic!("fixture key must load: {e}"));
    let key_id = KeyId::new(KEY_ID).unwrap_or_else(|e| panic!("valid key id: {e}"));
    RequestSigner::with_clock(
        SignerSettings {
            key_id,
            access_token: access_token.map(AccessToken::new),
        },
        Arc::new(key),
        Arc::new(FixedClock(fixed_instant())),
    )
}

/// Provider that knows [`KEY_ID`].
#[must_use]
pub fn provider() -> StaticKeyProvider {
    let key = parse_public_key_pem(API_PUBLIC_PEM)
        .unwrap_or_else(|e| panic!("fixture public key must load: {e}"));
    StaticKeyProvider::new(vec![(KEY_ID.to_owned(), key)])
}

/// Policy checking freshness against [`fixed_instant`].
#[must_use]
pub fn policy() -> VerificationPolicy {
    VerificationPolicy {
        max_clock_skew: Some(chrono::TimeDelta::minutes(5)),
        clock: Arc::new(FixedClock(fixed_instant())),
    }
}

/// Build request parts carrying the signed headers, as a server would see them.
#[must_use]
pub fn signed_request_parts(
    method: &str,
    path: &str,
    headers: &SignedHeaders,
) -> http::request::Parts {
    let (mut parts, ()) = http::Request::builder()
        .method(method.to_ascii_uppercase().as_str())
        .uri(format!("https://api-sandbox.example.com{path}"))
        .body(())
        .unwrap_or_else(|e| panic!("valid request: {e}"))
        .into_parts();
    parts.headers = headers
        .to_header_map()
        .unwrap_or_else(|e| panic!("valid headers: {e}"));
    parts
}

mod test_message_verification;
mod test_signing;
