//! HTTP Signature request signing and webhook verification for reqsig.
//!
//! This crate signs outbound API requests with an RSA or P-256 ECDSA key and
//! verifies the two kinds of inbound traffic a client of a signed API
//! receives: requests signed the same way, and webhooks signed with a shared
//! secret or an RSA key.
//!
//! # Overview
//!
//! An outbound request is signed over a canonical string built from the
//! lowercase method, the path, a fresh timestamp and a SHA-512 digest of the
//! body. The caller sends the timestamp, the digest and the resulting
//! `Authorization` value as the `Date`, `Digest` and `Authorization` headers.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use reqsig_auth::request::{RequestSigner, SignerSettings};
//! use reqsig_auth::signer::RsaSigner;
//! use reqsig_core::{KeyId, SigningAlgorithm};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pem = std::fs::read_to_string("starling-api-private.key")?;
//! let signer = RequestSigner::new(
//!     SignerSettings {
//!         key_id: KeyId::new("bbbbbbbb-bbbb-4bbb-bbbb-bbbbbbbbbbbb")?,
//!         access_token: None,
//!     },
//!     Arc::new(RsaSigner::from_pem(&pem, SigningAlgorithm::RsaSha512)?),
//! );
//!
//! let headers = signer.sign_request("get", "/api/v2/accounts", None)?;
//! println!("Authorization: {}", headers.authorization);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Canonical signing string construction
//! - [`clock`] - Time source and timestamp formatting
//! - [`digest`] - Body digest calculation
//! - [`ecdsa`] - ECDSA P-256 signer
//! - [`error`] - Signing and verification error types
//! - [`header`] - `Authorization` header assembly and parsing
//! - [`keys`] - Key loading, encoding and RSA key generation
//! - [`keystore`] - Public key provider trait and in-memory implementation
//! - [`request`] - End-to-end outbound request signing
//! - [`rotation`] - Key rotation upload signature
//! - [`signer`] - Signer trait, RSA signer and signature verification
//! - [`verify`] - Inbound message-signature verification
//! - [`webhook`] - Webhook signature verification

pub mod canonical;
pub mod clock;
pub mod digest;
pub mod ecdsa;
pub mod error;
pub mod header;
pub mod keys;
pub mod keystore;
pub mod request;
pub mod rotation;
pub mod signer;
pub mod verify;
pub mod webhook;

pub use clock::{Clock, FixedClock, SystemClock};
pub use digest::compute_digest;
pub use ecdsa::EcdsaSigner;
pub use error::{AuthError, SigningError};
pub use header::build_authorization_header;
pub use keys::PublicKey;
pub use keystore::{PublicKeyProvider, StaticKeyProvider};
pub use request::{RequestSigner, SignedHeaders, SignerSettings, sign_request};
pub use rotation::{KeyRotationUpload, sign_key_rotation};
pub use signer::{MessageSigner, RsaSigner, sign, signer_from_pem, verify_signature};
pub use verify::{VerificationPolicy, VerifiedMessage, verify_message};
pub use webhook::{WebhookVerifier, verify_webhook, verify_webhook_v2};
