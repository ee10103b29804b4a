//! Signature generation and verification.
//!
//! RSA signatures are RSASSA-PKCS1-v1_5 over SHA-256 or SHA-512. ECDSA
//! signatures are produced by [`crate::ecdsa::EcdsaSigner`]. Either kind is
//! base64 encoded for transport in headers.

use std::fmt;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqsig_core::SigningAlgorithm;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Sha256, Sha512};
use tracing::debug;

use crate::ecdsa::{EcdsaSigner, verify_ecdsa};
use crate::error::SigningError;
use crate::keys::{PublicKey, key_bits, parse_private_key_pem};

/// Signs canonical strings on behalf of the request signer.
///
/// Implementations are sync; signing is CPU-bound and holds no shared
/// mutable state, so one signer may be used from many threads.
pub trait MessageSigner: Send + Sync {
    /// Sign `data` and return the raw signature bytes.
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, SigningError>;

    /// Algorithm advertised alongside the signature.
    fn algorithm(&self) -> SigningAlgorithm;

    /// Public half of the signing key.
    fn public_key(&self) -> PublicKey;
}

enum PrivateSigningKey {
    Sha256(SigningKey<Sha256>),
    Sha512(SigningKey<Sha512>),
}

/// RSA PKCS#1 v1.5 signer.
pub struct RsaSigner {
    signing_key: PrivateSigningKey,
    public_key: RsaPublicKey,
    algorithm: SigningAlgorithm,
}

impl RsaSigner {
    /// Wrap an already parsed private key.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::KeyAlgorithmMismatch`] for ECDSA algorithms.
    pub fn new(private_key: RsaPrivateKey, algorithm: SigningAlgorithm) -> Result<Self, SigningError> {
        let public_key = private_key.to_public_key();
        let signing_key = match algorithm {
            SigningAlgorithm::RsaSha256 => {
                PrivateSigningKey::Sha256(SigningKey::<Sha256>::new(private_key))
            }
            SigningAlgorithm::RsaSha512 => {
                PrivateSigningKey::Sha512(SigningKey::<Sha512>::new(private_key))
            }
            SigningAlgorithm::EcdsaSha256 | SigningAlgorithm::EcdsaSha512 => {
                return Err(SigningError::KeyAlgorithmMismatch {
                    key: "RSA",
                    algorithm,
                });
            }
        };
        Ok(Self {
            signing_key,
            public_key,
            algorithm,
        })
    }

    /// Parse a PEM private key and wrap it.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::InvalidKey`], [`SigningError::KeyTooSmall`],
    /// or [`SigningError::KeyAlgorithmMismatch`].
    pub fn from_pem(pem: &str, algorithm: SigningAlgorithm) -> Result<Self, SigningError> {
        Self::new(parse_private_key_pem(pem)?, algorithm)
    }
}

impl fmt::Debug for RsaSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaSigner")
            .field("algorithm", &self.algorithm)
            .field("bits", &key_bits(&self.public_key))
            .finish_non_exhaustive()
    }
}

impl MessageSigner for RsaSigner {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, SigningError> {
        let signature = match &self.signing_key {
            PrivateSigningKey::Sha256(key) => key.try_sign(data),
            PrivateSigningKey::Sha512(key) => key.try_sign(data),
        }
        .map_err(|e| SigningError::Crypto(e.to_string()))?;
        Ok(signature.to_vec())
    }

    fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    fn public_key(&self) -> PublicKey {
        PublicKey::Rsa(self.public_key.clone())
    }
}

/// Load a signer for `algorithm` from a PEM private key.
///
/// RSA algorithms take an RSA key, ECDSA algorithms a P-256 key.
///
/// # Errors
///
/// Returns [`SigningError::InvalidKey`] if the PEM does not hold a key of
/// the kind the algorithm needs, or [`SigningError::KeyTooSmall`].
pub fn signer_from_pem(
    pem: &str,
    algorithm: SigningAlgorithm,
) -> Result<Arc<dyn MessageSigner>, SigningError> {
    if algorithm.is_ecdsa() {
        Ok(Arc::new(EcdsaSigner::from_pem(pem, algorithm)?))
    } else {
        Ok(Arc::new(RsaSigner::from_pem(pem, algorithm)?))
    }
}

/// Sign a canonical string and return the base64 signature.
///
/// # Errors
///
/// Returns [`SigningError::Crypto`] if the primitive fails; never returns an
/// empty signature.
pub fn sign(canonical: &str, signer: &dyn MessageSigner) -> Result<String, SigningError> {
    let raw = signer.sign(canonical.as_bytes())?;
    if raw.is_empty() {
        return Err(SigningError::Crypto("signer returned no bytes".to_owned()));
    }
    debug!(algorithm = %signer.algorithm(), len = raw.len(), "Signed canonical string");
    Ok(BASE64.encode(raw))
}

/// Check a base64 signature over `data`.
///
/// Malformed base64, a malformed signature, or a key of the wrong type for
/// `algorithm` is a mismatch, not an error.
#[must_use]
pub fn verify_signature(
    public_key: &PublicKey,
    algorithm: SigningAlgorithm,
    data: &[u8],
    signature_b64: &str,
) -> bool {
    let Ok(raw) = BASE64.decode(signature_b64.trim()) else {
        debug!("Signature is not valid base64");
        return false;
    };

    match (public_key, algorithm.is_ecdsa()) {
        (PublicKey::Rsa(key), false) => verify_rsa(key, algorithm, data, &raw),
        (PublicKey::Ec(key), true) => verify_ecdsa(key, algorithm, data, &raw),
        (key, _) => {
            debug!(key = key.kind(), %algorithm, "Key type does not match algorithm");
            false
        }
    }
}

pub(crate) fn verify_rsa(
    public_key: &RsaPublicKey,
    algorithm: SigningAlgorithm,
    data: &[u8],
    raw_signature: &[u8],
) -> bool {
    let Ok(signature) = Signature::try_from(raw_signature) else {
        return false;
    };

    let result = match algorithm {
        SigningAlgorithm::RsaSha256 => {
            VerifyingKey::<Sha256>::new(public_key.clone()).verify(data, &signature)
        }
        SigningAlgorithm::RsaSha512 => {
            VerifyingKey::<Sha512>::new(public_key.clone()).verify(data, &signature)
        }
        SigningAlgorithm::EcdsaSha256 | SigningAlgorithm::EcdsaSha512 => return false,
    };
    result.is_ok()
}
