//! Common value types shared by the signer, the verifiers, and the CLI.

use std::fmt;
use std::str::FromStr;

use crate::error::ReqSigError;

/// Opaque identifier telling the server which public key verifies a signature.
///
/// Usually a UUID issued by the API provider, but the value is never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct KeyId(String);

impl KeyId {
    /// Create a new key id.
    ///
    /// # Errors
    /// Returns an error if the id is empty or only whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, ReqSigError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ReqSigError::Config("key id must not be empty".to_owned()));
        }
        Ok(Self(id))
    }

    /// Get the key id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signature algorithm advertised in the `algorithm="..."` parameter.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum SigningAlgorithm {
    /// RSASSA-PKCS1-v1_5 over SHA-256.
    #[serde(rename = "rsa-sha256")]
    RsaSha256,
    /// RSASSA-PKCS1-v1_5 over SHA-512.
    #[default]
    #[serde(rename = "rsa-sha512")]
    RsaSha512,
    /// ECDSA on P-256 over SHA-256, DER-encoded signature.
    #[serde(rename = "ecdsa-sha256")]
    EcdsaSha256,
    /// ECDSA on P-256 over SHA-512, DER-encoded signature.
    #[serde(rename = "ecdsa-sha512")]
    EcdsaSha512,
}

impl SigningAlgorithm {
    /// Wire name used in the `Authorization` header.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RsaSha256 => "rsa-sha256",
            Self::RsaSha512 => "rsa-sha512",
            Self::EcdsaSha256 => "ecdsa-sha256",
            Self::EcdsaSha512 => "ecdsa-sha512",
        }
    }

    /// Whether the algorithm needs an elliptic-curve key.
    #[must_use]
    pub fn is_ecdsa(self) -> bool {
        matches!(self, Self::EcdsaSha256 | Self::EcdsaSha512)
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SigningAlgorithm {
    type Err = ReqSigError;

    /// Accepts the wire name (`rsa-sha512`) and the constant-style name
    /// (`RSA_SHA512`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "rsa-sha256" => Ok(Self::RsaSha256),
            "rsa-sha512" => Ok(Self::RsaSha512),
            "ecdsa-sha256" => Ok(Self::EcdsaSha256),
            "ecdsa-sha512" => Ok(Self::EcdsaSha512),
            _ => Err(ReqSigError::UnsupportedAlgorithm(s.to_owned())),
        }
    }
}

/// OAuth access token sent as `Bearer {token};` ahead of the signature.
#[derive(Clone, PartialEq, Eq, serde::Deserialize)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Expose the raw token for header assembly.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Secret shared with the webhook sender.
#[derive(Clone, PartialEq, Eq, serde::Deserialize)]
pub struct SharedSecret(String);

impl SharedSecret {
    /// Wrap a raw secret.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Raw secret bytes, for hashing.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(***)")
    }
}
