//! Public key lookup by key id.
//!
//! This module defines the [`PublicKeyProvider`] trait used by the inbound
//! verifier to resolve the `keyid` of a signed request, along with a
//! [`StaticKeyProvider`] for tests and small deployments.

use std::collections::HashMap;

use crate::error::AuthError;
use crate::keys::PublicKey;

/// Trait for looking up verification keys by key id.
///
/// Implementations may back this with a database, a key registry, or any
/// other store.
pub trait PublicKeyProvider: Send + Sync {
    /// Retrieve the public key registered for `key_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::KeyNotFound`] if the key id is not recognized.
    fn public_key(&self, key_id: &str) -> Result<PublicKey, AuthError>;
}

/// A simple in-memory key provider backed by a `HashMap`.
#[derive(Debug, Clone, Default)]
pub struct StaticKeyProvider {
    keys: HashMap<String, PublicKey>,
}

impl StaticKeyProvider {
    /// Create a provider from `(key_id, public_key)` pairs. RSA and P-256
    /// keys may be mixed.
    pub fn new<K: Into<PublicKey>>(keys: impl IntoIterator<Item = (String, K)>) -> Self {
        Self {
            keys: keys
                .into_iter()
                .map(|(key_id, key)| (key_id, key.into()))
                .collect(),
        }
    }
}

impl PublicKeyProvider for StaticKeyProvider {
    fn public_key(&self, key_id: &str) -> Result<PublicKey, AuthError> {
        self.keys
            .get(key_id)
            .cloned()
            .ok_or_else(|| AuthError::KeyNotFound(key_id.to_owned()))
    }
}
