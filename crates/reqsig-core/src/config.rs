//! Configuration for request signing and webhook verification.
//!
//! All configuration is driven by environment variables and returned as a
//! plain value; nothing is stored process-wide.

use tracing::debug;

use crate::error::{ReqSigError, ReqSigResult};
use crate::types::{AccessToken, KeyId, SharedSecret, SigningAlgorithm};

/// Default inbound `Date` tolerance, in seconds.
pub const DEFAULT_MAX_CLOCK_SKEW_SECS: u64 = 300;

/// Configuration for signing outbound requests and verifying inbound ones.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningConfig {
    /// Key uid registered with the API provider.
    pub key_uid: Option<String>,
    /// Path of the PEM-encoded private key. Only the CLI reads it.
    pub private_key_path: String,
    /// Signing algorithm.
    pub algorithm: SigningAlgorithm,
    /// Optional OAuth access token.
    #[serde(skip_serializing, default)]
    pub access_token: Option<AccessToken>,
    /// Shared secret for v1 webhooks.
    #[serde(skip_serializing, default)]
    pub webhook_secret: Option<SharedSecret>,
    /// Maximum accepted distance between an inbound `Date` and now.
    pub max_clock_skew_secs: u64,
    /// Log level.
    pub log_level: String,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            key_uid: None,
            private_key_path: "starling-api-private.key".to_owned(),
            algorithm: SigningAlgorithm::default(),
            access_token: None,
            webhook_secret: None,
            max_clock_skew_secs: DEFAULT_MAX_CLOCK_SKEW_SECS,
            log_level: "info".to_owned(),
        }
    }
}

impl SigningConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Returns an error if `REQSIG_ALGORITHM` or `REQSIG_MAX_CLOCK_SKEW_SECS`
    /// hold values that cannot be parsed.
    pub fn from_env() -> ReqSigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Same as [`SigningConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ReqSigResult<Self> {
        let mut config = Self::default();

        if let Some(v) = lookup("REQSIG_KEY_UID") {
            config.key_uid = Some(v);
        }
        if let Some(v) = lookup("REQSIG_PRIVATE_KEY") {
            config.private_key_path = v;
        }
        if let Some(v) = lookup("REQSIG_ALGORITHM") {
            config.algorithm = v.parse()?;
        }
        if let Some(v) = lookup("REQSIG_ACCESS_TOKEN").filter(|v| !v.is_empty()) {
            config.access_token = Some(AccessToken::new(v));
        }
        if let Some(v) = lookup("REQSIG_WEBHOOK_SECRET").filter(|v| !v.is_empty()) {
            config.webhook_secret = Some(SharedSecret::new(v));
        }
        if let Some(v) = lookup("REQSIG_MAX_CLOCK_SKEW_SECS") {
            config.max_clock_skew_secs = v.trim().parse().map_err(|_| {
                ReqSigError::Config(format!("invalid REQSIG_MAX_CLOCK_SKEW_SECS: {v}"))
            })?;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }

        debug!(
            algorithm = %config.algorithm,
            has_key_uid = config.key_uid.is_some(),
            has_access_token = config.access_token.is_some(),
            "loaded signing configuration"
        );

        Ok(config)
    }

    /// Resolve the configured key uid into a [`KeyId`].
    ///
    /// # Errors
    /// Returns [`ReqSigError::Config`] when the key uid is missing or empty.
    pub fn key_id(&self) -> ReqSigResult<KeyId> {
        let uid = self
            .key_uid
            .as_deref()
            .ok_or_else(|| ReqSigError::Config("REQSIG_KEY_UID is not set".to_owned()))?;
        KeyId::new(uid)
    }

    /// Check that the configuration is complete enough to sign requests.
    ///
    /// # Errors
    /// Returns [`ReqSigError::Config`] when the key uid is missing or empty.
    pub fn validate(&self) -> ReqSigResult<()> {
        self.key_id().map(|_| ())
    }
}
