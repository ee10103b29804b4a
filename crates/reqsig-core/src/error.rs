//! Error types for the reqsig core.

/// Core error type for configuration and value validation.
#[derive(Debug, thiserror::Error)]
pub enum ReqSigError {
    /// The signing algorithm name is not one we can produce or verify.
    #[error("unsupported signing algorithm: {0} (expected rsa-sha256 or rsa-sha512)")]
    UnsupportedAlgorithm(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience result type for reqsig operations.
pub type ReqSigResult<T> = Result<T, ReqSigError>;
