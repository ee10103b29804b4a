//! Core types, configuration, and errors for reqsig.
//!
//! This crate provides the value types shared by the request signer, the
//! inbound verifiers, and the command-line tool: key ids, the signing
//! algorithm, redacted secret wrappers, and the environment-driven
//! [`SigningConfig`].

mod config;
mod error;
mod types;

pub use config::{DEFAULT_MAX_CLOCK_SKEW_SECS, SigningConfig};
pub use error::{ReqSigError, ReqSigResult};
pub use types::{AccessToken, KeyId, SharedSecret, SigningAlgorithm};
