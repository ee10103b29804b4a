//! Subcommand implementations, kept free of argument parsing and printing
//! side effects so they can be tested directly.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use http::HeaderMap;
use reqsig_auth::keys::{encode_private_key_pem, generate_private_key, parse_public_key_pem};
use reqsig_auth::webhook::WEBHOOK_SIGNATURE_HEADER;
use reqsig_auth::{
    KeyRotationUpload, MessageSigner, PublicKey, RequestSigner, SignedHeaders, SignerSettings,
    SystemClock, WebhookVerifier, sign_key_rotation, signer_from_pem, verify_webhook_v2,
};
use reqsig_core::{SigningAlgorithm, SigningConfig};
use tracing::{info, warn};

/// Resolve the body from an inline value or a file.
pub fn read_body(inline: Option<String>, file: Option<&Path>) -> Result<Option<Vec<u8>>> {
    match (inline, file) {
        (Some(body), _) => Ok(Some(body.into_bytes())),
        (None, Some(path)) => std::fs::read(path)
            .map(Some)
            .with_context(|| format!("cannot read body from {}", path.display())),
        (None, None) => Ok(None),
    }
}

fn load_signer(path: &Path, algorithm: SigningAlgorithm) -> Result<Arc<dyn MessageSigner>> {
    let pem = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read private key {}", path.display()))?;
    signer_from_pem(&pem, algorithm)
        .with_context(|| format!("cannot load private key {}", path.display()))
}

/// Sign one request with the configured key.
pub fn sign(
    config: &SigningConfig,
    method: &str,
    path: &str,
    body: Option<&[u8]>,
) -> Result<SignedHeaders> {
    let settings = SignerSettings::from_config(config).context("cannot sign request")?;
    let signer = load_signer(Path::new(&config.private_key_path), config.algorithm)?;
    let headers = RequestSigner::new(settings, signer)
        .sign_request(method, path, body)
        .with_context(|| format!("cannot sign {method} {path}"))?;
    Ok(headers)
}

/// Render signed headers as `Name: value` lines.
pub fn format_signed_headers(headers: &SignedHeaders) -> String {
    format!(
        "Date: {}\nDigest: {}\nAuthorization: {}\n",
        headers.date, headers.digest, headers.authorization
    )
}

/// Verify a webhook payload.
///
/// With a public key, the v2 RSA scheme is used; otherwise the configured
/// shared secret.
pub fn verify_webhook(
    config: &SigningConfig,
    signature: &str,
    body: &[u8],
    public_key: Option<&Path>,
) -> Result<bool> {
    let valid = if let Some(path) = public_key {
        let pem = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read public key {}", path.display()))?;
        let key = parse_public_key_pem(&pem)
            .with_context(|| format!("cannot load public key {}", path.display()))?;
        verify_webhook_v2(body, &key, signature)
    } else {
        let secret = config
            .webhook_secret
            .clone()
            .context("REQSIG_WEBHOOK_SECRET is not set")?;
        WebhookVerifier::new(secret).verify_request(&signature_headers(signature)?, body)
    };

    if valid {
        info!(body_len = body.len(), "webhook signature is valid");
    } else {
        warn!(body_len = body.len(), "webhook signature is invalid");
    }
    Ok(valid)
}

fn signature_headers(signature: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        WEBHOOK_SIGNATURE_HEADER,
        signature
            .trim()
            .parse()
            .context("signature is not a valid header value")?,
    );
    Ok(headers)
}

/// Generate an RSA key pair and write both halves as PEM.
///
/// Neither file may exist yet. On Unix the private key is created with mode
/// `0600`.
pub fn keygen(bits: usize, private_key_out: &Path, public_key_out: &Path) -> Result<()> {
    let private_key = generate_private_key(bits).context("cannot generate key pair")?;
    let public_pem = PublicKey::from(private_key.to_public_key())
        .to_pem()
        .context("cannot encode public key")?;
    let private_pem = encode_private_key_pem(&private_key).context("cannot encode private key")?;

    write_new_file(private_key_out, &private_pem, true)?;
    write_new_file(public_key_out, &public_pem, false)?;
    info!(
        bits,
        private_key = %private_key_out.display(),
        public_key = %public_key_out.display(),
        "wrote key pair"
    );
    Ok(())
}

/// Where the key being uploaded by [`rotate`] comes from.
#[derive(Debug, Clone, Copy)]
pub enum NewKey<'a> {
    /// An existing PEM public key.
    Existing(&'a Path),
    /// A fresh RSA key pair; the private half is written to `private_key_out`.
    Generate {
        /// Destination of the new private key.
        private_key_out: &'a Path,
        /// Modulus size.
        bits: usize,
    },
}

/// Sign the upload of a new public key.
pub fn rotate(
    config: &SigningConfig,
    rotation_key_uid: &str,
    rotation_key: &Path,
    new_key: NewKey<'_>,
) -> Result<KeyRotationUpload> {
    let signer = load_signer(rotation_key, config.algorithm)?;
    match new_key {
        NewKey::Existing(public_key) => {
            let pem = std::fs::read_to_string(public_key)
                .with_context(|| format!("cannot read public key {}", public_key.display()))?;
            let new_key = PublicKey::from_pem(&pem)
                .with_context(|| format!("cannot load public key {}", public_key.display()))?;
            sign_key_rotation(rotation_key_uid, &*signer, &new_key, &SystemClock)
                .context("cannot sign key rotation")
        }
        NewKey::Generate {
            private_key_out,
            bits,
        } => {
            let private_key = generate_private_key(bits).context("cannot generate key pair")?;
            let new_key = PublicKey::from(private_key.to_public_key());
            let upload =
                sign_key_rotation(rotation_key_uid, &*signer, &new_key, &SystemClock)
                    .context("cannot sign key rotation")?;
            let private_pem =
                encode_private_key_pem(&private_key).context("cannot encode private key")?;
            write_new_file(private_key_out, &private_pem, true)?;
            info!(private_key = %private_key_out.display(), "wrote new private key");
            Ok(upload)
        }
    }
}

#[cfg_attr(not(unix), allow(unused_variables))]
fn write_new_file(path: &Path, contents: &str, private: bool) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(if private { 0o600 } else { 0o644 });
    }
    let mut file = options
        .open(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("cannot write {}", path.display()))
}
