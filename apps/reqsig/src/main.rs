//! reqsig - sign API requests and verify webhook signatures from the shell.
//!
//! # Usage
//!
//! ```text
//! REQSIG_KEY_UID=... reqsig sign get /api/v2/accounts
//! REQSIG_KEY_UID=... reqsig sign put /api/v2/payees --body-file payee.json
//! REQSIG_WEBHOOK_SECRET=... reqsig verify-webhook --signature ... --body-file event.json
//! reqsig rotate --rotation-key-uid ... --rotation-key rotation.pem --public-key new.pem
//! reqsig rotate --rotation-key-uid ... --rotation-key rotation.pem --generate new-private.pem
//! reqsig keygen --private-key-out api-private.pem --public-key-out api-public.pem
//! ```
//!
//! Header values go to stdout; logs go to stderr.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `REQSIG_KEY_UID` | *(unset)* | Key uid placed in `keyid="..."` |
//! | `REQSIG_PRIVATE_KEY` | `starling-api-private.key` | PEM private key path |
//! | `REQSIG_ALGORITHM` | `rsa-sha512` | `rsa-sha256`, `rsa-sha512`, `ecdsa-sha256` or `ecdsa-sha512` |
//! | `REQSIG_ACCESS_TOKEN` | *(unset)* | OAuth bearer token to prefix |
//! | `REQSIG_WEBHOOK_SECRET` | *(unset)* | Shared secret for v1 webhooks |
//! | `REQSIG_MAX_CLOCK_SKEW_SECS` | `300` | Inbound `Date` tolerance |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use reqsig_auth::keys::RECOMMENDED_RSA_KEY_BITS;
use reqsig_core::SigningConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Tool version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "reqsig", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign a request and print its Date, Digest and Authorization headers.
    Sign {
        /// HTTP method, e.g. `get` or `PUT`.
        method: String,
        /// Request path with optional query, without scheme or host.
        path: String,
        #[command(flatten)]
        body: BodyArgs,
    },
    /// Verify a webhook signature against the raw payload.
    VerifyWebhook {
        /// Presented signature (the `x-hook-signature` header value).
        #[arg(long)]
        signature: String,
        /// Verify with this PEM public key (v2) instead of the shared secret.
        #[arg(long)]
        public_key: Option<PathBuf>,
        #[command(flatten)]
        body: PayloadArgs,
    },
    /// Sign the upload of a new API public key with the rotation key.
    Rotate {
        /// Key uid of the rotation key.
        #[arg(long)]
        rotation_key_uid: String,
        /// PEM private rotation key.
        #[arg(long)]
        rotation_key: PathBuf,
        #[command(flatten)]
        new_key: NewKeyArgs,
    },
    /// Generate an RSA key pair for request signing.
    Keygen {
        /// Where to write the PEM private key; must not exist.
        #[arg(long)]
        private_key_out: PathBuf,
        /// Where to write the PEM public key; must not exist.
        #[arg(long)]
        public_key_out: PathBuf,
        /// Modulus size in bits.
        #[arg(long, default_value_t = RECOMMENDED_RSA_KEY_BITS)]
        bits: usize,
    },
}

/// Key to upload on rotation.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct NewKeyArgs {
    /// PEM public key to upload.
    #[arg(long)]
    public_key: Option<PathBuf>,
    /// Generate a new 4096-bit key pair, write its private key here, and
    /// upload its public key.
    #[arg(long)]
    generate: Option<PathBuf>,
}

impl NewKeyArgs {
    fn as_new_key(&self) -> Option<commands::NewKey<'_>> {
        match (&self.public_key, &self.generate) {
            (Some(public_key), _) => Some(commands::NewKey::Existing(public_key)),
            (None, Some(private_key_out)) => Some(commands::NewKey::Generate {
                private_key_out,
                bits: RECOMMENDED_RSA_KEY_BITS,
            }),
            (None, None) => None,
        }
    }
}

/// Optional request body.
#[derive(Debug, Args)]
#[group(required = false, multiple = false)]
struct BodyArgs {
    /// Body given inline.
    #[arg(long)]
    body: Option<String>,
    /// Body read from a file, byte for byte.
    #[arg(long)]
    body_file: Option<PathBuf>,
}

/// Mandatory webhook payload.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct PayloadArgs {
    /// Payload given inline.
    #[arg(long)]
    body: Option<String>,
    /// Payload read from a file, byte for byte.
    #[arg(long)]
    body_file: Option<PathBuf>,
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = SigningConfig::from_env().context("failed to load configuration")?;

    init_tracing(&config.log_level)?;

    info!(algorithm = %config.algorithm, version = VERSION, "starting reqsig");

    match cli.command {
        Command::Sign { method, path, body } => {
            let body = commands::read_body(body.body, body.body_file.as_deref())?;
            let headers = commands::sign(&config, &method, &path, body.as_deref())?;
            print!("{}", commands::format_signed_headers(&headers));
            Ok(ExitCode::SUCCESS)
        }
        Command::VerifyWebhook {
            signature,
            public_key,
            body,
        } => {
            let body = commands::read_body(body.body, body.body_file.as_deref())?
                .unwrap_or_default();
            let valid = commands::verify_webhook(&config, &signature, &body, public_key.as_deref())?;
            if valid {
                println!("valid");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("invalid");
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Rotate {
            rotation_key_uid,
            rotation_key,
            new_key,
        } => {
            let new_key = new_key
                .as_new_key()
                .context("either --public-key or --generate is required")?;
            let upload = commands::rotate(&config, &rotation_key_uid, &rotation_key, new_key)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&upload).context("failed to encode upload")?
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Keygen {
            private_key_out,
            public_key_out,
            bits,
        } => {
            commands::keygen(bits, &private_key_out, &public_key_out)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
