//! # CLI Interface
//!
//! Defines the command-line argument structure for `phase` using `clap`
//! derive. Supports four subcommands: `keygen`, `encrypt`, `decrypt`, and
//! `version`.

use clap::{Args, Parser, Subcommand};

use crate::logging::LogFormat;

/// Anonymous encryption to a Phase app ID.
///
/// Publishers encrypt short messages with nothing but the recipient's app
/// ID. The recipient decrypts them with the matching secret key.
#[derive(Parser, Debug)]
#[command(
    name = "phase",
    about = "Anonymous encryption to a Phase app ID",
    version,
    propagate_version = true
)]
pub struct PhaseCli {
    /// Log output format. Logs always go to stderr.
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the `phase` binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a recipient key pair and print its app ID and secret key.
    Keygen(KeygenArgs),
    /// Encrypt a message for an app ID.
    Encrypt(EncryptArgs),
    /// Decrypt a `ph:v1:` ciphertext with a recipient secret key.
    Decrypt(DecryptArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `keygen` subcommand.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Print `{"app_id", "secret_key"}` as JSON instead of plain lines.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `encrypt` subcommand.
#[derive(Args, Debug)]
pub struct EncryptArgs {
    /// Recipient app ID, `phApp:v<N>:<64 hex>`.
    #[arg(long, env = "PHASE_APP_ID")]
    pub app_id: String,

    /// Clear-text tag appended to the ciphertext. Not encrypted.
    #[arg(long, default_value = "")]
    pub tag: String,

    /// Message to encrypt. Read from stdin when omitted; one trailing
    /// newline is dropped.
    pub plaintext: Option<String>,
}

/// Arguments for the `decrypt` subcommand.
#[derive(Args, Debug)]
pub struct DecryptArgs {
    /// Recipient secret key, 64 hex characters.
    ///
    /// Prefer the environment variable over the flag so the key stays out
    /// of shell history.
    #[arg(long, env = "PHASE_SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,

    /// Print `{"plaintext", "tag"}` as JSON instead of the bare plaintext.
    #[arg(long)]
    pub json: bool,

    /// Ciphertext to decrypt. Read from stdin when omitted.
    pub ciphertext: Option<String>,
}
