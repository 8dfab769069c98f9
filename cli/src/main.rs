// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Phase CLI
//!
//! Entry point for the `phase` binary. Parses CLI arguments, initializes
//! logging, and runs one subcommand:
//!
//! - `keygen`  — generate a recipient key pair
//! - `encrypt` — encrypt a message for an app ID
//! - `decrypt` — decrypt a ciphertext with a secret key
//! - `version` — print build version information
//!
//! Results go to stdout, logs to stderr.

mod cli;
mod logging;

use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use phase_protocol::{Phase, Recipient};

use cli::{Commands, DecryptArgs, EncryptArgs, KeygenArgs, PhaseCli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = PhaseCli::parse();
    logging::init_logging(cli.log_format);

    match cli.command {
        Commands::Keygen(args) => keygen(args),
        Commands::Encrypt(args) => encrypt(args).await,
        Commands::Decrypt(args) => decrypt(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct KeygenOutput<'a> {
    app_id: &'a str,
    secret_key: &'a str,
}

fn keygen(args: KeygenArgs) -> Result<()> {
    let recipient = Recipient::generate().context("failed to generate recipient key pair")?;
    let app_id = recipient.app_id();
    let secret_key = recipient.secret_key_hex();
    tracing::info!(app_id = %app_id, "recipient key pair generated");

    if args.json {
        let output = KeygenOutput {
            app_id: app_id.as_str(),
            secret_key: secret_key.as_str(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("App ID     : {}", app_id);
        println!("Secret key : {}", secret_key.as_str());
    }
    Ok(())
}

async fn encrypt(args: EncryptArgs) -> Result<()> {
    let phase = Phase::new(&args.app_id).context("cannot encrypt for this app ID")?;
    let plaintext = match args.plaintext {
        Some(text) => text,
        None => strip_newline(read_stdin().context("failed to read plaintext from stdin")?),
    };

    let ciphertext = phase.encrypt_async(plaintext, args.tag).await?;
    println!("{ciphertext}");
    Ok(())
}

fn decrypt(args: DecryptArgs) -> Result<()> {
    let recipient =
        Recipient::from_secret_hex(args.secret_key.trim()).context("cannot load secret key")?;
    let ciphertext = match args.ciphertext {
        Some(text) => text,
        None => read_stdin().context("failed to read ciphertext from stdin")?,
    };

    let message = recipient
        .decrypt(ciphertext.trim())
        .context("could not decrypt message")?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&message)?);
    } else {
        println!("{}", message.plaintext);
    }
    Ok(())
}

fn read_stdin() -> io::Result<String> {
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

/// Drop one trailing `\n` or `\r\n`, the way `echo` and heredocs add it.
fn strip_newline(mut s: String) -> String {
    if s.ends_with('\n') {
        s.pop();
        if s.ends_with('\r') {
            s.pop();
        }
    }
    s
}

fn print_version() {
    println!("phase    {}", env!("CARGO_PKG_VERSION"));
    println!(
        "format   {}:{}",
        phase_protocol::config::PH_PREFIX,
        phase_protocol::config::PH_VERSION
    );
    println!(
        "ciphers  {} / {} / {}",
        phase_protocol::config::KEY_EXCHANGE_ALGORITHM,
        phase_protocol::config::SESSION_KDF_ALGORITHM,
        phase_protocol::config::SYMMETRIC_ALGORITHM
    );
}
