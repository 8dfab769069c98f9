//! Terminal walkthrough of a Phase message's life.
//!
//! A recipient generates a key pair and publishes its app ID, a publisher
//! encrypts a card number against it, and the recipient decrypts it. Along
//! the way the demo takes the ciphertext apart segment by segment.
//!
//! Run with:
//!   cargo run --example demo --release

use std::time::Instant;

use phase_protocol::{Phase, PhaseCiphertext, Recipient};

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

fn section(title: &str) {
    println!();
    println!("{BOLD}{WHITE}  {title}{RESET}");
}

fn narrate(text: &str) {
    println!("{DIM}{CYAN}  >> {text}{RESET}");
}

fn ok(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn field(label: &str, value: &str) {
    println!("{WHITE}  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    section("1. Recipient publishes an app ID");
    let recipient = Recipient::generate()?;
    let app_id = recipient.app_id();
    field("app id", app_id.as_str());
    narrate("the secret key never leaves the recipient");

    section("2. Publisher encrypts");
    let phase = Phase::new(app_id.as_str())?;
    let started = Instant::now();
    let ciphertext = phase.encrypt_with_tag("4111 1111 1111 1111", "card_number")?;
    let elapsed = started.elapsed();
    field("ciphertext", &ciphertext);
    ok(&format!("encrypted in {:.3} ms", elapsed.as_secs_f64() * 1000.0));

    section("3. Anatomy");
    let parsed: PhaseCiphertext = ciphertext.parse()?;
    field("version", parsed.version());
    field("ephemeral key", &hex::encode(parsed.ephemeral_public_key()));
    field("sealed bytes", &parsed.sealed().len().to_string());
    field("tag (clear text)", parsed.tag());
    narrate("same input, new key pair and nonce: different bytes, same length");
    let again = phase.encrypt_with_tag("4111 1111 1111 1111", "card_number")?;
    ok(&format!(
        "lengths {} == {}, bytes differ: {}",
        ciphertext.len(),
        again.len(),
        ciphertext != again
    ));

    section("4. Recipient decrypts");
    let message = recipient.decrypt(&ciphertext)?;
    field("plaintext", &message.plaintext);
    field("tag", &message.tag);
    ok("round-trip complete");
    println!();
    Ok(())
}
