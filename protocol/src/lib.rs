// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Phase Protocol — Core Library
//!
//! Anonymous, one-way hybrid encryption for short text messages. A
//! publisher who knows nothing but the recipient's app ID can encrypt a
//! message that only the recipient can read. The sender keeps no identity
//! and no state, and nothing links two messages from the same sender.
//!
//! ```no_run
//! use phase_protocol::Phase;
//!
//! let phase = Phase::new(
//!     "phApp:v1:cd2d579490fd794f1640590220de86a3676fa7979d419056bc631741b320b701",
//! )?;
//! let ciphertext = phase.encrypt_with_tag("4111 1111 1111 1111", "card")?;
//! assert!(ciphertext.starts_with("ph:v1:"));
//! # Ok::<(), phase_protocol::PhaseError>(())
//! ```
//!
//! ## Architecture
//!
//! - **crypto** — Key pairs, key exchange, AEAD, and the provider seam.
//! - **codec** — The `ph:v1:` wire format, both directions.
//! - **app_id** — Parsing and rendering `phApp:v<N>:<hex>` identifiers.
//! - **phase** — The publisher-facing encryption facade.
//! - **recipient** — The key holder's side: key generation and decryption.
//! - **error** — The error types the public API returns.
//! - **config** — Protocol constants.
//!
//! ## Design Philosophy
//!
//! 1. Byte-compatible with the libsodium constructions every other Phase
//!    client uses. Interop is checked with known-answer tests.
//! 2. Secrets are wiped on every exit path, not just the happy one.
//! 3. No unsafe code. Anywhere.

pub mod app_id;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod phase;
pub mod recipient;

#[cfg(test)]
mod test_support;

pub use app_id::AppId;
pub use codec::{CodecError, PhaseCiphertext};
pub use error::{CryptoError, PhaseError};
pub use phase::Phase;
pub use recipient::{DecryptedMessage, Recipient};
