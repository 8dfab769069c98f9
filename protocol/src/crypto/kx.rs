//! # One-Sided Key Exchange
//!
//! Derives a pair of directional session keys from an X25519 exchange
//! between a fresh sender key pair and the recipient's static public key.
//!
//! The sender has no identity. It generates a key pair, uses it once, and
//! ships the public half next to the ciphertext. The recipient, who only
//! ever publishes a static public key, repeats the exchange from its side
//! when it receives the message.
//!
//! ## Key Derivation
//!
//! The construction is byte-compatible with libsodium's `crypto_kx`:
//!
//! ```text
//! q          = X25519(own_secret, peer_public)
//! h          = BLAKE2b-512(q || client_pk || server_pk)
//! client rx  = h[0..32]    client tx = h[32..64]
//! server tx  = h[0..32]    server rx = h[32..64]
//! ```
//!
//! The sender always plays the client and the recipient always plays the
//! server. Swap the roles and the two sides end up with unrelated keys,
//! which shows up as an authentication failure on decrypt and nothing else.
//!
//! Raw DH output is never used as a key directly. It has algebraic
//! structure; the hash flattens it and binds both public keys into the
//! result.

use std::fmt;

use blake2::{Blake2b512, Digest};
use rand::rngs::OsRng;
use thiserror::Error;
use x25519_dalek::PublicKey;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::{KX_PUBLIC_KEY_LENGTH, SESSION_KEY_LENGTH};
use crate::crypto::keys::{EphemeralKeyPair, KxKeyPair};

/// Errors in the key exchange.
#[derive(Debug, Error)]
pub enum KeyExchangeError {
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid key encoding: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("key exchange failed: peer public key has small order")]
    WeakPublicKey,
}

/// A pair of directional symmetric keys from one exchange.
///
/// `send_key` encrypts traffic leaving this side, `receive_key` decrypts
/// traffic arriving. The sender's `send_key` equals the recipient's
/// `receive_key`. Both are wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SessionKeys {
    receive_key: [u8; SESSION_KEY_LENGTH],
    send_key: [u8; SESSION_KEY_LENGTH],
}

impl SessionKeys {
    pub fn send_key(&self) -> &[u8; SESSION_KEY_LENGTH] {
        &self.send_key
    }

    pub fn receive_key(&self) -> &[u8; SESSION_KEY_LENGTH] {
        &self.receive_key
    }

    pub(crate) fn send_key_mut(&mut self) -> &mut [u8; SESSION_KEY_LENGTH] {
        &mut self.send_key
    }

    pub(crate) fn receive_key_mut(&mut self) -> &mut [u8; SESSION_KEY_LENGTH] {
        &mut self.receive_key
    }
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKeys(<redacted>)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Client,
    Server,
}

/// Generate a fresh sender key pair from the OS CSPRNG.
pub fn generate_ephemeral_keypair() -> Result<EphemeralKeyPair, KeyExchangeError> {
    KxKeyPair::generate_with(&mut OsRng)
}

/// Derive the sender's session keys against the recipient's static key.
///
/// `recipient_public_key` must be exactly 32 bytes.
pub fn derive_session_keys(
    ephemeral: &KxKeyPair,
    recipient_public_key: &[u8],
) -> Result<SessionKeys, KeyExchangeError> {
    derive(ephemeral, recipient_public_key, Role::Client)
}

/// Derive the recipient's session keys for a message whose sender used
/// `sender_public_key`. Inverse of [`derive_session_keys`].
pub fn derive_recipient_session_keys(
    recipient: &KxKeyPair,
    sender_public_key: &[u8],
) -> Result<SessionKeys, KeyExchangeError> {
    derive(recipient, sender_public_key, Role::Server)
}

fn derive(own: &KxKeyPair, peer: &[u8], role: Role) -> Result<SessionKeys, KeyExchangeError> {
    let peer: [u8; KX_PUBLIC_KEY_LENGTH] =
        peer.try_into()
            .map_err(|_| KeyExchangeError::InvalidKeyLength {
                expected: KX_PUBLIC_KEY_LENGTH,
                actual: peer.len(),
            })?;

    // Both the scalar and the shared point live in x25519-dalek types that
    // wipe themselves on drop.
    let shared = own.secret().to_static_secret().diffie_hellman(&PublicKey::from(peer));
    // Low-order peer points force the shared secret to zero.
    if !shared.was_contributory() {
        return Err(KeyExchangeError::WeakPublicKey);
    }

    let own_public = own.public_key_bytes();
    let (client_pk, server_pk) = match role {
        Role::Client => (&own_public, &peer),
        Role::Server => (&peer, &own_public),
    };

    let mut hasher = Blake2b512::new();
    hasher.update(shared.as_bytes());
    hasher.update(client_pk);
    hasher.update(server_pk);
    drop(shared);
    let mut digest = hasher.finalize();

    let mut first = [0u8; SESSION_KEY_LENGTH];
    let mut second = [0u8; SESSION_KEY_LENGTH];
    first.copy_from_slice(&digest[..SESSION_KEY_LENGTH]);
    second.copy_from_slice(&digest[SESSION_KEY_LENGTH..]);
    digest.as_mut_slice().zeroize();

    let keys = match role {
        Role::Client => SessionKeys {
            receive_key: first,
            send_key: second,
        },
        Role::Server => SessionKeys {
            send_key: first,
            receive_key: second,
        },
    };
    first.zeroize();
    second.zeroize();
    Ok(keys)
}
