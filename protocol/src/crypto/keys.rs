//! # Key Material
//!
//! X25519 key pairs for the one-sided key exchange.
//!
//! The same type backs both ends of the exchange: the sender's ephemeral
//! pair (created per message, dead before `encrypt` returns) and the
//! recipient's static pair (the one whose public half is embedded in the
//! app ID). Only the lifetime differs.
//!
//! ## Security considerations
//!
//! - Secret bytes live in [`SecretKeyBytes`], which zeroizes on drop and
//!   refuses to print itself.
//! - Nothing here implements `Serialize`. Exporting a secret is an explicit
//!   call to [`KxKeyPair::secret_key_hex`], never a side effect of logging a
//!   struct.

use std::fmt;

use rand_core::{CryptoRng, RngCore};
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::config::{KX_PUBLIC_KEY_LENGTH, KX_SECRET_KEY_LENGTH};
use crate::crypto::kx::KeyExchangeError;

/// A 32-byte X25519 secret scalar. Wiped when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretKeyBytes([u8; KX_SECRET_KEY_LENGTH]);

impl SecretKeyBytes {
    pub fn from_bytes(bytes: [u8; KX_SECRET_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KX_SECRET_KEY_LENGTH] {
        &self.0
    }

    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8; KX_SECRET_KEY_LENGTH] {
        &mut self.0
    }

    /// The scalar as an x25519-dalek secret, which wipes itself on drop.
    pub(crate) fn to_static_secret(&self) -> StaticSecret {
        StaticSecret::from(self.0)
    }

    /// True once every byte has been overwritten with zero.
    pub fn is_zeroed(&self) -> bool {
        self.0.iter().fold(0u8, |acc, b| acc | b) == 0
    }
}

impl fmt::Debug for SecretKeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKeyBytes(<redacted>)")
    }
}

/// An X25519 key pair used for key exchange.
pub struct KxKeyPair {
    public: [u8; KX_PUBLIC_KEY_LENGTH],
    secret: SecretKeyBytes,
}

/// Sender-side pair, generated fresh for every encryption.
pub type EphemeralKeyPair = KxKeyPair;

/// Recipient-side pair, long-lived, published as an app ID.
pub type RecipientKeyPair = KxKeyPair;

impl KxKeyPair {
    /// Generate a key pair from the given CSPRNG.
    ///
    /// Uses the fallible `try_fill_bytes` so an unavailable entropy source
    /// surfaces as [`KeyExchangeError::KeyGeneration`] instead of a panic.
    /// The random bytes land directly in the wiping container.
    pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self, KeyExchangeError> {
        let mut secret = SecretKeyBytes::from_bytes([0u8; KX_SECRET_KEY_LENGTH]);
        rng.try_fill_bytes(secret.as_mut_bytes())
            .map_err(|e| KeyExchangeError::KeyGeneration(e.to_string()))?;
        Ok(Self::from_secret(secret))
    }

    /// Rebuild a key pair from raw secret bytes. The public key is the
    /// X25519 base-point multiple of the (clamped) secret.
    pub fn from_secret_bytes(secret: [u8; KX_SECRET_KEY_LENGTH]) -> Self {
        Self::from_secret(SecretKeyBytes::from_bytes(secret))
    }

    pub fn from_secret(secret: SecretKeyBytes) -> Self {
        let public = PublicKey::from(&secret.to_static_secret()).to_bytes();
        Self { public, secret }
    }

    /// Rebuild a key pair from a hex-encoded secret key.
    pub fn from_secret_hex(secret_hex: &str) -> Result<Self, KeyExchangeError> {
        let bytes = Zeroizing::new(hex::decode(secret_hex)?);
        if bytes.len() != KX_SECRET_KEY_LENGTH {
            return Err(KeyExchangeError::InvalidKeyLength {
                expected: KX_SECRET_KEY_LENGTH,
                actual: bytes.len(),
            });
        }
        let mut secret = SecretKeyBytes::from_bytes([0u8; KX_SECRET_KEY_LENGTH]);
        secret.as_mut_bytes().copy_from_slice(&bytes);
        Ok(Self::from_secret(secret))
    }

    pub fn public_key_bytes(&self) -> [u8; KX_PUBLIC_KEY_LENGTH] {
        self.public
    }

    /// Lowercase hex of the public key.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public)
    }

    pub fn secret(&self) -> &SecretKeyBytes {
        &self.secret
    }

    pub(crate) fn secret_mut(&mut self) -> &mut SecretKeyBytes {
        &mut self.secret
    }

    /// Export the secret key as lowercase hex. The returned string wipes
    /// itself on drop; don't copy it somewhere that doesn't.
    pub fn secret_key_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.secret.as_bytes()))
    }
}

impl fmt::Debug for KxKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KxKeyPair")
            .field("public", &hex::encode(self.public))
            .field("secret", &self.secret)
            .finish()
    }
}

/// Parse a hex-encoded X25519 public key. Mixed case is accepted.
pub fn public_key_from_hex(hex_str: &str) -> Result<[u8; KX_PUBLIC_KEY_LENGTH], KeyExchangeError> {
    let bytes = hex::decode(hex_str)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| KeyExchangeError::InvalidKeyLength {
            expected: KX_PUBLIC_KEY_LENGTH,
            actual: bytes.len(),
        })
}
