//! # Cryptographic Primitives for Phase
//!
//! Everything that touches key material lives under this module.
//!
//! We deliberately chose boring, well-audited cryptography, and the exact
//! same constructions libsodium uses, so ciphertexts stay interchangeable
//! with every other Phase client:
//!
//! - **X25519** for the one-sided key exchange.
//! - **BLAKE2b-512** to turn the shared secret into two directional keys.
//! - **XChaCha20-Poly1305** (IETF) for the payload, random 192-bit nonce.
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. The primitives come from `x25519-dalek`, `blake2` and
//! `chacha20poly1305`; this module only wires them together in the order
//! the wire format demands, and makes sure secrets get wiped afterwards.

pub mod aead;
pub mod keys;
pub mod kx;
pub mod provider;

pub use aead::{open, seal, AeadError};
pub use keys::{public_key_from_hex, EphemeralKeyPair, KxKeyPair, RecipientKeyPair, SecretKeyBytes};
pub use kx::{
    derive_recipient_session_keys, derive_session_keys, generate_ephemeral_keypair,
    KeyExchangeError, SessionKeys,
};
pub use provider::{ensure_ready, DefaultProvider, PrimitiveProvider, ProviderError};
