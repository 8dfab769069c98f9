//! Error types for the Phase protocol.
//!
//! Each layer has its own error enum next to the code that produces it
//! ([`KeyExchangeError`], [`AeadError`], [`CodecError`], [`ProviderError`]).
//! [`CryptoError`] gathers them into one cause type, and [`PhaseError`] is
//! what the public entry points actually return.
//!
//! Encryption has a single rejected outcome: whatever failed inside, the
//! caller sees `something went wrong: <cause>`. The cause stays reachable
//! through [`std::error::Error::source`] for anyone who wants to branch on it.

use thiserror::Error;

use crate::codec::CodecError;
use crate::crypto::aead::AeadError;
use crate::crypto::kx::KeyExchangeError;
use crate::crypto::provider::ProviderError;

/// Any failure from the primitive, key exchange, cipher or codec layers.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The primitive provider never became ready.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Key generation or session key derivation failed.
    #[error(transparent)]
    KeyExchange(#[from] KeyExchangeError),

    /// The AEAD layer rejected the input or failed to authenticate it.
    #[error(transparent)]
    Aead(#[from] AeadError),

    /// The ciphertext string is malformed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Authenticated plaintext that isn't UTF-8. Phase only carries text.
    #[error("decrypted payload is not valid UTF-8")]
    NotUtf8,
}

/// Errors returned by the public Phase API.
#[derive(Debug, Error)]
pub enum PhaseError {
    /// The application identifier doesn't match `phApp:v<N>:<64 hex>`.
    #[error("invalid Phase app ID: {0}")]
    InvalidAppId(String),

    /// Encryption failed somewhere between readiness and encoding.
    #[error("something went wrong: {source}")]
    Encrypt {
        /// What actually broke.
        #[source]
        source: CryptoError,
    },

    /// Decoding, key agreement or authentication failed on the recipient side.
    #[error("decryption failed: {source}")]
    Decrypt {
        /// What actually broke.
        #[source]
        source: CryptoError,
    },

    /// The entropy source failed while generating a recipient key pair.
    #[error(transparent)]
    KeyGeneration(KeyExchangeError),

    /// A recipient secret key couldn't be loaded.
    #[error("invalid secret key: {0}")]
    InvalidSecretKey(#[source] KeyExchangeError),

    /// The blocking worker behind an async call was cancelled or panicked.
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl PhaseError {
    pub(crate) fn encrypt(source: impl Into<CryptoError>) -> Self {
        Self::Encrypt {
            source: source.into(),
        }
    }

    pub(crate) fn decrypt(source: impl Into<CryptoError>) -> Self {
        Self::Decrypt {
            source: source.into(),
        }
    }
}
