//! # Recipient
//!
//! The other end of [`crate::phase::Phase`]: the holder of the static key
//! pair behind an app ID.
//!
//! A recipient publishes [`Recipient::app_id`], keeps the secret key
//! somewhere safe, and turns incoming `ph:v1:` strings back into text with
//! [`Recipient::decrypt`]. It plays the server role in the key exchange,
//! so its receive key is the sender's send key.
//!
//! Decryption is all-or-nothing. Wrong key, flipped bit, truncated
//! ciphertext: every one of them is the same authentication failure and
//! no plaintext comes out.

use std::fmt;
use std::sync::Arc;

use rand::rngs::OsRng;
use rand_core::{CryptoRng, RngCore};
use serde::Serialize;
use tracing::instrument;
use zeroize::Zeroizing;

use crate::app_id::AppId;
use crate::codec::PhaseCiphertext;
use crate::config::APP_ID_VERSION;
use crate::crypto::keys::RecipientKeyPair;
use crate::crypto::kx::KeyExchangeError;
use crate::crypto::provider::{DefaultProvider, KeyMaterialGuard, PrimitiveProvider};
use crate::error::{CryptoError, PhaseError};

/// A decrypted message and the clear-text tag it travelled with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecryptedMessage {
    pub plaintext: String,
    pub tag: String,
}

/// Holder of a static key pair that can open Phase ciphertexts.
pub struct Recipient {
    keypair: RecipientKeyPair,
    provider: Arc<dyn PrimitiveProvider>,
}

impl Recipient {
    /// Generate a new static key pair from the OS CSPRNG.
    pub fn generate() -> Result<Self, PhaseError> {
        Self::generate_with(&mut OsRng)
    }

    /// Generate a new static key pair from the given CSPRNG.
    pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self, PhaseError> {
        let keypair = RecipientKeyPair::generate_with(rng).map_err(|e| match e {
            KeyExchangeError::KeyGeneration(_) => PhaseError::KeyGeneration(e),
            other => PhaseError::InvalidSecretKey(other),
        })?;
        Ok(Self::from_keypair(keypair))
    }

    /// Restore a recipient from its 64-character hex secret key.
    pub fn from_secret_hex(secret_hex: &str) -> Result<Self, PhaseError> {
        let keypair =
            RecipientKeyPair::from_secret_hex(secret_hex).map_err(PhaseError::InvalidSecretKey)?;
        Ok(Self::from_keypair(keypair))
    }

    pub fn from_keypair(keypair: RecipientKeyPair) -> Self {
        Self {
            keypair,
            provider: Arc::new(DefaultProvider),
        }
    }

    /// Swap in a different primitive provider.
    pub fn with_provider(mut self, provider: Arc<dyn PrimitiveProvider>) -> Self {
        self.provider = provider;
        self
    }

    /// The app ID senders should use, with lowercase hex.
    pub fn app_id(&self) -> AppId {
        AppId::from_public_key(APP_ID_VERSION, &self.keypair.public_key_bytes())
    }

    /// Export the secret key. Wiped when the returned string drops.
    pub fn secret_key_hex(&self) -> Zeroizing<String> {
        self.keypair.secret_key_hex()
    }

    /// Decrypt a `ph:v1:` string addressed to this recipient.
    #[instrument(skip_all, fields(input_len = ciphertext.len()))]
    pub fn decrypt(&self, ciphertext: &str) -> Result<DecryptedMessage, PhaseError> {
        let parsed = PhaseCiphertext::decode(ciphertext).map_err(PhaseError::decrypt)?;
        let plaintext = self.open(&parsed).map_err(|e| {
            tracing::debug!(error = %e, "decryption failed");
            e
        })?;
        tracing::debug!(
            plaintext_len = plaintext.len(),
            tag_len = parsed.tag().len(),
            "message decrypted"
        );
        Ok(DecryptedMessage {
            plaintext,
            tag: parsed.tag().to_string(),
        })
    }

    fn open(&self, parsed: &PhaseCiphertext) -> Result<String, PhaseError> {
        let provider = self.provider.as_ref();
        provider.ensure_ready().map_err(PhaseError::decrypt)?;

        let mut guard = KeyMaterialGuard::new(provider);
        let session = provider
            .kx_server_session_keys(&self.keypair, parsed.ephemeral_public_key())
            .map_err(PhaseError::decrypt)?;
        let session = guard.hold_session(session);

        let opened = Zeroizing::new(
            provider
                .aead_decrypt(session.receive_key(), parsed.sealed())
                .map_err(PhaseError::decrypt)?,
        );
        drop(guard);

        String::from_utf8(opened.to_vec()).map_err(|_| PhaseError::decrypt(CryptoError::NotUtf8))
    }
}

impl fmt::Debug for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recipient")
            .field("app_id", &self.app_id().to_string())
            .finish_non_exhaustive()
    }
}
