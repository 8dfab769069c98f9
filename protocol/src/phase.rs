//! # Phase Facade
//!
//! The publisher-facing entry point. Construct once from an app ID, then
//! call [`Phase::encrypt`] as often as needed.
//!
//! ## Encryption flow
//!
//! ```text
//! 1. ensure_ready()                      (process-wide, run once)
//! 2. (epk, esk) = kx_keypair()           (fresh per call)
//! 3. (rx, tx)   = client_session_keys(epk, esk, app_pk)
//! 4. sealed     = xchacha20poly1305(tx, plaintext) || nonce
//! 5. wipe esk, rx, tx
//! 6. "ph:v1:" + hex(epk) + ":" + hex(sealed) + ":" + tag
//! ```
//!
//! Step 5 happens on every exit path. The ephemeral key pair and session
//! keys are parked in a guard the moment they exist, and the guard's `Drop`
//! does the wiping, so an early `?` return or a panic can't skip it.
//!
//! ## Properties
//!
//! - Two calls with the same input give different output (fresh key pair
//!   and nonce every time), but always of the same length.
//! - No call depends on another; a `Phase` can be shared across threads.

use std::sync::Arc;

use tracing::instrument;

use crate::app_id::AppId;
use crate::codec::PhaseCiphertext;
use crate::crypto::provider::{DefaultProvider, KeyMaterialGuard, PrimitiveProvider};
use crate::error::PhaseError;

/// Encrypts messages for the holder of one app ID.
#[derive(Clone)]
pub struct Phase {
    app_id: AppId,
    provider: Arc<dyn PrimitiveProvider>,
}

impl Phase {
    /// Create a facade for `app_id` backed by the default primitives.
    ///
    /// Fails with [`PhaseError::InvalidAppId`] if the identifier doesn't
    /// match `phApp:v<N>:<64 hex>`.
    pub fn new(app_id: &str) -> Result<Self, PhaseError> {
        Self::with_provider(app_id, Arc::new(DefaultProvider))
    }

    /// Same as [`Phase::new`] with a caller-supplied provider.
    pub fn with_provider(
        app_id: &str,
        provider: Arc<dyn PrimitiveProvider>,
    ) -> Result<Self, PhaseError> {
        let app_id = AppId::parse(app_id)?;
        tracing::debug!(version = app_id.version(), "phase instance created");
        Ok(Self { app_id, provider })
    }

    /// The recipient public key, as the 64 hex characters from the app ID.
    pub fn app_pub_key(&self) -> &str {
        self.app_id.public_key_hex()
    }

    pub fn app_id(&self) -> &AppId {
        &self.app_id
    }

    /// Encrypt `plaintext` with an empty tag.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, PhaseError> {
        self.encrypt_with_tag(plaintext, "")
    }

    /// Encrypt `plaintext` and append `tag` in the clear.
    ///
    /// The tag is neither encrypted nor authenticated.
    #[instrument(skip_all, fields(plaintext_len = plaintext.len(), tag_len = tag.len()))]
    pub fn encrypt_with_tag(&self, plaintext: &str, tag: &str) -> Result<String, PhaseError> {
        let ciphertext = self.seal(plaintext.as_bytes(), tag).map_err(|e| {
            tracing::debug!(error = %e, "encryption failed");
            e
        })?;
        tracing::debug!(
            sealed_len = ciphertext.sealed().len(),
            "message encrypted"
        );
        Ok(ciphertext.encode())
    }

    /// [`Phase::encrypt_with_tag`] on tokio's blocking pool.
    ///
    /// Outside a tokio runtime there is no blocking pool to hand off to, so
    /// the work runs inline on the polling thread instead.
    pub async fn encrypt_async(
        &self,
        plaintext: impl Into<String>,
        tag: impl Into<String>,
    ) -> Result<String, PhaseError> {
        let this = self.clone();
        let plaintext = plaintext.into();
        let tag = tag.into();
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::debug!("no tokio runtime, encrypting inline");
                return this.encrypt_with_tag(&plaintext, &tag);
            }
        };
        handle
            .spawn_blocking(move || this.encrypt_with_tag(&plaintext, &tag))
            .await
            .map_err(|e| PhaseError::Runtime(e.to_string()))?
    }

    fn seal(&self, plaintext: &[u8], tag: &str) -> Result<PhaseCiphertext, PhaseError> {
        let provider = self.provider.as_ref();
        provider.ensure_ready().map_err(PhaseError::encrypt)?;

        let mut guard = KeyMaterialGuard::new(provider);
        let ephemeral = guard.hold_keypair(provider.kx_keypair().map_err(PhaseError::encrypt)?);
        let ephemeral_public_key = ephemeral.public_key_bytes();

        let session = provider
            .kx_client_session_keys(ephemeral, self.app_id.public_key_bytes())
            .map_err(PhaseError::encrypt)?;
        let session = guard.hold_session(session);

        let sealed = provider
            .aead_encrypt(session.send_key(), plaintext)
            .map_err(PhaseError::encrypt)?;
        drop(guard);

        Ok(PhaseCiphertext::new(ephemeral_public_key, sealed, tag))
    }
}

impl std::fmt::Debug for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Phase").field("app_id", &self.app_id).finish()
    }
}
