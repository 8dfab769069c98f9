//! # Primitive Provider
//!
//! The seam between the protocol and whatever actually does the math.
//!
//! Everything above this module (the facade, the recipient) talks to a
//! [`PrimitiveProvider`] instead of calling the crypto crates directly. The
//! default provider is backed by `x25519-dalek`, `blake2` and
//! `chacha20poly1305`; tests swap in doubles that record what gets wiped or
//! inject failures at a chosen step.
//!
//! ## Readiness
//!
//! [`ensure_ready`] is a process-wide, run-once barrier. The first caller
//! runs a self-test (entropy draw plus a fixed-vector exchange and AEAD
//! round-trip) and everyone after that gets the cached verdict. There is
//! nothing to lock beyond the `OnceLock` itself.

use std::sync::OnceLock;

use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;
use zeroize::Zeroize;

use crate::crypto::aead::{self, AeadError};
use crate::crypto::keys::KxKeyPair;
use crate::crypto::kx::{self, KeyExchangeError, SessionKeys};

/// Errors from provider initialisation.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("primitive self-test failed: {0}")]
    SelfTestFailed(String),
}

/// The cryptographic capabilities the protocol needs.
///
/// Implementations must be stateless from the caller's point of view:
/// every call is independent, and nothing passed in may be retained.
pub trait PrimitiveProvider: Send + Sync {
    /// Block until the provider can serve requests. Idempotent.
    fn ensure_ready(&self) -> Result<(), ProviderError> {
        ensure_ready()
    }

    /// Fresh X25519 key pair from a CSPRNG.
    fn kx_keypair(&self) -> Result<KxKeyPair, KeyExchangeError>;

    /// Session keys for the initiating (sender) side.
    fn kx_client_session_keys(
        &self,
        keypair: &KxKeyPair,
        server_public_key: &[u8],
    ) -> Result<SessionKeys, KeyExchangeError>;

    /// Session keys for the static (recipient) side.
    fn kx_server_session_keys(
        &self,
        keypair: &KxKeyPair,
        client_public_key: &[u8],
    ) -> Result<SessionKeys, KeyExchangeError>;

    /// AEAD-encrypt with a random nonce; returns `ciphertext || tag || nonce`.
    fn aead_encrypt(&self, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, AeadError>;

    /// Inverse of [`PrimitiveProvider::aead_encrypt`].
    fn aead_decrypt(&self, key: &[u8], sealed: &[u8]) -> Result<Vec<u8>, AeadError>;

    /// Overwrite `buf` with zeros in a way the optimiser can't elide.
    fn memzero(&self, buf: &mut [u8]) {
        buf.zeroize();
    }
}

/// Provider backed by the RustCrypto / dalek crates.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultProvider;

impl PrimitiveProvider for DefaultProvider {
    fn kx_keypair(&self) -> Result<KxKeyPair, KeyExchangeError> {
        kx::generate_ephemeral_keypair()
    }

    fn kx_client_session_keys(
        &self,
        keypair: &KxKeyPair,
        server_public_key: &[u8],
    ) -> Result<SessionKeys, KeyExchangeError> {
        kx::derive_session_keys(keypair, server_public_key)
    }

    fn kx_server_session_keys(
        &self,
        keypair: &KxKeyPair,
        client_public_key: &[u8],
    ) -> Result<SessionKeys, KeyExchangeError> {
        kx::derive_recipient_session_keys(keypair, client_public_key)
    }

    fn aead_encrypt(&self, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, AeadError> {
        aead::seal(key, plaintext)
    }

    fn aead_decrypt(&self, key: &[u8], sealed: &[u8]) -> Result<Vec<u8>, AeadError> {
        aead::open(key, sealed)
    }
}

static READY: OnceLock<Result<(), ProviderError>> = OnceLock::new();

/// Run the one-time primitive self-test, or return its cached result.
pub fn ensure_ready() -> Result<(), ProviderError> {
    READY
        .get_or_init(|| {
            let result = self_test().map_err(ProviderError::SelfTestFailed);
            match &result {
                Ok(()) => tracing::debug!("crypto primitives ready"),
                Err(e) => tracing::warn!(error = %e, "crypto primitives unavailable"),
            }
            result
        })
        .clone()
}

fn self_test() -> Result<(), String> {
    let mut probe = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut probe)
        .map_err(|e| format!("entropy source unavailable: {e}"))?;
    probe.zeroize();

    let client = KxKeyPair::from_secret_bytes([0x01; 32]);
    let server = KxKeyPair::from_secret_bytes([0x02; 32]);
    let sent = kx::derive_session_keys(&client, &server.public_key_bytes())
        .map_err(|e| e.to_string())?;
    let received = kx::derive_recipient_session_keys(&server, &client.public_key_bytes())
        .map_err(|e| e.to_string())?;
    if sent.send_key() != received.receive_key() {
        return Err("directional session keys disagree".into());
    }

    let message = b"phase self-test";
    let sealed = aead::seal_with_nonce(sent.send_key(), &[0u8; 24], message)
        .map_err(|e| e.to_string())?;
    let opened = aead::open(received.receive_key(), &sealed).map_err(|e| e.to_string())?;
    if opened != message {
        return Err("AEAD round-trip mismatch".into());
    }
    Ok(())
}

/// Scope guard owning per-call key material.
///
/// Whatever is parked here gets wiped through the provider's `memzero`
/// when the guard drops: normal return, `?` early return, or unwind.
pub(crate) struct KeyMaterialGuard<'a> {
    provider: &'a dyn PrimitiveProvider,
    keypair: Option<KxKeyPair>,
    session: Option<SessionKeys>,
}

impl<'a> KeyMaterialGuard<'a> {
    pub(crate) fn new(provider: &'a dyn PrimitiveProvider) -> Self {
        Self {
            provider,
            keypair: None,
            session: None,
        }
    }

    /// Take ownership of a key pair whose secret must die with this scope.
    pub(crate) fn hold_keypair(&mut self, keypair: KxKeyPair) -> &KxKeyPair {
        self.keypair.insert(keypair)
    }

    pub(crate) fn hold_session(&mut self, session: SessionKeys) -> &SessionKeys {
        self.session.insert(session)
    }
}

impl Drop for KeyMaterialGuard<'_> {
    fn drop(&mut self) {
        if let Some(keypair) = self.keypair.as_mut() {
            self.provider
                .memzero(keypair.secret_mut().as_mut_bytes().as_mut_slice());
        }
        if let Some(session) = self.session.as_mut() {
            self.provider.memzero(session.send_key_mut().as_mut_slice());
            self.provider.memzero(session.receive_key_mut().as_mut_slice());
        }
    }
}
