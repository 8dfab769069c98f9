//! Instrumented provider for unit tests.
//!
//! Delegates to [`DefaultProvider`] while remembering every secret it hands
//! out and every buffer it is asked to wipe, so tests can check that each
//! secret was wiped before the call returned. It can also pin the
//! "random" inputs for known-answer tests, and fail on purpose at a chosen
//! step.

use parking_lot::Mutex;
use rand_core::{CryptoRng, RngCore};

use crate::config::XCHACHA_NONCE_LENGTH;
use crate::crypto::aead::{self, AeadError};
use crate::crypto::keys::KxKeyPair;
use crate::crypto::kx::{KeyExchangeError, SessionKeys};
use crate::crypto::provider::{DefaultProvider, PrimitiveProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailAt {
    KeyPair,
    SessionKeys,
    Encrypt,
    Decrypt,
}

#[derive(Debug, Clone)]
pub(crate) struct Wipe {
    pub before: Vec<u8>,
    pub after: Vec<u8>,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct Recording {
    /// Every secret the provider handed out: key pair secrets and both
    /// halves of every session key pair.
    pub secrets: Vec<Vec<u8>>,
    pub wiped: Vec<Wipe>,
}

impl Recording {
    /// True when every secret handed out shows up among the wiped buffers
    /// and every wiped buffer is zero afterwards.
    pub fn all_secrets_wiped(&self) -> bool {
        let zeroed = self.wiped.iter().all(|w| w.after.iter().all(|&b| b == 0));
        let covered = self
            .secrets
            .iter()
            .all(|s| self.wiped.iter().any(|w| &w.before == s));
        zeroed && covered
    }
}

#[derive(Default)]
pub(crate) struct RecordingProvider {
    inner: DefaultProvider,
    fail_at: Option<FailAt>,
    fixed_secret: Option<[u8; 32]>,
    fixed_nonce: Option<[u8; XCHACHA_NONCE_LENGTH]>,
    log: Mutex<Recording>,
}

impl RecordingProvider {
    pub fn failing_at(step: FailAt) -> Self {
        Self {
            fail_at: Some(step),
            ..Self::default()
        }
    }

    pub fn deterministic(secret: [u8; 32], nonce: [u8; XCHACHA_NONCE_LENGTH]) -> Self {
        Self {
            fixed_secret: Some(secret),
            fixed_nonce: Some(nonce),
            ..Self::default()
        }
    }

    pub fn recording(&self) -> Recording {
        self.log.lock().clone()
    }

    fn remember_session(&self, keys: &SessionKeys) {
        let mut log = self.log.lock();
        log.secrets.push(keys.send_key().to_vec());
        log.secrets.push(keys.receive_key().to_vec());
    }
}

impl PrimitiveProvider for RecordingProvider {
    fn kx_keypair(&self) -> Result<KxKeyPair, KeyExchangeError> {
        if self.fail_at == Some(FailAt::KeyPair) {
            return Err(KeyExchangeError::KeyGeneration("entropy exhausted".into()));
        }
        let keypair = match self.fixed_secret {
            Some(secret) => KxKeyPair::from_secret_bytes(secret),
            None => self.inner.kx_keypair()?,
        };
        self.log
            .lock()
            .secrets
            .push(keypair.secret().as_bytes().to_vec());
        Ok(keypair)
    }

    fn kx_client_session_keys(
        &self,
        keypair: &KxKeyPair,
        server_public_key: &[u8],
    ) -> Result<SessionKeys, KeyExchangeError> {
        if self.fail_at == Some(FailAt::SessionKeys) {
            return Err(KeyExchangeError::WeakPublicKey);
        }
        let keys = self.inner.kx_client_session_keys(keypair, server_public_key)?;
        self.remember_session(&keys);
        Ok(keys)
    }

    fn kx_server_session_keys(
        &self,
        keypair: &KxKeyPair,
        client_public_key: &[u8],
    ) -> Result<SessionKeys, KeyExchangeError> {
        if self.fail_at == Some(FailAt::SessionKeys) {
            return Err(KeyExchangeError::WeakPublicKey);
        }
        let keys = self.inner.kx_server_session_keys(keypair, client_public_key)?;
        self.remember_session(&keys);
        Ok(keys)
    }

    fn aead_encrypt(&self, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, AeadError> {
        if self.fail_at == Some(FailAt::Encrypt) {
            return Err(AeadError::EncryptFailed);
        }
        match self.fixed_nonce {
            Some(nonce) => aead::seal_with_nonce(key, &nonce, plaintext),
            None => self.inner.aead_encrypt(key, plaintext),
        }
    }

    fn aead_decrypt(&self, key: &[u8], sealed: &[u8]) -> Result<Vec<u8>, AeadError> {
        if self.fail_at == Some(FailAt::Decrypt) {
            return Err(AeadError::DecryptFailed);
        }
        self.inner.aead_decrypt(key, sealed)
    }

    fn memzero(&self, buf: &mut [u8]) {
        let before = buf.to_vec();
        self.inner.memzero(buf);
        self.log.lock().wiped.push(Wipe {
            before,
            after: buf.to_vec(),
        });
    }
}

/// Fills every buffer with the same byte. Lets key generation be pinned.
pub(crate) struct FixedRng(pub u8);

impl RngCore for FixedRng {
    fn next_u32(&mut self) -> u32 {
        u32::from_ne_bytes([self.0; 4])
    }

    fn next_u64(&mut self) -> u64 {
        u64::from_ne_bytes([self.0; 8])
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(self.0);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for FixedRng {}

/// An entropy source that is never available.
pub(crate) struct FailingRng;

impl RngCore for FailingRng {
    fn next_u32(&mut self) -> u32 {
        0
    }

    fn next_u64(&mut self) -> u64 {
        0
    }

    fn fill_bytes(&mut self, _dest: &mut [u8]) {
        panic!("FailingRng only supports try_fill_bytes");
    }

    fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand_core::Error> {
        Err(rand_core::Error::new("entropy source unavailable"))
    }
}

impl CryptoRng for FailingRng {}
