//! # XChaCha20-Poly1305 Encryption
//!
//! Authenticated encryption of the message body under the sender's
//! directional session key.
//!
//! ## Nonce management
//!
//! Every call draws a fresh 192-bit nonce from the OS CSPRNG. Keys here are
//! single-use anyway (a new exchange per message), but a wide random nonce
//! means nobody ever has to track nonce state, and collisions stay out of
//! reach even under heavy use of related keys.
//!
//! ## Wire format
//!
//! ```text
//! ciphertext || tag(16) || nonce(24)
//! ```
//!
//! The nonce is **appended**, not prepended. That is the opposite of what
//! most libraries do, and it is what every existing Phase client emits.
//! [`open`] reads the nonce from the tail.
//!
//! No associated data is used. The clear-text tag that travels next to the
//! ciphertext is not authenticated.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

use crate::config::{AEAD_OVERHEAD, AEAD_TAG_LENGTH, SESSION_KEY_LENGTH, XCHACHA_NONCE_LENGTH};

/// Errors from the AEAD layer.
///
/// Decryption failures are deliberately indistinct: wrong key, flipped bit
/// and truncated tag all look the same from outside.
#[derive(Debug, Error)]
pub enum AeadError {
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("nonce generation failed: {0}")]
    RandomSource(String),

    #[error("encryption failed")]
    EncryptFailed,

    #[error("decryption failed -- wrong key or corrupted ciphertext")]
    DecryptFailed,

    #[error("ciphertext too short: need at least {minimum} bytes, got {actual}")]
    CiphertextTooShort { minimum: usize, actual: usize },
}

fn cipher_for(key: &[u8]) -> Result<XChaCha20Poly1305, AeadError> {
    if key.len() != SESSION_KEY_LENGTH {
        return Err(AeadError::InvalidKeyLength {
            expected: SESSION_KEY_LENGTH,
            actual: key.len(),
        });
    }
    XChaCha20Poly1305::new_from_slice(key).map_err(|_| AeadError::InvalidKeyLength {
        expected: SESSION_KEY_LENGTH,
        actual: key.len(),
    })
}

/// Encrypt `plaintext` under `key` with a random nonce.
///
/// Returns `ciphertext || tag || nonce`. Output length is always
/// `plaintext.len() + 40`.
pub fn seal(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, AeadError> {
    let mut nonce = [0u8; XCHACHA_NONCE_LENGTH];
    OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|e| AeadError::RandomSource(e.to_string()))?;
    seal_with_nonce(key, &nonce, plaintext)
}

/// Encrypt with a caller-chosen nonce.
///
/// Exists for known-answer tests and for providers that bring their own
/// randomness. Reusing a nonce under the same key breaks confidentiality.
pub fn seal_with_nonce(
    key: &[u8],
    nonce: &[u8; XCHACHA_NONCE_LENGTH],
    plaintext: &[u8],
) -> Result<Vec<u8>, AeadError> {
    let cipher = cipher_for(key)?;
    let mut out = cipher
        .encrypt(XNonce::from_slice(nonce), plaintext)
        .map_err(|_| AeadError::EncryptFailed)?;

    out.reserve_exact(XCHACHA_NONCE_LENGTH);
    out.extend_from_slice(nonce);
    Ok(out)
}

/// Decrypt data produced by [`seal`].
pub fn open(key: &[u8], sealed: &[u8]) -> Result<Vec<u8>, AeadError> {
    if sealed.len() < AEAD_OVERHEAD {
        return Err(AeadError::CiphertextTooShort {
            minimum: AEAD_OVERHEAD,
            actual: sealed.len(),
        });
    }
    let cipher = cipher_for(key)?;

    let (ciphertext, nonce) = sealed.split_at(sealed.len() - XCHACHA_NONCE_LENGTH);
    debug_assert!(ciphertext.len() >= AEAD_TAG_LENGTH);
    cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map_err(|_| AeadError::DecryptFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = i as u8;
        }
        key
    }

    fn test_nonce() -> [u8; 24] {
        std::array::from_fn(|i| 0x40 + i as u8)
    }

    #[test]
    fn test_known_answer() {
        // libsodium crypto_aead_xchacha20poly1305_ietf_encrypt, nonce appended.
        let key = hex::decode("5c6c0404465bb9ee4e82ae89e7f58f8ca971dc46210035295487efa794dcc24d")
            .unwrap();
        let sealed = seal_with_nonce(&key, &test_nonce(), b"Hello, world!").unwrap();
        assert_eq!(
            hex::encode(&sealed),
            "10cb02cb85aa61bcb67b982740d2dd6e1e7f867f80870b5ef0645e7ef3\
             404142434445464748494a4b4c4d4e4f5051525354555657"
        );
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let key = test_key();
        let sealed = seal(&key, b"the quick brown fox").unwrap();
        assert_eq!(open(&key, &sealed).unwrap(), b"the quick brown fox");
    }

    #[test]
    fn test_nonce_is_appended() {
        let key = test_key();
        let nonce = test_nonce();
        let sealed = seal_with_nonce(&key, &nonce, b"abc").unwrap();
        assert_eq!(&sealed[sealed.len() - XCHACHA_NONCE_LENGTH..], &nonce);
    }

    #[test]
    fn test_output_length() {
        let key = test_key();
        for len in [0usize, 1, 13, 1000] {
            let sealed = seal(&key, &vec![0x61; len]).unwrap();
            assert_eq!(sealed.len(), len + AEAD_OVERHEAD);
        }
    }

    #[test]
    fn test_empty_plaintext() {
        let key = test_key();
        let sealed = seal(&key, b"").unwrap();
        assert_eq!(sealed.len(), AEAD_TAG_LENGTH + XCHACHA_NONCE_LENGTH);
        assert!(open(&key, &sealed).unwrap().is_empty());
    }

    #[test]
    fn test_unique_nonces() {
        let key = test_key();
        let a = seal(&key, b"message").unwrap();
        let b = seal(&key, b"message").unwrap();
        assert_ne!(a, b);
        assert_ne!(&a[a.len() - 24..], &b[b.len() - 24..]);
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = seal(&test_key(), b"secret").unwrap();
        let mut wrong = test_key();
        wrong[0] ^= 0xFF;
        assert!(matches!(open(&wrong, &sealed), Err(AeadError::DecryptFailed)));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = test_key();
        let mut sealed = seal(&key, b"secret").unwrap();
        sealed[0] ^= 0x01;
        assert!(open(&key, &sealed).is_err());

        // Tampering with the trailing nonce breaks it too.
        let mut sealed = seal(&key, b"secret").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0x01;
        assert!(open(&key, &sealed).is_err());
    }

    #[test]
    fn test_rejects_bad_key_length() {
        assert!(matches!(
            seal(&[0u8; 16], b"x"),
            Err(AeadError::InvalidKeyLength { expected: 32, actual: 16 })
        ));
        assert!(open(&[0u8; 31], &[0u8; 64]).is_err());
    }

    #[test]
    fn test_open_too_short() {
        let err = open(&test_key(), &[0u8; 39]).unwrap_err();
        assert!(matches!(
            err,
            AeadError::CiphertextTooShort { minimum: 40, actual: 39 }
        ));
    }
}
