//! # Protocol Configuration & Constants
//!
//! Every magic number in Phase lives here. The wire format is shared with
//! every other Phase client that has ever shipped, so changing any of these
//! values is a protocol break, not a refactor.

// ---------------------------------------------------------------------------
// Wire Format
// ---------------------------------------------------------------------------

/// Literal first segment of every ciphertext string.
pub const PH_PREFIX: &str = "ph";

/// Ciphertext format version. The only one that exists.
pub const PH_VERSION: &str = "v1";

/// Segment separator for both ciphertexts and app IDs.
pub const SEGMENT_SEPARATOR: char = ':';

/// Number of `:`-separated segments in a ciphertext string:
/// prefix, version, ephemeral public key, AEAD output, tag.
pub const PH_SEGMENT_COUNT: usize = 5;

/// Literal first segment of an application identifier.
pub const APP_ID_PREFIX: &str = "phApp";

/// App ID format version emitted by [`crate::recipient::Recipient::app_id`].
/// Parsing accepts any decimal version.
pub const APP_ID_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// X25519 for the one-sided key exchange.
pub const KEY_EXCHANGE_ALGORITHM: &str = "X25519";

/// BLAKE2b-512 over `shared || client_pk || server_pk`, split into two
/// 32-byte directional keys. Same construction as libsodium's `crypto_kx`.
pub const SESSION_KDF_ALGORITHM: &str = "BLAKE2b-512";

/// XChaCha20-Poly1305 (IETF variant) for the payload.
pub const SYMMETRIC_ALGORITHM: &str = "XChaCha20-Poly1305";

/// Key exchange public key length in bytes.
pub const KX_PUBLIC_KEY_LENGTH: usize = 32;

/// Key exchange secret key length in bytes.
pub const KX_SECRET_KEY_LENGTH: usize = 32;

/// Length of each directional session key.
pub const SESSION_KEY_LENGTH: usize = 32;

/// XChaCha20 nonce length. 192 bits, wide enough that random nonces never
/// collide in practice.
pub const XCHACHA_NONCE_LENGTH: usize = 24;

/// Poly1305 authentication tag length.
pub const AEAD_TAG_LENGTH: usize = 16;

/// Fixed per-message overhead of the AEAD output: tag plus trailing nonce.
pub const AEAD_OVERHEAD: usize = AEAD_TAG_LENGTH + XCHACHA_NONCE_LENGTH;

/// Hex length of an encoded public key (the last app ID segment and the
/// third ciphertext segment).
pub const KX_PUBLIC_KEY_HEX_LENGTH: usize = KX_PUBLIC_KEY_LENGTH * 2;

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------

/// Hex length of the AEAD segment for a plaintext of `plaintext_len` bytes.
///
/// Only the byte count of the plaintext matters, which is why two
/// encryptions of the same plaintext always produce strings of equal length.
pub const fn ciphertext_hex_len(plaintext_len: usize) -> usize {
    (plaintext_len + AEAD_OVERHEAD) * 2
}

/// Total length of an encoded ciphertext string.
pub const fn encoded_len(plaintext_len: usize, tag_len: usize) -> usize {
    PH_PREFIX.len()
        + PH_VERSION.len()
        + KX_PUBLIC_KEY_HEX_LENGTH
        + ciphertext_hex_len(plaintext_len)
        + tag_len
        + (PH_SEGMENT_COUNT - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crypto_parameter_sizes() {
        assert_eq!(KX_PUBLIC_KEY_LENGTH, 32);
        assert_eq!(KX_SECRET_KEY_LENGTH, 32);
        assert_eq!(SESSION_KEY_LENGTH, 32);
        assert_eq!(XCHACHA_NONCE_LENGTH, 24);
        assert_eq!(AEAD_TAG_LENGTH, 16);
    }

    #[test]
    fn test_ciphertext_hex_len() {
        // "Hello, world!" is 13 bytes: (13 + 16 + 24) * 2.
        assert_eq!(ciphertext_hex_len(13), 106);
        assert_eq!(ciphertext_hex_len(0), 80);
    }

    #[test]
    fn test_encoded_len() {
        // ph + v1 + 64 + 106 + "sample_tag" + four separators
        assert_eq!(encoded_len(13, 10), 2 + 2 + 64 + 106 + 10 + 4);
    }
}
