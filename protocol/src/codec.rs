//! # Ciphertext Wire Format
//!
//! The textual envelope every Phase ciphertext travels in:
//!
//! ```text
//! ph:v1:<hex(ephemeral_pk)>:<hex(ciphertext || tag || nonce)>:<tag>
//! ```
//!
//! Hex is lowercase with no separators. The last segment is the caller's
//! tag, verbatim: not encrypted, not encoded, not authenticated. It is a
//! routing/labelling hint and anyone holding the string can read it. An
//! empty tag still leaves its trailing `:`.
//!
//! ## Decoding
//!
//! The string is split on the first four colons only, so a tag that itself
//! contains `:` comes back intact. For colon-free tags that is the same as
//! requiring exactly five segments.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::config::{
    AEAD_OVERHEAD, KX_PUBLIC_KEY_LENGTH, PH_PREFIX, PH_SEGMENT_COUNT, PH_VERSION,
    SEGMENT_SEPARATOR,
};

/// Errors from parsing a ciphertext string.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed ciphertext: expected {expected} segments, got {actual}")]
    SegmentCount { expected: usize, actual: usize },

    #[error("malformed ciphertext: expected prefix 'ph', got '{0}'")]
    BadPrefix(String),

    #[error("unsupported ciphertext version '{0}'")]
    UnsupportedVersion(String),

    #[error("malformed ciphertext: {segment} is not valid hex: {source}")]
    InvalidHex {
        segment: &'static str,
        #[source]
        source: hex::FromHexError,
    },

    #[error("malformed ciphertext: {segment} has {actual} bytes, {requirement}")]
    BadLength {
        segment: &'static str,
        requirement: &'static str,
        actual: usize,
    },
}

/// A parsed (or about-to-be-encoded) Phase ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseCiphertext {
    ephemeral_public_key: [u8; KX_PUBLIC_KEY_LENGTH],
    sealed: Vec<u8>,
    tag: String,
}

impl PhaseCiphertext {
    pub fn new(
        ephemeral_public_key: [u8; KX_PUBLIC_KEY_LENGTH],
        sealed: Vec<u8>,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            ephemeral_public_key,
            sealed,
            tag: tag.into(),
        }
    }

    /// Always `v1`; it's the only version there is.
    pub fn version(&self) -> &'static str {
        PH_VERSION
    }

    pub fn ephemeral_public_key(&self) -> &[u8; KX_PUBLIC_KEY_LENGTH] {
        &self.ephemeral_public_key
    }

    /// AEAD output: `ciphertext || tag || nonce`.
    pub fn sealed(&self) -> &[u8] {
        &self.sealed
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn encode(&self) -> String {
        encode(&self.ephemeral_public_key, &self.sealed, &self.tag)
    }

    pub fn decode(s: &str) -> Result<Self, CodecError> {
        let segments: Vec<&str> = s.splitn(PH_SEGMENT_COUNT, SEGMENT_SEPARATOR).collect();
        if segments.len() != PH_SEGMENT_COUNT {
            return Err(CodecError::SegmentCount {
                expected: PH_SEGMENT_COUNT,
                actual: segments.len(),
            });
        }
        if segments[0] != PH_PREFIX {
            return Err(CodecError::BadPrefix(segments[0].to_string()));
        }
        if segments[1] != PH_VERSION {
            return Err(CodecError::UnsupportedVersion(segments[1].to_string()));
        }

        let ephemeral = hex::decode(segments[2]).map_err(|source| CodecError::InvalidHex {
            segment: "ephemeral public key",
            source,
        })?;
        let ephemeral_public_key: [u8; KX_PUBLIC_KEY_LENGTH] = ephemeral
            .as_slice()
            .try_into()
            .map_err(|_| CodecError::BadLength {
                segment: "ephemeral public key",
                requirement: "expected exactly 32",
                actual: ephemeral.len(),
            })?;

        let sealed = hex::decode(segments[3]).map_err(|source| CodecError::InvalidHex {
            segment: "ciphertext",
            source,
        })?;
        if sealed.len() < AEAD_OVERHEAD {
            return Err(CodecError::BadLength {
                segment: "ciphertext",
                requirement: "expected at least 40",
                actual: sealed.len(),
            });
        }

        Ok(Self {
            ephemeral_public_key,
            sealed,
            tag: segments[4].to_string(),
        })
    }
}

/// Format the four fields into a `ph:v1:...` string.
pub fn encode(ephemeral_public_key: &[u8; KX_PUBLIC_KEY_LENGTH], sealed: &[u8], tag: &str) -> String {
    format!(
        "{PH_PREFIX}:{PH_VERSION}:{}:{}:{tag}",
        hex::encode(ephemeral_public_key),
        hex::encode(sealed),
    )
}

impl fmt::Display for PhaseCiphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for PhaseCiphertext {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for PhaseCiphertext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PhaseCiphertext {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PhaseCiphertext {
        PhaseCiphertext::new([0xAB; 32], vec![0x01; 53], "sample_tag")
    }

    #[test]
    fn test_encode_layout() {
        let encoded = sample().encode();
        let segments: Vec<&str> = encoded.split(':').collect();
        assert_eq!(segments.len(), 5);
        assert_eq!(segments[0], "ph");
        assert_eq!(segments[1], "v1");
        assert_eq!(segments[2], "ab".repeat(32));
        assert_eq!(segments[3], "01".repeat(53));
        assert_eq!(segments[4], "sample_tag");
    }

    #[test]
    fn test_empty_tag_keeps_trailing_separator() {
        let ct = PhaseCiphertext::new([0u8; 32], vec![0u8; 40], "");
        let encoded = ct.to_string();
        assert!(encoded.ends_with(':'));
        assert_eq!(encoded.split(':').count(), 5);
        assert_eq!(PhaseCiphertext::decode(&encoded).unwrap().tag(), "");
    }

    #[test]
    fn test_decode_inverts_encode() {
        let ct = sample();
        assert_eq!(PhaseCiphertext::decode(&ct.encode()).unwrap(), ct);
    }

    #[test]
    fn test_tag_with_colons_survives() {
        let ct = PhaseCiphertext::new([0x01; 32], vec![0x02; 40], "user:42:email");
        let parsed: PhaseCiphertext = ct.to_string().parse().unwrap();
        assert_eq!(parsed.tag(), "user:42:email");
    }

    #[test]
    fn test_decode_accepts_uppercase_hex() {
        let upper = format!("ph:v1:{}:{}:t", "AB".repeat(32), "CD".repeat(40));
        let ct = PhaseCiphertext::decode(&upper).unwrap();
        assert_eq!(ct.ephemeral_public_key(), &[0xAB; 32]);
    }

    #[test]
    fn test_decode_rejects_too_few_segments() {
        let err = PhaseCiphertext::decode("ph:v1:abcd").unwrap_err();
        assert!(matches!(
            err,
            CodecError::SegmentCount { expected: 5, actual: 3 }
        ));
    }

    #[test]
    fn test_decode_rejects_wrong_prefix() {
        let s = format!("xx:v1:{}:{}:", "00".repeat(32), "00".repeat(40));
        assert!(matches!(
            PhaseCiphertext::decode(&s),
            Err(CodecError::BadPrefix(p)) if p == "xx"
        ));
    }

    #[test]
    fn test_decode_rejects_unknown_version() {
        let s = format!("ph:v2:{}:{}:", "00".repeat(32), "00".repeat(40));
        assert!(matches!(
            PhaseCiphertext::decode(&s),
            Err(CodecError::UnsupportedVersion(v)) if v == "v2"
        ));
    }

    #[test]
    fn test_decode_rejects_bad_hex() {
        let s = format!("ph:v1:{}:{}:", "zz".repeat(32), "00".repeat(40));
        assert!(matches!(
            PhaseCiphertext::decode(&s),
            Err(CodecError::InvalidHex { .. })
        ));
        let s = format!("ph:v1:{}:{}:", "00".repeat(32), "0".repeat(81));
        assert!(PhaseCiphertext::decode(&s).is_err());
    }

    #[test]
    fn test_decode_rejects_bad_lengths() {
        let short_key = format!("ph:v1:{}:{}:", "00".repeat(31), "00".repeat(40));
        assert!(matches!(
            PhaseCiphertext::decode(&short_key),
            Err(CodecError::BadLength { actual: 31, .. })
        ));
        let short_body = format!("ph:v1:{}:{}:", "00".repeat(32), "00".repeat(39));
        assert!(matches!(
            PhaseCiphertext::decode(&short_body),
            Err(CodecError::BadLength { actual: 39, .. })
        ));
    }

    #[test]
    fn test_serde_as_string() {
        let ct = sample();
        let json = serde_json::to_string(&ct).unwrap();
        assert_eq!(json, format!("\"{}\"", ct));
        let back: PhaseCiphertext = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ct);
    }
}
