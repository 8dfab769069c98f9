//! # Application Identifiers
//!
//! A Phase app ID is how a recipient publishes its static public key:
//!
//! ```text
//! phApp:v<version>:<64 hex chars>
//! ```
//!
//! The version is any run of ASCII digits and isn't interpreted beyond
//! that. The key segment is kept exactly as written, case included, so
//! [`AppId::public_key_hex`] hands back the same characters the caller
//! passed in. Mixed-case hex is fine; it decodes to the same bytes.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::config::{APP_ID_PREFIX, KX_PUBLIC_KEY_LENGTH};
use crate::crypto::keys::public_key_from_hex;
use crate::error::PhaseError;

// `[0-9]` rather than `\d`: the latter is Unicode-aware in this engine and
// would let non-ASCII digits through.
const APP_ID_PATTERN: &str = r"^phApp:v([0-9]+):([a-fA-F0-9]{64})$";

fn app_id_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(APP_ID_PATTERN).ok()).as_ref()
}

/// A validated application identifier.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AppId {
    raw: String,
    version_end: usize,
    public_key: [u8; KX_PUBLIC_KEY_LENGTH],
}

impl AppId {
    /// Validate `s` against the app ID grammar.
    pub fn parse(s: &str) -> Result<Self, PhaseError> {
        let caps = app_id_regex()
            .and_then(|re| re.captures(s))
            .ok_or_else(|| PhaseError::InvalidAppId(s.to_string()))?;
        let (version, key_hex) = match (caps.get(1), caps.get(2)) {
            (Some(v), Some(k)) => (v, k.as_str()),
            _ => return Err(PhaseError::InvalidAppId(s.to_string())),
        };
        let public_key =
            public_key_from_hex(key_hex).map_err(|_| PhaseError::InvalidAppId(s.to_string()))?;

        Ok(Self {
            raw: s.to_string(),
            version_end: version.end(),
            public_key,
        })
    }

    /// Build an app ID for a public key, rendered with lowercase hex.
    pub fn from_public_key(version: u32, public_key: &[u8; KX_PUBLIC_KEY_LENGTH]) -> Self {
        let raw = format!("{APP_ID_PREFIX}:v{version}:{}", hex::encode(public_key));
        let version_end = raw.len() - public_key.len() * 2 - 1;
        Self {
            raw,
            version_end,
            public_key: *public_key,
        }
    }

    /// The version digits, without the leading `v`.
    pub fn version(&self) -> &str {
        // "phApp:v" is 7 bytes.
        &self.raw[APP_ID_PREFIX.len() + 2..self.version_end]
    }

    /// The key segment exactly as it appeared in the identifier.
    pub fn public_key_hex(&self) -> &str {
        &self.raw[self.version_end + 1..]
    }

    pub fn public_key_bytes(&self) -> &[u8; KX_PUBLIC_KEY_LENGTH] {
        &self.public_key
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Debug for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AppId").field(&self.raw).finish()
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for AppId {
    type Err = PhaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for AppId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for AppId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
