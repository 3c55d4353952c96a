//! SHA-256 content hashing.

use aidux_common_core::Error;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Length of a hex-encoded SHA-256 digest.
pub const HASH_HEX_LEN: usize = 64;

/// Rejected textual hash.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HashParseError {
    #[error("expected {HASH_HEX_LEN} hex characters, got {0}")]
    Length(usize),
    #[error("hash must be lowercase hexadecimal")]
    NotLowercaseHex,
}

impl From<HashParseError> for Error {
    fn from(e: HashParseError) -> Self {
        Error::validation(e.to_string())
    }
}

/// Lowercase hex SHA-256 digest of a document's exact bytes.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Accept an already-computed digest, e.g. one read back from storage.
    pub fn parse(s: &str) -> Result<Self, HashParseError> {
        if s.len() != HASH_HEX_LEN {
            return Err(HashParseError::Length(s.len()));
        }
        if !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(HashParseError::NotLowercaseHex);
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.0)
    }
}

impl FromStr for ContentHash {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContentHash {
    type Error = HashParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

/// Computes content hashes.
///
/// Any change to the input, down to a single byte, changes the digest.
/// Empty input is valid and hashes to the well-known empty digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentHasher;

impl DocumentHasher {
    /// SHA-256 of `"abc"`, used by [`DocumentHasher::self_test`].
    const KNOWN_ANSWER: &'static str =
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    pub fn hash(bytes: &[u8]) -> ContentHash {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        ContentHash(format!("{:x}", hasher.finalize()))
    }

    /// Hash a file on disk.
    pub async fn hash_file(path: impl AsRef<Path>) -> Result<ContentHash, Error> {
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::hash(&bytes))
    }

    /// Check the digest primitive against a known answer.
    ///
    /// Called once at startup; a failure means signatures cannot be trusted.
    pub fn self_test() -> Result<(), Error> {
        let actual = Self::hash(b"abc");
        if actual.as_str() == Self::KNOWN_ANSWER {
            Ok(())
        } else {
            Err(Error::config(format!(
                "SHA-256 self-test failed: got {actual}"
            )))
        }
    }
}
