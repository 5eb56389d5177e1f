//! Content fingerprints
//!
//! A fingerprint is a SHA-256 digest over a canonical, length-prefixed
//! serialisation of a block's visible content. Equal fingerprints mean the
//! two blocks render identically; different fingerprints say nothing about
//! how far apart the blocks are.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Prefix shared by every digest string produced by this crate
pub const DIGEST_PREFIX: &str = "sha256:";

/// Deterministic content hash of a block, row or cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an existing digest string
    pub fn from_raw(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    /// The digest string, e.g. `sha256:ab12...`
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty fingerprint marks a block that was never fingerprinted
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Incremental fingerprint construction
///
/// Every field is written with a length prefix so that `("ab", "c")` and
/// `("a", "bc")` never collide.
pub struct FingerprintBuilder {
    hasher: Sha256,
}

impl FingerprintBuilder {
    /// Start a fingerprint for the given element tag
    pub fn new(tag: &str) -> Self {
        let mut builder = Self {
            hasher: Sha256::new(),
        };
        builder.write(tag.as_bytes());
        builder
    }

    fn write(&mut self, bytes: &[u8]) {
        self.hasher.update((bytes.len() as u64).to_le_bytes());
        self.hasher.update(bytes);
    }

    /// Add a string field
    pub fn str(mut self, value: &str) -> Self {
        self.write(value.as_bytes());
        self
    }

    /// Add an optional string field (absent and empty are distinct)
    pub fn opt_str(mut self, value: Option<&str>) -> Self {
        match value {
            Some(v) => {
                self.write(b"1");
                self.write(v.as_bytes());
            }
            None => self.write(b"0"),
        }
        self
    }

    /// Add a boolean field
    pub fn bool(mut self, value: bool) -> Self {
        self.write(if value { b"1" } else { b"0" });
        self
    }

    /// Add an unsigned integer field
    pub fn u64(mut self, value: u64) -> Self {
        self.write(&value.to_le_bytes());
        self
    }

    /// Fold a child fingerprint into this one
    pub fn child(mut self, fingerprint: &Fingerprint) -> Self {
        self.write(fingerprint.as_str().as_bytes());
        self
    }

    /// Finish and produce the fingerprint
    pub fn finish(self) -> Fingerprint {
        Fingerprint(format!("{}{}", DIGEST_PREFIX, to_hex(&self.hasher.finalize())))
    }
}

/// SHA-256 digest of raw bytes, formatted like a fingerprint
///
/// Used for embedded media identity.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{}{}", DIGEST_PREFIX, to_hex(&hasher.finalize()))
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
