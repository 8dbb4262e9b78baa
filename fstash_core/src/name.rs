//! Stash name normalization, validation and storage path derivation.
//!
//! A stash lives at `<home>/<XX>/<XX>/<XX>/<XX>/<name>`, where the four
//! `XX` segments come from a 32-bit fold of the FNV-1a hash of the
//! normalized name. The mapping must never change once stashes exist,
//! otherwise they become unreachable by name.

use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// Number of fan-out directory levels above a stash.
pub const SHARD_LEVELS: usize = 4;

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// Lowercase and trim surrounding whitespace.
pub fn normalize(name: &str) -> String {
    name.to_lowercase().trim().to_string()
}

/// Check that `name` is non-empty and only holds ASCII letters, digits, `-` or `_`.
pub fn validate(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Derive the storage path of `name` under `home`.
///
/// Normalizes but does not validate; mutating operations go through
/// [`StashName::parse`] first.
pub fn derive(home: &Path, name: &str) -> PathBuf {
    let normalized = normalize(name);
    ShardKey::of(&normalized).join(home).join(normalized)
}

/// FNV-1a, 64-bit.
fn fnv1a_hash(data: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &b in data {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Four shard bytes derived from a normalized stash name.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShardKey([u8; SHARD_LEVELS]);

impl ShardKey {
    /// Hash `normalized` and fold the high half of the digest into the low half.
    pub fn of(normalized: &str) -> Self {
        let digest = fnv1a_hash(normalized.as_bytes());
        let folded = ((digest >> 32) ^ (digest & 0xffff_ffff)) as u32;
        ShardKey(folded.to_be_bytes())
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; SHARD_LEVELS] {
        &self.0
    }

    /// Uppercase two-hex-digit path segments, outermost first.
    pub fn segments(&self) -> [String; SHARD_LEVELS] {
        self.0.map(|b| hex::encode_upper([b]))
    }

    /// Append the shard segments to `base`.
    pub fn join(&self, base: &Path) -> PathBuf {
        let mut path = base.to_path_buf();
        for segment in self.segments() {
            path.push(segment);
        }
        path
    }
}

impl fmt::Display for ShardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments().join("/"))
    }
}

impl fmt::Debug for ShardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShardKey({})", hex::encode_upper(self.0))
    }
}

/// A normalized, validated stash name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StashName(String);

impl StashName {
    /// Normalize `raw` and reject it unless it passes [`validate`].
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = normalize(raw);
        if !validate(&normalized) {
            return Err(Error::invalid_name(raw));
        }
        Ok(StashName(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn shard(&self) -> ShardKey {
        ShardKey::of(&self.0)
    }

    /// The stash directory under `home`.
    pub fn storage_path(&self, home: &Path) -> PathBuf {
        self.shard().join(home).join(&self.0)
    }
}

impl fmt::Display for StashName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StashName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
