//! Content Hash Value Object
//!
//! A deterministic digest of output content, used to produce cache-busting
//! filenames. The same bytes always hash to the same name, so repeated
//! builds over unchanged input emit identical output trees.

use std::fmt;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Number of hex digits embedded in hashed filenames
const FILENAME_HASH_LEN: usize = 10;

/// Content hash value object
///
/// Wraps the full SHA-256 hex digest of a file's content. Immutable once
/// computed; filename embedding uses a short prefix via [`ContentHash::short`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(String);

impl ContentHash {
    /// Compute the SHA-256 digest of `content`
    pub fn of(content: &[u8]) -> Self {
        Self(format!("{:x}", Sha256::digest(content)))
    }

    /// Full 64-char hex digest
    pub fn hex(&self) -> &str {
        &self.0
    }

    /// Short prefix used in hashed filenames
    pub fn short(&self) -> &str {
        &self.0[..FILENAME_HASH_LEN]
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build the cache-busting filename for a logical path:
/// `logo.png` → `logo-3fb1a02c9d.png`.
///
/// The logical path may contain directory components; the hash lands before
/// the final extension. A path without an extension gets the hash appended.
pub fn hashed_filename(logical: &str, hash: &ContentHash) -> String {
    match Path::new(logical).extension().and_then(|e| e.to_str()) {
        Some(ext) => {
            let stem = &logical[..logical.len() - ext.len() - 1];
            format!("{}-{}.{}", stem, hash.short(), ext)
        }
        None => format!("{}-{}", logical, hash.short()),
    }
}
