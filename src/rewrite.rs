//! Reference rewriting
//!
//! Substitutes logical asset paths with their content-hashed counterparts in
//! downstream output. Rewriting is textual, not parse-aware: every occurrence
//! of a known logical path is replaced, and a logical path string appearing
//! outside a reference context would be replaced too (documented risk of the
//! manifest approach, inherited from the format contract).
//!
//! Manifests are applied in the exact order the caller supplies. A logical
//! key present in more than one applied manifest is a configuration error —
//! the rewriter refuses to resolve the ambiguity silently.

use crate::error::{PipelineError, PipelineResult};
use crate::manifest::Manifest;
use crate::models::AssetClass;

/// Applies one or more class manifests to text in a fixed order
#[derive(Debug, Clone)]
pub struct Rewriter {
    // (class, logical, hashed), grouped by manifest order, longest key first
    // within each manifest so `logo.png.map` wins over `logo.png`
    replacements: Vec<(AssetClass, String, String)>,
}

impl Rewriter {
    /// Build a rewriter from manifests in application order.
    ///
    /// Fails with [`PipelineError::ManifestOverlap`] if two manifests map
    /// the same logical path.
    pub fn new(manifests: Vec<(AssetClass, Manifest)>) -> PipelineResult<Self> {
        for (i, (first, manifest)) in manifests.iter().enumerate() {
            for (key, _) in manifest.entries() {
                for (second, later) in manifests.iter().skip(i + 1) {
                    if later.contains(key) {
                        return Err(PipelineError::ManifestOverlap {
                            key: key.to_string(),
                            first: *first,
                            second: *second,
                        });
                    }
                }
            }
        }

        let mut replacements = Vec::new();
        for (class, manifest) in &manifests {
            let mut entries: Vec<(&str, &str)> = manifest.entries().collect();
            entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));
            for (logical, hashed) in entries {
                replacements.push((*class, logical.to_string(), hashed.to_string()));
            }
        }
        Ok(Self { replacements })
    }

    /// True when no applied manifest has any entry, i.e. rewriting is a no-op
    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }

    /// Replace every occurrence of every known logical path in `text`.
    /// Paths absent from all manifests are left verbatim.
    pub fn rewrite(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (_, logical, hashed) in &self.replacements {
            if out.contains(logical.as_str()) {
                out = out.replace(logical.as_str(), hashed);
            }
        }
        out
    }
}
