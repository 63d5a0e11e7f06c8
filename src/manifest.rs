//! Per-asset-class manifests
//!
//! A manifest is a flat mapping from logical filename to content-hashed
//! filename, one independent file per asset class (`js.json`, `css.json`,
//! `svg.json`, `images.json`). Manifests are written once per production
//! build and read by downstream stages that rewrite references.
//!
//! Reading a class whose manifest file does not exist yields an empty
//! mapping. This is a documented default, not error recovery: a stage may
//! legitimately request rewriting against a class that has not been built
//! on this checkout yet, in which case it rewrites nothing.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::models::AssetClass;

/// Flat logical→hashed mapping for one asset class.
///
/// Backed by a `BTreeMap` so serialization order is deterministic and
/// repeated builds produce byte-identical manifest files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, String>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, logical: impl Into<String>, hashed: impl Into<String>) {
        self.entries.insert(logical.into(), hashed.into());
    }

    pub fn get(&self, logical: &str) -> Option<&str> {
        self.entries.get(logical).map(|s| s.as_str())
    }

    pub fn contains(&self, logical: &str) -> bool {
        self.entries.contains_key(logical)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Reads and writes per-class manifest files under one manifest root
#[derive(Debug, Clone)]
pub struct ManifestStore {
    root: PathBuf,
}

impl ManifestStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the manifest file for `class`
    pub fn path_for(&self, class: AssetClass) -> PathBuf {
        self.root.join(class.manifest_file())
    }

    /// Read the manifest for `class`. A missing file is an empty mapping.
    pub fn read(&self, class: AssetClass) -> PipelineResult<Manifest> {
        let path = self.path_for(class);
        if !path.exists() {
            return Ok(Manifest::default());
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Persist the manifest for `class`, creating the root on demand.
    ///
    /// Writes go through a temp file in the same directory and a rename, so
    /// a concurrent reader never observes a half-written manifest.
    pub fn write(&self, class: AssetClass, manifest: &Manifest) -> PipelineResult<()> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(class);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        tmp.write_all(serde_json::to_string_pretty(manifest)?.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.persist(&path).map_err(|e| PipelineError::Io(e.error))?;
        Ok(())
    }
}
