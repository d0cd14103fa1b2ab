//! Incremental build manifest, keyed by slug.

use crate::utils::fs::write_atomic;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Record of one document's last successful build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Fingerprint of the source bytes at build time.
    pub hash: String,
    /// Source path relative to the document root.
    pub src_path: String,
    /// RFC 3339 timestamp of the build.
    pub built_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    pub entries: FxHashMap<String, ManifestEntry>,
}

impl Manifest {
    /// Load the manifest. Missing or unreadable manifests mean a full
    /// rebuild, never a failed one.
    pub fn load(path: &Path) -> Self {
        let Ok(raw) = std::fs::read(path) else {
            return Self::default();
        };
        serde_json::from_slice(&raw).unwrap_or_default()
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let bytes = serde_json::to_vec_pretty(self)?;
        write_atomic(path, &bytes)?;
        Ok(())
    }
}
