//! On-disk artifact store: one pretty-printed JSON file per slug.
//!
//! The store is the durable layer behind the in-memory cache; anything
//! in it can be regenerated from source, so corrupt entries are skipped
//! and logged instead of failing a load.

use crate::content::Artifact;
use crate::log;
use crate::utils::fs::write_atomic;
use rustc_hash::FxHashSet;
use std::io;
use std::path::{Path, PathBuf};

/// Location of a slug's artifact file.
pub fn artifact_path(posts_dir: &Path, slug: &str) -> PathBuf {
    posts_dir.join(format!("{slug}.json"))
}

/// Whether an artifact exists for `slug`.
pub fn exists(posts_dir: &Path, slug: &str) -> bool {
    artifact_path(posts_dir, slug).is_file()
}

/// Persist an artifact atomically.
pub fn write(posts_dir: &Path, artifact: &Artifact) -> anyhow::Result<()> {
    let bytes = serde_json::to_vec_pretty(artifact)?;
    write_atomic(&artifact_path(posts_dir, &artifact.slug), &bytes)?;
    Ok(())
}

/// Load every readable artifact in the store.
///
/// Unreadable or unparseable files are logged and skipped; the caller
/// recompiles from source if it needs them.
pub fn load_all(posts_dir: &Path) -> io::Result<Vec<Artifact>> {
    let mut artifacts = Vec::new();

    for entry in std::fs::read_dir(posts_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let raw = match std::fs::read(&path) {
            Ok(raw) => raw,
            Err(e) => {
                log!("store"; "skipping unreadable artifact {}: {e}", path.display());
                continue;
            }
        };
        match serde_json::from_slice::<Artifact>(&raw) {
            Ok(artifact) => artifacts.push(artifact),
            Err(e) => {
                log!("store"; "skipping unreadable artifact {}: {e}", path.display());
            }
        }
    }

    Ok(artifacts)
}

/// Delete artifacts whose slug is no longer active. Returns the number
/// of files removed.
pub fn collect_garbage(posts_dir: &Path, active: &FxHashSet<String>) -> io::Result<usize> {
    let mut deleted = 0;

    for entry in std::fs::read_dir(posts_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        if let Some(slug) = path.file_stem().and_then(|s| s.to_str())
            && !active.contains(slug)
        {
            std::fs::remove_file(&path)?;
            deleted += 1;
        }
    }

    Ok(deleted)
}
