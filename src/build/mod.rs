//! Incremental batch build: fingerprint, plan, compile, sweep.
//!
//! The build never fails because one document does. Per-document
//! errors are logged and counted; a document that fails gets no
//! manifest entry, so the next run retries it.

pub mod manifest;

use crate::compile;
use crate::config::SiteConfig;
use crate::content::fingerprint::fingerprint;
use crate::content::scan::find_documents;
use crate::utils::date;
use crate::{debug, log, search, store};
use manifest::{Manifest, ManifestEntry};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};

/// Documents compiled together; one failure never poisons its batch.
const BATCH_SIZE: usize = 10;

/// Outcome counters for one build run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub compiled: usize,
    pub skipped: usize,
    pub failed: usize,
    pub deleted: usize,
}

struct PlannedDoc {
    path: PathBuf,
    raw: String,
    hash: String,
    slug: String,
}

/// Run one build over the document tree.
///
/// With `force`, the previous manifest is ignored and everything
/// recompiles.
pub fn run(config: &SiteConfig, force: bool) -> anyhow::Result<BuildReport> {
    let posts_dir = config.posts_dir();
    std::fs::create_dir_all(&posts_dir)?;

    let docs = match find_documents(&config.content.dir) {
        Ok(docs) => docs,
        Err(e) => {
            debug!("build"; "{e}");
            Vec::new()
        }
    };

    let old = if force {
        Manifest::default()
    } else {
        Manifest::load(&config.manifest_path())
    };

    let mut report = BuildReport::default();
    let mut new_manifest = Manifest::default();
    let mut active: FxHashSet<String> = FxHashSet::default();
    let mut seen: FxHashMap<String, PathBuf> = FxHashMap::default();
    let mut planned: Vec<PlannedDoc> = Vec::new();

    for path in docs {
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                log!("error"; "cannot read {}: {e}", path.display());
                report.failed += 1;
                continue;
            }
        };
        let hash = fingerprint(raw.as_bytes());
        let slug = compile::document_slug(&path, &raw);

        if let Some(prev) = seen.insert(slug.clone(), path.clone()) {
            log!(
                "build";
                "slug `{slug}`: {} shadows {}",
                path.display(),
                prev.display()
            );
            planned.retain(|d| d.slug != slug);
            if new_manifest.entries.remove(&slug).is_some() {
                report.skipped -= 1;
            }
        }
        active.insert(slug.clone());

        let unchanged = old.entries.get(&slug).is_some_and(|e| e.hash == hash)
            && store::exists(&posts_dir, &slug);
        if unchanged {
            new_manifest
                .entries
                .insert(slug.clone(), old.entries[&slug].clone());
            report.skipped += 1;
            debug!("build"; "unchanged: {slug}");
        } else {
            planned.push(PlannedDoc {
                path,
                raw,
                hash,
                slug,
            });
        }
    }

    log!(
        "build";
        "{} documents, {} unchanged, {} to compile",
        active.len(),
        report.skipped,
        planned.len()
    );

    for chunk in planned.chunks(BATCH_SIZE) {
        let results: Vec<_> = chunk
            .par_iter()
            .map(|doc| compile::compile_source(&doc.path, &doc.raw, config))
            .collect();

        for (doc, result) in chunk.iter().zip(results) {
            match result {
                Ok(artifact) => match store::write(&posts_dir, &artifact) {
                    Ok(()) => {
                        new_manifest.entries.insert(
                            doc.slug.clone(),
                            ManifestEntry {
                                hash: doc.hash.clone(),
                                src_path: relative_src(&doc.path, &config.content.dir),
                                built_at: date::now_rfc3339(),
                            },
                        );
                        report.compiled += 1;
                    }
                    Err(e) => {
                        log!("error"; "cannot store artifact `{}`: {e}", doc.slug);
                        report.failed += 1;
                    }
                },
                Err(e) => {
                    log!("error"; "{e}");
                    report.failed += 1;
                }
            }
        }
    }

    // Active covers failed documents too, so their last good artifact
    // survives until they compile again.
    match store::collect_garbage(&posts_dir, &active) {
        Ok(deleted) => report.deleted = deleted,
        Err(e) => log!("error"; "artifact sweep failed: {e}"),
    }

    new_manifest.save(&config.manifest_path())?;

    let artifacts = store::load_all(&posts_dir)?;
    search::write_index(&artifacts, &config.search_index_path())?;

    Ok(report)
}

fn relative_src(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
