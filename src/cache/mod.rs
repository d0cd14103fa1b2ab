//! In-memory content cache with derived indexes.
//!
//! The artifact map is the source of truth; indexes are an immutable
//! snapshot swapped atomically, so readers never block on writers and
//! never observe a half-rebuilt ordering. Writers serialize on the map
//! lock and hold it across the rebuild-and-swap, so index generations
//! apply in mutation order.

pub mod index;
pub mod trending;

use crate::compile;
use crate::config::SiteConfig;
use crate::content::Artifact;
use crate::content::scan::find_documents;
use crate::{debug, log, store};
use arc_swap::ArcSwap;
use index::Indexes;
use parking_lot::RwLock;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use trending::TrendingSource;

pub struct ContentCache {
    artifacts: RwLock<FxHashMap<String, Arc<Artifact>>>,
    indexes: ArcSwap<Indexes>,
}

/// How a cache load was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    /// True when artifacts came from disk, false when compiled fresh.
    pub from_store: bool,
}

impl ContentCache {
    pub fn new() -> Self {
        Self {
            artifacts: RwLock::new(FxHashMap::default()),
            indexes: ArcSwap::from_pointee(Indexes::default()),
        }
    }

    /// Populate the cache: from stored artifacts when any exist, else by
    /// compiling the document tree.
    pub fn load(&self, config: &SiteConfig) -> anyhow::Result<LoadSummary> {
        let posts_dir = config.posts_dir();
        std::fs::create_dir_all(&posts_dir)?;

        let stored = store::load_all(&posts_dir)?;
        let from_store = !stored.is_empty();
        let artifacts = if from_store {
            stored
        } else {
            compile_tree(config)
        };

        let mut map = self.artifacts.write();
        map.clear();
        for artifact in artifacts {
            map.insert(artifact.slug.clone(), Arc::new(artifact));
        }
        self.indexes.store(Arc::new(Indexes::rebuild(map.values())));

        Ok(LoadSummary {
            loaded: map.len(),
            from_store,
        })
    }

    /// Insert or replace one artifact and rebuild the indexes.
    pub fn insert(&self, artifact: Artifact) {
        let mut map = self.artifacts.write();
        map.insert(artifact.slug.clone(), Arc::new(artifact));
        self.indexes.store(Arc::new(Indexes::rebuild(map.values())));
    }

    /// Remove a slug. Returns whether it was present.
    pub fn remove(&self, slug: &str) -> bool {
        let mut map = self.artifacts.write();
        let removed = map.remove(slug).is_some();
        if removed {
            self.indexes.store(Arc::new(Indexes::rebuild(map.values())));
        }
        removed
    }

    // The read API below is the interface the page-serving layer
    // consumes; not every operation has an in-process caller.

    #[allow(dead_code)]
    pub fn get(&self, slug: &str) -> Option<Arc<Artifact>> {
        self.artifacts.read().get(slug).cloned()
    }

    /// Every cached artifact, in chronological order.
    pub fn all(&self) -> Vec<Arc<Artifact>> {
        self.indexes.load().chronological.clone()
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.artifacts.read().len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.artifacts.read().is_empty()
    }

    /// Up to `n` newest artifacts, optionally excluding one slug.
    pub fn latest(&self, n: usize, exclude: Option<&str>) -> Vec<Arc<Artifact>> {
        take_n(&self.indexes.load().chronological, n, exclude)
    }

    /// Up to `n` trending artifacts, optionally excluding one slug.
    #[allow(dead_code)]
    pub fn trending(&self, n: usize, exclude: Option<&str>) -> Vec<Arc<Artifact>> {
        take_n(&self.indexes.load().trending, n, exclude)
    }

    pub fn tag_counts(&self) -> FxHashMap<String, usize> {
        self.indexes.load().tag_counts.clone()
    }

    /// Artifacts carrying `tag`, in chronological order.
    #[allow(dead_code)]
    pub fn with_tag(&self, tag: &str) -> Vec<Arc<Artifact>> {
        self.indexes
            .load()
            .chronological
            .iter()
            .filter(|a| a.frontmatter.tags.iter().any(|t| t == tag))
            .cloned()
            .collect()
    }

    /// Re-rank trending from an external source. Failures and empty
    /// rankings keep the current ordering.
    pub fn refresh_trending(&self, source: &dyn TrendingSource, n: usize) {
        let slugs = match source.trending_slugs(n) {
            Ok(slugs) => slugs,
            Err(e) => {
                debug!("cache"; "trending refresh failed, keeping fallback: {e}");
                return;
            }
        };
        if slugs.is_empty() {
            return;
        }

        // Read lock keeps writers out between computing and swapping, so
        // the new ordering matches the current generation.
        let _map = self.artifacts.read();
        let next = self.indexes.load().with_trending_from(&slugs);
        self.indexes.store(Arc::new(next));
    }
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::new()
    }
}

fn take_n(list: &[Arc<Artifact>], n: usize, exclude: Option<&str>) -> Vec<Arc<Artifact>> {
    list.iter()
        .filter(|a| exclude.is_none_or(|ex| a.slug != ex))
        .take(n)
        .cloned()
        .collect()
}

/// Slow path: compile the whole tree into memory. Persisting artifacts
/// is the build's job, not the cache's.
fn compile_tree(config: &SiteConfig) -> Vec<Artifact> {
    let docs = match find_documents(&config.content.dir) {
        Ok(docs) => docs,
        Err(e) => {
            debug!("cache"; "{e}");
            return Vec::new();
        }
    };

    docs.par_iter()
        .filter_map(|path| match compile::compile(path, config) {
            Ok(artifact) => Some(artifact),
            Err(e) => {
                log!("error"; "{e}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Frontmatter;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn artifact(slug: &str, date: &str, tags: &[&str]) -> Artifact {
        Artifact {
            slug: slug.to_string(),
            html: format!("<p>{slug}</p>"),
            toc: Vec::new(),
            frontmatter: Frontmatter {
                title: slug.to_string(),
                date: Some(date.to_string()),
                slug: slug.to_string(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                description: String::new(),
                cover_image: None,
            },
            dir_path: PathBuf::new(),
        }
    }

    fn slugs(artifacts: &[Arc<Artifact>]) -> Vec<&str> {
        artifacts.iter().map(|a| a.slug.as_str()).collect()
    }

    #[test]
    fn test_insert_updates_orderings() {
        let cache = ContentCache::new();
        cache.insert(artifact("old", "2023-01-01", &[]));
        cache.insert(artifact("new", "2024-01-01", &[]));

        assert_eq!(slugs(&cache.latest(10, None)), vec!["new", "old"]);
        assert!(cache.get("old").is_some());
    }

    #[test]
    fn test_replace_supersedes_whole_artifact() {
        let cache = ContentCache::new();
        cache.insert(artifact("post", "2023-01-01", &["a"]));
        cache.insert(artifact("post", "2024-01-01", &["b"]));

        assert_eq!(cache.len(), 1);
        let got = cache.get("post").unwrap();
        assert_eq!(got.frontmatter.tags, vec!["b"]);
        assert_eq!(cache.tag_counts().get("a"), None);
        assert_eq!(cache.tag_counts()["b"], 1);
    }

    #[test]
    fn test_remove() {
        let cache = ContentCache::new();
        cache.insert(artifact("a", "2024-01-01", &["rust"]));

        assert!(cache.remove("a"));
        assert!(!cache.remove("a"));
        assert!(cache.is_empty());
        assert!(cache.latest(10, None).is_empty());
        assert!(cache.tag_counts().is_empty());
    }

    #[test]
    fn test_latest_exclude_and_limit() {
        let cache = ContentCache::new();
        cache.insert(artifact("a", "2024-03-01", &[]));
        cache.insert(artifact("b", "2024-02-01", &[]));
        cache.insert(artifact("c", "2024-01-01", &[]));

        assert_eq!(slugs(&cache.latest(2, None)), vec!["a", "b"]);
        assert_eq!(slugs(&cache.latest(2, Some("a"))), vec!["b", "c"]);
    }

    #[test]
    fn test_with_tag() {
        let cache = ContentCache::new();
        cache.insert(artifact("a", "2024-02-01", &["rust"]));
        cache.insert(artifact("b", "2024-01-01", &["rust", "web"]));
        cache.insert(artifact("c", "2024-03-01", &["web"]));

        assert_eq!(slugs(&cache.with_tag("rust")), vec!["a", "b"]);
    }

    #[test]
    fn test_refresh_trending_applies_ranking() {
        struct Fixed(Vec<String>);
        impl TrendingSource for Fixed {
            fn trending_slugs(&self, _n: usize) -> anyhow::Result<Vec<String>> {
                Ok(self.0.clone())
            }
        }

        let cache = ContentCache::new();
        cache.insert(artifact("a", "2024-02-01", &["x", "y"]));
        cache.insert(artifact("b", "2024-01-01", &[]));

        // Fallback puts the tag-richer document first
        assert_eq!(slugs(&cache.trending(10, None)), vec!["a", "b"]);

        cache.refresh_trending(&Fixed(vec!["b".to_string()]), 10);
        assert_eq!(slugs(&cache.trending(10, None)), vec!["b", "a"]);
    }

    #[test]
    fn test_refresh_trending_failure_keeps_ordering() {
        struct Failing;
        impl TrendingSource for Failing {
            fn trending_slugs(&self, _n: usize) -> anyhow::Result<Vec<String>> {
                anyhow::bail!("backend unreachable")
            }
        }

        let cache = ContentCache::new();
        cache.insert(artifact("a", "2024-02-01", &["x"]));
        cache.insert(artifact("b", "2024-01-01", &[]));
        let before = slugs(&cache.trending(10, None))
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        cache.refresh_trending(&Failing, 10);
        assert_eq!(slugs(&cache.trending(10, None)), before);
    }

    #[test]
    fn test_load_from_store() {
        let dir = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.build.dist = dir.path().join("dist");
        config.content.dir = dir.path().join("posts");

        fs::create_dir_all(config.posts_dir()).unwrap();
        store::write(&config.posts_dir(), &artifact("stored", "2024-01-01", &[])).unwrap();

        let cache = ContentCache::new();
        let summary = cache.load(&config).unwrap();
        assert_eq!(summary.loaded, 1);
        assert!(summary.from_store);
        assert!(cache.get("stored").is_some());
    }

    #[test]
    fn test_load_compiles_when_store_empty() {
        let dir = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.build.dist = dir.path().join("dist");
        config.content.dir = dir.path().join("posts");
        fs::create_dir_all(&config.content.dir).unwrap();
        fs::write(
            config.content.dir.join("fresh.md"),
            "---\ntitle: Fresh\n---\nbody",
        )
        .unwrap();

        let cache = ContentCache::new();
        let summary = cache.load(&config).unwrap();
        assert_eq!(summary.loaded, 1);
        assert!(!summary.from_store);
        assert!(cache.get("fresh").is_some());
        // The slow path compiles into memory only; the store is the
        // build's output, not the cache's
        assert!(!store::exists(&config.posts_dir(), "fresh"));
    }
}
