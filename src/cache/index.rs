//! Derived orderings over the artifact set.
//!
//! Indexes are rebuilt whole from the artifact map and swapped in as a
//! unit, so readers always see orderings and counts from the same
//! generation.

use crate::content::Artifact;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Reverse;
use std::sync::Arc;

/// One immutable generation of derived data.
#[derive(Debug, Default)]
pub struct Indexes {
    /// Newest first; ties broken by slug, descending.
    pub chronological: Vec<Arc<Artifact>>,
    /// Analytics ranking when available, tag-count fallback otherwise.
    pub trending: Vec<Arc<Artifact>>,
    pub tag_counts: FxHashMap<String, usize>,
}

impl Indexes {
    /// Rebuild every ordering from scratch.
    pub fn rebuild<'a, I>(artifacts: I) -> Self
    where
        I: IntoIterator<Item = &'a Arc<Artifact>>,
    {
        let mut chronological: Vec<Arc<Artifact>> =
            artifacts.into_iter().cloned().collect();
        chronological.sort_by(|a, b| {
            let a_key = (a.frontmatter.date.as_deref().unwrap_or(""), a.slug.as_str());
            let b_key = (b.frontmatter.date.as_deref().unwrap_or(""), b.slug.as_str());
            b_key.cmp(&a_key)
        });

        // Fallback ranking: tag-richer documents first, chronological
        // order preserved within equal counts.
        let mut trending = chronological.clone();
        trending.sort_by_key(|a| Reverse(a.frontmatter.tags.len()));

        let mut tag_counts: FxHashMap<String, usize> = FxHashMap::default();
        for artifact in &chronological {
            for tag in &artifact.frontmatter.tags {
                *tag_counts.entry(tag.clone()).or_default() += 1;
            }
        }

        Self {
            chronological,
            trending,
            tag_counts,
        }
    }

    /// Replace the trending ordering with an external ranking: ranked
    /// slugs first in the given order, everything else chronological.
    pub fn with_trending_from(&self, slugs: &[String]) -> Self {
        let by_slug: FxHashMap<&str, &Arc<Artifact>> = self
            .chronological
            .iter()
            .map(|a| (a.slug.as_str(), a))
            .collect();

        let mut trending: Vec<Arc<Artifact>> = Vec::with_capacity(self.chronological.len());
        let mut ranked: FxHashSet<&str> = FxHashSet::default();
        for slug in slugs {
            if let Some(artifact) = by_slug.get(slug.as_str()) {
                ranked.insert(slug.as_str());
                trending.push(Arc::clone(artifact));
            }
        }
        trending.extend(
            self.chronological
                .iter()
                .filter(|a| !ranked.contains(a.slug.as_str()))
                .cloned(),
        );

        Self {
            chronological: self.chronological.clone(),
            trending,
            tag_counts: self.tag_counts.clone(),
        }
    }
}
