//! Client-side search index, derived from the full artifact set.
//!
//! Each document contributes its metadata plus a deduplicated token
//! stream extracted from the rendered HTML. Dedup keeps first-seen
//! order so phrase-adjacent tokens stay near each other.

use crate::content::{Artifact, TocEntry};
use crate::utils::fs::write_atomic;
use regex::Regex;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::path::Path;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z0-9]+").unwrap());

/// One searchable document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchDoc {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub headings: Vec<String>,
    /// Space-joined unique body tokens, in first occurrence order.
    pub words: String,
}

impl SearchDoc {
    fn from_artifact(artifact: &Artifact) -> Self {
        Self {
            slug: artifact.slug.clone(),
            title: artifact.frontmatter.title.clone(),
            description: artifact.frontmatter.description.clone(),
            tags: artifact.frontmatter.tags.clone(),
            headings: artifact.toc.iter().map(|e: &TocEntry| e.text.clone()).collect(),
            words: tokenize(&artifact.html),
        }
    }
}

/// Strip markup, lowercase, and collect unique tokens.
fn tokenize(html: &str) -> String {
    let text = TAG_RE.replace_all(html, " ").to_lowercase();

    let mut seen = FxHashSet::default();
    let mut words = Vec::new();
    for token in TOKEN_RE.find_iter(&text) {
        let token = token.as_str();
        if seen.insert(token.to_string()) {
            words.push(token);
        }
    }
    words.join(" ")
}

/// Build search documents for every artifact.
pub fn build_docs<'a, I>(artifacts: I) -> Vec<SearchDoc>
where
    I: IntoIterator<Item = &'a Artifact>,
{
    artifacts.into_iter().map(SearchDoc::from_artifact).collect()
}

/// Write the search index atomically. Always covers the whole artifact
/// set, never a partial one.
pub fn write_index<'a, I>(artifacts: I, path: &Path) -> anyhow::Result<()>
where
    I: IntoIterator<Item = &'a Artifact>,
{
    let docs = build_docs(artifacts);
    let bytes = serde_json::to_vec_pretty(&docs)?;
    write_atomic(path, &bytes)?;
    Ok(())
}
