//! Core content types: compiled artifacts and their metadata.

pub mod fingerprint;
pub mod scan;
pub mod slug;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Title used when frontmatter provides none.
pub const UNTITLED: &str = "Untitled";

/// Table-of-contents entry extracted from an `h2`/`h3` heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Anchor id injected into the heading element.
    pub id: String,
    /// Plain heading text.
    pub text: String,
    /// Heading level (2 or 3).
    pub depth: u8,
}

/// Normalized document metadata carried by every artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frontmatter {
    pub title: String,
    /// ISO 8601 date string; `None` when absent or unparseable.
    pub date: Option<String>,
    pub slug: String,
    pub tags: Vec<String>,
    pub description: String,
    /// Site-absolute URL of the cover image, when the referenced file
    /// exists next to the document.
    pub cover_image: Option<String>,
}

/// Compiled output of one document.
///
/// Immutable once produced; a recompilation supersedes the whole value
/// rather than mutating it in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub slug: String,
    pub html: String,
    pub toc: Vec<TocEntry>,
    pub frontmatter: Frontmatter,
    /// Source directory holding the document and its co-located assets.
    pub dir_path: PathBuf,
}
