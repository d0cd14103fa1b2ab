//! Slug derivation and anchor slugification.

use deunicode::deunicode;
use std::path::Path;

/// Derive a document's slug from its path: the file stem, or the parent
/// directory name for `index` entry files.
pub fn derive_slug(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    if stem == "index"
        && let Some(dir) = path
            .parent()
            .and_then(Path::file_name)
            .and_then(|n| n.to_str())
    {
        return dir.to_string();
    }

    stem.to_string()
}

/// Slugify heading text into a stable anchor id.
///
/// Transliterates to ASCII, lowercases, drops punctuation, and collapses
/// whitespace and hyphen runs into single hyphens.
pub fn slugify(text: &str) -> String {
    let ascii = deunicode(text);
    let mut out = String::with_capacity(ascii.len());
    let mut pending_hyphen = false;

    for ch in ascii.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(ch);
        } else if ch.is_whitespace() || ch == '-' {
            pending_hyphen = true;
        }
        // Other punctuation is dropped entirely
    }

    out
}
