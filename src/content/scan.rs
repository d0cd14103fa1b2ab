//! Document discovery: recursive walk filtering to markdown sources.

use jwalk::WalkDir;
use std::io;
use std::path::{Path, PathBuf};

/// Recognized document extension.
pub const DOC_EXTENSION: &str = "md";

/// Walk `root` and collect every document path, sorted for deterministic
/// build order.
///
/// A missing root is an `io::Error`; callers treat it as "no documents"
/// rather than a fatal startup condition.
pub fn find_documents(root: &Path) -> io::Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("document root not found: {}", root.display()),
        ));
    }

    let mut docs: Vec<PathBuf> = WalkDir::new(root)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(DOC_EXTENSION))
        .collect();
    docs.sort();
    Ok(docs)
}
