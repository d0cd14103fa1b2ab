//! Document compiler: markdown source in, immutable artifact out.
//!
//! Compilation is a pure function of the source bytes plus the site
//! configuration. One document failing never aborts a batch; errors
//! carry the source path so callers can report and move on.

pub mod dom;
pub mod frontmatter;
pub mod highlight;
pub mod render;
pub mod transform;

use crate::config::SiteConfig;
use crate::content::slug::derive_slug;
use crate::content::{Artifact, Frontmatter, UNTITLED};
use crate::utils::date;
use frontmatter::RawFrontmatter;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use transform::{TRANSFORMS, TransformCtx};

#[derive(Debug, Error)]
#[error("failed to compile {}: {kind}", .path.display())]
pub struct CompileError {
    pub path: PathBuf,
    #[source]
    pub kind: CompileErrorKind,
}

#[derive(Debug, Error)]
pub enum CompileErrorKind {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("invalid frontmatter: {0}")]
    Frontmatter(String),
}

/// Compile a document from disk.
pub fn compile(path: &Path, config: &SiteConfig) -> Result<Artifact, CompileError> {
    let raw = std::fs::read_to_string(path).map_err(|e| CompileError {
        path: path.to_path_buf(),
        kind: e.into(),
    })?;
    compile_source(path, &raw, config)
}

/// Compile a document whose source is already in memory.
pub fn compile_source(
    path: &Path,
    raw: &str,
    config: &SiteConfig,
) -> Result<Artifact, CompileError> {
    let (fm, body) = match frontmatter::extract(raw) {
        Ok(Some((fm, body))) => (fm, body),
        Ok(None) => (RawFrontmatter::default(), raw),
        Err(msg) => {
            return Err(CompileError {
                path: path.to_path_buf(),
                kind: CompileErrorKind::Frontmatter(msg),
            });
        }
    };

    let slug = fm.slug.clone().unwrap_or_else(|| derive_slug(path));
    let dir_path = path.parent().unwrap_or(Path::new("")).to_path_buf();

    let mut doc = dom::from_markdown(body);
    let site_host = config.site_host();
    let mut ctx = TransformCtx {
        slug: &slug,
        section: &config.content.section,
        site_host: site_host.as_deref(),
        toc: Vec::new(),
    };
    for transform in TRANSFORMS {
        transform(&mut doc, &mut ctx);
    }
    let html = render::render(&doc);

    let frontmatter = normalize_frontmatter(fm, &slug, &dir_path, &config.content.section);

    let toc = ctx.toc;
    Ok(Artifact {
        slug,
        html,
        toc,
        frontmatter,
        dir_path,
    })
}

/// The slug a document will compile to, resolved without compiling.
///
/// Frontmatter errors are tolerated here; the later compile reports them.
pub fn document_slug(path: &Path, raw: &str) -> String {
    if let Ok(Some((fm, _))) = frontmatter::extract(raw)
        && let Some(slug) = fm.slug
    {
        return slug;
    }
    derive_slug(path)
}

fn normalize_frontmatter(
    fm: RawFrontmatter,
    slug: &str,
    dir_path: &Path,
    section: &str,
) -> Frontmatter {
    Frontmatter {
        title: fm.title.unwrap_or_else(|| UNTITLED.to_string()),
        date: fm.date.as_deref().and_then(date::normalize),
        slug: slug.to_string(),
        tags: fm.tags,
        description: fm.description.unwrap_or_default(),
        cover_image: fm
            .cover_image
            .as_deref()
            .and_then(|img| resolve_cover_image(img, slug, dir_path, section)),
    }
}

/// A cover image reference resolves to a served URL only when the file
/// actually exists next to the document.
fn resolve_cover_image(img: &str, slug: &str, dir_path: &Path, section: &str) -> Option<String> {
    let rel = img.strip_prefix("./").unwrap_or(img);
    dir_path
        .join(rel)
        .is_file()
        .then(|| format!("/{section}/{slug}/{rel}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config() -> SiteConfig {
        SiteConfig::default()
    }

    #[test]
    fn test_compile_minimal_document() {
        let raw = "---\ntitle: Hello\ndate: 2024-03-01\n---\n\n## Intro\n\nSome text.\n";
        let artifact =
            compile_source(Path::new("posts/hello.md"), raw, &config()).unwrap();

        assert_eq!(artifact.slug, "hello");
        assert_eq!(artifact.frontmatter.title, "Hello");
        assert_eq!(artifact.frontmatter.date.as_deref(), Some("2024-03-01"));
        assert_eq!(artifact.toc.len(), 1);
        assert_eq!(artifact.toc[0].id, "intro");
        assert!(artifact.html.contains("<h2 id=\"intro\">Intro</h2>"));
    }

    #[test]
    fn test_defaults_without_frontmatter() {
        let artifact =
            compile_source(Path::new("posts/plain.md"), "just text", &config()).unwrap();
        assert_eq!(artifact.frontmatter.title, UNTITLED);
        assert!(artifact.frontmatter.date.is_none());
        assert!(artifact.frontmatter.tags.is_empty());
        assert_eq!(artifact.frontmatter.description, "");
        assert_eq!(artifact.slug, "plain");
    }

    #[test]
    fn test_explicit_slug_wins() {
        let raw = "---\nslug: custom-slug\n---\nbody";
        let artifact = compile_source(Path::new("posts/file.md"), raw, &config()).unwrap();
        assert_eq!(artifact.slug, "custom-slug");
        assert_eq!(artifact.frontmatter.slug, "custom-slug");
    }

    #[test]
    fn test_index_slug_from_directory() {
        let artifact =
            compile_source(Path::new("posts/my-post/index.md"), "body", &config()).unwrap();
        assert_eq!(artifact.slug, "my-post");
    }

    #[test]
    fn test_invalid_date_dropped() {
        let raw = "---\ndate: not-a-date\n---\nbody";
        let artifact = compile_source(Path::new("posts/a.md"), raw, &config()).unwrap();
        assert!(artifact.frontmatter.date.is_none());
    }

    #[test]
    fn test_cover_image_requires_existing_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("cover.png"), b"png").unwrap();
        let doc = dir.path().join("index.md");

        let raw = "---\ncoverImage: ./cover.png\n---\nbody";
        let artifact = compile_source(&doc, raw, &config()).unwrap();
        let slug = artifact.slug.clone();
        assert_eq!(
            artifact.frontmatter.cover_image,
            Some(format!("/blog/{slug}/cover.png"))
        );

        let raw = "---\ncoverImage: ./missing.png\n---\nbody";
        let artifact = compile_source(&doc, raw, &config()).unwrap();
        assert!(artifact.frontmatter.cover_image.is_none());
    }

    #[test]
    fn test_frontmatter_error_carries_path() {
        let raw = "---\nnot a key value line\n---\nbody";
        let err = compile_source(Path::new("posts/bad.md"), raw, &config()).unwrap_err();
        assert!(err.to_string().contains("bad.md"));
        assert!(matches!(err.kind, CompileErrorKind::Frontmatter(_)));
    }

    #[test]
    fn test_leading_rule_is_markup_not_metadata() {
        let artifact =
            compile_source(Path::new("posts/rule.md"), "---\n\nopens with a rule", &config())
                .unwrap();
        assert!(artifact.html.starts_with("<hr>"));
        assert_eq!(artifact.frontmatter.title, UNTITLED);
    }

    #[test]
    fn test_document_slug_tolerates_bad_frontmatter() {
        assert_eq!(
            document_slug(Path::new("posts/broken.md"), "---\nno colon\n---\nbody"),
            "broken"
        );
        assert_eq!(
            document_slug(Path::new("posts/x.md"), "---\nslug: override\n---\nbody"),
            "override"
        );
    }

    #[test]
    fn test_compile_is_deterministic() {
        let raw = "---\ntitle: T\n---\n\n## A\n\n```rust\nlet x = 1;\n```\n";
        let a = compile_source(Path::new("p/d.md"), raw, &config()).unwrap();
        let b = compile_source(Path::new("p/d.md"), raw, &config()).unwrap();
        assert_eq!(a, b);
    }
}
