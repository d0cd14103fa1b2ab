//! Frontmatter extraction: `---` YAML-style and `+++` TOML blocks.
//!
//! The YAML-style parser handles the flat key/value subset used by
//! document metadata; nested structures are not supported there. TOML
//! blocks go through the full `toml` parser.

use serde::Deserialize;

/// Raw metadata as written by the author, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RawFrontmatter {
    pub title: Option<String>,
    pub date: Option<String>,
    pub slug: Option<String>,
    pub tags: Vec<String>,
    pub description: Option<String>,
    #[serde(alias = "coverImage")]
    pub cover_image: Option<String>,
}

/// Split a document into its frontmatter and markdown body.
///
/// A fence only counts as a frontmatter block when it sits on its own
/// opening line and a matching closing fence exists; anything else is
/// ordinary markup (a document may open with a thematic break).
/// Returns `Ok(None)` when there is no block, `Err` when a detected
/// block fails to parse.
pub fn extract(raw: &str) -> Result<Option<(RawFrontmatter, &str)>, String> {
    let trimmed = raw.trim_start();

    for (fence, parse) in [
        ("---", parse_yaml_like as fn(&str) -> Result<RawFrontmatter, String>),
        ("+++", parse_toml),
    ] {
        let Some(rest) = trimmed.strip_prefix(fence) else {
            continue;
        };
        let Some(rest) = rest.strip_prefix('\n') else {
            continue;
        };

        let close = format!("\n{fence}");
        let (block, after) = if let Some(after) = rest.strip_prefix(fence)
            && (after.is_empty() || after.starts_with('\n'))
        {
            ("", after)
        } else if let Some(end) = rest.find(&close) {
            (&rest[..end], &rest[end + close.len()..])
        } else {
            continue;
        };

        let body = after.trim_start_matches('\n');
        return parse(block).map(|fm| Some((fm, body)));
    }

    Ok(None)
}

fn parse_toml(block: &str) -> Result<RawFrontmatter, String> {
    toml::from_str(block).map_err(|e| e.to_string())
}

fn parse_yaml_like(block: &str) -> Result<RawFrontmatter, String> {
    let mut fm = RawFrontmatter::default();

    for line in block.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            return Err(format!("expected `key: value`, got `{line}`"));
        };
        let key = key.trim();
        let value = value.trim();

        match key {
            "title" => fm.title = non_empty(value),
            "date" => fm.date = non_empty(value),
            "slug" => fm.slug = non_empty(value),
            "description" => fm.description = non_empty(value),
            "coverImage" | "cover_image" => fm.cover_image = non_empty(value),
            "tags" => fm.tags = parse_tags(value),
            // Unknown keys are author notes, not errors
            _ => {}
        }
    }

    Ok(fm)
}

/// Tags written as `[a, b]` or as a bare comma list.
fn parse_tags(value: &str) -> Vec<String> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .unwrap_or(value);

    inner
        .split(',')
        .map(|t| unquote(t.trim()).to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn non_empty(value: &str) -> Option<String> {
    let value = unquote(value);
    (!value.is_empty()).then(|| value.to_string())
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_frontmatter() {
        let result = extract("# Just a heading\n\nbody").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_yaml_like_block() {
        let raw = "---\ntitle: Hello World\ndate: 2024-03-01\ntags: [rust, web]\n---\n\n# Body\n";
        let (fm, body) = extract(raw).unwrap().unwrap();
        assert_eq!(fm.title.as_deref(), Some("Hello World"));
        assert_eq!(fm.date.as_deref(), Some("2024-03-01"));
        assert_eq!(fm.tags, vec!["rust", "web"]);
        assert!(body.starts_with("# Body"));
    }

    #[test]
    fn test_yaml_like_quoted_values() {
        let raw = "---\ntitle: \"Quoted: title\"\ndescription: 'single'\n---\nbody";
        let (fm, _) = extract(raw).unwrap().unwrap();
        assert_eq!(fm.title.as_deref(), Some("Quoted: title"));
        assert_eq!(fm.description.as_deref(), Some("single"));
    }

    #[test]
    fn test_yaml_like_cover_image_aliases() {
        let raw = "---\ncoverImage: ./cover.png\n---\nbody";
        let (fm, _) = extract(raw).unwrap().unwrap();
        assert_eq!(fm.cover_image.as_deref(), Some("./cover.png"));
    }

    #[test]
    fn test_toml_block() {
        let raw = "+++\ntitle = \"Hello\"\ntags = [\"a\", \"b\"]\nslug = \"custom\"\n+++\nbody";
        let (fm, body) = extract(raw).unwrap().unwrap();
        assert_eq!(fm.title.as_deref(), Some("Hello"));
        assert_eq!(fm.tags, vec!["a", "b"]);
        assert_eq!(fm.slug.as_deref(), Some("custom"));
        assert_eq!(body, "body");
    }

    #[test]
    fn test_leading_thematic_break_is_content() {
        let result = extract("---\n\njust a horizontal rule up top").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_unclosed_fence_is_content() {
        // No closing fence means the opener was markup, not metadata
        let result = extract("---\ntitle: oops\n\nbody").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_empty_block() {
        let (fm, body) = extract("---\n---\nbody").unwrap().unwrap();
        assert_eq!(fm, RawFrontmatter::default());
        assert_eq!(body, "body");
    }

    #[test]
    fn test_malformed_toml_errors() {
        assert!(extract("+++\ntitle = = nope\n+++\nbody").is_err());
    }

    #[test]
    fn test_bare_comma_tags() {
        let raw = "---\ntags: one, two, three\n---\nbody";
        let (fm, _) = extract(raw).unwrap().unwrap();
        assert_eq!(fm.tags, vec!["one", "two", "three"]);
    }
}
