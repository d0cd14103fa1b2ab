//! Site configuration loaded from `papermill.toml`.
//!
//! Every field has a default, so a missing config file yields a usable
//! configuration; a malformed one is a startup error.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level site configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub site: SiteSection,
    pub content: ContentSection,
    pub build: BuildSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    /// Public site URL, used to distinguish off-site hyperlinks.
    pub url: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            url: "http://localhost:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentSection {
    /// Document source tree.
    pub dir: PathBuf,
    /// URL section co-located assets are served under: `/{section}/{slug}/...`
    pub section: String,
}

impl Default for ContentSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("content/posts"),
            section: "blog".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSection {
    /// Output directory for artifacts, manifest, and search index.
    pub dist: PathBuf,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            dist: PathBuf::from("dist"),
        }
    }
}

impl SiteConfig {
    /// Load configuration. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            crate::debug!("config"; "{} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.site.url).map_err(|e| {
            ConfigError::Validation(format!("site.url `{}` is not a URL: {e}", self.site.url))
        })?;
        Ok(())
    }

    /// Host component of the configured site URL.
    pub fn site_host(&self) -> Option<String> {
        Url::parse(&self.site.url)
            .ok()?
            .host_str()
            .map(str::to_string)
    }

    /// Per-document artifact directory: `{dist}/posts/`
    pub fn posts_dir(&self) -> PathBuf {
        self.build.dist.join("posts")
    }

    /// Incremental build manifest: `{dist}/manifest.json`
    pub fn manifest_path(&self) -> PathBuf {
        self.build.dist.join("manifest.json")
    }

    /// Client-side search index: `{dist}/search-index.json`
    pub fn search_index_path(&self) -> PathBuf {
        self.build.dist.join("search-index.json")
    }
}
