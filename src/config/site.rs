//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::content::WORDS_PER_MINUTE;

/// Environment variable overriding `cms.endpoint`
pub const ENDPOINT_ENV: &str = "SPACETRAVELING_CMS_ENDPOINT";
/// Environment variable overriding `cms.access_token`
pub const TOKEN_ENV: &str = "SPACETRAVELING_CMS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub public_dir: String,

    // Content repository
    pub cms: CmsConfig,

    // Post pages
    pub reading: ReadingConfig,
    pub comments: CommentsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            description: String::new(),
            language: "pt-BR".to_string(),

            url: "http://localhost:4000".to_string(),
            root: "/".to_string(),

            public_dir: "public".to_string(),

            cms: CmsConfig::default(),
            reading: ReadingConfig::default(),
            comments: CommentsConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENDPOINT_ENV).ok(),
            std::env::var(TOKEN_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, endpoint: Option<String>, token: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            tracing::debug!("CMS endpoint overridden by {}", ENDPOINT_ENV);
            self.cms.endpoint = endpoint;
        }
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.cms.access_token = Some(token);
        }
    }
}

/// Headless CMS connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    /// API root, e.g. `https://<repo>.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub document_type: String,
    pub access_token: Option<String>,
    /// Pin a content ref (preview); the master ref is used otherwise
    #[serde(rename = "ref")]
    pub content_ref: Option<String>,
    pub page_size: usize,
    pub timeout_secs: u64,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://spacetraveling.cdn.prismic.io/api/v2".to_string(),
            document_type: "posts".to_string(),
            access_token: None,
            content_ref: None,
            page_size: 1,
            timeout_secs: 30,
        }
    }
}

/// Reading time settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingConfig {
    pub words_per_minute: u32,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            words_per_minute: WORDS_PER_MINUTE,
        }
    }
}

/// Utterances comment widget; disabled while `repo` is unset
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    pub repo: Option<String>,
    pub issue_term: String,
    pub label: String,
    pub theme: String,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            repo: None,
            issue_term: "pathname".to_string(),
            label: "blog-comment".to_string(),
            theme: "photon-dark".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "spacetraveling");
        assert_eq!(config.cms.document_type, "posts");
        assert_eq!(config.cms.page_size, 1);
        assert_eq!(config.reading.words_per_minute, 200);
        assert!(config.comments.repo.is_none());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
cms:
  endpoint: https://myblog.cdn.prismic.io/api/v2
  ref: preview-ref
  page_size: 5
reading:
  words_per_minute: 250
comments:
  repo: someone/blog-comments
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.cms.endpoint, "https://myblog.cdn.prismic.io/api/v2");
        assert_eq!(config.cms.content_ref.as_deref(), Some("preview-ref"));
        assert_eq!(config.cms.page_size, 5);
        assert_eq!(config.cms.document_type, "posts");
        assert_eq!(config.reading.words_per_minute, 250);
        assert_eq!(config.comments.repo.as_deref(), Some("someone/blog-comments"));
        assert_eq!(config.comments.theme, "photon-dark");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "public_dir: dist\n").unwrap();

        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.public_dir, "dist");
        assert_eq!(config.root, "/");
    }

    #[test]
    fn test_overrides_ignore_blank_values() {
        let mut config = SiteConfig::default();
        config.apply_overrides(Some("https://other/api/v2".to_string()), Some("  ".to_string()));
        assert_eq!(config.cms.endpoint, "https://other/api/v2");
        assert!(config.cms.access_token.is_none());

        config.apply_overrides(None, Some("secret".to_string()));
        assert_eq!(config.cms.access_token.as_deref(), Some("secret"));
    }
}
