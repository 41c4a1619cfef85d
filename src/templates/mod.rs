//! Built-in site templates using Tera template engine
//!
//! Templates are embedded in the binary; there is no theme directory.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::content::to_plain_text;
use crate::helpers::html_escape;

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Escape CMS text but leave slashes in URLs and paths alone
        tera.set_escape_fn(html_escape);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("index.html", include_str!("site/index.html")),
            ("post.html", include_str!("site/post.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("site/partials/header.html"),
            ),
            (
                "partials/comments.html",
                include_str!("site/partials/comments.html"),
            ),
        ])?;

        tera.register_filter("plain_text", plain_text_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: flatten rich-text markup to plain text
fn plain_text_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("plain_text", "value", String, value);
    Ok(tera::Value::String(to_plain_text(&s)))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub language: String,
    pub root: String,
    pub generator: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostCardData {
    pub uid: String,
    pub path: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: String,
    pub date_xml: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationData {
    pub current: usize,
    pub has_more: bool,
    pub next_link: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostPageData {
    pub uid: String,
    pub permalink: String,
    pub title: String,
    pub description: String,
    pub banner_url: String,
    pub author: String,
    pub date: String,
    pub date_xml: String,
    pub reading_minutes: u32,
    pub word_count: usize,
    pub blocks: Vec<BlockData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockData {
    pub heading: String,
    pub paragraphs: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentsData {
    pub repo: String,
    pub issue_term: String,
    pub label: String,
    pub theme: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_parse() {
        assert!(TemplateRenderer::new().is_ok());
    }

    #[test]
    fn test_plain_text_filter() {
        let value = tera::Value::String("<b>bold</b> move".to_string());
        let out = plain_text_filter(&value, &HashMap::new()).unwrap();
        assert_eq!(out, tera::Value::String("bold move".to_string()));
    }
}
