//! Post models

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

/// A post as shown in a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    /// Unique, URL-friendly identifier
    pub uid: String,

    /// First publication date, if the CMS reported one
    pub publication_date: Option<DateTime<FixedOffset>>,

    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// A full post, as shown on its own page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostDetail {
    pub uid: String,
    pub publication_date: Option<DateTime<FixedOffset>>,
    pub title: String,
    pub banner: Banner,
    pub author: String,
    pub content: Vec<ContentBlock>,
}

/// Post banner image
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
}

/// A section of a post: a heading followed by rich-text fragments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(default, deserialize_with = "null_as_default")]
    pub heading: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub body: Vec<BodyFragment>,
}

impl ContentBlock {
    pub fn new(heading: impl Into<String>, body: Vec<BodyFragment>) -> Self {
        Self {
            heading: heading.into(),
            body,
        }
    }
}

/// One rich-text fragment. `text` may carry inline markup.
///
/// CMS fragments also carry `type` and `spans`; those are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyFragment {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

impl BodyFragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One page of listing results together with its pagination cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostsPage {
    pub results: Vec<PostSummary>,

    /// URL of the following page, `None` on the last page
    pub next_page: Option<String>,
}

impl PostsPage {
    pub fn new(results: Vec<PostSummary>, next_page: Option<String>) -> Self {
        Self { results, next_page }
    }
}

/// Treat an explicit `null` the same as a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
