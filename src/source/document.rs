//! Wire shapes of the CMS REST API

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use crate::content::post::null_as_default;
use crate::content::{Banner, ContentBlock, PostDetail, PostSummary, PostsPage};

/// Repository metadata returned by the API root
#[derive(Debug, Deserialize)]
pub(crate) struct ApiInfo {
    #[serde(default)]
    pub refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiRef {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master_ref: bool,
}

impl ApiInfo {
    pub fn master_ref(&self) -> Option<&str> {
        self.refs
            .iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference.as_str())
    }
}

/// A search response page
#[derive(Debug, Deserialize)]
pub struct SearchResponse<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// A post document as listed by a search
#[derive(Debug, Deserialize)]
pub struct RawPost {
    #[serde(default, deserialize_with = "null_as_default")]
    pub uid: String,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: RawPostData,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawPostData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subtitle: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
}

/// A post document with its full content
#[derive(Debug, Deserialize)]
pub struct RawPostDetail {
    #[serde(default, deserialize_with = "null_as_default")]
    pub uid: String,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: RawPostDetailData,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawPostDetailData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub banner: Banner,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<ContentBlock>,
}

impl From<RawPost> for PostSummary {
    fn from(raw: RawPost) -> Self {
        Self {
            publication_date: raw
                .first_publication_date
                .as_deref()
                .and_then(parse_timestamp),
            uid: raw.uid,
            title: raw.data.title,
            subtitle: raw.data.subtitle,
            author: raw.data.author,
        }
    }
}

impl From<RawPostDetail> for PostDetail {
    fn from(raw: RawPostDetail) -> Self {
        Self {
            publication_date: raw
                .first_publication_date
                .as_deref()
                .and_then(parse_timestamp),
            uid: raw.uid,
            title: raw.data.title,
            banner: raw.data.banner,
            author: raw.data.author,
            content: raw.data.content,
        }
    }
}

impl From<SearchResponse<RawPost>> for PostsPage {
    fn from(response: SearchResponse<RawPost>) -> Self {
        Self {
            results: response.results.into_iter().map(PostSummary::from).collect(),
            next_page: response.next_page,
        }
    }
}

/// Parse a CMS timestamp such as `2021-03-25T19:25:28+0000`.
///
/// RFC 3339 is accepted too. Anything else is logged and dropped.
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let parsed = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(value));

    match parsed {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::warn!("Ignoring unparseable publication date {:?}: {}", value, e);
            None
        }
    }
}
