//! Errors raised while talking to the content repository

use thiserror::Error;

/// Failure while fetching posts from the CMS or a pagination URL
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{url} answered with http status {status}")]
    Status { status: u16, url: String },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no post with uid {0:?}")]
    NotFound(String),

    #[error("repository did not advertise a master ref")]
    MissingMasterRef,

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;
