//! Content source - where posts come from
//!
//! The CMS is reached through two small traits so the rest of the crate can
//! run against an in-memory source in tests.

mod document;
#[cfg(test)]
pub(crate) mod memory;
mod prismic;

use std::future::Future;

use crate::content::{PostDetail, PostsPage};
use crate::error::FetchResult;

pub use document::{parse_timestamp, RawPost, RawPostDetail, SearchResponse};
pub use prismic::PrismicClient;

/// Follows an opaque pagination URL handed out by the CMS
pub trait PageFetcher: Send + Sync {
    fn fetch_page(&self, url: &str) -> impl Future<Output = FetchResult<PostsPage>> + Send;
}

/// Queries posts from the content repository
pub trait ContentSource: PageFetcher {
    /// Fetch one listing page. `page` is 1-based; `None` means the first page.
    fn query_posts(
        &self,
        page_size: usize,
        page: Option<u32>,
    ) -> impl Future<Output = FetchResult<PostsPage>> + Send;

    /// Fetch a single post with its full content
    fn get_post_by_uid(&self, uid: &str) -> impl Future<Output = FetchResult<PostDetail>> + Send;

    /// Enumerate the uid of every post, in listing order
    fn list_uids(&self, page_size: usize) -> impl Future<Output = FetchResult<Vec<String>>> + Send {
        async move {
            let mut uids = Vec::new();
            let mut page = 1;
            loop {
                let batch = self.query_posts(page_size, Some(page)).await?;
                uids.extend(batch.results.into_iter().map(|post| post.uid));
                if batch.next_page.is_none() {
                    return Ok(uids);
                }
                page += 1;
            }
        }
    }
}

impl<T: PageFetcher + ?Sized> PageFetcher for &T {
    fn fetch_page(&self, url: &str) -> impl Future<Output = FetchResult<PostsPage>> + Send {
        (**self).fetch_page(url)
    }
}
