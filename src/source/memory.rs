//! In-memory content source for tests

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{ContentSource, PageFetcher};
use crate::content::{PostDetail, PostSummary, PostsPage};
use crate::error::{FetchError, FetchResult};

/// Serves posts from memory. Pagination URLs look like `memory://posts?page=N&size=S`;
/// other URLs are served from pages staged with [`MemorySource::stage_page`].
#[derive(Default)]
pub struct MemorySource {
    posts: Vec<PostDetail>,
    staged: Mutex<HashMap<String, PostsPage>>,
    fetches: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(posts: Vec<PostDetail>) -> Self {
        Self {
            posts,
            ..Self::default()
        }
    }

    /// Make `url` answer with the given page
    pub fn stage_page(&self, url: &str, results: Vec<PostSummary>, next_page: Option<String>) {
        self.staged
            .lock()
            .unwrap()
            .insert(url.to_string(), PostsPage::new(results, next_page));
    }

    /// Number of pagination URLs fetched so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn page(&self, page_size: usize, page: u32) -> PostsPage {
        let size = page_size.max(1);
        let start = (page.max(1) as usize - 1) * size;
        let results = self
            .posts
            .iter()
            .skip(start)
            .take(size)
            .map(summarize)
            .collect();
        let next_page = (start + size < self.posts.len())
            .then(|| format!("memory://posts?page={}&size={}", page.max(1) + 1, size));
        PostsPage::new(results, next_page)
    }
}

fn summarize(post: &PostDetail) -> PostSummary {
    PostSummary {
        uid: post.uid.clone(),
        publication_date: post.publication_date,
        title: post.title.clone(),
        subtitle: String::new(),
        author: post.author.clone(),
    }
}

impl PageFetcher for MemorySource {
    fn fetch_page(&self, url: &str) -> impl Future<Output = FetchResult<PostsPage>> + Send {
        async move {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            // Suspend once so concurrent callers interleave
            tokio::task::yield_now().await;

            if let Some(page) = self.staged.lock().unwrap().get(url) {
                return Ok(page.clone());
            }

            let parsed = url::Url::parse(url)?;
            if parsed.scheme() != "memory" {
                return Err(FetchError::Status {
                    status: 404,
                    url: url.to_string(),
                });
            }
            let pairs: HashMap<_, _> = parsed.query_pairs().into_owned().collect();
            let page = pairs.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
            let size = pairs.get("size").and_then(|s| s.parse().ok()).unwrap_or(1);
            Ok(self.page(size, page))
        }
    }
}

impl ContentSource for MemorySource {
    fn query_posts(
        &self,
        page_size: usize,
        page: Option<u32>,
    ) -> impl Future<Output = FetchResult<PostsPage>> + Send {
        async move { Ok(self.page(page_size, page.unwrap_or(1))) }
    }

    fn get_post_by_uid(&self, uid: &str) -> impl Future<Output = FetchResult<PostDetail>> + Send {
        async move {
            self.posts
                .iter()
                .find(|p| p.uid == uid)
                .cloned()
                .ok_or_else(|| FetchError::NotFound(uid.to_string()))
        }
    }
}
