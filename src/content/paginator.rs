//! Post list pagination
//!
//! A [`Paginator`] starts from the first listing page rendered at build
//! time and grows by following the opaque `next_page` cursor the CMS hands
//! back. Each successful load swaps in a new post sequence, so snapshots
//! taken earlier never change underneath their holders.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{PostSummary, PostsPage};
use crate::error::FetchResult;
use crate::source::PageFetcher;

/// Result of a [`Paginator::load_more`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched and appended
    Loaded { appended: usize },
    /// There is no next page; nothing was fetched
    Exhausted,
    /// Another load is still in flight; nothing was fetched
    InFlight,
}

/// What a listing renderer needs to draw the page
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    pub posts: Vec<PostSummary>,
    pub has_more: bool,
}

struct State {
    posts: Arc<[PostSummary]>,
    next_page: Option<String>,
    loading: bool,
}

/// Aggregates listing pages fetched on demand
pub struct Paginator<F> {
    fetcher: F,
    state: Mutex<State>,
}

impl<F: PageFetcher> Paginator<F> {
    /// Start from the first page of results
    pub fn new(fetcher: F, first_page: PostsPage) -> Self {
        Self {
            fetcher,
            state: Mutex::new(State {
                posts: first_page.results.into(),
                next_page: first_page.next_page,
                loading: false,
            }),
        }
    }

    /// Posts loaded so far, in listing order
    pub fn posts(&self) -> Arc<[PostSummary]> {
        Arc::clone(&self.lock().posts)
    }

    /// Cursor of the next page, if any
    pub fn next_page(&self) -> Option<String> {
        self.lock().next_page.clone()
    }

    /// Whether a "load more" control should be offered
    pub fn has_more(&self) -> bool {
        self.lock().next_page.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn view(&self) -> ListingView {
        let state = self.lock();
        ListingView {
            posts: state.posts.to_vec(),
            has_more: state.next_page.is_some(),
        }
    }

    /// Fetch the next page and append its posts.
    ///
    /// Does nothing when there is no next page or when a previous call has
    /// not settled yet. On failure the posts and cursor are left untouched.
    pub async fn load_more(&self) -> FetchResult<LoadOutcome> {
        let url = {
            let mut state = self.lock();
            if state.loading {
                tracing::debug!("Load already in flight, ignoring");
                return Ok(LoadOutcome::InFlight);
            }
            let Some(url) = state.next_page.clone() else {
                return Ok(LoadOutcome::Exhausted);
            };
            state.loading = true;
            url
        };

        // Clears the loading flag on every exit, including a dropped future
        let _loading = LoadingGuard { state: &self.state };

        tracing::debug!("Loading more posts from {}", url);
        let page = self.fetcher.fetch_page(&url).await?;
        let appended = page.results.len();

        {
            let mut state = self.lock();
            let mut posts = Vec::with_capacity(state.posts.len() + appended);
            posts.extend_from_slice(&state.posts);
            posts.extend(page.results);
            state.posts = posts.into();
            state.next_page = page.next_page;
        }

        Ok(LoadOutcome::Loaded { appended })
    }

    /// Keep loading until no page is left. Returns the number of posts appended.
    pub async fn load_all(&self) -> FetchResult<usize> {
        let mut total = 0;
        loop {
            match self.load_more().await? {
                LoadOutcome::Loaded { appended } => total += appended,
                LoadOutcome::Exhausted | LoadOutcome::InFlight => return Ok(total),
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct LoadingGuard<'a> {
    state: &'a Mutex<State>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .loading = false;
    }
}
