//! Content module - post models, reading time and listing pagination

mod paginator;
mod plain_text;
pub(crate) mod post;
mod reading_time;

pub use paginator::{ListingView, LoadOutcome, Paginator};
pub use plain_text::to_plain_text;
pub use post::{Banner, BodyFragment, ContentBlock, PostDetail, PostSummary, PostsPage};
pub use reading_time::{
    count_words, estimate_read_minutes, estimate_read_minutes_at, WORDS_PER_MINUTE,
};
