//! Reading time estimation

use super::plain_text::to_plain_text;
use super::ContentBlock;

/// Average reading speed used when none is configured
pub const WORDS_PER_MINUTE: u32 = 200;

/// Estimate how many minutes it takes to read `content`.
///
/// Never returns less than one minute, even for empty content.
pub fn estimate_read_minutes(content: &[ContentBlock]) -> u32 {
    estimate_read_minutes_at(content, WORDS_PER_MINUTE)
}

/// Same as [`estimate_read_minutes`] with an explicit reading speed.
/// A speed of zero falls back to [`WORDS_PER_MINUTE`].
pub fn estimate_read_minutes_at(content: &[ContentBlock], words_per_minute: u32) -> u32 {
    let words_per_minute = if words_per_minute == 0 {
        WORDS_PER_MINUTE
    } else {
        words_per_minute
    };

    let minutes = count_words(content).div_ceil(words_per_minute as usize);
    u32::try_from(minutes).unwrap_or(u32::MAX).max(1)
}

/// Total words across all headings and flattened body fragments
pub fn count_words(content: &[ContentBlock]) -> usize {
    content.iter().map(block_words).sum()
}

fn block_words(block: &ContentBlock) -> usize {
    let heading = block.heading.split_whitespace().count();
    let body: usize = block
        .body
        .iter()
        .map(|fragment| to_plain_text(&fragment.text).split_whitespace().count())
        .sum();

    heading + body
}
