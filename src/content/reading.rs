//! Reading time estimate

use super::post::ContentBlock;

pub const DEFAULT_WORDS_PER_MINUTE: usize = 200;

/// Words over every heading and body block
pub(crate) fn word_count(content: &[ContentBlock]) -> usize {
    content.iter().map(ContentBlock::word_count).sum()
}

/// Minutes to read `content`, rounded up; empty content reads in 0 minutes
pub fn reading_time(content: &[ContentBlock], words_per_minute: usize) -> usize {
    minutes_for(word_count(content), words_per_minute)
}

/// `ceil(words / words_per_minute)`
pub(crate) fn minutes_for(words: usize, words_per_minute: usize) -> usize {
    words.div_ceil(words_per_minute.max(1))
}
