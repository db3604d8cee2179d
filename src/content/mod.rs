//! Content module - backend access, raw records and their projections

pub mod client;
#[cfg(test)]
pub(crate) mod memory;
mod post;
mod reading;
pub mod record;
mod richtext;

pub use client::{ContentSource, PrismicClient};
pub use post::{ContentBlock, PostDetail, PostSummary};
pub use reading::{reading_time, DEFAULT_WORDS_PER_MINUTE};
pub use record::{RawPage, RawRecord};
pub use richtext::{count_words, render_html, RichTextBlock, Span};
