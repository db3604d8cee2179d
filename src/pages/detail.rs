//! A single post page

use crate::content::{reading_time, ContentSource, PostDetail};
use crate::error::Result;

/// A projected post together with its estimated reading time
#[derive(Debug, Clone, PartialEq)]
pub struct DetailPage {
    pub uid: String,
    pub post: PostDetail,
    /// Minutes
    pub reading_time: usize,
}

impl DetailPage {
    /// Fetch, project and measure the post `uid`
    pub async fn build(
        source: &dyn ContentSource,
        doc_type: &str,
        uid: &str,
        words_per_minute: usize,
    ) -> Result<Self> {
        let record = source.get_by_uid(doc_type, uid).await?;
        let post = PostDetail::project(&record)?;
        let reading_time = reading_time(&post.content, words_per_minute);
        tracing::debug!(
            "Built post {} ({} words, {} min)",
            uid,
            post.word_count(),
            reading_time
        );

        Ok(Self {
            uid: uid.to_string(),
            post,
            reading_time,
        })
    }
}

/// Uids whose pages are generated ahead of time
pub async fn known_uids(source: &dyn ContentSource, doc_type: &str) -> Result<Vec<String>> {
    source.list_all_uids(doc_type).await
}
