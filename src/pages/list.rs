//! The post list and its "load more" pagination

use std::collections::HashSet;

use crate::content::record::normalize_cursor;
use crate::content::{ContentSource, PostSummary, RawPage};
use crate::error::Result;

/// Whether any page beyond the first has been appended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    Initial,
    Expanded,
}

/// Result of a load-more action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched; `skipped` counts uids already in the list
    Appended { added: usize, skipped: usize },
    /// There is no cursor left, nothing was fetched
    Exhausted,
    /// Another fetch is pending, nothing was fetched
    InFlight,
}

/// An ordered, append-only list of post summaries plus the cursor of the
/// next backend page
#[derive(Debug, Clone)]
pub struct ListPage {
    posts: Vec<PostSummary>,
    next_page: Option<String>,
    seen: HashSet<String>,
    state: ListState,
    in_flight: bool,
}

impl ListPage {
    /// Fetch and project the first page
    pub async fn build(source: &dyn ContentSource, doc_type: &str, page_size: usize) -> Result<Self> {
        let page = source.list_by_type(doc_type, page_size).await?;
        let posts = project_page(&page)?;
        tracing::debug!(
            "Built list with {} posts (more: {})",
            posts.len(),
            page.cursor().is_some()
        );
        Ok(Self::from_parts(posts, page.next_page))
    }

    /// A list in the initial state; later duplicates of a uid are dropped
    pub fn from_parts(posts: Vec<PostSummary>, next_page: Option<String>) -> Self {
        let mut list = Self {
            posts: Vec::with_capacity(posts.len()),
            next_page: normalize_cursor(next_page.as_deref()).map(str::to_string),
            seen: HashSet::new(),
            state: ListState::Initial,
            in_flight: false,
        };
        list.append(posts);
        list
    }

    /// An empty list positioned at `cursor`, used to serve one page on demand
    pub fn resume(cursor: &str) -> Self {
        Self::from_parts(Vec::new(), Some(cursor.to_string()))
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    pub fn into_posts(self) -> Vec<PostSummary> {
        self.posts
    }

    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    pub fn state(&self) -> ListState {
        self.state
    }

    /// True while a cursor is held; the load-more control is shown only then
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// Claim the cursor for a fetch. Returns `None` when exhausted or when a
    /// fetch is already pending.
    pub fn begin_load(&mut self) -> Option<String> {
        if self.in_flight {
            return None;
        }
        let cursor = self.next_page.clone()?;
        self.in_flight = true;
        Some(cursor)
    }

    /// Apply the result of the fetch started by [`begin_load`](Self::begin_load).
    ///
    /// On any error the posts and cursor are left untouched so the same
    /// cursor can be retried.
    pub fn finish_load(&mut self, fetched: Result<RawPage>) -> Result<LoadOutcome> {
        self.in_flight = false;

        let page = fetched?;
        let posts = project_page(&page)?;
        let fetched_count = posts.len();
        let added = self.append(posts);

        self.next_page = page.cursor().map(str::to_string);
        self.state = ListState::Expanded;

        Ok(LoadOutcome::Appended {
            added,
            skipped: fetched_count - added,
        })
    }

    /// Fetch the next page through `source` and append it
    pub async fn load_more(&mut self, source: &dyn ContentSource) -> Result<LoadOutcome> {
        if self.in_flight {
            return Ok(LoadOutcome::InFlight);
        }
        let Some(cursor) = self.begin_load() else {
            return Ok(LoadOutcome::Exhausted);
        };

        let fetched = source.fetch_cursor(&cursor).await;
        if let Err(e) = &fetched {
            tracing::warn!("Loading more posts failed: {}", e);
        }
        self.finish_load(fetched)
    }

    fn append(&mut self, posts: Vec<PostSummary>) -> usize {
        let mut added = 0;
        for post in posts {
            if self.seen.insert(post.uid.clone()) {
                self.posts.push(post);
                added += 1;
            } else {
                tracing::debug!("Dropping duplicate post {}", post.uid);
            }
        }
        added
    }
}

/// Project every record of a page; one bad record rejects the whole page
fn project_page(page: &RawPage) -> Result<Vec<PostSummary>> {
    page.results.iter().map(PostSummary::project).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::memory::{post_record, MemorySource};
    use crate::error::BlogError;

    fn uids(list: &ListPage) -> Vec<&str> {
        list.posts().iter().map(|p| p.uid.as_str()).collect()
    }

    #[tokio::test]
    async fn test_load_more_appends_until_exhausted() {
        let source = MemorySource::with_posts(&["a", "b", "c"]);
        let mut list = ListPage::build(&source, "posts", 2).await.unwrap();
        assert_eq!(uids(&list), vec!["a", "b"]);
        assert_eq!(list.state(), ListState::Initial);
        assert!(list.has_more());

        let outcome = list.load_more(&source).await.unwrap();
        assert_eq!(outcome, LoadOutcome::Appended { added: 1, skipped: 0 });
        assert_eq!(uids(&list), vec!["a", "b", "c"]);
        assert_eq!(list.state(), ListState::Expanded);
        assert!(!list.has_more());

        assert_eq!(list.load_more(&source).await.unwrap(), LoadOutcome::Exhausted);
        assert_eq!(source.cursor_fetches(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_leaves_state_unchanged() {
        let source = MemorySource::with_posts(&["a", "b", "c"]);
        let mut list = ListPage::build(&source, "posts", 2).await.unwrap();
        let cursor = list.next_page().unwrap().to_string();
        source.fail_cursor(&cursor);

        let err = list.load_more(&source).await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(uids(&list), vec!["a", "b"]);
        assert_eq!(list.next_page(), Some(cursor.as_str()));
        assert_eq!(list.state(), ListState::Initial);
        assert!(!list.is_loading());

        source.heal_cursor(&cursor);
        list.load_more(&source).await.unwrap();
        assert_eq!(uids(&list), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_bad_record_rejects_whole_page() {
        let source = MemorySource::with_posts(&["a", "b"]);
        let mut broken = post_record("c");
        broken.data.author = None;
        source.override_cursor(
            "next",
            RawPage {
                results: vec![post_record("d"), broken],
                next_page: None,
                ..RawPage::default()
            },
        );

        let mut list = ListPage::from_parts(Vec::new(), Some("next".to_string()));
        let err = list.load_more(&source).await.unwrap_err();
        assert!(matches!(err, BlogError::Projection { field: "author", .. }));
        assert!(list.posts().is_empty());
        assert_eq!(list.next_page(), Some("next"));
    }

    #[tokio::test]
    async fn test_duplicate_uids_are_dropped() {
        let source = MemorySource::with_posts(&["a"]);
        source.override_cursor(
            "next",
            RawPage {
                results: vec![post_record("b"), post_record("a")],
                next_page: Some(String::new()),
                ..RawPage::default()
            },
        );
        let summary = PostSummary::project(&post_record("a")).unwrap();
        let mut list = ListPage::from_parts(vec![summary], Some("next".to_string()));

        let outcome = list.load_more(&source).await.unwrap();
        assert_eq!(outcome, LoadOutcome::Appended { added: 1, skipped: 1 });
        assert_eq!(uids(&list), vec!["a", "b"]);
        assert!(!list.has_more());
    }

    #[tokio::test]
    async fn test_pending_fetch_blocks_reentry() {
        let source = MemorySource::with_posts(&["a", "b", "c"]);
        let mut list = ListPage::build(&source, "posts", 2).await.unwrap();

        let cursor = list.begin_load().unwrap();
        assert!(list.is_loading());
        assert_eq!(list.begin_load(), None);
        assert_eq!(list.load_more(&source).await.unwrap(), LoadOutcome::InFlight);
        assert_eq!(source.cursor_fetches(), 0);

        let fetched = source.fetch_cursor(&cursor).await;
        list.finish_load(fetched).unwrap();
        assert_eq!(uids(&list), vec!["a", "b", "c"]);
        assert!(!list.is_loading());
    }

    #[test]
    fn test_empty_cursor_offers_no_more() {
        let list = ListPage::from_parts(Vec::new(), Some(String::new()));
        assert!(!list.has_more());
        assert_eq!(list.next_page(), None);
    }

    #[tokio::test]
    async fn test_resume_serves_one_page() {
        let source = MemorySource::with_posts(&["a", "b", "c", "d", "e"]);
        let cursor = MemorySource::cursor_for("posts", 2, 2);
        let mut list = ListPage::resume(&cursor);
        list.load_more(&source).await.unwrap();
        assert_eq!(uids(&list), vec!["c", "d"]);
        assert_eq!(
            list.next_page(),
            Some(MemorySource::cursor_for("posts", 3, 2).as_str())
        );
    }
}
