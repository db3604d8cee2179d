//! In-memory content backend for tests

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::client::ContentSource;
use super::record::{RawPage, RawRecord};
use crate::error::{BlogError, Result};

/// Serves fixed records, paginated with `memory://` cursors
#[derive(Default)]
pub struct MemorySource {
    records: Vec<RawRecord>,
    max_page_size: Option<usize>,
    delay: Option<Duration>,
    failing_cursors: Mutex<HashSet<String>>,
    overrides: Mutex<Vec<(String, RawPage)>>,
    cursor_fetches: AtomicUsize,
    uid_fetches: AtomicUsize,
}

impl MemorySource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// One well-formed post per uid
    pub fn with_posts(uids: &[&str]) -> Self {
        Self::new(uids.iter().map(|uid| post_record(uid)).collect())
    }

    pub fn with_max_page_size(mut self, size: usize) -> Self {
        self.max_page_size = Some(size);
        self
    }

    /// Sleep before answering `get_by_uid`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn cursor_for(doc_type: &str, page: usize, page_size: usize) -> String {
        format!("memory://{}?page={}&pageSize={}", doc_type, page, page_size)
    }

    /// Make fetching `cursor` fail with a transport error
    pub fn fail_cursor(&self, cursor: &str) {
        self.failing_cursors
            .lock()
            .unwrap()
            .insert(cursor.to_string());
    }

    pub fn heal_cursor(&self, cursor: &str) {
        self.failing_cursors.lock().unwrap().remove(cursor);
    }

    /// Answer `cursor` with `page` instead of slicing the records
    pub fn override_cursor(&self, cursor: &str, page: RawPage) {
        self.overrides
            .lock()
            .unwrap()
            .push((cursor.to_string(), page));
    }

    pub fn cursor_fetches(&self) -> usize {
        self.cursor_fetches.load(Ordering::SeqCst)
    }

    pub fn uid_fetches(&self) -> usize {
        self.uid_fetches.load(Ordering::SeqCst)
    }

    fn page(&self, doc_type: &str, page: usize, page_size: usize) -> RawPage {
        let page_size = self
            .max_page_size
            .map_or(page_size, |max| page_size.min(max))
            .max(1);
        let of_type: Vec<&RawRecord> = self
            .records
            .iter()
            .filter(|r| r.doc_type.as_deref() == Some(doc_type))
            .collect();
        let total_pages = of_type.len().div_ceil(page_size);
        let start = (page - 1) * page_size;

        RawPage {
            page: Some(page as u32),
            total_pages: Some(total_pages as u32),
            results: of_type
                .into_iter()
                .skip(start)
                .take(page_size)
                .cloned()
                .collect(),
            next_page: (page < total_pages).then(|| Self::cursor_for(doc_type, page + 1, page_size)),
        }
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn list_by_type(&self, doc_type: &str, page_size: usize) -> Result<RawPage> {
        if page_size == 0 {
            return Err(BlogError::Config("page size must be greater than 0".into()));
        }
        Ok(self.page(doc_type, 1, page_size))
    }

    async fn fetch_cursor(&self, cursor: &str) -> Result<RawPage> {
        self.cursor_fetches.fetch_add(1, Ordering::SeqCst);

        if self.failing_cursors.lock().unwrap().contains(cursor) {
            return Err(BlogError::Transport(format!("connection refused: {}", cursor)));
        }
        if let Some((_, page)) = self
            .overrides
            .lock()
            .unwrap()
            .iter()
            .find(|(c, _)| c == cursor)
        {
            return Ok(page.clone());
        }

        let invalid = || BlogError::Status {
            status: 400,
            body: format!("invalid cursor {}", cursor),
        };
        let rest = cursor.strip_prefix("memory://").ok_or_else(invalid)?;
        let (doc_type, query) = rest.split_once('?').ok_or_else(invalid)?;
        let mut page = None;
        let mut page_size = None;
        for pair in query.split('&') {
            match pair.split_once('=') {
                Some(("page", value)) => page = value.parse::<usize>().ok(),
                Some(("pageSize", value)) => page_size = value.parse::<usize>().ok(),
                _ => {}
            }
        }
        match (page, page_size) {
            (Some(page), Some(page_size)) if page > 0 => Ok(self.page(doc_type, page, page_size)),
            _ => Err(invalid()),
        }
    }

    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<RawRecord> {
        self.uid_fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.records
            .iter()
            .find(|r| r.doc_type.as_deref() == Some(doc_type) && r.uid.as_deref() == Some(uid))
            .cloned()
            .ok_or_else(|| BlogError::NotFound {
                doc_type: doc_type.to_string(),
                uid: uid.to_string(),
            })
    }
}

/// A complete `posts` record for `uid`
pub fn post_record(uid: &str) -> RawRecord {
    serde_json::from_value(json!({
        "id": format!("id-{}", uid),
        "uid": uid,
        "type": "posts",
        "first_publication_date": "2021-04-19T19:25:28+0000",
        "data": {
            "title": format!("Title {}", uid),
            "subtitle": format!("Subtitle {}", uid),
            "author": "Joseph Oliveira",
            "banner": {"url": format!("https://images.prismic.io/{}.png", uid)},
            "content": [
                {"heading": "Intro", "body": [{"type": "paragraph", "text": "hello world", "spans": []}]}
            ]
        }
    }))
    .expect("valid post record")
}
