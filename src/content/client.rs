//! Content backend access
//!
//! [`ContentSource`] is the seam every page builder depends on.
//! [`PrismicClient`] implements it against a Prismic-style REST API
//! (`/documents/search` with predicate queries and a content `ref`).

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::OnceCell;

use super::record::{normalize_cursor, RawPage, RawRecord};
use crate::config::CmsConfig;
use crate::error::{BlogError, Result};

/// Page size used when enumerating every uid
pub const ALL_UIDS_PAGE_SIZE: usize = 100;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Read-only queries against the content backend
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// First page of documents of `doc_type`
    async fn list_by_type(&self, doc_type: &str, page_size: usize) -> Result<RawPage>;

    /// The page behind an opaque `next_page` cursor, fetched verbatim
    async fn fetch_cursor(&self, cursor: &str) -> Result<RawPage>;

    /// The document of `doc_type` whose uid is `uid`
    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<RawRecord>;

    /// Every uid of `doc_type`, in backend order, following all pages
    async fn list_all_uids(&self, doc_type: &str) -> Result<Vec<String>> {
        let mut uids = Vec::new();
        let mut seen_uids = HashSet::new();
        let mut seen_cursors = HashSet::new();
        let mut page = self.list_by_type(doc_type, ALL_UIDS_PAGE_SIZE).await?;

        loop {
            for record in &page.results {
                match &record.uid {
                    Some(uid) if seen_uids.insert(uid.clone()) => uids.push(uid.clone()),
                    Some(_) => {}
                    None => tracing::debug!("Document {} has no uid, skipping", record.label()),
                }
            }

            let cursor = match page.cursor() {
                Some(cursor) if seen_cursors.insert(cursor.to_string()) => cursor.to_string(),
                Some(cursor) => {
                    tracing::warn!("Backend repeated cursor {}, stopping enumeration", cursor);
                    break;
                }
                None => break,
            };
            page = self.fetch_cursor(&cursor).await?;
        }

        Ok(uids)
    }
}

#[derive(Debug, Deserialize)]
struct ApiRoot {
    #[serde(default)]
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    id: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

/// HTTP client for a Prismic-style repository
pub struct PrismicClient {
    http: Client,
    endpoint: String,
    access_token: Option<String>,
    pinned_ref: Option<String>,
    master_ref: OnceCell<String>,
}

impl PrismicClient {
    pub fn new(config: &CmsConfig) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BlogError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone().filter(|t| !t.is_empty()),
            pinned_ref: config.content_ref.clone().filter(|r| !r.is_empty()),
            master_ref: OnceCell::new(),
        })
    }

    /// The configured ref, or the repository's master ref (fetched once)
    async fn content_ref(&self) -> Result<&str> {
        if let Some(pinned) = &self.pinned_ref {
            return Ok(pinned.as_str());
        }

        let master = self
            .master_ref
            .get_or_try_init(|| async {
                let root: ApiRoot = self.send(self.authorized(self.http.get(&self.endpoint))).await?;
                let master = root
                    .refs
                    .into_iter()
                    .find(|r| r.is_master_ref)
                    .map(|r| r.id)
                    .ok_or_else(|| BlogError::Transport("API root lists no master ref".into()))?;
                tracing::debug!("Resolved master ref {}", master);
                Ok::<_, BlogError>(master)
            })
            .await?;

        Ok(master.as_str())
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.query(&[("access_token", token)]),
            None => request,
        }
    }

    async fn search(&self, predicate: String, page_size: usize) -> Result<RawPage> {
        let content_ref = self.content_ref().await?;
        let url = format!("{}/documents/search", self.endpoint);
        let request = self.http.get(&url).query(&[
            ("ref", content_ref),
            ("q", predicate.as_str()),
            ("pageSize", page_size.to_string().as_str()),
        ]);
        self.send(self.authorized(request)).await
    }

    async fn send<T: serde::de::DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BlogError::Status { status, body });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ContentSource for PrismicClient {
    async fn list_by_type(&self, doc_type: &str, page_size: usize) -> Result<RawPage> {
        if page_size == 0 {
            return Err(BlogError::Config("page size must be greater than 0".into()));
        }
        tracing::debug!("Listing {} (page size {})", doc_type, page_size);
        self.search(type_predicate(doc_type), page_size).await
    }

    async fn fetch_cursor(&self, cursor: &str) -> Result<RawPage> {
        let cursor = normalize_cursor(Some(cursor))
            .ok_or_else(|| BlogError::Transport("Empty pagination cursor".into()))?;
        tracing::debug!("Fetching cursor {}", cursor);
        self.send(self.http.get(cursor)).await
    }

    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<RawRecord> {
        tracing::debug!("Fetching {} {}", doc_type, uid);
        let page = self.search(uid_predicate(doc_type, uid), 1).await?;
        record_with_uid(page.results, doc_type, uid)
    }
}

/// The result whose uid is exactly `uid`; anything else counts as not found
fn record_with_uid(results: Vec<RawRecord>, doc_type: &str, uid: &str) -> Result<RawRecord> {
    results
        .into_iter()
        .find(|record| record.uid.as_deref() == Some(uid))
        .ok_or_else(|| BlogError::NotFound {
            doc_type: doc_type.to_string(),
            uid: uid.to_string(),
        })
}

fn type_predicate(doc_type: &str) -> String {
    format!(r#"[[at(document.type,"{}")]]"#, quote(doc_type))
}

fn uid_predicate(doc_type: &str, uid: &str) -> String {
    format!(r#"[[at(my.{}.uid,"{}")]]"#, doc_type, quote(uid))
}

/// Escape a value for a double-quoted predicate string
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted
}
