//! Raw document schema as returned by the content backend
//!
//! Every field is optional here. Whether a field is required is decided by
//! the projections in [`super::post`], which report missing fields instead of
//! letting them surface later as empty markup.

use serde::{Deserialize, Serialize};

use super::richtext::RichTextBlock;

/// One page of a backend search response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPage {
    #[serde(default)]
    pub page: Option<u32>,

    #[serde(default)]
    pub total_pages: Option<u32>,

    #[serde(default)]
    pub results: Vec<RawRecord>,

    /// Fully-qualified URL of the following page, if any
    #[serde(default)]
    pub next_page: Option<String>,
}

impl RawPage {
    /// The continuation cursor, with empty strings treated as absent
    pub fn cursor(&self) -> Option<&str> {
        normalize_cursor(self.next_page.as_deref())
    }
}

/// Treat both `null` and `""` as "no further pages"
pub fn normalize_cursor(cursor: Option<&str>) -> Option<&str> {
    cursor.map(str::trim).filter(|c| !c.is_empty())
}

/// A document as stored in the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub uid: Option<String>,

    #[serde(default, rename = "type")]
    pub doc_type: Option<String>,

    #[serde(default)]
    pub first_publication_date: Option<String>,

    #[serde(default)]
    pub data: RawPostData,
}

impl RawRecord {
    /// Identifier used in error messages
    pub fn label(&self) -> String {
        self.uid
            .clone()
            .or_else(|| self.id.clone())
            .unwrap_or_else(|| "<unidentified>".to_string())
    }
}

/// The `data` object of a post document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPostData {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub subtitle: Option<String>,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub banner: Option<RawImage>,

    #[serde(default)]
    pub content: Option<Vec<RawContentBlock>>,
}

/// Image field; the backend sends `{}` for an empty image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawImage {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub alt: Option<String>,
}

/// One entry of the repeatable `content` group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawContentBlock {
    #[serde(default)]
    pub heading: Option<String>,

    #[serde(default)]
    pub body: Vec<RichTextBlock>,
}
