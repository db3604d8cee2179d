//! Post models and the projections from raw backend records

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::record::RawRecord;
use super::richtext::{count_words, RichTextBlock};
use crate::error::{BlogError, Result};
use crate::helpers::parse_cms_date;

/// Entry of the post list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    /// Backend-assigned slug, unique per list session
    pub uid: String,

    pub first_publication_date: Option<DateTime<FixedOffset>>,

    pub title: String,

    pub subtitle: String,

    pub author: String,
}

impl PostSummary {
    /// Narrow a raw record to the list fields
    pub fn project(record: &RawRecord) -> Result<Self> {
        let data = &record.data;
        Ok(Self {
            uid: required(record, record.uid.as_ref(), "uid")?,
            first_publication_date: publication_date(record)?,
            title: required(record, data.title.as_ref(), "title")?,
            subtitle: required(record, data.subtitle.as_ref(), "subtitle")?,
            author: required(record, data.author.as_ref(), "author")?,
        })
    }
}

/// A full post as shown on its own page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    pub first_publication_date: Option<DateTime<FixedOffset>>,

    pub title: String,

    /// Empty when the post has no banner image
    pub banner_url: String,

    pub author: String,

    /// In backend order
    pub content: Vec<ContentBlock>,
}

impl PostDetail {
    /// Narrow a raw record to the detail fields
    pub fn project(record: &RawRecord) -> Result<Self> {
        let data = &record.data;
        let raw_content = data
            .content
            .as_ref()
            .ok_or_else(|| missing(record, "content"))?;

        Ok(Self {
            first_publication_date: publication_date(record)?,
            title: required(record, data.title.as_ref(), "title")?,
            banner_url: data
                .banner
                .as_ref()
                .and_then(|banner| banner.url.clone())
                .unwrap_or_default(),
            author: required(record, data.author.as_ref(), "author")?,
            content: raw_content
                .iter()
                .map(|block| ContentBlock {
                    heading: block.heading.clone().unwrap_or_default(),
                    body: block.body.clone(),
                })
                .collect(),
        })
    }

    pub fn has_banner(&self) -> bool {
        !self.banner_url.is_empty()
    }

    /// Total words over every heading and body block
    pub fn word_count(&self) -> usize {
        super::reading::word_count(&self.content)
    }
}

/// One section of a post: a heading followed by rich text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub heading: String,
    pub body: Vec<RichTextBlock>,
}

impl ContentBlock {
    pub fn word_count(&self) -> usize {
        count_words(&self.heading) + self.body.iter().map(RichTextBlock::word_count).sum::<usize>()
    }
}

fn missing(record: &RawRecord, field: &'static str) -> BlogError {
    BlogError::Projection {
        record: record.label(),
        field,
    }
}

fn required(record: &RawRecord, value: Option<&String>, field: &'static str) -> Result<String> {
    value.cloned().ok_or_else(|| missing(record, field))
}

fn publication_date(record: &RawRecord) -> Result<Option<DateTime<FixedOffset>>> {
    match record.first_publication_date.as_deref() {
        None => Ok(None),
        Some(raw) => parse_cms_date(raw)
            .map(Some)
            .ok_or_else(|| missing(record, "first_publication_date")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawRecord {
        serde_json::from_value(value).unwrap()
    }

    fn full_record() -> RawRecord {
        record(json!({
            "id": "YH1",
            "uid": "como-utilizar-hooks",
            "type": "posts",
            "first_publication_date": "2021-04-19T19:25:28+0000",
            "data": {
                "title": "Como utilizar Hooks",
                "subtitle": "Pensando em sincronização",
                "author": "Joseph Oliveira",
                "banner": {"url": "https://images.prismic.io/banner.png"},
                "content": [
                    {"heading": "Intro", "body": [{"type": "paragraph", "text": "hello world", "spans": []}]},
                    {"heading": "Second part", "body": [{"type": "paragraph", "text": "more", "spans": []}]}
                ]
            }
        }))
    }

    #[test]
    fn test_summary_projection_keeps_uid_and_fields() {
        let raw = full_record();
        let summary = PostSummary::project(&raw).unwrap();
        assert_eq!(summary.uid, "como-utilizar-hooks");
        assert_eq!(summary.title, "Como utilizar Hooks");
        assert_eq!(summary.subtitle, "Pensando em sincronização");
        assert_eq!(summary.author, "Joseph Oliveira");
        assert_eq!(
            summary.first_publication_date.unwrap().to_rfc3339(),
            "2021-04-19T19:25:28+00:00"
        );
    }

    #[test]
    fn test_summary_projection_reports_missing_field() {
        let mut raw = full_record();
        raw.data.subtitle = None;
        match PostSummary::project(&raw) {
            Err(BlogError::Projection { record, field }) => {
                assert_eq!(record, "como-utilizar-hooks");
                assert_eq!(field, "subtitle");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let mut raw = full_record();
        raw.uid = None;
        assert!(matches!(
            PostSummary::project(&raw),
            Err(BlogError::Projection { field: "uid", .. })
        ));
    }

    #[test]
    fn test_null_publication_date_is_allowed() {
        let mut raw = full_record();
        raw.first_publication_date = None;
        assert_eq!(PostSummary::project(&raw).unwrap().first_publication_date, None);

        raw.first_publication_date = Some("yesterday".to_string());
        assert!(PostSummary::project(&raw).is_err());
    }

    #[test]
    fn test_detail_projection() {
        let detail = PostDetail::project(&full_record()).unwrap();
        assert_eq!(detail.title, "Como utilizar Hooks");
        assert_eq!(detail.banner_url, "https://images.prismic.io/banner.png");
        assert!(detail.has_banner());
        let headings: Vec<_> = detail.content.iter().map(|b| b.heading.as_str()).collect();
        assert_eq!(headings, vec!["Intro", "Second part"]);
    }

    #[test]
    fn test_detail_without_banner_has_empty_url() {
        let mut raw = full_record();
        raw.data.banner = None;
        assert_eq!(PostDetail::project(&raw).unwrap().banner_url, "");

        let raw = record(json!({
            "uid": "x",
            "data": {"title": "T", "author": "A", "banner": {}, "content": []}
        }));
        let detail = PostDetail::project(&raw).unwrap();
        assert_eq!(detail.banner_url, "");
        assert!(!detail.has_banner());
    }

    #[test]
    fn test_detail_requires_content() {
        let mut raw = full_record();
        raw.data.content = None;
        assert!(matches!(
            PostDetail::project(&raw),
            Err(BlogError::Projection { field: "content", .. })
        ));
    }

    #[test]
    fn test_projection_is_idempotent() {
        let raw = full_record();
        assert_eq!(
            PostSummary::project(&raw).unwrap(),
            PostSummary::project(&raw).unwrap()
        );
        assert_eq!(
            PostDetail::project(&raw).unwrap(),
            PostDetail::project(&raw).unwrap()
        );
    }

    #[test]
    fn test_word_count() {
        let detail = PostDetail::project(&full_record()).unwrap();
        // "Intro" + "hello world" + "Second part" + "more"
        assert_eq!(detail.word_count(), 6);
    }
}
