//! Structured rich text: HTML rendering and word counting
//!
//! Body fields arrive as a list of blocks (`paragraph`, `heading2`,
//! `list-item`, `image`, ...), each carrying plain `text` plus inline
//! `spans` that mark character ranges as bold, italic, links and so on.
//! Span offsets count characters of `text`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::helpers::{html_escape, image_tag, link_open, text_with_breaks};

fn default_kind() -> String {
    "paragraph".to_string()
}

/// One block of structured text, kept opaque apart from what rendering needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextBlock {
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default)]
    pub spans: Vec<Span>,

    /// Block-specific payload (`url`, `alt`, `oembed`, `dimensions`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RichTextBlock {
    /// A plain paragraph
    pub fn paragraph(text: &str) -> Self {
        Self {
            kind: default_kind(),
            text: Some(text.to_string()),
            spans: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Number of whitespace-delimited words in the block text
    pub fn word_count(&self) -> usize {
        self.text.as_deref().map(count_words).unwrap_or(0)
    }

    fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}

/// Inline formatting over a character range of a block's text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Span {
    fn open_tag(&self) -> String {
        match self.kind.as_str() {
            "strong" => "<strong>".to_string(),
            "em" => "<em>".to_string(),
            "hyperlink" => {
                let data = self.data.as_ref();
                let url = data
                    .and_then(|d| d.get("url"))
                    .and_then(Value::as_str)
                    .unwrap_or("#");
                let target = data.and_then(|d| d.get("target")).and_then(Value::as_str);
                link_open(url, target)
            }
            "label" => {
                let label = self
                    .data
                    .as_ref()
                    .and_then(|d| d.get("label"))
                    .and_then(Value::as_str)
                    .unwrap_or("");
                format!(r#"<span class="{}">"#, html_escape(label))
            }
            _ => "<span>".to_string(),
        }
    }

    fn close_tag(&self) -> &'static str {
        match self.kind.as_str() {
            "strong" => "</strong>",
            "em" => "</em>",
            "hyperlink" => "</a>",
            _ => "</span>",
        }
    }
}

/// Count whitespace-delimited tokens
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Render a sequence of blocks to HTML
///
/// Consecutive `list-item` blocks share one `<ul>`, consecutive
/// `o-list-item` blocks one `<ol>`. Unknown block types render nothing.
pub fn render_html(blocks: &[RichTextBlock]) -> String {
    let mut html = String::new();
    let mut open_list: Option<&'static str> = None;

    for block in blocks {
        let list_tag = match block.kind.as_str() {
            "list-item" => Some("ul"),
            "o-list-item" => Some("ol"),
            _ => None,
        };

        if open_list != list_tag {
            if let Some(tag) = open_list {
                html.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list_tag {
                html.push_str(&format!("<{}>", tag));
            }
            open_list = list_tag;
        }

        html.push_str(&render_block(block));
    }

    if let Some(tag) = open_list {
        html.push_str(&format!("</{}>", tag));
    }

    html
}

fn render_block(block: &RichTextBlock) -> String {
    let inner = || render_inline(block.text.as_deref().unwrap_or(""), &block.spans);

    match block.kind.as_str() {
        "paragraph" => format!("<p>{}</p>", inner()),
        "preformatted" => format!("<pre>{}</pre>", inner()),
        "list-item" | "o-list-item" => format!("<li>{}</li>", inner()),
        "heading1" | "heading2" | "heading3" | "heading4" | "heading5" | "heading6" => {
            let level = &block.kind["heading".len()..];
            format!("<h{level}>{}</h{level}>", inner())
        }
        "image" => match block.extra_str("url") {
            Some(url) => format!(
                r#"<p class="block-img">{}</p>"#,
                image_tag(url, block.extra_str("alt"))
            ),
            None => String::new(),
        },
        "embed" => {
            let oembed = block.extra.get("oembed");
            let field = |key: &str| {
                oembed
                    .and_then(|o| o.get(key))
                    .and_then(Value::as_str)
                    .unwrap_or("")
            };
            format!(
                r#"<div data-oembed="{}" data-oembed-type="{}" data-oembed-provider="{}">{}</div>"#,
                html_escape(field("embed_url")),
                html_escape(field("type")),
                html_escape(field("provider_name")),
                field("html")
            )
        }
        other => {
            tracing::debug!("Skipping unsupported rich text block type: {}", other);
            String::new()
        }
    }
}

/// Render text with its inline spans; overlapping spans are closed and
/// reopened so the output stays well nested.
fn render_inline(text: &str, spans: &[Span]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    let spans: Vec<&Span> = spans
        .iter()
        .filter(|s| s.start < s.end && s.end <= len)
        .collect();

    if spans.is_empty() {
        return text_with_breaks(text);
    }

    let mut boundaries: Vec<usize> = vec![0, len];
    for span in &spans {
        boundaries.push(span.start);
        boundaries.push(span.end);
    }
    boundaries.sort_unstable();
    boundaries.dedup();

    let mut html = String::new();
    let mut stack: Vec<&Span> = Vec::new();

    for window in boundaries.windows(2) {
        let (at, next) = (window[0], window[1]);

        if let Some(lowest) = stack.iter().position(|s| s.end <= at) {
            let popped: Vec<&Span> = stack.drain(lowest..).collect();
            for span in popped.iter().rev() {
                html.push_str(span.close_tag());
            }
            for span in popped.into_iter().filter(|s| s.end > at) {
                html.push_str(&span.open_tag());
                stack.push(span);
            }
        }

        let mut starting: Vec<&Span> = spans.iter().copied().filter(|s| s.start == at).collect();
        starting.sort_by(|a, b| b.end.cmp(&a.end));
        for span in starting {
            html.push_str(&span.open_tag());
            stack.push(span);
        }

        let segment: String = chars[at..next].iter().collect();
        html.push_str(&text_with_breaks(&segment));
    }

    for span in stack.iter().rev() {
        html.push_str(span.close_tag());
    }

    html
}
