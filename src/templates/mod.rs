//! Built-in blog templates using Tera template engine
//!
//! All templates are embedded directly in the binary. HTML autoescaping is
//! on; pre-rendered rich text is passed through with `| safe`.

use serde::Serialize;
use tera::{Context, Tera};

use crate::config::{MessagesConfig, SiteConfig};
use crate::content::{render_html, PostSummary};
use crate::error::Result;
use crate::helpers::{date_xml, format_date, month_names, post_url, url_for};
use crate::pages::DetailPage;

/// Template renderer with the embedded blog theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("blog/layout.html")),
            ("index.html", include_str!("blog/index.html")),
            ("post.html", include_str!("blog/post.html")),
            ("loading.html", include_str!("blog/loading.html")),
            ("404.html", include_str!("blog/404.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("blog/partials/header.html"),
            ),
            (
                "partials/post_item.html",
                include_str!("blog/partials/post_item.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub language: String,
    pub root: String,
    pub version: &'static str,
}

impl SiteData {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            language: config.language.clone(),
            root: url_for(&config.root, ""),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostItemData {
    pub uid: String,
    pub path: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: Option<String>,
    pub datetime: Option<String>,
}

impl PostItemData {
    pub fn new(post: &PostSummary, dates: &DateStyle) -> Self {
        Self {
            uid: post.uid.clone(),
            path: post_url(&dates.root, &post.uid),
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            date: post.first_publication_date.as_ref().map(|d| dates.format(d)),
            datetime: post.first_publication_date.as_ref().map(date_xml),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostPageData {
    pub uid: String,
    pub title: String,
    pub banner_url: String,
    pub author: String,
    pub date: Option<String>,
    pub datetime: Option<String>,
    pub reading_time: usize,
    pub sections: Vec<SectionData>,
}

impl PostPageData {
    pub fn new(page: &DetailPage, dates: &DateStyle) -> Self {
        let post = &page.post;
        Self {
            uid: page.uid.clone(),
            title: post.title.clone(),
            banner_url: post.banner_url.clone(),
            author: post.author.clone(),
            date: post.first_publication_date.as_ref().map(|d| dates.format(d)),
            datetime: post.first_publication_date.as_ref().map(date_xml),
            reading_time: page.reading_time,
            sections: post
                .content
                .iter()
                .map(|block| SectionData {
                    heading: block.heading.clone(),
                    body: render_html(&block.body),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionData {
    pub heading: String,
    /// Rendered HTML
    pub body: String,
}

/// Settings the list page script needs to append entries on its own
#[derive(Debug, Clone, Serialize)]
pub struct ListScriptData {
    pub api_url: String,
    /// Prefix of post URLs, ending in `/`
    pub post_root: String,
    pub date_format: String,
    pub timezone: String,
    pub months: Vec<&'static str>,
    pub months_full: Vec<&'static str>,
}

impl ListScriptData {
    pub fn new(config: &SiteConfig, dates: &DateStyle) -> Self {
        let (full, short) = month_names(&dates.language);
        Self {
            api_url: url_for(&config.root, "api/posts"),
            post_root: url_for(&config.root, "post/"),
            date_format: dates.format.clone(),
            timezone: dates.tz.name().to_string(),
            months: short.to_vec(),
            months_full: full.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessagesData {
    pub load_more: String,
    pub loading: String,
    pub load_error: String,
    pub not_found: String,
}

impl From<&MessagesConfig> for MessagesData {
    fn from(messages: &MessagesConfig) -> Self {
        Self {
            load_more: messages.load_more.clone(),
            loading: messages.loading.clone(),
            load_error: messages.load_error.clone(),
            not_found: messages.not_found.clone(),
        }
    }
}

/// Fixed date presentation: timezone, format and month-name language
#[derive(Debug, Clone)]
pub struct DateStyle {
    pub tz: chrono_tz::Tz,
    pub format: String,
    pub language: String,
    pub root: String,
}

impl DateStyle {
    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        Ok(Self {
            tz: config.tz()?,
            format: config.date_format.clone(),
            language: config.language.clone(),
            root: config.root.clone(),
        })
    }

    pub fn format(&self, date: &chrono::DateTime<chrono::FixedOffset>) -> String {
        format_date(date, self.tz, &self.format, &self.language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_templates_parse() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &SiteData::from_config(&SiteConfig::default()));
        context.insert("messages", &MessagesData::from(&MessagesConfig::default()));
        let html = renderer.render("404.html", &context).unwrap();
        assert!(html.contains("<h1>404</h1>"));
        assert!(html.contains("Post não encontrado"));

        let html = renderer.render("loading.html", &context).unwrap();
        assert!(html.contains("Carregando..."));
        assert!(html.contains(r#"http-equiv="refresh""#));
    }

    #[test]
    fn test_post_item_escapes_fields() {
        let renderer = TemplateRenderer::new().unwrap();
        let dates = DateStyle::from_config(&SiteConfig::default()).unwrap();
        let post = PostSummary {
            uid: "tags".to_string(),
            first_publication_date: None,
            title: "<script>".to_string(),
            subtitle: "A & B".to_string(),
            author: "Ana".to_string(),
        };
        let mut context = Context::new();
        context.insert("post", &PostItemData::new(&post, &dates));
        let html = renderer.render("partials/post_item.html", &context).unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("A &amp; B"));
        assert!(!html.contains("<time"));
    }
}
