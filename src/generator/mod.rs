//! Generator module - renders pages with the built-in Tera templates and
//! writes them to the public directory

use anyhow::Result as AnyResult;
use futures::stream::{self, StreamExt};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tera::Context;

use crate::content::{ContentSource, PostSummary};
use crate::error::{BlogError, Result};
use crate::pages::{known_uids, DetailPage, ListPage};
use crate::templates::{
    DateStyle, ListScriptData, MessagesData, PostItemData, PostPageData, SiteData,
    TemplateRenderer,
};
use crate::Blog;

/// Post pages built at the same time
const GENERATE_CONCURRENCY: usize = 8;

/// What a full generation produced
#[derive(Debug, Clone, Default)]
pub struct GenerateReport {
    pub index_posts: usize,
    pub post_pages: usize,
    /// `(uid, error)` for every post page that could not be built
    pub failures: Vec<(String, String)>,
}

/// Static site generator using Tera templates
pub struct Generator {
    blog: Blog,
    source: Arc<dyn ContentSource>,
    renderer: TemplateRenderer,
    dates: DateStyle,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog, source: Arc<dyn ContentSource>) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            source,
            renderer: TemplateRenderer::new()?,
            dates: DateStyle::from_config(&blog.config)?,
        })
    }

    pub fn source(&self) -> &dyn ContentSource {
        self.source.as_ref()
    }

    /// Generate the list page, every known post page and the 404 page.
    ///
    /// A failing post page does not stop the others, but the whole run is
    /// reported as failed.
    pub async fn generate(&self) -> AnyResult<GenerateReport> {
        fs::create_dir_all(&self.blog.public_dir)?;

        let list = self.generate_index().await?;
        self.generate_not_found()?;

        let uids = known_uids(self.source(), &self.blog.config.cms.document_type).await?;
        tracing::info!("Found {} posts", uids.len());

        let results: Vec<(String, Result<PathBuf>)> = stream::iter(uids)
            .map(|uid| async move {
                let result = self.generate_post(&uid).await;
                (uid, result)
            })
            .buffer_unordered(GENERATE_CONCURRENCY)
            .collect()
            .await;

        let mut report = GenerateReport {
            index_posts: list.posts().len(),
            ..GenerateReport::default()
        };
        for (uid, result) in results {
            match result {
                Ok(_) => report.post_pages += 1,
                Err(e) => {
                    tracing::error!("Failed to generate post {}: {}", uid, e);
                    report.failures.push((uid, e.to_string()));
                }
            }
        }

        if !report.failures.is_empty() {
            let failed: Vec<&str> = report.failures.iter().map(|(uid, _)| uid.as_str()).collect();
            anyhow::bail!(
                "{} of {} post pages failed: {}",
                report.failures.len(),
                report.failures.len() + report.post_pages,
                failed.join(", ")
            );
        }

        Ok(report)
    }

    /// Build and write `index.html`
    pub async fn generate_index(&self) -> Result<ListPage> {
        let cms = &self.blog.config.cms;
        let list = ListPage::build(self.source(), &cms.document_type, cms.page_size).await?;
        let html = self.render_index(&list)?;
        write_page(&self.index_path(), &html)?;
        Ok(list)
    }

    /// Build and write `post/{uid}/index.html`. Nothing is written on error.
    pub async fn generate_post(&self, uid: &str) -> Result<PathBuf> {
        let config = &self.blog.config;
        let page = DetailPage::build(
            self.source(),
            &config.cms.document_type,
            uid,
            config.reading.words_per_minute,
        )
        .await?;
        let html = self.render_post(&page)?;
        let path = self.post_path(uid);
        write_page(&path, &html)?;
        Ok(path)
    }

    /// Write `404.html`
    pub fn generate_not_found(&self) -> Result<PathBuf> {
        let path = self.blog.public_dir.join("404.html");
        write_page(&path, &self.render_not_found()?)?;
        Ok(path)
    }

    pub fn index_path(&self) -> PathBuf {
        self.blog.public_dir.join("index.html")
    }

    pub fn post_path(&self, uid: &str) -> PathBuf {
        self.blog.public_dir.join("post").join(uid).join("index.html")
    }

    pub fn render_index(&self, list: &ListPage) -> Result<String> {
        let posts: Vec<PostItemData> = list
            .posts()
            .iter()
            .map(|post| PostItemData::new(post, &self.dates))
            .collect();

        let mut context = self.base_context();
        context.insert("posts", &posts);
        context.insert("next_page", &list.next_page());
        context.insert("script", &ListScriptData::new(&self.blog.config, &self.dates));
        self.renderer.render("index.html", &context)
    }

    /// One rendered list entry per post, for appending on the client
    pub fn render_post_items(&self, posts: &[PostSummary]) -> Result<Vec<String>> {
        posts
            .iter()
            .map(|post| {
                let mut context = Context::new();
                context.insert("post", &PostItemData::new(post, &self.dates));
                self.renderer.render("partials/post_item.html", &context)
            })
            .collect()
    }

    pub fn render_post(&self, page: &DetailPage) -> Result<String> {
        let mut context = self.base_context();
        context.insert("post", &PostPageData::new(page, &self.dates));
        self.renderer.render("post.html", &context)
    }

    pub fn render_loading(&self) -> Result<String> {
        self.renderer.render("loading.html", &self.base_context())
    }

    pub fn render_not_found(&self) -> Result<String> {
        self.renderer.render("404.html", &self.base_context())
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &SiteData::from_config(&self.blog.config));
        context.insert("messages", &MessagesData::from(&self.blog.config.messages));
        context
    }
}

/// Write through a temporary file so readers never see a partial page
fn write_page(path: &Path, html: &str) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| BlogError::Config(format!("Invalid output path {:?}", path)))?;
    fs::create_dir_all(parent)?;

    let tmp = path.with_extension("html.tmp");
    fs::write(&tmp, html)?;
    fs::rename(&tmp, path)?;
    tracing::debug!("Generated: {:?}", path);
    Ok(())
}
