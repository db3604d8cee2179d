//! Generate static files

use anyhow::Result;
use std::sync::Arc;

use crate::content::ContentSource;
use crate::generator::{GenerateReport, Generator};
use crate::Blog;

/// Generate the static site from the configured backend
pub async fn run(blog: &Blog) -> Result<GenerateReport> {
    run_with_source(blog, blog.content_source()?).await
}

/// Generate the static site from `source`
pub async fn run_with_source(blog: &Blog, source: Arc<dyn ContentSource>) -> Result<GenerateReport> {
    let start = std::time::Instant::now();

    let generator = Generator::new(blog, source)?;
    let report = generator.generate().await?;

    tracing::info!(
        "Generated index ({} posts) and {} post pages in {:.2}s",
        report.index_posts,
        report.post_pages,
        start.elapsed().as_secs_f64()
    );

    Ok(report)
}
