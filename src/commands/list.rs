//! List posts from the content backend

use anyhow::Result;

use crate::content::{ContentSource, PostSummary};
use crate::pages::{ListPage, LoadOutcome};
use crate::templates::DateStyle;
use crate::Blog;

/// Walk the post list page by page, like repeated "load more" clicks.
///
/// Stops after `max_pages` pages when given, otherwise when the backend
/// has no further cursor.
pub async fn collect(
    blog: &Blog,
    source: &dyn ContentSource,
    max_pages: Option<usize>,
) -> Result<ListPage> {
    let cms = &blog.config.cms;
    let mut list = ListPage::build(source, &cms.document_type, cms.page_size).await?;
    let mut pages = 1;

    while list.has_more() && max_pages.map_or(true, |max| pages < max) {
        match list.load_more(source).await? {
            LoadOutcome::Appended { skipped, .. } => {
                if skipped > 0 {
                    tracing::info!("Skipped {} duplicate posts on page {}", skipped, pages + 1);
                }
                pages += 1;
            }
            LoadOutcome::Exhausted | LoadOutcome::InFlight => break,
        }
    }

    Ok(list)
}

/// Print the post list
pub async fn run(blog: &Blog, max_pages: Option<usize>) -> Result<()> {
    let source = blog.content_source()?;
    let list = collect(blog, source.as_ref(), max_pages).await?;
    let dates = DateStyle::from_config(&blog.config)?;

    println!("Posts ({}):", list.posts().len());
    for post in list.posts() {
        println!("  {}", describe(post, &dates));
    }
    if let Some(cursor) = list.next_page() {
        println!("More posts available: {}", cursor);
    }

    Ok(())
}

fn describe(post: &PostSummary, dates: &DateStyle) -> String {
    let date = post
        .first_publication_date
        .as_ref()
        .map(|d| dates.format(d))
        .unwrap_or_else(|| "unpublished".to_string());
    format!("{} - {} by {} [{}]", date, post.title, post.author, post.uid)
}
