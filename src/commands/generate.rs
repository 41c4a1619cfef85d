//! Generate static files

use anyhow::{Context, Result};

use crate::generator::Generator;
use crate::Blog;

/// Fetch every post from the CMS and render the site
pub async fn run(blog: &Blog) -> Result<()> {
    let start = std::time::Instant::now();

    let client = blog
        .connect()
        .await
        .with_context(|| format!("Failed to connect to {}", blog.config.cms.endpoint))?;

    let generator = Generator::new(blog, &client)?;
    let report = generator.generate().await?;

    if report.posts_skipped > 0 {
        tracing::warn!("{} posts could not be rendered", report.posts_skipped);
    }

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} listing pages and {} posts in {:.2}s",
        report.listing_pages,
        report.posts_written,
        duration.as_secs_f64()
    );

    Ok(())
}
