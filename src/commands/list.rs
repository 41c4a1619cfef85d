//! List posts from the CMS

use anyhow::Result;
use std::io::Write;

use crate::content::Paginator;
use crate::source::ContentSource;
use crate::Blog;

/// What to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// Post summaries, one page or all of them
    Posts { all: bool },
    /// Every post uid
    Uids,
}

impl ListKind {
    /// Parse the `list` argument
    pub fn parse(content_type: &str, all: bool) -> Result<Self> {
        match content_type {
            "post" | "posts" => Ok(ListKind::Posts { all }),
            "uid" | "uids" => Ok(ListKind::Uids),
            _ => anyhow::bail!("Unknown type: {}. Available: post, uid", content_type),
        }
    }
}

/// List CMS content to stdout
pub async fn run(blog: &Blog, kind: ListKind) -> Result<()> {
    let client = blog.connect().await?;
    let mut out = Vec::new();
    list(blog, &client, kind, &mut out).await?;
    std::io::stdout().write_all(&out)?;
    Ok(())
}

/// List content from `source` into `out`
pub async fn list<S: ContentSource, W: Write>(
    blog: &Blog,
    source: &S,
    kind: ListKind,
    out: &mut W,
) -> Result<()> {
    let page_size = blog.config.cms.page_size;

    match kind {
        ListKind::Posts { all } => {
            let first = source.query_posts(page_size, None).await?;
            let paginator = Paginator::new(source, first);
            if all {
                paginator.load_all().await?;
            }

            let view = paginator.view();
            writeln!(out, "Posts ({}):", view.posts.len())?;
            for post in &view.posts {
                let date = post
                    .publication_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "----------".to_string());
                writeln!(out, "  {} - {} [{}]", date, post.title, post.uid)?;
            }
            if view.has_more {
                writeln!(out, "  ... more posts available (use --all)")?;
            }
        }
        ListKind::Uids => {
            let uids = source.list_uids(page_size).await?;
            writeln!(out, "Uids ({}):", uids.len())?;
            for uid in uids {
                writeln!(out, "  {}", uid)?;
            }
        }
    }

    Ok(())
}
