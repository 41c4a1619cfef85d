//! Generator module - renders listing and post pages from CMS content

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use tera::Context;

use crate::content::{
    count_words, estimate_read_minutes_at, to_plain_text, LoadOutcome, Paginator, PostDetail,
    PostSummary,
};
use crate::helpers::{
    date_xml, format_publication_date, full_url_for, listing_path, meta_generator, post_path,
    squash_whitespace, truncate, url_for,
};
use crate::source::ContentSource;
use crate::templates::{
    BlockData, CommentsData, PaginationData, PostCardData, PostPageData, SiteData,
    TemplateRenderer,
};
use crate::Blog;

/// Longest meta description derived from post content
const DESCRIPTION_LENGTH: usize = 160;

/// What a generation run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    pub listing_pages: usize,
    pub posts_written: usize,
    pub posts_skipped: usize,
}

/// Static site generator over a content source
pub struct Generator<'a, S> {
    blog: &'a Blog,
    source: &'a S,
    renderer: TemplateRenderer,
}

impl<'a, S: ContentSource> Generator<'a, S> {
    /// Create a new generator
    pub fn new(blog: &'a Blog, source: &'a S) -> Result<Self> {
        Ok(Self {
            blog,
            source,
            renderer: TemplateRenderer::new()?,
        })
    }

    /// Generate the entire site
    pub async fn generate(&self) -> Result<GenerateReport> {
        fs::create_dir_all(&self.blog.public_dir)?;

        let site_data = self.build_site_data();

        let (listing_pages, posts) = self.generate_index_pages(&site_data).await?;
        let (posts_written, posts_skipped) = self.generate_post_pages(&site_data, &posts).await?;

        Ok(GenerateReport {
            listing_pages,
            posts_written,
            posts_skipped,
        })
    }

    /// Build site data for templates
    fn build_site_data(&self) -> SiteData {
        let config = &self.blog.config;
        SiteData {
            title: config.title.clone(),
            description: config.description.clone(),
            language: config.language.clone(),
            root: url_for(config, ""),
            generator: meta_generator(),
        }
    }

    /// Generate listing pages.
    ///
    /// Page N holds everything the reader would see after pressing
    /// "load more" N-1 times, and links to page N+1 while more remain.
    /// Returns the page count and every listed post.
    async fn generate_index_pages(
        &self,
        site_data: &SiteData,
    ) -> Result<(usize, Vec<PostSummary>)> {
        let config = &self.blog.config;
        let first = self.source.query_posts(config.cms.page_size, None).await?;
        let paginator = Paginator::new(self.source, first);

        let mut page_num = 1;
        let mut stalled = false;
        loop {
            let view = paginator.view();
            let page_posts: Vec<PostCardData> =
                view.posts.iter().map(|p| self.post_card(p)).collect();

            let pagination = PaginationData {
                current: page_num,
                has_more: view.has_more,
                next_link: if view.has_more {
                    url_for(config, &listing_path(page_num + 1))
                } else {
                    String::new()
                },
            };

            let mut context = Context::new();
            context.insert("site", site_data);
            context.insert("page_posts", &page_posts);
            context.insert("pagination", &pagination);

            let html = self.renderer.render("index.html", &context)?;
            let output_path = self
                .blog
                .public_dir
                .join(listing_path(page_num))
                .join("index.html");
            write_page(&output_path, &html)?;

            if !view.has_more {
                break;
            }
            if stalled {
                tracing::warn!("CMS keeps returning empty pages, stopping at page {}", page_num);
                break;
            }

            let outcome = paginator.load_more().await?;
            stalled = outcome == LoadOutcome::Loaded { appended: 0 };
            page_num += 1;
        }

        let posts = paginator.posts().to_vec();
        tracing::info!("Generated {} listing pages ({} posts)", page_num, posts.len());
        Ok((page_num, posts))
    }

    /// Generate individual post pages. Returns (written, skipped).
    async fn generate_post_pages(
        &self,
        site_data: &SiteData,
        posts: &[PostSummary],
    ) -> Result<(usize, usize)> {
        let comments = self.comments_data();
        let mut written = 0;
        let mut skipped = 0;

        for summary in posts {
            let uid = summary.uid.as_str();
            if !is_safe_uid(uid) {
                tracing::warn!("Skipping post with unusable uid {:?}", uid);
                skipped += 1;
                continue;
            }

            let post = match self.source.get_post_by_uid(uid).await {
                Ok(post) => post,
                Err(e) => {
                    tracing::warn!("Failed to load post {:?}: {}", uid, e);
                    skipped += 1;
                    continue;
                }
            };

            let mut context = Context::new();
            context.insert("site", site_data);
            context.insert("post", &self.post_page(&post));
            context.insert("comments", &comments);

            let html = self.renderer.render("post.html", &context)?;
            let output_path = self
                .blog
                .public_dir
                .join("post")
                .join(uid)
                .join("index.html");
            write_page(&output_path, &html)?;
            written += 1;
        }

        tracing::info!("Generated {} post pages", written);
        Ok((written, skipped))
    }

    fn post_card(&self, post: &PostSummary) -> PostCardData {
        let config = &self.blog.config;
        PostCardData {
            uid: post.uid.clone(),
            path: url_for(config, &post_path(&post.uid)),
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            date: format_publication_date(post.publication_date.as_ref(), &config.language),
            date_xml: post
                .publication_date
                .as_ref()
                .map(date_xml)
                .unwrap_or_default(),
        }
    }

    fn post_page(&self, post: &PostDetail) -> PostPageData {
        let config = &self.blog.config;

        let plain: Vec<String> = post
            .content
            .iter()
            .flat_map(|block| block.body.iter())
            .map(|fragment| to_plain_text(&fragment.text))
            .collect();
        let description = truncate(
            &squash_whitespace(&plain.join(" ")),
            DESCRIPTION_LENGTH,
            None,
        );

        PostPageData {
            uid: post.uid.clone(),
            permalink: full_url_for(config, &post_path(&post.uid)),
            title: post.title.clone(),
            description,
            banner_url: post.banner.url.clone(),
            author: post.author.clone(),
            date: format_publication_date(post.publication_date.as_ref(), &config.language),
            date_xml: post
                .publication_date
                .as_ref()
                .map(date_xml)
                .unwrap_or_default(),
            reading_minutes: estimate_read_minutes_at(
                &post.content,
                config.reading.words_per_minute,
            ),
            word_count: count_words(&post.content),
            blocks: post
                .content
                .iter()
                .map(|block| BlockData {
                    heading: block.heading.clone(),
                    paragraphs: block.body.iter().map(|f| f.text.clone()).collect(),
                })
                .collect(),
        }
    }

    fn comments_data(&self) -> Option<CommentsData> {
        let comments = &self.blog.config.comments;
        comments.repo.as_ref().map(|repo| CommentsData {
            repo: repo.clone(),
            issue_term: comments.issue_term.clone(),
            label: comments.label.clone(),
            theme: comments.theme.clone(),
        })
    }
}

/// A uid must map to exactly one directory below `post/`
fn is_safe_uid(uid: &str) -> bool {
    !uid.is_empty()
        && uid != "."
        && uid != ".."
        && !uid.contains(['/', '\\'])
        && PathBuf::from(uid).components().count() == 1
}

fn write_page(output_path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
    }
    fs::write(output_path, html)
        .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
    tracing::debug!("Generated: {:?}", output_path);
    Ok(())
}
