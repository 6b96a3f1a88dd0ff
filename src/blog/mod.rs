//! The blog-reading operations.
//!
//! Every call starts from scratch: the feed is fetched and parsed again, and
//! post pages are fetched on demand. Nothing is cached between calls.

mod search;

pub use search::{snippet_for, SNIPPET_RADIUS};

use std::sync::Arc;

use crate::app::{BlogError, Result};
use crate::config::FeedConfig;
use crate::domain::{FeedMetadata, PostContent, PostRecord};
use crate::fetcher::Fetcher;
use crate::normalizer::{Normalizer, ParsedFeed};
use crate::scraper::{PostFetcher, ScraperConfig};

pub const DEFAULT_RECENT_COUNT: i64 = 5;

pub struct BlogService {
    feed: FeedConfig,
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    normalizer: Normalizer,
    posts: PostFetcher,
}

impl BlogService {
    pub fn new(
        feed: FeedConfig,
        scraper: ScraperConfig,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
    ) -> Result<Self> {
        let posts = PostFetcher::new(fetcher.clone(), scraper)?;

        Ok(Self {
            feed,
            fetcher,
            normalizer: Normalizer::new(),
            posts,
        })
    }

    pub fn is_feed_configured(&self) -> bool {
        self.feed.is_configured()
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.is_feed_configured() {
            Ok(())
        } else {
            Err(BlogError::Configuration(
                "RSS_FEED_URL is not set. Set the RSS_FEED_URL environment variable or feed.url in the config file."
                    .into(),
            ))
        }
    }

    async fn fetch_feed(&self) -> Result<ParsedFeed> {
        self.ensure_configured()?;
        let url = self.feed.url.trim();

        let page = self
            .fetcher
            .fetch(url, self.feed.timeout())
            .await
            .map_err(|e| {
                tracing::error!("Error fetching RSS feed {}: {}", url, e);
                BlogError::feed(url, e)
            })?;

        self.normalizer.parse(&page.body).map_err(|e| {
            tracing::error!("Error parsing RSS feed {}: {}", url, e);
            BlogError::feed(url, e)
        })
    }

    /// All well-formed posts, in feed order.
    pub async fn list_posts(&self) -> Result<Vec<PostRecord>> {
        tracing::info!("Fetching posts from RSS feed: {}", self.feed.url);

        let feed = self.fetch_feed().await?;
        if feed.entries.is_empty() {
            tracing::info!("No entries found in RSS feed: {}", self.feed.url);
            return Ok(Vec::new());
        }

        let posts = feed
            .entries
            .iter()
            .filter_map(|entry| {
                let post = self.normalizer.normalize(entry);
                if post.is_listable() {
                    Some(post)
                } else {
                    tracing::debug!(
                        "Skipping malformed entry (missing title or link): {:?}",
                        post
                    );
                    None
                }
            })
            .collect();

        Ok(posts)
    }

    /// The last `count` posts of the feed, newest first.
    ///
    /// Assumes the feed appends new posts at the end. Feeds that list newest
    /// first come out oldest first.
    pub async fn recent_posts(&self, count: i64) -> Result<Vec<PostRecord>> {
        let count = usize::try_from(count.max(1)).unwrap_or(usize::MAX);
        let posts = self.list_posts().await?;

        Ok(posts.into_iter().rev().take(count).collect())
    }

    /// Feed-level title, subtitle and link.
    pub async fn feed_info(&self) -> Result<FeedMetadata> {
        let feed = self.fetch_feed().await?;
        Ok(self.normalizer.feed_metadata(&feed.header))
    }

    pub async fn fetch_post(&self, url: &str) -> Result<PostContent> {
        self.posts.fetch_post(url).await
    }
}
