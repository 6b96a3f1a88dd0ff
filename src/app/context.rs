use std::sync::Arc;

use crate::app::error::{BlogError, Result};
use crate::blog::BlogService;
use crate::config::Config;
use crate::domain::SearchHit;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::Fetcher;

pub struct AppContext {
    pub config: Config,
    pub blog: Arc<BlogService>,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.scraper.user_agent).map_err(|e| {
            BlogError::Configuration(format!("Failed to build HTTP client: {}", e))
        })?;

        Self::with_fetcher(config, Arc::new(fetcher))
    }

    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher + Send + Sync>) -> Result<Self> {
        if !config.is_feed_configured() {
            tracing::warn!("RSS_FEED_URL is not set; feed tools will fail until it is");
        }

        let blog = BlogService::new(config.feed.clone(), config.scraper.clone(), fetcher)?;

        Ok(Self {
            config,
            blog: Arc::new(blog),
        })
    }

    /// Full-text search, concurrent when `search.workers` allows more than one fetch.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        match self.config.search.workers {
            0 | 1 => self.blog.search(query).await,
            workers => self.blog.search_concurrent(query, workers).await,
        }
    }
}
