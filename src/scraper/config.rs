use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::fetcher::http_fetcher::DEFAULT_USER_AGENT;

/// Configuration for fetching and extracting post pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Page request timeout in seconds (default: 10)
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,

    /// CSS selector of the primary content region (default: "article")
    pub content_selector: String,

    /// Elements whose text is never part of the extracted content
    pub skip_tags: Vec<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            content_selector: "article".to_string(),
            skip_tags: vec![
                "script".to_string(),
                "style".to_string(),
                "noscript".to_string(),
                "template".to_string(),
            ],
        }
    }
}

impl ScraperConfig {
    /// Get the page request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
