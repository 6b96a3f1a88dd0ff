//! Post page fetching and readable-text extraction.
//!
//! # Architecture
//!
//! ```text
//! post URL → Fetcher → HTML → ContentExtractor → PostContent
//! ```
//!
//! The primary content region (an `<article>` by default) wins when it has
//! text; otherwise the whole body is used.

mod config;
mod extractor;

pub use config::ScraperConfig;
pub use extractor::ContentExtractor;

use std::sync::Arc;

use encoding_rs::{Encoding, WINDOWS_1252};

use crate::app::{BlogError, FetchFailure, Result};
use crate::domain::PostContent;
use crate::fetcher::{Fetcher, Page};

pub struct PostFetcher {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    extractor: ContentExtractor,
    config: ScraperConfig,
}

impl PostFetcher {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, config: ScraperConfig) -> Result<Self> {
        let extractor = ContentExtractor::new(&config)?;

        Ok(Self {
            fetcher,
            extractor,
            config,
        })
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Fetch a post page and return its readable text.
    pub async fn fetch_post(&self, url: &str) -> Result<PostContent> {
        let url = url.trim();
        if url.is_empty() {
            return Err(BlogError::InvalidArgument(
                "Missing required parameter: slug (which should be the post's full URL)".into(),
            ));
        }

        tracing::info!("Fetching single post content via HTTP for: {}", url);

        let page = self
            .fetcher
            .fetch(url, self.config.timeout())
            .await
            .map_err(|e| {
                tracing::error!("Error fetching post HTML: {}", e);
                BlogError::fetch(url, e)
            })?;

        self.extract(url, &page)
    }

    /// Turn an already fetched page into post content.
    pub fn extract(&self, url: &str, page: &Page) -> Result<PostContent> {
        let html = decode(page).map_err(|e| {
            tracing::error!("Error decoding post HTML from {}: {}", url, e);
            BlogError::fetch(url, FetchFailure::Extract(e))
        })?;

        Ok(PostContent::new(url, self.extractor.extract(&html)))
    }
}

/// Page text in the charset the server declared.
///
/// Undeclared pages are read as UTF-8 when they are valid UTF-8 and as
/// windows-1252 (the superset of Latin-1) otherwise. A declared charset the
/// body does not match is an error.
fn decode(page: &Page) -> std::result::Result<String, String> {
    let declared = page
        .charset()
        .and_then(|label| Encoding::for_label(label.as_bytes()));

    match declared {
        Some(encoding) => {
            let (text, _, had_errors) = encoding.decode(&page.body);
            if had_errors {
                return Err(format!("page is not valid {}", encoding.name()));
            }
            Ok(text.into_owned())
        }
        None => match std::str::from_utf8(&page.body) {
            Ok(text) => Ok(text.to_string()),
            Err(_) => Ok(WINDOWS_1252.decode_without_bom_handling(&page.body).0.into_owned()),
        },
    }
}
