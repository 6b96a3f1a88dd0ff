pub mod http_fetcher;
pub mod parallel;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP status {status}")]
    Status { status: u16 },

    #[error("fetch task failed: {0}")]
    Task(String),
}

/// A response body together with the media type it was served as.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

impl Page {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    /// Charset parameter of the Content-Type header, if one was sent.
    pub fn charset(&self) -> Option<String> {
        let media_type: mime::Mime = self.content_type.as_deref()?.parse().ok()?;
        media_type
            .get_param(mime::CHARSET)
            .map(|charset| charset.as_str().to_string())
    }
}

#[async_trait]
pub trait Fetcher {
    /// GET `url`, failing on transport errors and non-success statuses.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Page, HttpError>;
}
