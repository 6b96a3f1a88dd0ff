use thiserror::Error;

use crate::fetcher::HttpError;

#[derive(Error, Debug)]
pub enum BlogError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to read feed {url}: {source}")]
    Feed {
        url: String,
        #[source]
        source: FeedFailure,
    },

    #[error("Failed to fetch post {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchFailure,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a feed could not be read at all.
#[derive(Error, Debug)]
pub enum FeedFailure {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("unparseable feed: {0}")]
    Parse(String),
}

/// Why a single post's content could not be produced.
#[derive(Error, Debug)]
pub enum FetchFailure {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("content extraction failed: {0}")]
    Extract(String),
}

impl BlogError {
    pub fn feed(url: &str, source: impl Into<FeedFailure>) -> Self {
        Self::Feed {
            url: url.to_string(),
            source: source.into(),
        }
    }

    pub fn fetch(url: &str, source: impl Into<FetchFailure>) -> Self {
        Self::Fetch {
            url: url.to_string(),
            source: source.into(),
        }
    }

    /// Stage label used when reporting failures to tool callers.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "ConfigurationError",
            Self::InvalidArgument(_) => "InvalidArgument",
            Self::Feed { .. } => "FeedError",
            Self::Fetch { .. } => "FetchError",
            Self::Io(_) | Self::Json(_) => "InternalError",
        }
    }
}

pub type Result<T> = std::result::Result<T, BlogError>;

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_feed_error_keeps_cause() {
        let err = BlogError::feed(
            "https://example.com/feed.xml",
            FeedFailure::Parse("unexpected end of input".into()),
        );

        assert_eq!(err.kind(), "FeedError");
        let cause = err.source().expect("cause should be attached");
        assert!(cause.to_string().contains("unexpected end of input"));
    }

    #[test]
    fn test_fetch_error_chains_http_status() {
        let err = BlogError::fetch("https://example.com/post", HttpError::Status { status: 404 });

        assert_eq!(err.kind(), "FetchError");
        assert_eq!(
            err.to_string(),
            "Failed to fetch post https://example.com/post: HTTP status 404"
        );
        let cause = err.source().expect("cause should be attached");
        assert!(cause.to_string().contains("404"));
    }
}
