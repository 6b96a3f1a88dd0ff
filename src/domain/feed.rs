use serde::{Deserialize, Serialize};

/// Feed-level metadata, as opposed to per-entry fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedMetadata {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub link: Option<String>,
}
