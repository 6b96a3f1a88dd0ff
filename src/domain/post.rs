use serde::{Deserialize, Serialize};

/// One post as listed by the feed. The slug is the post's full URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub title: Option<String>,
    pub slug: Option<String>,
    #[serde(rename = "pubDate")]
    pub pub_date: Option<String>,
}

impl PostRecord {
    /// Listed posts need both a title and a slug.
    pub fn is_listable(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.title) && present(&self.slug)
    }
}

/// Readable text of a single post page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostContent {
    pub slug: String,
    pub url: String,
    pub content: String,
}

impl PostContent {
    pub fn new(url: &str, content: String) -> Self {
        Self {
            slug: url.to_string(),
            url: url.to_string(),
            content,
        }
    }
}
