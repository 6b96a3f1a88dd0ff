//! On-demand full-text search.
//!
//! There is no index: every query lists the feed and fetches every post page.

use crate::app::{BlogError, Result};
use crate::blog::BlogService;
use crate::domain::{PostRecord, SearchHit};
use crate::fetcher::parallel::ParallelFetcher;

/// Characters of context kept on each side of a match.
pub const SNIPPET_RADIUS: usize = 60;

/// Excerpt around the first case-insensitive occurrence of `query` in `text`.
///
/// The window runs from `SNIPPET_RADIUS` characters before the match to
/// `SNIPPET_RADIUS` characters after it, clipped to the text and trimmed.
pub fn snippet_for(text: &str, query: &str) -> Option<String> {
    let needle = query.to_lowercase();

    // lowered[folded_starts[i]..] begins with the lowercase form of the i-th char of text
    let mut lowered = String::with_capacity(text.len());
    let mut folded_starts = Vec::with_capacity(text.len());
    let mut byte_offsets = Vec::with_capacity(text.len() + 1);
    for (offset, c) in text.char_indices() {
        folded_starts.push(lowered.len());
        byte_offsets.push(offset);
        lowered.extend(c.to_lowercase());
    }
    byte_offsets.push(text.len());

    let found = lowered.find(&needle)?;
    let first = folded_starts
        .partition_point(|&start| start <= found)
        .checked_sub(1)?;

    let chars = folded_starts.len();
    let start = first.saturating_sub(SNIPPET_RADIUS);
    let end = (first + needle.chars().count() + SNIPPET_RADIUS).min(chars);

    Some(text[byte_offsets[start]..byte_offsets[end]].trim().to_string())
}

fn require_query(query: &str) -> Result<()> {
    if query.is_empty() {
        return Err(BlogError::InvalidArgument(
            "Missing required parameter: query".into(),
        ));
    }
    Ok(())
}

fn hit_for(post: PostRecord, content: &str, query: &str) -> Option<SearchHit> {
    let snippet = snippet_for(content, query)?;
    Some(SearchHit {
        slug: post.slug?,
        title: post.title?,
        snippet,
    })
}

impl BlogService {
    /// Search every post's text for `query`, one post at a time.
    ///
    /// Posts that cannot be fetched are logged and skipped. Hits follow feed
    /// order, one per post.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        require_query(query)?;

        let posts = self.list_posts().await?;
        let mut hits = Vec::new();

        for post in posts {
            let Some(url) = post.slug.clone() else {
                continue;
            };

            let content = match self.fetch_post(&url).await {
                Ok(page) => page.content,
                Err(e) => {
                    tracing::warn!("Failed to fetch post for search {}: {}", url, e);
                    continue;
                }
            };

            hits.extend(hit_for(post, &content, query));
        }

        tracing::info!("Search for {:?} matched {} posts", query, hits.len());
        Ok(hits)
    }

    /// Same results as [`search`](Self::search), with up to `workers` post
    /// pages fetched at once.
    pub async fn search_concurrent(&self, query: &str, workers: usize) -> Result<Vec<SearchHit>> {
        require_query(query)?;

        let posts = self.list_posts().await?;
        let urls = posts.iter().filter_map(|p| p.slug.clone()).collect();

        let pages = ParallelFetcher::new(self.fetcher.clone(), workers)
            .fetch_all(urls, self.posts.config().timeout())
            .await;

        let mut hits = Vec::new();
        for (post, (url, page)) in posts.into_iter().zip(pages) {
            let content = match page
                .map_err(|e| BlogError::fetch(&url, e))
                .and_then(|page| self.posts.extract(&url, &page))
            {
                Ok(post) => post.content,
                Err(e) => {
                    tracing::warn!("Failed to fetch post for search {}: {}", url, e);
                    continue;
                }
            };

            hits.extend(hit_for(post, &content, query));
        }

        tracing::info!("Search for {:?} matched {} posts", query, hits.len());
        Ok(hits)
    }
}
