//! # Blog RSS Server
//!
//! Read-only blog tools backed by an RSS/Atom feed, exposed to MCP clients.
//!
//! ## Architecture
//!
//! Every call starts from scratch; nothing is stored between calls:
//!
//! ```text
//! Fetcher → Normalizer → BlogService → Tool server
//!                            ↓
//!                    Scraper (post pages)
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! # Point at a feed
//! export RSS_FEED_URL=https://blog.rust-lang.org/feed.xml
//!
//! # Try the tools from the shell
//! blog-rss-server info
//! blog-rss-server recent --count 3
//! blog-rss-server search "async"
//!
//! # Serve them over stdio (the default)
//! blog-rss-server serve
//! ```
//!
//! ## Modules
//!
//! - [`app`]: Application context and error types
//! - [`blog`]: Feed listing, recency view, metadata and full-text search
//! - [`cli`]: Command-line interface definitions
//! - [`config`]: File and environment configuration
//! - [`domain`]: Records returned by the tools
//! - [`fetcher`]: HTTP fetching
//! - [`normalizer`]: Tolerant feed parsing and field normalization
//! - [`scraper`]: Post page fetching and text extraction
//! - [`server`]: MCP tool server and transports

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together config,
/// fetcher and the blog service.
pub mod app;

/// The blog operations behind every tool.
///
/// - [`BlogService`](blog::BlogService): list, recent, info, post, search
/// - [`snippet_for`](blog::snippet_for): match window used by search hits
pub mod blog;

/// Command-line interface using clap.
///
/// - `serve` - Serve the tools over the configured transport (default)
/// - `info` - Show feed metadata
/// - `list` - List every post
/// - `recent [--count N]` - Show the newest posts
/// - `post <url>` - Fetch a post's text
/// - `search <query>` - Search post contents
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/blog-rss-server/config.toml`, then applies
/// `RSS_FEED_URL`, `MCP_TRANSPORT` and `MCP_MOUNT_PATH` overrides.
pub mod config;

/// Records returned by the tools.
///
/// - [`PostRecord`](domain::PostRecord): one feed entry
/// - [`PostContent`](domain::PostContent): a post's extracted text
/// - [`FeedMetadata`](domain::FeedMetadata): blog-level fields
/// - [`SearchHit`](domain::SearchHit): a matching post with its snippet
pub mod domain;

/// HTTP fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for fetching a URL's body
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
/// - [`ParallelFetcher`](fetcher::parallel::ParallelFetcher): Concurrent fetching with semaphore
pub mod fetcher;

/// Feed parsing and normalization.
///
/// Parses RSS 0.9x/1.0/2.0, Atom and JSON Feed with feed-rs, salvaging
/// what it can from malformed documents.
pub mod normalizer;

/// Post page fetching and readable-text extraction.
///
/// - [`PostFetcher`](scraper::PostFetcher): fetch a post by URL
/// - [`ContentExtractor`](scraper::ContentExtractor): HTML to plain text
/// - [`ScraperConfig`](scraper::ScraperConfig): Configuration options
pub mod scraper;

/// MCP tool server over stdio, SSE or streamable HTTP.
pub mod server;
