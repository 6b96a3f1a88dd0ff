pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::blog::DEFAULT_RECENT_COUNT;

#[derive(Parser)]
#[command(name = "blog-rss-server")]
#[command(about = "Blog reading tools over an RSS/Atom feed, served over MCP", long_about = None)]
pub struct Cli {
    /// Path to the config file (default: ~/.config/blog-rss-server/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Serve the blog tools over the configured MCP transport
    Serve,
    /// Show the blog's title, subtitle and link
    Info,
    /// List every post in the feed
    List,
    /// Show the most recent posts
    Recent {
        /// Number of posts to show
        #[arg(short = 'n', long, default_value_t = DEFAULT_RECENT_COUNT, allow_negative_numbers = true)]
        count: i64,
    },
    /// Fetch a post's text content
    Post {
        /// Full URL of the post
        url: String,
    },
    /// Search post contents for a phrase
    Search {
        /// Text to look for (case-insensitive)
        query: String,
    },
}
