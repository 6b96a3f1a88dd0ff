//! The tool table: names, descriptions, input schemas and dispatch.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::app::{AppContext, BlogError, Result};
use crate::blog::DEFAULT_RECENT_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    ListBlogPosts,
    GetBlogPost,
    GetRecentPosts,
    GetBlogInfo,
    SearchFullText,
}

impl Tool {
    pub const ALL: [Tool; 5] = [
        Tool::ListBlogPosts,
        Tool::GetBlogPost,
        Tool::GetRecentPosts,
        Tool::GetBlogInfo,
        Tool::SearchFullText,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::ListBlogPosts => "list_blog_posts",
            Tool::GetBlogPost => "get_blog_post",
            Tool::GetRecentPosts => "get_recent_posts",
            Tool::GetBlogInfo => "get_blog_info",
            Tool::SearchFullText => "search_full_text",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            Tool::ListBlogPosts => {
                "Parses the RSS feed to get a list of all posts. Returns a list of post objects, \
                 each with a 'title', 'slug' (which is the full URL), and 'pubDate'."
            }
            Tool::GetBlogPost => {
                "Fetches a specific post and returns its text content. The 'slug' parameter must \
                 be the post's full URL (as returned by 'list_blog_posts')."
            }
            Tool::GetRecentPosts => {
                "Return the most recent `count` posts, assuming the feed lists newest posts last."
            }
            Tool::GetBlogInfo => {
                "Return blog-level metadata: title, subtitle/description, and link."
            }
            Tool::SearchFullText => {
                "Search post contents on-demand for the query and return matches with snippets. \
                 Returns a list of {slug, title, snippet}."
            }
        }
    }

    pub fn input_schema(self) -> Value {
        match self {
            Tool::ListBlogPosts | Tool::GetBlogInfo => json!({
                "type": "object",
                "properties": {},
            }),
            Tool::GetBlogPost => json!({
                "type": "object",
                "properties": {
                    "slug": { "type": "string", "description": "The post's full URL" },
                },
                "required": ["slug"],
            }),
            Tool::GetRecentPosts => json!({
                "type": "object",
                "properties": {
                    "count": { "type": "integer", "default": DEFAULT_RECENT_COUNT },
                },
            }),
            Tool::SearchFullText => json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string" },
                },
                "required": ["query"],
            }),
        }
    }

    /// Entry for a `tools/list` response.
    pub fn definition(self) -> Value {
        json!({
            "name": self.name(),
            "description": self.description(),
            "inputSchema": self.input_schema(),
        })
    }

    /// Run the tool against `args` and serialize its output.
    pub async fn call(self, ctx: &AppContext, args: Map<String, Value>) -> Result<Value> {
        let output = match self {
            Tool::ListBlogPosts => serde_json::to_value(ctx.blog.list_posts().await?)?,
            Tool::GetBlogPost => {
                let args: GetBlogPostArgs = parse_args(self, args)?;
                let slug = args.slug.unwrap_or_default();
                serde_json::to_value(ctx.blog.fetch_post(&slug).await?)?
            }
            Tool::GetRecentPosts => {
                let args: GetRecentPostsArgs = parse_args(self, args)?;
                let count = match args.count {
                    None | Some(Value::Null) => DEFAULT_RECENT_COUNT,
                    Some(count) => coerce_count(&count)?,
                };
                serde_json::to_value(ctx.blog.recent_posts(count).await?)?
            }
            Tool::GetBlogInfo => serde_json::to_value(ctx.blog.feed_info().await?)?,
            Tool::SearchFullText => {
                let args: SearchFullTextArgs = parse_args(self, args)?;
                let query = args.query.unwrap_or_default();
                serde_json::to_value(ctx.search(&query).await?)?
            }
        };

        Ok(output)
    }
}

#[derive(Debug, Deserialize)]
struct GetBlogPostArgs {
    slug: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GetRecentPostsArgs {
    count: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct SearchFullTextArgs {
    query: Option<String>,
}

/// Integer value of `count`: whole or fractional numbers (truncated) and
/// numeric strings are accepted.
fn coerce_count(count: &Value) -> Result<i64> {
    let coerced = match count {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    coerced.ok_or_else(|| {
        BlogError::InvalidArgument(format!("count must be an integer, got {}", count))
    })
}

fn parse_args<T: DeserializeOwned>(tool: Tool, args: Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(args)).map_err(|e| {
        BlogError::InvalidArgument(format!("bad arguments for {}: {}", tool.name(), e))
    })
}
