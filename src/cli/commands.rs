use serde::Serialize;

use crate::app::{AppContext, Result};

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", to_pretty_json(value)?);
    Ok(())
}

pub async fn show_info(ctx: &AppContext) -> Result<()> {
    print_json(&ctx.blog.feed_info().await?)
}

pub async fn list_posts(ctx: &AppContext) -> Result<()> {
    let posts = ctx.blog.list_posts().await?;
    if posts.is_empty() {
        eprintln!("No posts");
    }
    print_json(&posts)
}

pub async fn recent_posts(ctx: &AppContext, count: i64) -> Result<()> {
    print_json(&ctx.blog.recent_posts(count).await?)
}

pub async fn show_post(ctx: &AppContext, url: &str) -> Result<()> {
    print_json(&ctx.blog.fetch_post(url).await?)
}

pub async fn search(ctx: &AppContext, query: &str) -> Result<()> {
    let hits = ctx.search(query).await?;
    eprintln!("{} matching posts", hits.len());
    print_json(&hits)
}
