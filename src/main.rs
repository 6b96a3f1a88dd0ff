use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use blog_rss_server::app::AppContext;
use blog_rss_server::cli::{commands, Cli, Commands};
use blog_rss_server::config::Config;
use blog_rss_server::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the protocol on the stdio transport, so logs go to stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let ctx = Arc::new(AppContext::new(config)?);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            server::serve(ctx).await?;
        }
        Commands::Info => {
            commands::show_info(&ctx).await?;
        }
        Commands::List => {
            commands::list_posts(&ctx).await?;
        }
        Commands::Recent { count } => {
            commands::recent_posts(&ctx, count).await?;
        }
        Commands::Post { url } => {
            commands::show_post(&ctx, &url).await?;
        }
        Commands::Search { query } => {
            commands::search(&ctx, &query).await?;
        }
    }

    Ok(())
}
