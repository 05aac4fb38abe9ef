use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use redis_status::collector::{self, SlotErrorPolicy};
use redis_status::config;
use redis_status::connection::RedisConnector;
use redis_status::registry::ConnectionRegistry;
use redis_status::render::{self, Layout, RenderOptions};
use tracing_subscriber::EnvFilter;

/// Render a status page for one or more Redis servers
#[derive(Parser)]
#[command(name = "redis-status", version, about)]
struct Cli {
    /// JSON file with an array of {"host", "port", "password"} objects.
    /// Default: config.json next to the executable
    #[arg(long)]
    config: Option<PathBuf>,

    /// Redis server URL (repeatable). Overrides the config file.
    /// Example: redis://:secret@127.0.0.1:6380
    #[arg(long = "server")]
    servers: Vec<String>,

    /// Reload the page every N seconds. Zero or negative disables it
    #[arg(long, allow_negative_numbers = true)]
    refresh: Option<i64>,

    /// Panel arrangement
    #[arg(long, value_enum, default_value_t = Layout::Stacked)]
    layout: Layout,

    /// Report a failing key count inside that server's panel instead of
    /// aborting the whole page
    #[arg(long)]
    isolate_slot_errors: bool,

    /// Write the page here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let descriptors = if cli.servers.is_empty() {
        let path = cli.config.clone().unwrap_or_else(config::default_config_path);
        config::load_descriptors(&path)?
    } else {
        tracing::info!(servers = cli.servers.len(), "Using servers from command line");
        config::descriptors_from_urls(&cli.servers)?
    };

    let policy = if cli.isolate_slot_errors {
        SlotErrorPolicy::Isolate
    } else {
        SlotErrorPolicy::Fatal
    };

    let mut registry = ConnectionRegistry::new(RedisConnector, descriptors);
    let statuses = collector::collect_all(&mut registry, policy).await?;

    let options = RenderOptions {
        refresh: cli.refresh,
        layout: cli.layout,
    };
    let page = render::render_page(&statuses, &options);

    match &cli.output {
        Some(path) => {
            std::fs::write(path, page)
                .with_context(|| format!("Cannot write '{}'", path.display()))?;
            tracing::info!(path = %path.display(), servers = statuses.len(), "Wrote status page");
        }
        None => print!("{page}"),
    }

    Ok(())
}
