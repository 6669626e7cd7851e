use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use framework::task;
use pr_context_api::ApiState;
use pr_context_api::config::Settings;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(version, about = "PR context generator api", long_about = None)]
struct Cli {
    #[arg(long, help = "bind host, overrides HOST")]
    host: Option<String>,

    #[arg(long, help = "bind port, overrides PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    if let Some(host) = cli.host {
        settings.host = host;
    }
    if let Some(port) = cli.port {
        settings.port = port;
    }

    let level = if settings.debug { LevelFilter::INFO } else { LevelFilter::WARN };
    let filter = EnvFilter::builder().with_default_directive(level.into()).from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .with_line_number(true)
        .with_thread_ids(true)
        .init();

    info!("starting pr context api");
    info!("debug mode: {}", settings.debug);
    info!("allowed origins: {:?}", settings.allowed_origins);
    framework::web::error::expose_internal_detail(settings.debug);

    let address = format!("{}:{}", settings.host, settings.port);
    let state = ApiState::new(settings);

    let cache = state.cache.clone();
    task::spawn_interval("cache-sweep", SWEEP_INTERVAL, move || {
        cache.sweep();
    });
    let limiter = state.limiter.clone();
    task::spawn_interval("rate-limit-prune", SWEEP_INTERVAL, move || limiter.prune());

    framework::web::server::start_http_server(pr_context_api::app(state), &address).await?;
    task::shutdown().await;
    info!("pr context api stopped");

    Ok(())
}
