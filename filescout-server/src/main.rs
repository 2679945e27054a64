use anyhow::Context;
use clap::Parser;
use filescout::filters::parse_extension_list;
use filescout::{ConfigOverrides, ServerConfig};
use filescout_server::router;
use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about = "A static file server which supports search", long_about = None)]
struct Cli {
    /// Port to listen on
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Time budget for each search (e.g. 1s, 250ms)
    #[arg(long, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Only search these file types, comma separated (e.g. txt,md,py)
    #[arg(short = 't', long = "type")]
    file_type: Option<String>,

    /// Directory to serve and search (default: current directory)
    #[arg(short = 'd', long)]
    root: Option<PathBuf>,

    /// Maximum number of files read at the same time
    #[arg(short = 'j', long)]
    max_workers: Option<NonZeroUsize>,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            port: self.port,
            root: self.root.clone(),
            timeout: self.timeout,
            extensions: self.file_type.as_deref().map(parse_extension_list),
            max_workers: self.max_workers,
            log_level: self.log_level.clone(),
        }
    }
}

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("filescout={level},filescout_server={level},tower_http={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ServerConfig::load_from(cli.config.as_deref())
        .context("Failed to load configuration")?
        .merge_with_cli(cli.overrides());
    init_tracing(&config.log_level);
    config.validate()?;

    info!("Serving {}", config.root.display());
    info!(
        "Search timeout {:?}, file types {:?}",
        config.timeout, config.extensions
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Static file server listening on {}", listener.local_addr()?);

    axum::serve(listener, router(config))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
