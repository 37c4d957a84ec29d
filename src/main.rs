use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use xhsfeed::app::AppContext;
use xhsfeed::cli::{commands, Cli, Commands};
use xhsfeed::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Commands::Serve { host, port } = &cli.command {
        if let Some(host) = host {
            config.server.host = host.clone();
        }
        if let Some(port) = port {
            config.server.port = *port;
        }
    }

    let ctx = Arc::new(AppContext::new(config)?);

    match cli.command {
        Commands::Serve { .. } => {
            commands::serve(ctx).await?;
        }
        Commands::Login => {
            commands::login(ctx).await?;
        }
        Commands::User { user_id, collect } => {
            let result = commands::user(&ctx, &user_id, collect).await;
            ctx.shutdown().await;
            result?;
        }
        Commands::Board { board_id } => {
            let result = commands::board(&ctx, &board_id).await;
            ctx.shutdown().await;
            result?;
        }
    }

    Ok(())
}
