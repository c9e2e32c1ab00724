use std::path::Path;

use anyhow::Context;
use clap::Parser;

use fullfeed::app::AppContext;
use fullfeed::cli::{commands, Cli, Commands};
use fullfeed::config::Config;
use fullfeed::logging;

/// Load configuration and start logging with its level.
fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = Config::load(path).context("Failed to load configuration")?;
    logging::init(&config.logging);
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Cli { config, command } = Cli::parse();

    match command {
        Commands::Serve { host, port } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let ctx = AppContext::new(&config).await?;
            commands::serve(ctx, &config.server).await?;
        }
        Commands::Transform { url } => {
            let config = load_config(config.as_deref())?;
            let ctx = AppContext::new(&config).await?;
            commands::transform(&ctx, &url).await?;
        }
        Commands::Config => {
            commands::print_default_config();
        }
    }

    Ok(())
}
