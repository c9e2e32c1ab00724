pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "fullfeed")]
#[command(about = "A proxy that turns summary-only RSS/Atom feeds into full-text feeds", long_about = None)]
pub struct Cli {
    /// Path to the config file (default: ~/.config/fullfeed/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP proxy
    Serve {
        /// Address to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Transform one feed and print it to stdout
    Transform {
        /// URL of the feed
        url: String,
    },
    /// Print the default configuration
    Config,
}
