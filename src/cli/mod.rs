pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xhsfeed")]
#[command(about = "RSS feeds for Xiaohongshu profiles, collections and boards", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/xhsfeed/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run the HTTP server and open the QR login page
    Login,
    /// Print a user's feed
    User {
        /// Profile id
        user_id: String,

        /// Collected notes instead of published ones
        #[arg(long)]
        collect: bool,
    },
    /// Print a board's feed
    Board {
        /// Board id
        board_id: String,
    },
}
