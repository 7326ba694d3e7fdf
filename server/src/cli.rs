use std::path::PathBuf;

use clap::Parser;

/// Host tic-tac-toe games against the trained bot
#[derive(Parser)]
pub struct Args {
    /// Address to listen on
    #[clap(long, default_value = "127.0.0.1")]
    pub host: String,
    /// Port to listen on
    #[clap(short, long, default_value_t = 8765)]
    pub port: u16,
    /// Directory with the trained policy tables
    #[clap(long, default_value = ".")]
    pub policy_dir: PathBuf,
    /// Log to this file instead of stderr
    #[clap(short, long)]
    pub log_file: Option<PathBuf>,
}
