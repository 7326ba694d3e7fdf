use std::path::PathBuf;

use clap::Parser;

/// Train tic-tac-toe policy tables by self-play
#[derive(Parser)]
pub struct Args {
    /// Width of the board
    #[clap(long, default_value_t = 3)]
    pub width: usize,
    /// Height of the board
    #[clap(long, default_value_t = 3)]
    pub height: usize,
    /// Number of pieces in a row needed to win
    #[clap(short, long, default_value_t = 3)]
    pub win_by: usize,
    /// Number of games to play, trains forever if left out
    #[clap(short, long)]
    pub games: Option<usize>,
    /// Number of threads playing games
    #[clap(short, long, default_value_t = 1)]
    pub threads: usize,
    /// Chance of playing a random move
    #[clap(short, long, default_value_t = 0.3)]
    pub exploration: f64,
    /// Always play the best known move
    #[clap(long)]
    pub no_exploration: bool,
    /// Directory the policy tables are loaded from and saved to
    #[clap(short, long, default_value = ".")]
    pub policy_dir: PathBuf,
    /// Seed for the random number generators
    #[clap(short, long)]
    pub seed: Option<u64>,
    /// Log to this file instead of stderr
    #[clap(short, long)]
    pub log_file: Option<PathBuf>,
}
