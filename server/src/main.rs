use std::{
    error::Error,
    sync::{Arc, Mutex},
};

use clap::Parser;
use log::{info, LevelFilter};
use mimalloc::MiMalloc;
use policy::Solver;
use tictactoe::Rules;
use tokio::{net::TcpListener, select, signal::ctrl_c};

use crate::{cli::Args, connection::serve, room::Lobby};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod cli;
mod connection;
mod message;
mod room;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    match &args.log_file {
        Some(path) => simple_logging::log_to_file(path, LevelFilter::Info)?,
        None => simple_logging::log_to_stderr(LevelFilter::Info),
    }

    let rules = Rules::default();
    let solver = Solver::load(&args.policy_dir, rules);
    let lobby = Arc::new(Mutex::new(Lobby::new(rules, solver)));

    let listener = TcpListener::bind((args.host.as_str(), args.port)).await?;
    info!("listening on {}", listener.local_addr()?);

    select! {
        _ = ctrl_c() => (),
        result = serve(listener, lobby) => result?,
    }

    info!("shutting down");
    Ok(())
}
