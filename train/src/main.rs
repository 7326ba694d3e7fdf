use std::error::Error;

use clap::Parser;
use cli::Args;
use log::{info, LevelFilter};
use mimalloc::MiMalloc;
use policy::Trainer;
use tictactoe::Rules;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod cli;

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    match &args.log_file {
        Some(path) => simple_logging::log_to_file(path, LevelFilter::Info)?,
        None => simple_logging::log_to_stderr(LevelFilter::Info),
    }

    let rules = Rules::new(args.width, args.height, args.win_by)?;
    let mut trainer = Trainer::load(&args.policy_dir, rules);
    if let Some(seed) = args.seed {
        trainer = trainer.seeded(seed);
    }
    trainer.set_exploration((!args.no_exploration).then(|| args.exploration));

    let Some(games) = args.games else {
        info!("training on {}x{} boards (win by {}) until stopped", rules.width, rules.height, rules.win_by);
        match trainer.run_forever(&args.policy_dir)? {}
    };

    info!("training {games} games on {} threads", args.threads);
    trainer.run_parallel(games, args.threads)?;
    trainer.save(&args.policy_dir)?;
    Ok(())
}
