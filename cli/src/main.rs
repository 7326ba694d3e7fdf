use std::{
    error::Error,
    io::{self, BufRead, Write},
    path::PathBuf,
};

use clap::{Parser, Subcommand};
use human::Human;
use log::LevelFilter;
use mimalloc::MiMalloc;
use policy::{play_game, Solver, Tally};
use serde_json::json;
use tictactoe::{Board, Role, Rules};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod human;

/// Tic-tac-toe bot command line interface
#[derive(Parser)]
struct Args {
    #[clap(subcommand)]
    command: Command,
    /// Directory with the trained policy tables
    #[clap(short, long, default_value = ".")]
    policy_dir: PathBuf,
    /// Width of the board
    #[clap(long, default_value_t = 3)]
    width: usize,
    /// Height of the board
    #[clap(long, default_value_t = 3)]
    height: usize,
    /// Number of pieces in a row needed to win
    #[clap(short, long, default_value_t = 3)]
    win_by: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Print the best move for a board as JSON
    Solve {
        /// Comma separated cells in row-major order, -1 for x, 1 for o and 0 for empty
        #[clap(allow_hyphen_values = true)]
        board: Option<String>,
        /// Role to find a move for
        #[clap(short, long, default_value_t = Role::Defender)]
        role: Role,
    },
    /// Play against the bot
    Play {
        /// Role to play as against the bot
        #[clap(short, long, default_value_t = Role::Attacker)]
        role: Role,
        /// Number of games to play
        #[clap(short, long, default_value_t = 1)]
        games: usize,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    simple_logging::log_to_stderr(LevelFilter::Warn);

    let rules = Rules::new(args.width, args.height, args.win_by)?;
    let solver = Solver::load(&args.policy_dir, rules);
    match args.command {
        Command::Solve { board, role } => {
            let board = match board {
                Some(board) => Board::from_identifier(rules, &board)?,
                None => prompt_board(rules, io::stdin().lock())?,
            };
            let answer = match solver.solve(&board, role) {
                Some(pos) => json!({ "x": pos.x, "y": pos.y }),
                None => json!(null),
            };
            println!("{answer}");
        }
        Command::Play { role, games } => play(rules, solver, role, games)?,
    }
    Ok(())
}

/// Ask for a board until one parses.
fn prompt_board(rules: Rules, mut input: impl BufRead) -> io::Result<Board> {
    loop {
        print!("board: ");
        io::stdout().flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        match Board::from_identifier(rules, &line) {
            Ok(board) => return Ok(board),
            Err(err) => println!("{err}"),
        }
    }
}

fn play(rules: Rules, mut solver: Solver, role: Role, games: usize) -> Result<(), Box<dyn Error>> {
    let stdin = io::stdin();
    let mut human = Human::new(stdin.lock());
    let mut tally = Tally::default();
    for _ in 0..games {
        let result = match role {
            Role::Attacker => play_game(rules, &mut human, &mut solver)?,
            Role::Defender => play_game(rules, &mut solver, &mut human)?,
        };
        if !result.is_over() {
            break;
        }
        tally.update(result);
    }
    println!("{tally}, final score {}", human.score());
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tictactoe::{Board, Role, Rules};

    use crate::{prompt_board, Args, Command};

    fn solve_args(args: &[&str]) -> (Option<String>, Role) {
        match Args::try_parse_from(args).unwrap().command {
            Command::Solve { board, role } => (board, role),
            Command::Play { .. } => panic!("expected the solve command"),
        }
    }

    #[test]
    fn solve_takes_boards_starting_with_an_attacker() {
        let (board, role) = solve_args(&["cli", "solve", "-1,0,0,0,1,0,0,0,0"]);
        assert_eq!(board.as_deref(), Some("-1,0,0,0,1,0,0,0,0"));
        assert_eq!(role, Role::Defender);

        let (board, role) = solve_args(&["cli", "solve", "--role", "attacker", "-1,1,0,0,0,0,0,0,0"]);
        assert_eq!(board.as_deref(), Some("-1,1,0,0,0,0,0,0,0"));
        assert_eq!(role, Role::Attacker);

        assert_eq!(solve_args(&["cli", "solve"]).0, None);
    }

    #[test]
    fn prompt_skips_bad_boards() {
        let input = "nope\n0,0,0\n-1,0,0,0,1,0,0,0,0\n".as_bytes();
        let board = prompt_board(Rules::default(), input).unwrap();
        assert_eq!(board, "-1,0,0,0,1,0,0,0,0".parse::<Board>().unwrap());
    }

    #[test]
    fn prompt_gives_up_at_eof() {
        assert!(prompt_board(Rules::default(), "1,2,3\n".as_bytes()).is_err());
    }
}
