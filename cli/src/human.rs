use std::io::{self, BufRead, Write};

use policy::Agent;
use tictactoe::{Board, Pos, Role};

/// A player typing moves into the terminal.
pub struct Human<R> {
    input: R,
    score: f64,
}

impl<R: BufRead> Human<R> {
    pub fn new(input: R) -> Self {
        Human { input, score: 0. }
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// Read a number, `None` once the input is closed.
    fn read_number(&mut self, prompt: &str) -> Option<usize> {
        loop {
            print!("{prompt}: ");
            io::stdout().flush().ok()?;
            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) | Err(_) => return None,
                Ok(_) => {}
            }
            match line.trim().parse() {
                Ok(n) => return Some(n),
                Err(_) => println!("\"{}\" is not a number", line.trim()),
            }
        }
    }
}

impl<R: BufRead> Agent for Human<R> {
    fn pick_move(&mut self, board: &Board, role: Role) -> Option<Pos> {
        println!("{board}");
        println!("you are {}", role.symbol());
        loop {
            let x = self.read_number("x")?;
            let y = self.read_number("y")?;
            let pos = Pos::new(x, y);
            if board.is_empty(pos) {
                return Some(pos);
            }
            println!("illegal move");
        }
    }

    fn feed_reward(&mut self, reward: f64) {
        self.score += reward;
        println!("game over, your score is {}", self.score);
    }
}
