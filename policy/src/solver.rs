use std::path::Path;

use log::debug;
use tictactoe::{Board, Pos, Role, Rules};

use crate::{Agent, PolicyTable};

/// Plays the best known move from a pair of trained policy tables.
#[derive(Clone, Debug, Default)]
pub struct Solver {
    attacker: PolicyTable,
    defender: PolicyTable,
}

impl Solver {
    pub fn new(attacker: PolicyTable, defender: PolicyTable) -> Self {
        Solver { attacker, defender }
    }

    /// Load both tables for `rules` from `dir`. Missing tables are empty.
    pub fn load(dir: impl AsRef<Path>, rules: Rules) -> Self {
        let dir = dir.as_ref();
        Solver {
            attacker: PolicyTable::load_or_default(dir.join(PolicyTable::file_name(rules, Role::Attacker))),
            defender: PolicyTable::load_or_default(dir.join(PolicyTable::file_name(rules, Role::Defender))),
        }
    }

    pub fn table(&self, role: Role) -> &PolicyTable {
        match role {
            Role::Attacker => &self.attacker,
            Role::Defender => &self.defender,
        }
    }

    /// Score every empty cell by the value of the board after playing there.
    pub fn evaluate(&self, board: &Board, role: Role) -> Vec<(Pos, f64)> {
        let table = self.table(role);
        board
            .empty_positions()
            .into_iter()
            .map(|pos| (pos, table.get(&board.with(pos, role).identifier())))
            .collect()
    }

    /// The highest valued move for `role`, or `None` on a full board.
    pub fn solve(&self, board: &Board, role: Role) -> Option<Pos> {
        debug!("playing as {role} on {}", board.identifier());
        let scored = self.evaluate(board, role);
        for (pos, score) in &scored {
            debug!("{pos} scores {score}");
        }
        best_move(scored)
    }
}

impl Agent for Solver {
    fn pick_move(&mut self, board: &Board, role: Role) -> Option<Pos> {
        self.solve(board, role)
    }

    fn feed_reward(&mut self, _reward: f64) {}
}

/// Pick the highest scoring move. Ties go to the move that comes last.
pub(crate) fn best_move(scored: impl IntoIterator<Item = (Pos, f64)>) -> Option<Pos> {
    let mut best = None;
    let mut highest = f64::NEG_INFINITY;
    for (pos, score) in scored {
        if score >= highest {
            highest = score;
            best = Some(pos);
        }
    }
    best
}
