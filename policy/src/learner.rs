use std::{
    path::Path,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard},
};

use rand::{prelude::SliceRandom, rngs::StdRng, Rng, SeedableRng};
use tictactoe::{Board, Pos, Role};

use crate::{
    config::{DECAY_GAMMA, EXPLORATION_RATE, LEARNING_RATE},
    solver::best_move,
    Agent,
    PolicyTable,
    TableError,
};

/// A player that learns state values from the rewards of its games.
pub struct Learner {
    table: Arc<RwLock<PolicyTable>>,
    round: Vec<String>,
    pub exploration_rate: f64,
    pub learning_rate: f64,
    pub decay_gamma: f64,
    pub explore: bool,
    rng: StdRng,
}

impl Learner {
    pub fn new(table: PolicyTable) -> Self {
        Learner {
            table: Arc::new(RwLock::new(table)),
            round: Vec::new(),
            exploration_rate: EXPLORATION_RATE,
            learning_rate: LEARNING_RATE,
            decay_gamma: DECAY_GAMMA,
            explore: true,
            rng: StdRng::from_entropy(),
        }
    }

    #[must_use]
    pub fn seeded(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// A learner for another thread that updates the same table.
    pub fn fork(&mut self) -> Self {
        Learner {
            table: Arc::clone(&self.table),
            round: Vec::new(),
            exploration_rate: self.exploration_rate,
            learning_rate: self.learning_rate,
            decay_gamma: self.decay_gamma,
            explore: self.explore,
            rng: StdRng::seed_from_u64(self.rng.gen()),
        }
    }

    pub fn table(&self) -> RwLockReadGuard<'_, PolicyTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Boards this learner produced in the current game, oldest first.
    pub fn round(&self) -> &[String] {
        &self.round
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TableError> {
        self.table().save(path)
    }
}

impl Agent for Learner {
    fn pick_move(&mut self, board: &Board, role: Role) -> Option<Pos> {
        let moves = board.empty_positions();
        if self.explore && self.rng.gen::<f64>() <= self.exploration_rate {
            return moves.choose(&mut self.rng).copied();
        }
        let table = self.table();
        best_move(
            moves
                .into_iter()
                .map(|pos| (pos, table.get(&board.with(pos, role).identifier()))),
        )
    }

    fn record(&mut self, board: &Board) {
        self.round.push(board.identifier());
    }

    /// Temporal difference update from the last board back to the first,
    /// each board's new value becomes the reward of the one before it.
    fn feed_reward(&mut self, mut reward: f64) {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        for identifier in self.round.iter().rev() {
            reward = table.update(identifier, |value| {
                value + self.learning_rate * (self.decay_gamma * reward - value)
            });
        }
    }

    fn reset(&mut self) {
        self.round.clear();
    }
}

#[cfg(test)]
mod tests {
    use tictactoe::{Board, Pos, Role};

    use crate::{Agent, Learner, PolicyTable};

    fn greedy(table: PolicyTable) -> Learner {
        let mut learner = Learner::new(table).seeded(7);
        learner.explore = false;
        learner
    }

    #[test]
    fn reward_flows_backwards() {
        let mut learner = greedy(PolicyTable::new());
        let first: Board = "-1,0,0,0,0,0,0,0,0".parse().unwrap();
        let second: Board = "-1,1,-1,0,0,0,0,0,0".parse().unwrap();
        learner.record(&first);
        learner.record(&second);
        learner.feed_reward(1.);

        let table = learner.table();
        assert!((table.get(&second.identifier()) - 0.18).abs() < 1e-12);
        assert!((table.get(&first.identifier()) - 0.0324).abs() < 1e-12);
    }

    #[test]
    fn known_values_move_towards_the_reward() {
        let board: Board = "-1,0,0,0,0,0,0,0,0".parse().unwrap();
        let mut table = PolicyTable::new();
        table.insert(board.identifier(), 0.5);
        let mut learner = greedy(table);
        learner.record(&board);
        learner.feed_reward(0.);
        // 0.5 + 0.2 * (0.9 * 0 - 0.5)
        assert!((learner.table().get(&board.identifier()) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn reset_forgets_the_round() {
        let mut learner = greedy(PolicyTable::new());
        learner.record(&Board::default());
        assert_eq!(learner.round().len(), 1);
        learner.reset();
        assert!(learner.round().is_empty());
        learner.feed_reward(1.);
        assert!(learner.table().is_empty());
    }

    #[test]
    fn greedy_learner_follows_its_table() {
        let mut table = PolicyTable::new();
        table.insert("0,0,0,0,1,0,0,0,0".to_owned(), 0.6);
        let mut learner = greedy(table);
        assert_eq!(learner.pick_move(&Board::default(), Role::Defender), Some(Pos::new(1, 1)));
        assert_eq!(learner.pick_move(&Board::default(), Role::Attacker), Some(Pos::new(2, 2)));
    }

    #[test]
    fn exploring_learner_stays_on_empty_cells() {
        let mut learner = Learner::new(PolicyTable::new()).seeded(3);
        learner.exploration_rate = 1.;
        let board: Board = "-1,1,-1,1,0,-1,1,-1,0".parse().unwrap();
        for _ in 0..20 {
            let pos = learner.pick_move(&board, Role::Defender).unwrap();
            assert!(board.is_empty(pos));
        }
    }

    #[test]
    fn forks_share_the_table() {
        let mut learner = greedy(PolicyTable::new());
        let mut fork = learner.fork();
        assert!(!fork.explore);
        fork.record(&Board::default());
        fork.feed_reward(1.);
        assert_eq!(learner.table().len(), 1);
        assert!(learner.round().is_empty());
    }
}
