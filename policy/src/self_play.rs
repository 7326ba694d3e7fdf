use std::fmt::Display;

use log::trace;
use tictactoe::{Game, GameResult, PlayError, Role, Rules};

use crate::{
    config::{ATTACKER_DRAW_REWARD, DEFENDER_DRAW_REWARD, LOSS_REWARD, WIN_REWARD},
    Agent,
};

/// Play one game and hand out the rewards. The attacker moves first.
///
/// Returns `GameResult::Ongoing` if an agent abandoned the game, in which
/// case nobody is rewarded. Both agents are reset even if a move was illegal.
pub fn play_game(rules: Rules, attacker: &mut dyn Agent, defender: &mut dyn Agent) -> Result<GameResult, PlayError> {
    let outcome = play_out(Game::new(rules), attacker, defender);
    if let Ok(result) = outcome {
        give_rewards(result, attacker, defender);
    }
    attacker.reset();
    defender.reset();
    outcome
}

fn play_out(mut game: Game, attacker: &mut dyn Agent, defender: &mut dyn Agent) -> Result<GameResult, PlayError> {
    loop {
        let result = game.result();
        if result.is_over() {
            return Ok(result);
        }
        let role = game.to_move;
        let agent: &mut dyn Agent = match role {
            Role::Attacker => &mut *attacker,
            Role::Defender => &mut *defender,
        };
        let Some(pos) = agent.pick_move(&game.board, role) else {
            return Ok(GameResult::Ongoing);
        };
        game.play(pos)?;
        agent.record(&game.board);
        trace!("{role} played {pos}\n{}", game.board);
    }
}

fn give_rewards(result: GameResult, attacker: &mut dyn Agent, defender: &mut dyn Agent) {
    match result {
        GameResult::Winner(Role::Attacker) => {
            attacker.feed_reward(WIN_REWARD);
            defender.feed_reward(LOSS_REWARD);
        }
        GameResult::Winner(Role::Defender) => {
            attacker.feed_reward(LOSS_REWARD);
            defender.feed_reward(WIN_REWARD);
        }
        GameResult::Draw => {
            attacker.feed_reward(ATTACKER_DRAW_REWARD);
            defender.feed_reward(DEFENDER_DRAW_REWARD);
        }
        GameResult::Ongoing => {}
    }
}

/// Outcomes of a series of games.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub attacker_wins: usize,
    pub defender_wins: usize,
    pub draws: usize,
}

impl Tally {
    pub fn games(&self) -> usize {
        self.attacker_wins + self.defender_wins + self.draws
    }

    pub fn update(&mut self, result: GameResult) {
        match result {
            GameResult::Winner(Role::Attacker) => self.attacker_wins += 1,
            GameResult::Winner(Role::Defender) => self.defender_wins += 1,
            GameResult::Draw => self.draws += 1,
            GameResult::Ongoing => {}
        }
    }

    pub fn merge(&mut self, other: Tally) {
        self.attacker_wins += other.attacker_wins;
        self.defender_wins += other.defender_wins;
        self.draws += other.draws;
    }
}

impl Display for Tally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} games: {} won {}, {} won {}, {} ties",
            self.games(),
            Role::Attacker.symbol(),
            self.attacker_wins,
            Role::Defender.symbol(),
            self.defender_wins,
            self.draws
        )
    }
}
