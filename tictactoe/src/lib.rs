mod board;
mod error;
mod game;
mod game_result;
mod pos;
mod role;
mod rules;

pub use board::Board;
pub use error::*;
pub use game::Game;
pub use game_result::GameResult;
pub use pos::Pos;
pub use role::Role;
pub use rules::Rules;
