pub mod agent;
pub mod config;
pub mod learner;
pub mod self_play;
pub mod solver;
pub mod table;
pub mod train;

pub use agent::Agent;
pub use learner::Learner;
pub use self_play::{play_game, Tally};
pub use solver::Solver;
pub use table::{PolicyTable, TableError};
pub use train::{TrainError, Trainer};
