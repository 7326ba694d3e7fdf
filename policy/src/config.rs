// learner
pub const EXPLORATION_RATE: f64 = 0.3;
pub const LEARNING_RATE: f64 = 0.2;
pub const DECAY_GAMMA: f64 = 0.9;

// rewards
pub const WIN_REWARD: f64 = 1.0;
pub const LOSS_REWARD: f64 = 0.0;
pub const ATTACKER_DRAW_REWARD: f64 = 0.1;
pub const DEFENDER_DRAW_REWARD: f64 = 0.5;

// training
pub const SAVE_INTERVAL: usize = 1000;
pub const PROGRESS_STEPS: usize = 100;
