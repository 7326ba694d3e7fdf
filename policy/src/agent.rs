use tictactoe::{Board, Pos, Role};

/// Something that can take part in a game of tic-tac-toe.
pub trait Agent {
    /// Pick an empty cell to play as `role`. Returning `None` abandons the game.
    fn pick_move(&mut self, board: &Board, role: Role) -> Option<Pos>;

    /// Called with the board right after this agent moved.
    fn record(&mut self, _board: &Board) {}

    /// Called once when a game ends.
    fn feed_reward(&mut self, reward: f64);

    /// Forget everything about the current game.
    fn reset(&mut self) {}
}
