use crate::Role;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameResult {
    Winner(Role),
    Draw,
    Ongoing,
}

impl Default for GameResult {
    fn default() -> Self {
        GameResult::Ongoing
    }
}

impl GameResult {
    pub fn winner(self) -> Option<Role> {
        match self {
            GameResult::Winner(role) => Some(role),
            GameResult::Draw | GameResult::Ongoing => None,
        }
    }

    pub fn is_over(self) -> bool {
        !matches!(self, GameResult::Ongoing)
    }
}
