use std::{error::Error, fmt::Display};

use crate::Pos;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayError {
    OutOfBounds(Pos),
    AlreadyOccupied(Pos),
    GameOver,
    NothingToUndo,
    Unbalanced { attackers: usize, defenders: usize },
}

impl Display for PlayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayError::OutOfBounds(pos) => write!(f, "position {pos} is not on the board"),
            PlayError::AlreadyOccupied(pos) => write!(f, "position {pos} is already occupied"),
            PlayError::GameOver => write!(f, "cannot play after the game has ended"),
            PlayError::NothingToUndo => write!(f, "there is no move to undo"),
            PlayError::Unbalanced { attackers, defenders } => write!(
                f,
                "{attackers} attacker and {defenders} defender pieces cannot come from alternating turns"
            ),
        }
    }
}

impl Error for PlayError {}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParseBoardError {
    CellCount { expected: usize, found: usize },
    NotANumber(String),
    InvalidValue(String),
}

impl Display for ParseBoardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseBoardError::CellCount { expected, found } => {
                write!(f, "expected {expected} cells but found {found}")
            }
            ParseBoardError::NotANumber(cell) => write!(f, "cell \"{cell}\" is not a number"),
            ParseBoardError::InvalidValue(cell) => {
                write!(f, "cell \"{cell}\" must be -1 (x), 0 (empty) or 1 (o)")
            }
        }
    }
}

impl Error for ParseBoardError {}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParseRoleError(pub String);

impl Display for ParseRoleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown role \"{}\", expected attacker or defender", self.0)
    }
}

impl Error for ParseRoleError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RulesError {
    EmptyBoard,
    WinBy { win_by: usize, longest: usize },
}

impl Display for RulesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RulesError::EmptyBoard => write!(f, "the board needs at least one row and one column"),
            RulesError::WinBy { win_by, longest } => {
                write!(f, "cannot win by {win_by} when the longest line has {longest} cells")
            }
        }
    }
}

impl Error for RulesError {}
