use std::{
    fmt::Display,
    ops::{Index, IndexMut},
    str::FromStr,
};

use crate::{GameResult, ParseBoardError, Pos, Role, Rules};

/// Directions that a winning run can take: along a row, down a column,
/// and along both diagonals.
const DIRECTIONS: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (-1, 1)];

const EMPTY_SYMBOL: char = '□';

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    rules: Rules,
    cells: Vec<Option<Role>>,
}

impl Default for Board {
    fn default() -> Self {
        Board::new(Rules::default())
    }
}

impl Index<Pos> for Board {
    type Output = Option<Role>;

    fn index(&self, index: Pos) -> &Self::Output {
        assert!(self.rules.contains(index), "{index} is not on the board");
        &self.cells[index.index(self.rules.width)]
    }
}

impl IndexMut<Pos> for Board {
    fn index_mut(&mut self, index: Pos) -> &mut Self::Output {
        assert!(self.rules.contains(index), "{index} is not on the board");
        &mut self.cells[index.index(self.rules.width)]
    }
}

impl Board {
    pub fn new(rules: Rules) -> Self {
        Board {
            rules,
            cells: vec![None; rules.cells()],
        }
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }

    pub fn get(&self, pos: Pos) -> Option<&Option<Role>> {
        if self.rules.contains(pos) {
            Some(self.index(pos))
        } else {
            None
        }
    }

    pub fn is_empty(&self, pos: Pos) -> bool {
        matches!(self.get(pos), Some(None))
    }

    /// Empty cells in row-major order.
    pub fn empty_positions(&self) -> Vec<Pos> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(i, _)| Pos::from_index(i, self.rules.width))
            .collect()
    }

    pub fn full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn count(&self, role: Role) -> usize {
        self.cells.iter().filter(|&&cell| cell == Some(role)).count()
    }

    /// Copy of this board with one more piece placed.
    #[must_use]
    pub fn with(&self, pos: Pos, role: Role) -> Self {
        let mut board = self.clone();
        board[pos] = Some(role);
        board
    }

    /// The canonical key of this board in a policy table.
    pub fn identifier(&self) -> String {
        self.cells
            .iter()
            .map(|cell| cell.map_or(0, Role::value).to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Parse an identifier like `-1,0,1,0,0,0,0,0,0` for the given rules.
    pub fn from_identifier(rules: Rules, s: &str) -> Result<Self, ParseBoardError> {
        let cells = s.split(',').map(parse_cell).collect::<Result<Vec<_>, _>>()?;
        if cells.len() != rules.cells() {
            return Err(ParseBoardError::CellCount {
                expected: rules.cells(),
                found: cells.len(),
            });
        }
        Ok(Board { rules, cells })
    }

    /// Look for a run of `win_by` equal pieces. Rows are checked first,
    /// then columns, then the two diagonal directions.
    pub fn winner(&self) -> GameResult {
        for direction in DIRECTIONS {
            for start in self.line_starts(direction) {
                if let Some(role) = self.run_along(start, direction) {
                    return GameResult::Winner(role);
                }
            }
        }
        if self.full() {
            GameResult::Draw
        } else {
            GameResult::Ongoing
        }
    }

    fn line_starts(&self, (dx, dy): (isize, isize)) -> impl Iterator<Item = Pos> + '_ {
        (0..self.rules.cells())
            .map(|i| Pos::from_index(i, self.rules.width))
            .filter(move |&pos| {
                !pos.step((-dx, -dy))
                    .map_or(false, |before| self.rules.contains(before))
            })
    }

    fn run_along(&self, mut pos: Pos, direction: (isize, isize)) -> Option<Role> {
        let mut run: Option<(Role, usize)> = None;
        loop {
            run = match (self[pos], run) {
                (Some(role), Some((previous, length))) if role == previous => Some((role, length + 1)),
                (Some(role), _) => Some((role, 1)),
                (None, _) => None,
            };
            if let Some((role, length)) = run {
                if length >= self.rules.win_by {
                    return Some(role);
                }
            }
            pos = pos.step(direction).filter(|&next| self.rules.contains(next))?;
        }
    }
}

fn parse_cell(cell: &str) -> Result<Option<Role>, ParseBoardError> {
    let trimmed = cell.trim();
    let value = trimmed
        .parse::<f64>()
        .map_err(|_| ParseBoardError::NotANumber(trimmed.to_owned()))?;
    if value == 0. {
        Ok(None)
    } else if value == -1. {
        Ok(Some(Role::Attacker))
    } else if value == 1. {
        Ok(Some(Role::Defender))
    } else {
        Err(ParseBoardError::InvalidValue(trimmed.to_owned()))
    }
}

impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::from_identifier(Rules::default(), s)
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, " ")?;
        for x in 0..self.rules.width {
            write!(f, " {x}")?;
        }
        writeln!(f)?;
        for y in 0..self.rules.height {
            write!(f, "{y}")?;
            for x in 0..self.rules.width {
                let symbol = self[Pos::new(x, y)].map_or(EMPTY_SYMBOL, Role::symbol);
                write!(f, " {symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Board, Pos, Role, Rules};

    #[test]
    fn empty_positions_are_row_major() {
        let board: Board = "-1,0,1,0,-1,0,1,0,0".parse().unwrap();
        assert_eq!(board.empty_positions(), vec![
            Pos::new(1, 0),
            Pos::new(0, 1),
            Pos::new(2, 1),
            Pos::new(1, 2),
            Pos::new(2, 2),
        ]);
        assert_eq!(board.count(Role::Attacker), 2);
        assert_eq!(board.count(Role::Defender), 2);
    }

    #[test]
    fn line_starts_cover_every_line() {
        let board = Board::new(Rules::new(4, 3, 3).unwrap());
        // 3 rows, 4 columns, 6 diagonals each way
        assert_eq!(board.line_starts((1, 0)).count(), 3);
        assert_eq!(board.line_starts((0, 1)).count(), 4);
        assert_eq!(board.line_starts((1, 1)).count(), 6);
        assert_eq!(board.line_starts((-1, 1)).count(), 6);
    }

    #[test]
    fn display_uses_symbols() {
        let board: Board = "-1,0,0,0,1,0,0,0,0".parse().unwrap();
        assert_eq!(board.to_string(), "  0 1 2\n0 x □ □\n1 □ o □\n2 □ □ □\n");
    }

    #[test]
    fn with_leaves_original_untouched() {
        let board = Board::default();
        let next = board.with(Pos::new(1, 1), Role::Attacker);
        assert!(board.is_empty(Pos::new(1, 1)));
        assert_eq!(next[Pos::new(1, 1)], Some(Role::Attacker));
        assert!(!next.is_empty(Pos::new(3, 0)));
    }
}
