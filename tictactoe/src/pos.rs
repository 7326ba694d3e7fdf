use std::fmt::Display;

/// A cell on the board, `x` is the column and `y` the row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Pos { x, y }
    }

    /// Flat row-major index of this position.
    pub const fn index(self, width: usize) -> usize {
        self.x + self.y * width
    }

    pub const fn from_index(index: usize, width: usize) -> Self {
        Pos {
            x: index % width,
            y: index / width,
        }
    }

    /// Take one step, or `None` if that would leave the non-negative quadrant.
    pub fn step(self, (dx, dy): (isize, isize)) -> Option<Self> {
        Some(Pos {
            x: self.x.checked_add_signed(dx)?,
            y: self.y.checked_add_signed(dy)?,
        })
    }
}

impl Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
