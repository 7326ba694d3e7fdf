use crate::{Pos, RulesError};

/// Board dimensions and the length of a winning run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rules {
    pub width: usize,
    pub height: usize,
    pub win_by: usize,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            width: 3,
            height: 3,
            win_by: 3,
        }
    }
}

impl Rules {
    pub fn new(width: usize, height: usize, win_by: usize) -> Result<Self, RulesError> {
        if width == 0 || height == 0 {
            return Err(RulesError::EmptyBoard);
        }
        let longest = width.max(height);
        if win_by == 0 || win_by > longest {
            return Err(RulesError::WinBy { win_by, longest });
        }
        Ok(Rules { width, height, win_by })
    }

    pub const fn cells(&self) -> usize {
        self.width * self.height
    }

    pub const fn contains(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }
}

#[cfg(test)]
mod tests {
    use crate::{Rules, RulesError};

    #[test]
    fn rejects_unwinnable_rules() {
        assert_eq!(Rules::new(0, 3, 3), Err(RulesError::EmptyBoard));
        assert_eq!(Rules::new(3, 3, 4), Err(RulesError::WinBy { win_by: 4, longest: 3 }));
        assert_eq!(Rules::new(3, 3, 0), Err(RulesError::WinBy { win_by: 0, longest: 3 }));
        assert_eq!(Rules::new(3, 3, 3), Ok(Rules::default()));
        assert_eq!(Rules::new(5, 2, 4).map(|r| r.cells()), Ok(10));
    }
}
