use crate::{Board, GameResult, PlayError, Pos, Role, Rules};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Game {
    pub board: Board,
    pub to_move: Role,
    pub ply: usize,
    history: Vec<Pos>,
}

impl Default for Game {
    fn default() -> Self {
        Game::new(Rules::default())
    }
}

impl Game {
    pub fn new(rules: Rules) -> Self {
        Game {
            board: Board::new(rules),
            to_move: Role::Attacker, // the attacker always opens
            ply: 0,
            history: Vec::new(),
        }
    }

    pub fn from_moves(rules: Rules, moves: &[Pos]) -> Result<Self, PlayError> {
        let mut game = Game::new(rules);
        for &pos in moves {
            game.play(pos)?;
        }
        Ok(game)
    }

    /// Continue from a position without history. The attacker has either
    /// as many pieces as the defender or one more.
    pub fn from_board(board: Board) -> Result<Self, PlayError> {
        let attackers = board.count(Role::Attacker);
        let defenders = board.count(Role::Defender);
        let to_move = if attackers == defenders {
            Role::Attacker
        } else if attackers == defenders + 1 {
            Role::Defender
        } else {
            return Err(PlayError::Unbalanced { attackers, defenders });
        };
        Ok(Game {
            board,
            to_move,
            ply: attackers + defenders,
            history: Vec::new(),
        })
    }

    pub fn rules(&self) -> Rules {
        self.board.rules()
    }

    pub fn history(&self) -> &[Pos] {
        &self.history
    }

    pub fn result(&self) -> GameResult {
        self.board.winner()
    }

    pub fn possible_moves(&self) -> Vec<Pos> {
        if self.result().is_over() {
            Vec::new()
        } else {
            self.board.empty_positions()
        }
    }

    pub fn play(&mut self, pos: Pos) -> Result<(), PlayError> {
        match self.board.get(pos) {
            None => return Err(PlayError::OutOfBounds(pos)),
            Some(Some(_)) => return Err(PlayError::AlreadyOccupied(pos)),
            Some(None) => {}
        }
        if self.result().is_over() {
            return Err(PlayError::GameOver);
        }
        self.board[pos] = Some(self.to_move);
        self.history.push(pos);
        self.ply += 1;
        self.to_move = self.to_move.next();
        Ok(())
    }

    /// Take back the last move and return where it was played.
    pub fn undo(&mut self) -> Result<Pos, PlayError> {
        let pos = self.history.pop().ok_or(PlayError::NothingToUndo)?;
        self.board[pos] = None;
        self.ply -= 1;
        self.to_move = self.to_move.next();
        Ok(pos)
    }
}
