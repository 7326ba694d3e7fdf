use std::{collections::HashMap, error::Error, fmt::Display};

use log::{debug, info};
use policy::Solver;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use subtle::ConstantTimeEq;
use tictactoe::{Game, PlayError, Pos, Role, Rules};
use tokio::sync::broadcast;

pub const GUEST: &str = "guest";
pub const BOT: &str = "bot";

const KEY_BYTES: usize = 32;
const UPDATE_CAPACITY: usize = 16;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    pub game_id: String,
    pub move_index: usize,
    pub move_position: usize,
    pub player: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Players {
    pub attacker: String,
    pub defender: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GameState {
    pub finished: bool,
    pub winner: Option<String>,
}

/// Everything a client needs to draw a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub moves: Vec<MoveRecord>,
    pub players: Players,
    pub game_state: GameState,
}

fn player(role: Role) -> &'static str {
    match role {
        Role::Attacker => GUEST,
        Role::Defender => BOT,
    }
}

/// A game between a guest and the bot.
pub struct Room {
    id: String,
    key: String,
    game: Game,
    updates: broadcast::Sender<GameView>,
}

impl Room {
    fn new(id: String, key: String, rules: Rules) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CAPACITY);
        Room {
            id,
            key,
            game: Game::new(rules),
            updates,
        }
    }

    pub fn view(&self) -> GameView {
        let width = self.game.rules().width;
        let moves = self
            .game
            .history()
            .iter()
            .enumerate()
            .map(|(i, pos)| MoveRecord {
                game_id: self.id.clone(),
                move_index: i,
                move_position: pos.index(width),
                // the attacker plays the even moves
                player: player(if i % 2 == 0 { Role::Attacker } else { Role::Defender }).to_owned(),
            })
            .collect();
        let result = self.game.result();
        GameView {
            moves,
            players: Players {
                attacker: GUEST.to_owned(),
                defender: BOT.to_owned(),
            },
            game_state: GameState {
                finished: result.is_over(),
                winner: result.winner().map(|role| player(role).to_owned()),
            },
        }
    }

    fn play(&mut self, position: usize) -> Result<(), RoomError> {
        let rules = self.game.rules();
        if position >= rules.cells() {
            return Err(RoomError::OutOfRange(position));
        }
        let pos = Pos::from_index(position, rules.width);
        self.game.play(pos)?;
        debug!("game {}: {} played {pos}", self.id, player(self.game.to_move.next()));
        Ok(())
    }
}

/// All rooms hosted by the server.
pub struct Lobby {
    rules: Rules,
    solver: Solver,
    rooms: HashMap<String, Room>,
    next_id: u64,
    rng: StdRng,
}

impl Lobby {
    pub fn new(rules: Rules, solver: Solver) -> Self {
        Lobby {
            rules,
            solver,
            rooms: HashMap::new(),
            next_id: 1,
            rng: StdRng::from_entropy(),
        }
    }

    /// Open a new room, returns its id and the key needed to move in it.
    pub fn create(&mut self) -> (String, String) {
        let id = self.next_id.to_string();
        self.next_id += 1;
        let key: String = (0..KEY_BYTES)
            .map(|_| format!("{:02x}", self.rng.gen::<u8>()))
            .collect();
        self.rooms
            .insert(id.clone(), Room::new(id.clone(), key.clone(), self.rules));
        info!("opened game {id}");
        (id, key)
    }

    fn room(&self, id: &str) -> Result<&Room, RoomError> {
        self.rooms
            .get(id)
            .ok_or_else(|| RoomError::UnknownGame(id.to_owned()))
    }

    pub fn view(&self, id: &str) -> Result<GameView, RoomError> {
        self.room(id).map(Room::view)
    }

    pub fn subscribe(&self, id: &str) -> Result<broadcast::Receiver<GameView>, RoomError> {
        self.room(id).map(|room| room.updates.subscribe())
    }

    /// Number of live receivers following a room.
    pub fn subscribers(&self, id: &str) -> Result<usize, RoomError> {
        self.room(id).map(|room| room.updates.receiver_count())
    }

    /// Play the guest's move and the bot's answer.
    pub fn make_move(&mut self, id: &str, key: Option<&str>, position: usize) -> Result<GameView, RoomError> {
        let room = self
            .rooms
            .get_mut(id)
            .ok_or_else(|| RoomError::UnknownGame(id.to_owned()))?;
        let matches = key.map_or(false, |key| {
            bool::from(key.as_bytes().ct_eq(room.key.as_bytes()))
        });
        if !matches {
            return Err(RoomError::WrongKey);
        }
        if room.game.result().is_over() {
            return Err(RoomError::Finished);
        }
        if room.game.to_move != Role::Attacker {
            return Err(RoomError::NotYourTurn);
        }

        room.play(position)?;
        if !room.game.result().is_over() {
            if let Some(pos) = self.solver.solve(&room.game.board, Role::Defender) {
                room.play(pos.index(self.rules.width))?;
            }
        }

        let view = room.view();
        let result = room.game.result();
        if result.is_over() {
            info!("game {id} finished: {result:?}");
        }
        // nobody might be listening
        let _ = room.updates.send(view.clone());
        Ok(view)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum RoomError {
    UnknownGame(String),
    WrongKey,
    Finished,
    NotYourTurn,
    OutOfRange(usize),
    Play(PlayError),
}

impl Display for RoomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoomError::UnknownGame(id) => write!(f, "there is no game {id}"),
            RoomError::WrongKey => write!(f, "wrong game key"),
            RoomError::Finished => write!(f, "the game is already finished"),
            RoomError::NotYourTurn => write!(f, "it is not your turn"),
            RoomError::OutOfRange(position) => write!(f, "position {position} is not on the board"),
            RoomError::Play(err) => err.fmt(f),
        }
    }
}

impl Error for RoomError {}

impl From<PlayError> for RoomError {
    fn from(e: PlayError) -> Self {
        RoomError::Play(e)
    }
}
