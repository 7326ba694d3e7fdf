use std::{
    collections::HashMap,
    error::Error,
    fmt::Display,
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use log::{info, warn};
use tictactoe::{Role, Rules};

/// Values of board states, keyed by board identifier.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolicyTable {
    scores: HashMap<String, f64>,
}

impl PolicyTable {
    pub fn new() -> Self {
        PolicyTable::default()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Value of a state, unknown states are worth 0.
    pub fn get(&self, identifier: &str) -> f64 {
        self.scores.get(identifier).copied().unwrap_or_default()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.scores.contains_key(identifier)
    }

    pub fn insert(&mut self, identifier: String, value: f64) {
        self.scores.insert(identifier, value);
    }

    /// Apply `f` to the value of a state (starting from 0) and return the new value.
    pub fn update(&mut self, identifier: &str, f: impl FnOnce(f64) -> f64) -> f64 {
        let value = self.scores.entry(identifier.to_owned()).or_insert(0.);
        *value = f(*value);
        *value
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.scores.iter().map(|(id, &value)| (id.as_str(), value))
    }

    pub fn file_name(rules: Rules, role: Role) -> String {
        format!(
            "policy_{}_{}_{}_{}.policy",
            rules.width,
            rules.height,
            rules.win_by,
            role.symbol()
        )
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let reader = BufReader::new(File::open(path)?);
        let mut table = PolicyTable::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let (identifier, value) = line
                .trim()
                .rsplit_once(' ')
                .ok_or(TableError::Malformed { line: i + 1 })?;
            let value = value.parse().map_err(|_| TableError::InvalidValue {
                line: i + 1,
                value: value.to_owned(),
            })?;
            table.insert(identifier.to_owned(), value);
        }
        Ok(table)
    }

    /// Load a table, falling back to an empty one.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match PolicyTable::load(path) {
            Ok(table) => {
                info!("loaded {} states from {}", table.len(), path.display());
                table
            }
            Err(err) => {
                warn!("failed to load {}: {err}", path.display());
                PolicyTable::new()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TableError> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let mut writer = BufWriter::new(File::create(path)?);
        for (identifier, value) in entries {
            writeln!(writer, "{identifier} {value}")?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[derive(Debug)]
pub enum TableError {
    Io(io::Error),
    Malformed { line: usize },
    InvalidValue { line: usize, value: String },
}

impl Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableError::Io(err) => err.fmt(f),
            TableError::Malformed { line } => write!(f, "line {line} is not an identifier and a value"),
            TableError::InvalidValue { line, value } => {
                write!(f, "line {line} has value \"{value}\" which is not a number")
            }
        }
    }
}

impl Error for TableError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TableError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for TableError {
    fn from(e: io::Error) -> Self {
        TableError::Io(e)
    }
}
