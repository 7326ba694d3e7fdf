use std::{fmt::Display, str::FromStr};

use crate::ParseRoleError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Attacker,
    Defender,
}

impl Role {
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Role::Attacker => Role::Defender,
            Role::Defender => Role::Attacker,
        }
    }

    /// Value of this role's pieces in a board identifier.
    pub const fn value(self) -> i8 {
        match self {
            Role::Attacker => -1,
            Role::Defender => 1,
        }
    }

    pub const fn from_value(value: i8) -> Option<Self> {
        match value {
            -1 => Some(Role::Attacker),
            1 => Some(Role::Defender),
            _ => None,
        }
    }

    pub const fn symbol(self) -> char {
        match self {
            Role::Attacker => 'x',
            Role::Defender => 'o',
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            Role::Attacker => "attacker",
            Role::Defender => "defender",
        })
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "attacker" | "x" => Ok(Role::Attacker),
            "defender" | "o" => Ok(Role::Defender),
            _ => Err(ParseRoleError(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Role;

    #[test]
    fn attacker_is_negative() {
        assert_eq!(Role::Attacker.value(), -1);
        assert_eq!(Role::Defender.value(), 1);
        assert_eq!(Role::from_value(-1), Some(Role::Attacker));
        assert_eq!(Role::from_value(0), None);
    }

    #[test]
    fn parse_names_and_symbols() {
        assert_eq!("attacker".parse::<Role>().unwrap(), Role::Attacker);
        assert_eq!("O".parse::<Role>().unwrap(), Role::Defender);
        assert!("bot".parse::<Role>().is_err());
        assert_eq!(Role::Defender.to_string().parse::<Role>().unwrap(), Role::Defender);
    }
}
