use crate::error::ValidationError;
use crate::shuffle::shuffle;
use rand::Rng;
use serde_derive::*;
use std::collections::HashSet;

pub const MIN_PLAYERS: usize = 3;

#[derive(Clone, Eq, PartialEq, Serialize, Deserialize, Debug)]
pub struct Player {
    pub name: String,
    pub answer: String,
    pub votes_received: usize,
    pub is_impostor: bool,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Player {
            name: name.into(),
            answer: String::new(),
            votes_received: 0,
            is_impostor: false,
        }
    }
}

/// Splits raw roster input on newlines and commas
///
/// Names are trimmed and blank entries dropped. Uniqueness is case-sensitive,
/// so "Alice" and "alice" are two different players.
pub fn parse_names(raw: &str) -> Result<Vec<String>, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    let names: Vec<String> = raw
        .split(|c: char| c == '\n' || c == ',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    if names.len() < MIN_PLAYERS {
        return Err(ValidationError::TooFewPlayers { found: names.len() });
    }

    let mut seen = HashSet::new();
    for name in &names {
        if !seen.insert(name.as_str()) {
            return Err(ValidationError::DuplicateNames { name: name.clone() });
        }
    }

    Ok(names)
}

/// Builds the player list for a new round in a random turn order
pub fn build_roster<R: Rng + ?Sized>(
    raw: &str,
    rng: &mut R,
) -> Result<Vec<Player>, ValidationError> {
    let mut players: Vec<Player> = parse_names(raw)?.into_iter().map(Player::new).collect();
    shuffle(&mut players, rng);
    Ok(players)
}
