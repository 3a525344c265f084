use crate::player::Player;
use serde_derive::*;
use std::collections::HashMap;

#[derive(Clone, Copy, Eq, PartialEq, Serialize, Deserialize, Debug)]
pub enum Winner {
    Detectives,
    Impostor,
}

#[derive(Clone, Eq, PartialEq, Serialize, Deserialize, Debug)]
pub struct VoteCount {
    pub name: String,
    pub votes: usize,
}

/// Outcome of a finished round
#[derive(Clone, Eq, PartialEq, Serialize, Deserialize, Debug)]
pub struct RoundData {
    pub impostor: String,

    /// Every player, most votes first
    pub tally: Vec<VoteCount>,
    pub max_votes: usize,
    pub count_at_max: usize,

    pub winner: Winner,
}

/// Tallies the votes and decides who won
///
/// `votes` maps voter name to target name. Votes for unknown names are
/// dropped. The detectives only win when the impostor holds the maximum
/// alone; no votes at all, or any tie at the top, goes to the impostor.
pub fn evaluate(
    players: &mut [Player],
    votes: &HashMap<String, String>,
    impostor: &str,
) -> RoundData {
    for player in players.iter_mut() {
        player.votes_received = 0;
    }

    for target in votes.values() {
        if let Some(player) = players.iter_mut().find(|p| &p.name == target) {
            player.votes_received += 1;
        }
    }

    let max_votes = players.iter().map(|p| p.votes_received).max().unwrap_or(0);
    let count_at_max = players
        .iter()
        .filter(|p| p.votes_received == max_votes)
        .count();
    let impostor_votes = players
        .iter()
        .find(|p| p.name == impostor)
        .map(|p| p.votes_received);

    let winner = if max_votes > 0 && impostor_votes == Some(max_votes) && count_at_max == 1 {
        Winner::Detectives
    } else {
        Winner::Impostor
    };

    let mut tally: Vec<VoteCount> = players
        .iter()
        .map(|p| VoteCount {
            name: p.name.clone(),
            votes: p.votes_received,
        })
        .collect();
    tally.sort_by(|a, b| b.votes.cmp(&a.votes));

    RoundData {
        impostor: impostor.to_string(),
        tally,
        max_votes,
        count_at_max,
        winner,
    }
}
