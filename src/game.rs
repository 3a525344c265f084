use crate::error::{GameError, ResourceError, ValidationError};
use crate::player::{build_roster, Player};
use crate::question::{QuestionPair, QuestionPool};
use crate::round_data::{evaluate, RoundData};
use crate::shuffle::{pick_index, shuffle};
use log::*;
use rand::rngs::ThreadRng;
use rand::{thread_rng, Rng};
use serde_derive::*;
use std::collections::HashMap;

/// Round progression, strictly linear apart from the reset back to `Setup`
#[derive(Clone, Copy, Eq, PartialEq, Serialize, Deserialize, Debug)]
pub enum Phase {
    Setup,
    Asking,
    Discussing,
    Voting,
    Results,
}

#[derive(Clone, Eq, PartialEq, Serialize, Deserialize, Debug)]
pub struct Answer {
    pub name: String,
    pub answer: String,
}

/// What everyone sees once all answers are in
#[derive(Clone, Eq, PartialEq, Serialize, Deserialize, Debug)]
pub struct Discussion {
    pub question: String,
    pub answers: Vec<Answer>,
}

#[derive(Clone, Eq, PartialEq, Serialize, Deserialize, Debug)]
pub struct VoteOption {
    pub name: String,
    pub answer: String,
}

struct Round {
    players: Vec<Player>,
    question: QuestionPair,
    impostor: usize,
    phase: Phase,

    /// Whose turn it is while asking or voting
    cursor: usize,

    /// Voter name to target name
    votes: HashMap<String, String>,

    /// Player indices in discussion display order
    discussion_order: Vec<usize>,

    result: Option<RoundData>,
}

impl Round {
    fn current_player(&self) -> Option<&Player> {
        match self.phase {
            Phase::Asking | Phase::Voting => self.players.get(self.cursor),
            _ => None,
        }
    }
}

/// The single owned state of a game on one shared device
///
/// Every operation checks the phase first and leaves the state untouched when
/// it returns an error.
pub struct GameRoom<R = ThreadRng> {
    rng: R,
    questions: QuestionPool,
    round: Option<Round>,

    /// Names of the previous round, one per line
    roster_seed: String,
}

impl GameRoom<ThreadRng> {
    pub fn new() -> Self {
        GameRoom::with_rng(thread_rng())
    }
}

impl Default for GameRoom<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> GameRoom<R> {
    pub fn with_rng(rng: R) -> Self {
        GameRoom {
            rng,
            questions: QuestionPool::default(),
            round: None,
            roster_seed: String::new(),
        }
    }

    pub fn set_questions(&mut self, questions: QuestionPool) {
        self.questions = questions;
    }

    pub fn phase(&self) -> Phase {
        self.round.as_ref().map_or(Phase::Setup, |round| round.phase)
    }

    pub fn roster_seed(&self) -> &str {
        &self.roster_seed
    }

    /// Players in turn order, empty during setup
    #[cfg(test)]
    pub fn players(&self) -> &[Player] {
        self.round
            .as_ref()
            .map_or(&[][..], |round| round.players.as_slice())
    }

    /// The player holding the device while asking or voting
    pub fn current_player(&self) -> Option<&Player> {
        self.round.as_ref().and_then(Round::current_player)
    }

    pub fn start_round(&mut self, raw_names: &str) -> Result<Phase, GameError> {
        self.expect_phase(Phase::Setup)?;

        let mut players = build_roster(raw_names, &mut self.rng)?;

        if self.questions.is_empty() {
            return Err(ResourceError::NoQuestionsAvailable.into());
        }

        let question = self
            .questions
            .draw_pair(&mut self.rng)
            .ok_or(ResourceError::NoQuestionsAvailable)?;
        let impostor = pick_index(players.len(), &mut self.rng).ok_or(
            ValidationError::TooFewPlayers {
                found: players.len(),
            },
        )?;
        players[impostor].is_impostor = true;

        info!("Round started with {} players", players.len());
        debug!("Question pair: {:?}", question);
        debug!("Impostor: {}", players[impostor].name);

        self.round = Some(Round {
            players,
            question,
            impostor,
            phase: Phase::Asking,
            cursor: 0,
            votes: HashMap::new(),
            discussion_order: Vec::new(),
            result: None,
        });

        Ok(Phase::Asking)
    }

    /// The question for the player at the cursor, never anyone else's
    pub fn reveal_question(&self) -> Result<&str, GameError> {
        let round = self.round_in(Phase::Asking)?;
        let player = &round.players[round.cursor];

        if player.is_impostor {
            Ok(&round.question.impostor)
        } else {
            Ok(&round.question.official)
        }
    }

    pub fn submit_answer(&mut self, text: &str) -> Result<Phase, GameError> {
        self.expect_phase(Phase::Asking)?;

        let answer = text.trim();
        if answer.is_empty() {
            return Err(ValidationError::EmptyAnswer.into());
        }

        let Self { rng, round, .. } = self;
        let round = match round.as_mut() {
            Some(round) => round,
            None => return Err(wrong_phase(Phase::Asking, Phase::Setup)),
        };

        let player = &mut round.players[round.cursor];
        player.answer = answer.to_string();
        debug!("{} answered: {}", player.name, answer);

        round.cursor += 1;

        if round.cursor >= round.players.len() {
            let mut order: Vec<usize> = (0..round.players.len()).collect();
            shuffle(&mut order, rng);
            round.discussion_order = order;
            round.phase = Phase::Discussing;
            info!("All answers collected, discussion starts");
        }

        Ok(round.phase)
    }

    /// The official question and every answer in a shuffled order
    pub fn discussion(&self) -> Result<Discussion, GameError> {
        let round = self.round_in(Phase::Discussing)?;

        let answers = round
            .discussion_order
            .iter()
            .map(|&index| {
                let player = &round.players[index];
                Answer {
                    name: player.name.clone(),
                    answer: player.answer.clone(),
                }
            })
            .collect();

        Ok(Discussion {
            question: round.question.official.clone(),
            answers,
        })
    }

    pub fn start_voting(&mut self) -> Result<Phase, GameError> {
        let round = self.round_in_mut(Phase::Discussing)?;

        round.cursor = 0;
        round.votes.clear();
        round.phase = Phase::Voting;
        info!("Voting starts");

        Ok(Phase::Voting)
    }

    /// Everyone the current voter may accuse, which never includes themselves
    pub fn voting_options(&self) -> Result<Vec<VoteOption>, GameError> {
        let round = self.round_in(Phase::Voting)?;

        Ok(round
            .players
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != round.cursor)
            .map(|(_, player)| VoteOption {
                name: player.name.clone(),
                answer: player.answer.clone(),
            })
            .collect())
    }

    pub fn cast_vote(&mut self, target: &str) -> Result<Phase, GameError> {
        let round = self.round_in_mut(Phase::Voting)?;

        let voter = round.players[round.cursor].name.clone();
        let eligible = round
            .players
            .iter()
            .any(|player| player.name == target && player.name != voter);
        if !eligible {
            return Err(ValidationError::InvalidTarget {
                target: target.to_string(),
            }
            .into());
        }

        debug!("{} voted for {}", voter, target);
        round.votes.insert(voter, target.to_string());
        round.cursor += 1;

        if round.cursor >= round.players.len() {
            let impostor = round.players[round.impostor].name.clone();
            let result = evaluate(&mut round.players, &round.votes, &impostor);
            info!("All votes cast, winner: {:?}", result.winner);

            round.result = Some(result);
            round.phase = Phase::Results;
        }

        Ok(round.phase)
    }

    pub fn results(&self) -> Result<&RoundData, GameError> {
        let round = self.round_in(Phase::Results)?;
        round
            .result
            .as_ref()
            .ok_or_else(|| wrong_phase(Phase::Results, round.phase))
    }

    /// Drops the round and keeps only the player names for the next one
    pub fn play_again(&mut self) -> &str {
        if let Some(round) = self.round.take() {
            self.roster_seed = round
                .players
                .iter()
                .map(|player| player.name.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            info!("Round discarded, back to setup");
        }

        &self.roster_seed
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), GameError> {
        let actual = self.phase();
        if actual != expected {
            return Err(wrong_phase(expected, actual));
        }
        Ok(())
    }

    fn round_in(&self, expected: Phase) -> Result<&Round, GameError> {
        let actual = self.phase();
        match self.round.as_ref() {
            Some(round) if actual == expected => Ok(round),
            _ => Err(wrong_phase(expected, actual)),
        }
    }

    fn round_in_mut(&mut self, expected: Phase) -> Result<&mut Round, GameError> {
        let actual = self.phase();
        match self.round.as_mut() {
            Some(round) if actual == expected => Ok(round),
            _ => Err(wrong_phase(expected, actual)),
        }
    }
}

fn wrong_phase(expected: Phase, actual: Phase) -> GameError {
    GameError::WrongPhase { expected, actual }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::QuestionSet;
    use crate::round_data::Winner;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool() -> QuestionPool {
        QuestionPool::new(vec![
            QuestionSet::new(vec![
                "How many pets do you own?".to_string(),
                "How many siblings do you have?".to_string(),
            ])
            .unwrap(),
        ])
    }

    fn room(seed: u64) -> GameRoom<StdRng> {
        let mut room = GameRoom::with_rng(StdRng::seed_from_u64(seed));
        room.set_questions(pool());
        room
    }

    fn answer_all(room: &mut GameRoom<StdRng>) {
        while room.phase() == Phase::Asking {
            let name = room.current_player().unwrap().name.clone();
            room.submit_answer(&format!("answer of {}", name)).unwrap();
        }
    }

    fn impostor_name(room: &GameRoom<StdRng>) -> String {
        room.players()
            .iter()
            .find(|p| p.is_impostor)
            .unwrap()
            .name
            .clone()
    }

    /// Plays a round through to the end with the given voter to target map
    fn vote_all(room: &mut GameRoom<StdRng>, ballot: &HashMap<&str, &str>) {
        room.start_voting().unwrap();
        while room.phase() == Phase::Voting {
            let voter = room.current_player().unwrap().name.clone();
            room.cast_vote(ballot[voter.as_str()]).unwrap();
        }
    }

    #[test]
    fn test_start_round() {
        let mut room = room(30);
        assert_eq!(room.phase(), Phase::Setup);

        assert_eq!(room.start_round("Alice, Bob, Charlie"), Ok(Phase::Asking));
        assert_eq!(room.players().len(), 3);
        assert_eq!(room.players().iter().filter(|p| p.is_impostor).count(), 1);
        assert_eq!(
            room.current_player().map(|p| p.name.clone()),
            Some(room.players()[0].name.clone())
        );
    }

    #[test]
    fn test_start_round_validation_keeps_setup() {
        let mut room = room(31);

        assert_eq!(
            room.start_round("Alice, Bob"),
            Err(ValidationError::TooFewPlayers { found: 2 }.into())
        );
        assert_eq!(
            room.start_round("Alice, Bob, Alice"),
            Err(ValidationError::DuplicateNames {
                name: "Alice".to_string()
            }
            .into())
        );
        assert_eq!(room.start_round(""), Err(ValidationError::EmptyInput.into()));
        assert_eq!(room.phase(), Phase::Setup);
    }

    #[test]
    fn test_start_round_without_questions() {
        let mut room = GameRoom::with_rng(StdRng::seed_from_u64(32));

        assert_eq!(
            room.start_round("Alice, Bob, Charlie"),
            Err(ResourceError::NoQuestionsAvailable.into())
        );
        assert_eq!(room.phase(), Phase::Setup);

        room.set_questions(pool());
        assert_eq!(room.start_round("Alice, Bob, Charlie"), Ok(Phase::Asking));
    }

    #[test]
    fn test_impostor_chosen_uniformly() {
        let mut room = room(33);
        let mut counts: HashMap<String, usize> = HashMap::new();

        for _ in 0..3000 {
            room.start_round("A, B, C").unwrap();
            *counts.entry(impostor_name(&room)).or_default() += 1;
            room.play_again();
        }

        assert_eq!(counts.len(), 3);
        for count in counts.values() {
            assert!(*count > 850 && *count < 1150, "skewed count {}", count);
        }
    }

    #[test]
    fn test_reveal_question_follows_cursor() {
        let mut room = room(34);
        room.start_round("A, B, C, D").unwrap();

        while room.phase() == Phase::Asking {
            let player = room.current_player().unwrap().clone();
            let question = room.reveal_question().unwrap().to_string();

            if player.is_impostor {
                assert_ne!(question, room.round.as_ref().unwrap().question.official);
            } else {
                assert_eq!(question, room.round.as_ref().unwrap().question.official);
            }

            room.submit_answer("42").unwrap();
        }

        assert_eq!(
            room.reveal_question(),
            Err(GameError::WrongPhase {
                expected: Phase::Asking,
                actual: Phase::Discussing
            })
        );
    }

    #[test]
    fn test_empty_answer_rejected() {
        let mut room = room(35);
        room.start_round("A, B, C").unwrap();
        let first = room.current_player().unwrap().name.clone();

        assert_eq!(
            room.submit_answer("   "),
            Err(ValidationError::EmptyAnswer.into())
        );
        assert_eq!(room.current_player().unwrap().name, first);

        assert_eq!(room.submit_answer("  blue  "), Ok(Phase::Asking));
        assert_eq!(room.players()[0].answer, "blue");
    }

    #[test]
    fn test_last_answer_moves_to_discussion() {
        let mut room = room(36);
        room.start_round("A, B, C").unwrap();
        answer_all(&mut room);

        assert_eq!(room.phase(), Phase::Discussing);
        assert_eq!(room.current_player(), None);

        let discussion = room.discussion().unwrap();
        assert_eq!(discussion.question, room.round.as_ref().unwrap().question.official);

        let mut names: Vec<String> = discussion.answers.iter().map(|a| a.name.clone()).collect();
        names.sort();
        assert_eq!(names, vec!["A", "B", "C"]);
        for answer in &discussion.answers {
            assert_eq!(answer.answer, format!("answer of {}", answer.name));
        }

        // stable while discussing
        assert_eq!(room.discussion().unwrap(), discussion);
    }

    #[test]
    fn test_voting_options_exclude_voter() {
        let mut room = room(37);
        room.start_round("A, B, C, D").unwrap();
        answer_all(&mut room);
        room.start_voting().unwrap();

        while room.phase() == Phase::Voting {
            let voter = room.current_player().unwrap().name.clone();
            let options = room.voting_options().unwrap();

            assert_eq!(options.len(), 3);
            assert!(options.iter().all(|o| o.name != voter));
            assert!(options.iter().all(|o| o.answer.starts_with("answer of")));

            assert_eq!(
                room.cast_vote(&voter),
                Err(ValidationError::InvalidTarget { target: voter.clone() }.into())
            );
            assert_eq!(
                room.cast_vote("Nobody"),
                Err(ValidationError::InvalidTarget {
                    target: "Nobody".to_string()
                }
                .into())
            );
            assert_eq!(room.current_player().unwrap().name, voter);

            let target = options[0].name.clone();
            room.cast_vote(&target).unwrap();
        }

        assert_eq!(room.phase(), Phase::Results);
    }

    #[test]
    fn test_detectives_win_when_impostor_uniquely_accused() {
        let mut room = room(38);
        room.start_round("A, B, C, D").unwrap();
        answer_all(&mut room);

        let impostor = impostor_name(&room);
        let others: Vec<String> = room
            .players()
            .iter()
            .map(|p| p.name.clone())
            .filter(|name| *name != impostor)
            .collect();

        let mut ballot: HashMap<&str, &str> = HashMap::new();
        for name in &others {
            ballot.insert(name.as_str(), impostor.as_str());
        }
        ballot.insert(impostor.as_str(), others[0].as_str());

        vote_all(&mut room, &ballot);

        let results = room.results().unwrap();
        assert_eq!(results.impostor, impostor);
        assert_eq!(results.max_votes, 3);
        assert_eq!(results.winner, Winner::Detectives);
        assert_eq!(results.tally[0].name, impostor);
    }

    #[test]
    fn test_impostor_wins_three_way_tie() {
        let mut room = room(39);
        room.start_round("A, B, C").unwrap();
        answer_all(&mut room);

        let ballot: HashMap<&str, &str> = vec![("A", "B"), ("B", "C"), ("C", "A")]
            .into_iter()
            .collect();
        vote_all(&mut room, &ballot);

        let results = room.results().unwrap();
        assert_eq!(results.count_at_max, 3);
        assert_eq!(results.winner, Winner::Impostor);
    }

    #[test]
    fn test_start_voting_clears_previous_votes() {
        let mut room = room(40);
        room.start_round("A, B, C").unwrap();
        answer_all(&mut room);

        room.round.as_mut().unwrap().votes.insert("A".to_string(), "B".to_string());
        room.start_voting().unwrap();

        assert!(room.round.as_ref().unwrap().votes.is_empty());
        assert_eq!(room.current_player().unwrap().name, room.players()[0].name);
    }

    #[test]
    fn test_operations_in_wrong_phase() {
        let mut room = room(41);

        assert_eq!(
            room.submit_answer("x"),
            Err(GameError::WrongPhase {
                expected: Phase::Asking,
                actual: Phase::Setup
            })
        );
        assert_eq!(
            room.submit_answer(""),
            Err(GameError::WrongPhase {
                expected: Phase::Asking,
                actual: Phase::Setup
            })
        );
        assert!(room.start_voting().is_err());
        assert!(room.cast_vote("A").is_err());
        assert!(room.results().is_err());

        room.start_round("A, B, C").unwrap();
        assert_eq!(
            room.start_round("A, B, C"),
            Err(GameError::WrongPhase {
                expected: Phase::Setup,
                actual: Phase::Asking
            })
        );
        assert!(room.voting_options().is_err());
        assert!(room.discussion().is_err());
    }

    #[test]
    fn test_play_again_keeps_names_only() {
        let mut room = room(42);
        room.start_round("Alice\nBob\nCharlie").unwrap();
        answer_all(&mut room);

        let order: Vec<String> = room.players().iter().map(|p| p.name.clone()).collect();
        let seed = room.play_again().to_string();

        assert_eq!(seed, order.join("\n"));
        assert_eq!(room.phase(), Phase::Setup);
        assert!(room.players().is_empty());

        room.start_round(&seed).unwrap();
        assert!(room.players().iter().all(|p| p.answer.is_empty()));
        assert_eq!(room.players().iter().filter(|p| p.is_impostor).count(), 1);
    }
}
