//! Error types for the round state machine and its boundary services.

use crate::game::Phase;
use std::path::PathBuf;
use thiserror::Error;

/// Bad input from the player currently holding the device.
///
/// Always recoverable, the state machine is left unchanged.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ValidationError {
    #[error("please enter player names")]
    EmptyInput,
    #[error("you need at least 3 players, got {found}")]
    TooFewPlayers { found: usize },
    #[error("player names must be unique, \"{name}\" appears twice")]
    DuplicateNames { name: String },
    #[error("please enter an answer")]
    EmptyAnswer,
    #[error("\"{target}\" is not a valid vote target")]
    InvalidTarget { target: String },
}

/// The question pool could not be used to start a round.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ResourceError {
    #[error("no questions loaded, cannot start game")]
    NoQuestionsAvailable,
    #[error("still no questions loaded for language \"{language}\", check the questions files")]
    QuestionsUnavailable { language: String },
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum GameError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error("action not allowed during {actual:?}, expected {expected:?}")]
    WrongPhase { expected: Phase, actual: Phase },
    #[error("pass the device to {player} first")]
    AwaitingHandoff { player: String },
}

/// Failure of the console front end
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Failure to produce a question pool for a language.
#[derive(Debug, Error)]
pub enum QuestionError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not parse {path}: {source}")]
    Ron {
        path: PathBuf,
        #[source]
        source: ron::de::Error,
    },
    #[error("invalid question sets: {0}")]
    InvalidQuestionSets(String),
    #[error("no question files for language \"{language}\"")]
    NoQuestionFiles { language: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config {path}: {source}")]
    Ron {
        path: PathBuf,
        #[source]
        source: ron::de::Error,
    },
}
