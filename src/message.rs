use crate::game::{Answer, VoteOption};
use crate::round_data::RoundData;
use serde_derive::*;

/// Input from whoever holds the device
#[derive(Clone, Eq, PartialEq, Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
pub enum Command {
    SetLanguage { language: String },
    StartGame { names: String },
    /// Dismisses the "pass the device" screen
    Continue,
    SubmitAnswer { text: String },
    ProceedToVoting,
    CastVote { target: String },
    PlayAgain,
}

#[derive(Clone, Copy, Eq, PartialEq, Serialize, Deserialize, Debug)]
pub enum Turn {
    Answer,
    Vote,
}

/// Read-only snapshot pushed to the presentation layer
#[derive(Clone, Eq, PartialEq, Serialize, Deserialize, Debug)]
#[serde(tag = "screen")]
pub enum Screen {
    Setup {
        roster_seed: String,
        language: String,
        languages: Vec<String>,
        notice: Option<String>,
    },
    PassDevice {
        player: String,
        turn: Turn,
    },
    Question {
        player: String,
        question: String,
    },
    Discussion {
        question: String,
        answers: Vec<Answer>,
    },
    Voting {
        voter: String,
        is_impostor: bool,
        options: Vec<VoteOption>,
    },
    Results {
        result: RoundData,
    },
}

/// One line of output in JSON mode
#[derive(Clone, Eq, PartialEq, Serialize, Deserialize, Debug)]
#[serde(untagged)]
pub enum Reply {
    Screen(Screen),
    Error { error: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_command_json() {
        let command: Command =
            serde_json::from_str(r#"{"type": "CastVote", "target": "Bob"}"#).unwrap();
        assert_eq!(
            command,
            Command::CastVote {
                target: "Bob".to_string()
            }
        );

        let command: Command = serde_json::from_str(r#"{"type": "Continue"}"#).unwrap();
        assert_eq!(command, Command::Continue);
    }

    #[test]
    fn test_screen_json() {
        let screen = Screen::PassDevice {
            player: "Alice".to_string(),
            turn: Turn::Vote,
        };
        let json = serde_json::to_value(&screen).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"screen": "PassDevice", "player": "Alice", "turn": "Vote"})
        );
    }

    #[test]
    fn test_error_reply_json() {
        let reply = Reply::Error {
            error: "please enter an answer".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&reply).unwrap(),
            r#"{"error":"please enter an answer"}"#
        );
    }
}
