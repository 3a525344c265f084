use crate::error::{GameError, QuestionError, ResourceError};
use crate::game::{GameRoom, Phase};
use crate::message::{Command, Screen, Turn};
use crate::question::{QuestionPool, QuestionSource};
use log::*;
use rand::rngs::ThreadRng;
use rand::Rng;

/// Drives a `GameRoom` from presentation commands
///
/// Owns the question source and the "pass the device" interstitial that sits
/// in front of every question reveal and every vote.
pub struct Host<R = ThreadRng> {
    room: GameRoom<R>,
    source: Box<dyn QuestionSource>,

    language: String,
    fallback_language: String,

    /// Set while the device has to change hands before the next turn
    handoff: bool,

    /// Last question loading problem, shown on the setup screen
    notice: Option<String>,
}

impl<R: Rng> Host<R> {
    pub fn new(
        room: GameRoom<R>,
        source: Box<dyn QuestionSource>,
        language: impl Into<String>,
        fallback_language: impl Into<String>,
    ) -> Self {
        Host {
            room,
            source,
            language: language.into(),
            fallback_language: fallback_language.into(),
            handoff: false,
            notice: None,
        }
    }

    #[cfg(test)]
    pub fn language(&self) -> &str {
        &self.language
    }

    #[cfg(test)]
    pub fn room(&self) -> &GameRoom<R> {
        &self.room
    }

    /// Fetches the question pool for the active language
    ///
    /// Falls back to the fallback language once. On failure the pool is
    /// emptied and the error is kept as a notice for the setup screen.
    pub async fn load_questions(&mut self) -> Result<usize, QuestionError> {
        let mut result = self.source.draw_question_pool(&self.language).await;

        if let Err(err) = &result {
            if self.language != self.fallback_language {
                warn!(
                    "Could not load questions for \"{}\" ({}), falling back to \"{}\"",
                    self.language, err, self.fallback_language
                );
                self.language = self.fallback_language.clone();
                result = self.source.draw_question_pool(&self.language).await;
            }
        }

        match result {
            Ok(pool) => {
                let count = pool.len();
                self.room.set_questions(pool);
                self.notice = None;
                Ok(count)
            }
            Err(err) => {
                error!("Error loading questions: {}", err);
                self.room.set_questions(QuestionPool::default());
                self.notice = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn handle(&mut self, command: Command) -> Result<Screen, GameError> {
        debug!("Handling {:?}", command);

        match command {
            Command::SetLanguage { language } => {
                self.expect_phase(Phase::Setup)?;
                info!("Language set to \"{}\"", language);
                self.language = language;
                let _ = self.load_questions().await;
            }

            Command::StartGame { names } => {
                self.start_game(&names).await?;
            }

            Command::Continue => match self.room.phase() {
                Phase::Asking | Phase::Voting => self.handoff = false,
                actual => {
                    return Err(GameError::WrongPhase {
                        expected: Phase::Asking,
                        actual,
                    })
                }
            },

            Command::SubmitAnswer { text } => {
                self.expect_handed_over()?;
                self.room.submit_answer(&text)?;
                self.handoff = true;
            }

            Command::ProceedToVoting => {
                self.room.start_voting()?;
                self.handoff = true;
            }

            Command::CastVote { target } => {
                self.expect_handed_over()?;
                self.room.cast_vote(&target)?;
                self.handoff = true;
            }

            Command::PlayAgain => {
                self.room.play_again();
                self.handoff = false;
            }
        }

        self.screen()
    }

    /// The snapshot for the current state
    pub fn screen(&self) -> Result<Screen, GameError> {
        let screen = match self.room.phase() {
            Phase::Setup => Screen::Setup {
                roster_seed: self.room.roster_seed().to_string(),
                language: self.language.clone(),
                languages: self.source.available_languages(),
                notice: self.notice.clone(),
            },

            Phase::Asking if self.handoff => Screen::PassDevice {
                player: self.current_name(),
                turn: Turn::Answer,
            },
            Phase::Asking => Screen::Question {
                player: self.current_name(),
                question: self.room.reveal_question()?.to_string(),
            },

            Phase::Discussing => {
                let discussion = self.room.discussion()?;
                Screen::Discussion {
                    question: discussion.question,
                    answers: discussion.answers,
                }
            }

            Phase::Voting if self.handoff => Screen::PassDevice {
                player: self.current_name(),
                turn: Turn::Vote,
            },
            Phase::Voting => Screen::Voting {
                voter: self.current_name(),
                is_impostor: self
                    .room
                    .current_player()
                    .map_or(false, |player| player.is_impostor),
                options: self.room.voting_options()?,
            },

            Phase::Results => Screen::Results {
                result: self.room.results()?.clone(),
            },
        };

        Ok(screen)
    }

    async fn start_game(&mut self, names: &str) -> Result<(), GameError> {
        match self.room.start_round(names) {
            Err(GameError::Resource(ResourceError::NoQuestionsAvailable)) => {
                warn!("No questions loaded, reloading \"{}\"", self.language);
                let _ = self.load_questions().await;

                let language = self.language.clone();
                self.room.start_round(names).map_err(|err| match err {
                    GameError::Resource(ResourceError::NoQuestionsAvailable) => {
                        GameError::from(ResourceError::QuestionsUnavailable { language })
                    }
                    other => other,
                })?;
            }
            result => {
                result?;
            }
        }

        self.notice = None;
        self.handoff = true;
        Ok(())
    }

    fn current_name(&self) -> String {
        self.room
            .current_player()
            .map(|player| player.name.clone())
            .unwrap_or_default()
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), GameError> {
        let actual = self.room.phase();
        if actual != expected {
            return Err(GameError::WrongPhase { expected, actual });
        }
        Ok(())
    }

    fn expect_handed_over(&self) -> Result<(), GameError> {
        let turn_phase = matches!(self.room.phase(), Phase::Asking | Phase::Voting);
        if self.handoff && turn_phase {
            return Err(GameError::AwaitingHandoff {
                player: self.current_name(),
            });
        }
        Ok(())
    }
}
