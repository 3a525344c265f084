//! Terminal front end.
//!
//! Text mode is meant for people sitting around one machine. JSON mode speaks
//! one `Command` per input line and answers with one `Reply` per output line,
//! so another front end can drive the game.

use crate::config::OutputMode;
use crate::error::ConsoleError;
use crate::game::VoteOption;
use crate::host::Host;
use crate::message::{Command, Reply, Screen, Turn};
use crate::round_data::Winner;
use async_std::io::{self, BufReader, Stdin};
use async_std::io::prelude::*;
use futures::StreamExt;
use log::*;
use rand::Rng;

type Lines = io::Lines<BufReader<Stdin>>;

/// Clears the terminal so the previous player's screen is gone
const CLEAR: &str = "\x1B[2J\x1B[H";

pub const RULES: &str = "\
Game Rules

Objective:
  Detectives: identify the impostor.
  Impostor: avoid being identified.

Setup:
  Enter the names of all players (minimum 3).
  One player is randomly chosen as the impostor.
  A pair of related questions is chosen: the official question for the
  detectives and a slightly different one for the impostor.

Gameplay:
  1. Questions: each player secretly sees their own question.
  2. Answers: each player gives a short answer to their question.
  3. Discussion: all answers and the official question are revealed.
     Talk it over and work out who got a different question.
  4. Voting: everyone votes for the player they suspect. Nobody can vote
     for themselves.
  5. Reveal: votes are counted and the impostor is revealed.

Winning:
  The detectives win if the impostor alone receives the most votes.
  The impostor wins otherwise, including a tie for the most votes.";

pub async fn run<R: Rng>(host: &mut Host<R>, output: OutputMode) -> Result<(), ConsoleError> {
    let mut lines = BufReader::new(io::stdin()).lines();

    match output {
        OutputMode::Json => run_json(host, &mut lines).await,
        OutputMode::Text => run_text(host, &mut lines).await,
    }
}

async fn run_json<R: Rng>(host: &mut Host<R>, lines: &mut Lines) -> Result<(), ConsoleError> {
    println!("{}", serde_json::to_string(&Reply::Screen(host.screen()?))?);

    while let Some(line) = lines.next().await {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<Command>(&line) {
            Ok(command) => match host.handle(command).await {
                Ok(screen) => Reply::Screen(screen),
                Err(err) => Reply::Error {
                    error: err.to_string(),
                },
            },
            Err(err) => Reply::Error {
                error: format!("invalid command: {}", err),
            },
        };

        println!("{}", serde_json::to_string(&reply)?);
    }

    Ok(())
}

async fn run_text<R: Rng>(host: &mut Host<R>, lines: &mut Lines) -> Result<(), ConsoleError> {
    println!("The Impostor Game");

    let mut screen = host.screen()?;

    loop {
        let command = match prompt(&screen, lines).await? {
            Some(command) => command,
            None => return Ok(()),
        };

        match host.handle(command).await {
            Ok(next) => screen = next,
            Err(err) => {
                info!("Rejected input: {}", err);
                println!("! {}", err);
                screen = host.screen()?;
            }
        }
    }
}

async fn read_line(lines: &mut Lines) -> Result<Option<String>, ConsoleError> {
    match lines.next().await {
        Some(line) => Ok(Some(line?)),
        None => Ok(None),
    }
}

/// Renders a screen and turns the reply into a command, `None` quits
async fn prompt(screen: &Screen, lines: &mut Lines) -> Result<Option<Command>, ConsoleError> {
    match screen {
        Screen::Setup {
            roster_seed,
            language,
            languages,
            notice,
        } => {
            println!();
            println!("Language: {} (available: {})", language, languages.join(", "));
            if let Some(notice) = notice {
                println!("! {}", notice);
            }
            println!("Enter player names, one per line or comma-separated.");
            println!("Finish with an empty line. \":lang <code>\" switches language, \":rules\" shows the rules, \":quit\" exits.");
            if !roster_seed.is_empty() {
                println!("Empty line keeps: {}", roster_seed.replace('\n', ", "));
            }

            let mut names = Vec::new();
            loop {
                let line = match read_line(lines).await? {
                    Some(line) => line,
                    None => return Ok(None),
                };

                match SetupLine::parse(&line) {
                    SetupLine::Quit => return Ok(None),
                    SetupLine::Rules => println!("{}", RULES),
                    SetupLine::Language(language) => {
                        return Ok(Some(Command::SetLanguage { language }))
                    }
                    SetupLine::Done => break,
                    SetupLine::Names(line) => names.push(line),
                }
            }

            let names = if names.is_empty() {
                roster_seed.clone()
            } else {
                names.join("\n")
            };
            Ok(Some(Command::StartGame { names }))
        }

        Screen::PassDevice { player, turn } => {
            print!("{}", CLEAR);
            println!("Pass the device to {}.", player);
            match turn {
                Turn::Answer => println!("{}, press enter to show your question.", player),
                Turn::Vote => println!("{}, press enter to start voting.", player),
            }
            Ok(read_line(lines).await?.map(|_| Command::Continue))
        }

        Screen::Question { player, question } => {
            println!("Question for {}:", player);
            println!("  {}", question);
            println!("Your answer:");
            Ok(read_line(lines)
                .await?
                .map(|text| Command::SubmitAnswer { text }))
        }

        Screen::Discussion { question, answers } => {
            print!("{}", CLEAR);
            println!("Discussion time!");
            println!("The question was: {}", question);
            println!("Answers given:");
            for answer in answers {
                println!("  {}: {}", answer.name, answer.answer);
            }
            println!("Discuss the answers and try to identify the impostor.");
            println!("Press enter to proceed to voting.");
            Ok(read_line(lines).await?.map(|_| Command::ProceedToVoting))
        }

        Screen::Voting {
            voter,
            is_impostor,
            options,
        } => {
            if *is_impostor {
                println!("{}, whom do you vote for?", voter);
            } else {
                println!("{}, who do you think is the impostor?", voter);
            }
            for (number, option) in options.iter().enumerate() {
                println!("  {}) {}: \"{}\"", number + 1, option.name, option.answer);
            }

            let line = match read_line(lines).await? {
                Some(line) => line,
                None => return Ok(None),
            };
            Ok(Some(Command::CastVote {
                target: vote_target(&line, options),
            }))
        }

        Screen::Results { result } => {
            print!("{}", CLEAR);
            println!("Results");
            println!("The impostor was: {}", result.impostor);
            println!("Votes received:");
            for count in &result.tally {
                println!("  {}: {} vote(s)", count.name, count.votes);
            }
            match result.winner {
                Winner::Detectives => println!("The detectives win! They found the impostor."),
                Winner::Impostor => println!("The impostor wins! They escaped detection."),
            }
            println!("Press enter to play again, \":quit\" exits.");

            match read_line(lines).await? {
                Some(line) if line.trim() == ":quit" => Ok(None),
                Some(_) => Ok(Some(Command::PlayAgain)),
                None => Ok(None),
            }
        }
    }
}

/// One line typed while the roster is being entered
#[derive(Eq, PartialEq, Debug)]
enum SetupLine {
    Quit,
    Rules,
    Language(String),
    Done,
    Names(String),
}

impl SetupLine {
    fn parse(line: &str) -> Self {
        let trimmed = line.trim();

        if trimmed == ":quit" {
            return SetupLine::Quit;
        }
        if trimmed == ":rules" {
            return SetupLine::Rules;
        }
        if let Some(code) = trimmed.strip_prefix(":lang ") {
            return SetupLine::Language(code.trim().to_string());
        }
        if trimmed.is_empty() {
            return SetupLine::Done;
        }
        SetupLine::Names(line.to_string())
    }
}

/// Resolves vote input, an exact name wins over a list position
fn vote_target(line: &str, options: &[VoteOption]) -> String {
    let choice = line.trim();

    if let Some(option) = options.iter().find(|option| option.name == choice) {
        return option.name.clone();
    }

    choice
        .parse::<usize>()
        .ok()
        .and_then(|number| options.get(number.wrapping_sub(1)))
        .map_or_else(|| choice.to_string(), |option| option.name.clone())
}
