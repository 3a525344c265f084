use crate::config::{Cli, Config};
use crate::error::ConsoleError;
use crate::game::GameRoom;
use crate::host::Host;
use crate::question::{DirectoryQuestions, QuestionSource};
use clap::Parser;
use futures::executor::block_on;
use log::*;

pub mod config;
pub mod console;
pub mod error;
pub mod game;
pub mod host;
pub mod message;
pub mod player;
pub mod question;
pub mod round_data;
pub mod shuffle;

pub async fn run_game(config: Config) -> Result<(), ConsoleError> {
    let source = DirectoryQuestions::new(&config.questions_dir);
    info!(
        "Question languages in {}: {:?}",
        config.questions_dir.display(),
        source.available_languages()
    );

    let mut host = Host::new(
        GameRoom::new(),
        Box::new(source),
        config.language.as_str(),
        config.fallback_language.as_str(),
    );

    // A failed load is shown on the setup screen and retried on start
    if let Err(err) = host.load_questions().await {
        warn!("Starting without questions: {}", err);
    }

    console::run(&mut host, config.output).await
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(err) => {
            error!("{}", err);
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = block_on(run_game(config)) {
        error!("{}", err);
        std::process::exit(1);
    }
}
