use crate::error::ConfigError;
use clap::Parser;
use serde_derive::*;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "impostor.ron";

/// Command line arguments
#[derive(Parser, Debug, Default)]
#[command(name = "impostor-game", version)]
#[command(about = "Find the impostor, a party game played on one shared device")]
pub struct Cli {
    /// RON config file, defaults to ./impostor.ron when present
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding questions_<language>.json / .ron files
    #[arg(long, value_name = "DIR")]
    pub questions_dir: Option<PathBuf>,

    /// Language of the question pool
    #[arg(short, long)]
    pub language: Option<String>,

    /// Language loaded when the requested one is missing or broken
    #[arg(long)]
    pub fallback_language: Option<String>,

    /// Read commands and write screens as JSON lines
    #[arg(long)]
    pub json: bool,
}

/// How the console talks to whoever sits at the terminal
#[derive(Clone, Copy, Eq, PartialEq, Serialize, Deserialize, Debug)]
pub enum OutputMode {
    Text,
    /// One command per input line, one reply per output line
    Json,
}

impl Default for OutputMode {
    fn default() -> Self {
        OutputMode::Text
    }
}

#[derive(Clone, Eq, PartialEq, Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct Config {
    pub questions_dir: PathBuf,
    pub language: String,
    pub fallback_language: String,
    pub output: OutputMode,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            questions_dir: PathBuf::from("questions"),
            language: "en".to_string(),
            fallback_language: "en".to_string(),
            output: OutputMode::Text,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        ron::de::from_str(&contents).map_err(|source| ConfigError::Ron {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults, then the config file, then command line flags
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Config::default(),
        };

        config.apply(cli);
        Ok(config)
    }

    fn apply(&mut self, cli: &Cli) {
        if let Some(dir) = &cli.questions_dir {
            self.questions_dir = dir.clone();
        }
        if let Some(language) = &cli.language {
            self.language = language.clone();
        }
        if let Some(language) = &cli.fallback_language {
            self.fallback_language = language.clone();
        }
        if cli.json {
            self.output = OutputMode::Json;
        }
    }
}
