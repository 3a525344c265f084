use crate::error::QuestionError;
use crate::shuffle::{pick_index, shuffle};
use futures::future::BoxFuture;
use futures::FutureExt;
use log::*;
use rand::Rng;
use serde_derive::*;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Candidate questions that are close enough to each other that a player
/// answering one of them can blend in with players answering another
#[derive(Clone, Eq, PartialEq, Serialize, Deserialize, Debug)]
#[serde(transparent)]
pub struct QuestionSet(Vec<String>);

impl QuestionSet {
    /// Repeated questions are dropped, keeping the first occurrence
    pub fn new(questions: Vec<String>) -> Result<Self, QuestionError> {
        let mut seen = HashSet::new();
        let questions: Vec<String> = questions
            .into_iter()
            .filter(|question| seen.insert(question.clone()))
            .collect();

        if questions.len() < 2 {
            return Err(QuestionError::InvalidQuestionSets(format!(
                "a question set needs at least 2 different questions, got {}",
                questions.len()
            )));
        }
        Ok(QuestionSet(questions))
    }

    pub fn questions(&self) -> &[String] {
        &self.0
    }
}

/// The two questions handed out for one round
#[derive(Clone, Eq, PartialEq, Serialize, Deserialize, Debug)]
pub struct QuestionPair {
    pub official: String,
    pub impostor: String,
}

/// A validated, possibly empty, collection of question sets
#[derive(Clone, Eq, PartialEq, Serialize, Deserialize, Debug, Default)]
#[serde(transparent)]
pub struct QuestionPool {
    sets: Vec<QuestionSet>,
}

impl QuestionPool {
    pub fn new(sets: Vec<QuestionSet>) -> Self {
        QuestionPool { sets }
    }

    /// Validates the raw `[[String, String, ...], ...]` document layout
    pub fn from_raw(raw: Vec<Vec<String>>) -> Result<Self, QuestionError> {
        if raw.is_empty() {
            return Err(QuestionError::InvalidQuestionSets(
                "the question list is empty".to_string(),
            ));
        }

        let sets = raw
            .into_iter()
            .map(QuestionSet::new)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QuestionPool::new(sets))
    }

    pub fn from_json(text: &str, path: &Path) -> Result<Self, QuestionError> {
        let raw: Vec<Vec<String>> =
            serde_json::from_str(text).map_err(|source| QuestionError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_raw(raw)
    }

    pub fn from_ron(text: &str, path: &Path) -> Result<Self, QuestionError> {
        let raw: Vec<Vec<String>> =
            ron::de::from_str(text).map_err(|source| QuestionError::Ron {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_raw(raw)
    }

    pub fn append(&mut self, mut other: QuestionPool) {
        self.sets.append(&mut other.sets);
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Draws the question pair for a round
    ///
    /// A set is chosen uniformly, then shuffled so that which string becomes
    /// the official question is random too.
    pub fn draw_pair<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<QuestionPair> {
        let set = &self.sets[pick_index(self.sets.len(), rng)?];

        let mut candidates = set.questions().to_vec();
        shuffle(&mut candidates, rng);

        let mut candidates = candidates.into_iter();
        let official = candidates.next()?;
        let impostor = candidates.next()?;

        Some(QuestionPair { official, impostor })
    }
}

/// Provides the question pool for a language
///
/// The pool may come back empty or fail, callers must cope with both.
pub trait QuestionSource {
    fn draw_question_pool<'a>(
        &'a self,
        language: &'a str,
    ) -> BoxFuture<'a, Result<QuestionPool, QuestionError>>;

    fn available_languages(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Loads `questions_<language>.json` and `questions_<language>.ron` files
/// from a directory tree
pub struct DirectoryQuestions {
    root: PathBuf,
}

impl DirectoryQuestions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryQuestions { root: root.into() }
    }

    fn question_files(&self) -> Vec<(String, PathBuf)> {
        WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!("Skipping unreadable entry: {}", err);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let path = entry.path();
                let extension = path.extension()?.to_str()?;
                if extension != "json" && extension != "ron" {
                    return None;
                }
                let language = path
                    .file_stem()?
                    .to_str()?
                    .strip_prefix("questions_")?
                    .to_string();
                Some((language, path.to_path_buf()))
            })
            .collect()
    }

    async fn load(&self, language: &str) -> Result<QuestionPool, QuestionError> {
        let files: Vec<PathBuf> = self
            .question_files()
            .into_iter()
            .filter(|(file_language, _)| file_language == language)
            .map(|(_, path)| path)
            .collect();

        if files.is_empty() {
            return Err(QuestionError::NoQuestionFiles {
                language: language.to_string(),
            });
        }

        let mut pool = QuestionPool::default();

        for path in files {
            let contents = async_std::fs::read_to_string(&path)
                .await
                .map_err(|source| QuestionError::Io {
                    path: path.clone(),
                    source,
                })?;

            let loaded = match path.extension().and_then(|e| e.to_str()) {
                Some("ron") => QuestionPool::from_ron(&contents, &path)?,
                _ => QuestionPool::from_json(&contents, &path)?,
            };

            debug!("{} question sets in {}", loaded.len(), path.display());
            pool.append(loaded);
        }

        info!("Loaded {} question sets for \"{}\"", pool.len(), language);

        Ok(pool)
    }
}

impl QuestionSource for DirectoryQuestions {
    fn draw_question_pool<'a>(
        &'a self,
        language: &'a str,
    ) -> BoxFuture<'a, Result<QuestionPool, QuestionError>> {
        self.load(language).boxed()
    }

    fn available_languages(&self) -> Vec<String> {
        self.question_files()
            .into_iter()
            .map(|(language, _)| language)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
