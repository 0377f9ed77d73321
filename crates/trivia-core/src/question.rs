//! Questions and where they come from.
//!
//! The engine consumes questions through [`QuestionProvider`]. [`QuestionBank`]
//! is the file-backed provider: it reads the shared question file and serves
//! approved questions only.

use crate::board::Category;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// A question as the engine sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub expected_answer: String,
}

impl Question {
    pub fn new(text: impl Into<String>, expected_answer: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            expected_answer: expected_answer.into(),
        }
    }

    /// Whether `given` matches the expected answer
    pub fn is_answered_by(&self, given: &str) -> bool {
        answers_match(&self.expected_answer, given)
    }
}

/// Trimmed, case-insensitive comparison
pub fn answers_match(expected: &str, given: &str) -> bool {
    expected.trim().to_lowercase() == given.trim().to_lowercase()
}

/// Supplies one approved question for a category, or nothing
pub trait QuestionProvider {
    fn next_question(&mut self, category: Category) -> Option<Question>;
}

/// Moderation state of a stored question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    Pending,
    Approved,
    Rejected,
}

/// One entry of the question file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub category: Category,
    pub status: QuestionStatus,
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Debug, Error)]
pub enum QuestionBankError {
    #[error("Failed to read question file: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed question file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Approved questions grouped by category, served at random
pub struct QuestionBank {
    by_category: HashMap<Category, Vec<Question>>,
    rng: StdRng,
}

impl QuestionBank {
    /// Build from records, keeping only approved ones
    pub fn from_records(records: impl IntoIterator<Item = QuestionRecord>) -> Self {
        let mut by_category: HashMap<Category, Vec<Question>> = HashMap::new();
        for record in records {
            if record.status == QuestionStatus::Approved {
                by_category
                    .entry(record.category)
                    .or_default()
                    .push(Question::new(record.question, record.answer));
            }
        }

        for category in Category::ALL {
            if by_category.get(&category).map_or(true, Vec::is_empty) {
                warn!(%category, "No approved questions for category");
            }
        }

        Self {
            by_category,
            rng: StdRng::from_entropy(),
        }
    }

    /// Load the question file. A missing or empty file gives an empty bank.
    pub fn load(path: &Path) -> Result<Self, QuestionBankError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Question file not found, no questions available");
                return Ok(Self::from_records(Vec::new()));
            }
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            warn!(path = %path.display(), "Question file is empty, no questions available");
            return Ok(Self::from_records(Vec::new()));
        }

        let records: Vec<QuestionRecord> = serde_json::from_str(&contents)?;
        info!(path = %path.display(), records = records.len(), "Loaded question file");
        Ok(Self::from_records(records))
    }

    /// Use a fixed seed for question selection
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Number of approved questions in a category
    pub fn count(&self, category: Category) -> usize {
        self.by_category.get(&category).map_or(0, Vec::len)
    }
}

impl QuestionProvider for QuestionBank {
    fn next_question(&mut self, category: Category) -> Option<Question> {
        self.by_category
            .get(&category)
            .and_then(|questions| questions.choose(&mut self.rng))
            .cloned()
    }
}
