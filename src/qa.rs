//! Guided question set and the answer map stored as `qa` entry content.
//!
//! A `qa` entry's content is a JSON object keyed by question id, for example
//! `{"1":"Rested","4":"A long walk"}`. The store keeps it as opaque text;
//! [`QaAnswers`] is the typed view used by callers that render or edit it.

use crate::errors::ContentError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One guided question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub id: u32,
    pub prompt: &'static str,
    pub placeholder: &'static str,
}

/// The question catalog, in presentation order.
pub const QUESTIONS: [Question; 5] = [
    Question {
        id: 1,
        prompt: "How are you feeling today and what contributed to this mood?",
        placeholder: "Describe your emotions and what influenced them...",
    },
    Question {
        id: 2,
        prompt: "What was the highlight of your day?",
        placeholder: "Share the best moment or experience from today...",
    },
    Question {
        id: 3,
        prompt: "What challenged you today and how did you handle it?",
        placeholder: "Reflect on any difficulties and your response...",
    },
    Question {
        id: 4,
        prompt: "What are you grateful for today?",
        placeholder: "List the things you appreciate from today...",
    },
    Question {
        id: 5,
        prompt: "What would you like to improve or do differently tomorrow?",
        placeholder: "Think about tomorrow's goals and improvements...",
    },
];

/// Looks up a question by id.
pub fn question(id: u32) -> Option<&'static Question> {
    QUESTIONS.iter().find(|q| q.id == id)
}

/// Answers keyed by question id.
///
/// # Examples
///
/// ```
/// use diary_store::qa::QaAnswers;
///
/// let mut answers = QaAnswers::new();
/// answers.set(2, "Lunch with an old friend").unwrap();
/// let content = answers.to_content().unwrap();
/// assert_eq!(content, r#"{"2":"Lunch with an old friend"}"#);
/// assert_eq!(QaAnswers::from_content(&content).unwrap(), answers);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QaAnswers(BTreeMap<u32, String>);

impl QaAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the answer to question `id`, replacing any earlier answer.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::InvalidQuestionId` for id `0`.
    pub fn set(&mut self, id: u32, answer: impl Into<String>) -> Result<(), ContentError> {
        if id == 0 {
            return Err(ContentError::InvalidQuestionId(id));
        }
        self.0.insert(id, answer.into());
        Ok(())
    }

    pub fn get(&self, id: u32) -> Option<&str> {
        self.0.get(&id).map(String::as_str)
    }

    /// Copies every answer from `other` over this map.
    pub fn merge(&mut self, other: QaAnswers) {
        self.0.extend(other.0);
    }

    /// Number of answers that are not blank.
    pub fn answered_count(&self) -> usize {
        self.0.values().filter(|a| !a.trim().is_empty()).count()
    }

    /// `true` when at least one answer is not blank.
    pub fn has_answers(&self) -> bool {
        self.answered_count() > 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.0.iter().map(|(id, answer)| (*id, answer.as_str()))
    }

    /// Encodes the answers as entry content.
    pub fn to_content(&self) -> Result<String, ContentError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes entry content written by [`to_content`](Self::to_content).
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Malformed` when the content is not an object of
    /// string answers keyed by integer ids, and `ContentError::InvalidQuestionId`
    /// for id `0`.
    pub fn from_content(content: &str) -> Result<Self, ContentError> {
        let answers: QaAnswers = serde_json::from_str(content)?;
        if answers.0.contains_key(&0) {
            return Err(ContentError::InvalidQuestionId(0));
        }
        Ok(answers)
    }
}
