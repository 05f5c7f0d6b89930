use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bounds on the option list of an answerable question.
pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 6;

pub const SENTINEL_PROMPT: &str = "No question available";
pub const SENTINEL_ANSWER: &str = "No answer available";
pub const SENTINEL_SUBJECT: &str = "No movie title available";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("option list has {len} entries, expected {MIN_OPTIONS}..={MAX_OPTIONS}")]
    OptionCount { len: usize },

    #[error("correct answer is not one of the options")]
    AnswerNotInOptions,
}

/// One multiple-choice trivia question about a single film.
///
/// Immutable once issued. A question either carries 2..=6 options with the
/// correct answer among them, or is the contentless sentinel substituted when
/// the upstream generator fails; a sentinel round can never be answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriviaQuestion {
    prompt: String,
    options: Vec<String>,
    correct_answer: String,
    subject_title: String,
}

impl TriviaQuestion {
    /// Build a validated, answerable question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::OptionCount` if the option list is outside
    /// 2..=6 entries, or `QuestionError::AnswerNotInOptions` if
    /// `correct_answer` does not exactly match one of `options`.
    pub fn new(
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
        subject_title: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let correct_answer = correct_answer.into();
        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&options.len()) {
            return Err(QuestionError::OptionCount { len: options.len() });
        }
        if !options.iter().any(|o| o == &correct_answer) {
            return Err(QuestionError::AnswerNotInOptions);
        }

        Ok(Self {
            prompt: prompt.into(),
            options,
            correct_answer,
            subject_title: subject_title.into(),
        })
    }

    /// The well-formed but contentless question substituted on any upstream
    /// failure. It has no options, so it can never be answered correctly.
    #[must_use]
    pub fn sentinel() -> Self {
        Self {
            prompt: SENTINEL_PROMPT.to_owned(),
            options: Vec::new(),
            correct_answer: SENTINEL_ANSWER.to_owned(),
            subject_title: SENTINEL_SUBJECT.to_owned(),
        }
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn subject_title(&self) -> &str {
        &self.subject_title
    }

    /// True when the question carries options a player can choose from.
    #[must_use]
    pub fn is_answerable(&self) -> bool {
        !self.options.is_empty()
    }
}
