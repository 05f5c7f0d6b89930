use std::sync::Arc;

use log::debug;

use storage::repository::ScoreStore;
use trivia_core::model::{LeaderboardEntry, QuizSession, RoundOutcome};
use trivia_core::Clock;

use crate::error::QuizLoopError;
use crate::question_service::QuestionSource;

/// How many entries the leaderboard read returns.
pub const LEADERBOARD_SIZE: u32 = 10;

/// Result of submitting an answer for the current round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerResult {
    pub outcome: RoundOutcome,
    pub is_finished: bool,
}

/// Orchestrates a quiz session against the question source and score store.
///
/// The session itself stays a pure state machine; this service does the
/// fetching between rounds and the one-time score persistence. Each player
/// interaction triggers at most one question fetch.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    questions: Arc<dyn QuestionSource>,
    scores: Arc<dyn ScoreStore>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(clock: Clock, questions: Arc<dyn QuestionSource>, scores: Arc<dyn ScoreStore>) -> Self {
        Self {
            clock,
            questions,
            scores,
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Start a fresh session with its first question installed.
    pub async fn start_session(&self) -> QuizSession {
        let question = self.questions.next_question().await;
        let mut session = QuizSession::new();
        session.start(question, self.clock.now());
        session
    }

    /// Run the lazy time-expiry check and, when a round expired, install the
    /// next question. Called on each interaction before input is interpreted;
    /// there is no background timer.
    ///
    /// # Errors
    ///
    /// Returns `QuizLoopError::Session` if the follow-up round cannot begin.
    pub async fn check_expiry(
        &self,
        session: &mut QuizSession,
    ) -> Result<Option<RoundOutcome>, QuizLoopError> {
        let Some(outcome) = session.tick(self.clock.now()) else {
            return Ok(None);
        };
        debug!("round {} expired", session.round_index());
        if !session.is_finished() {
            let question = self.questions.next_question().await;
            session.begin_round(question, self.clock.now())?;
        }
        Ok(Some(outcome))
    }

    /// Resolve the current round and install the next question unless the
    /// session just finished.
    ///
    /// # Errors
    ///
    /// Returns `QuizLoopError::Session` when no round is in progress.
    pub async fn submit_answer(
        &self,
        session: &mut QuizSession,
    ) -> Result<AnswerResult, QuizLoopError> {
        let outcome = session.submit()?;
        debug!(
            "round {} resolved: {:?} (+{})",
            session.round_index(),
            outcome.verdict,
            outcome.points_awarded
        );
        if !session.is_finished() {
            let question = self.questions.next_question().await;
            session.begin_round(question, self.clock.now())?;
        }
        Ok(AnswerResult {
            outcome,
            is_finished: session.is_finished(),
        })
    }

    /// Forward the final score to the leaderboard, once per session.
    ///
    /// The session is marked recorded only after the store accepts the row,
    /// so a storage failure leaves the operation retryable.
    ///
    /// # Errors
    ///
    /// Returns `QuizLoopError::Session` before the session finishes or after
    /// a successful recording, and `QuizLoopError::Storage` if the insert
    /// fails.
    pub async fn record_score(
        &self,
        session: &mut QuizSession,
        name: &str,
    ) -> Result<(), QuizLoopError> {
        let score = session.final_score()?;
        self.scores.record(name, i64::from(score)).await?;
        session.mark_score_recorded();
        Ok(())
    }

    /// Top entries for the leaderboard page.
    ///
    /// # Errors
    ///
    /// Returns `QuizLoopError::Storage` on read failure.
    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, QuizLoopError> {
        Ok(self.scores.top(LEADERBOARD_SIZE).await?)
    }
}
