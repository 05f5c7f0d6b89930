use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::model::{RoundState, TriviaQuestion};

/// Number of rounds in one play session.
pub const TOTAL_ROUNDS: u32 = 10;

/// Gameplay clock limit for a single round, in seconds.
pub const ROUND_TIME_LIMIT_SECS: i64 = 30;

#[must_use]
fn round_time_limit() -> Duration {
    Duration::seconds(ROUND_TIME_LIMIT_SECS)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no round in progress")]
    NotInRound,

    #[error("no question is awaited")]
    RoundNotResolved,

    #[error("session is not finished")]
    NotFinished,

    #[error("final score already recorded")]
    AlreadyRecorded,

    #[error("current question has no options")]
    NoOptions,

    #[error("choice is not one of the options: {choice}")]
    UnknownOption { choice: String },
}

/// Lifecycle phase of a quiz session.
///
/// `InRound` and `RoundResolved` alternate up to [`TOTAL_ROUNDS`] times;
/// `RoundResolved` is the window in which the orchestrator installs the next
/// question via [`QuizSession::begin_round`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuizPhase {
    #[default]
    NotStarted,
    InRound,
    RoundResolved,
    Finished,
}

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundVerdict {
    Correct,
    Incorrect,
    TimedOut,
}

/// Outcome of one resolved round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    pub verdict: RoundVerdict,
    pub points_awarded: u32,
    pub correct_answer: String,
}

/// State machine for one play session.
///
/// Owns score, streak and the round counter; all timing comes in through the
/// `now` arguments so behavior is deterministic under a fixed clock. The
/// session does no I/O: fetching questions and persisting the final score are
/// the orchestrator's job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuizSession {
    phase: QuizPhase,
    score: u32,
    streak: u32,
    round_index: u32,
    round: Option<RoundState>,
    score_recorded: bool,
}

impl QuizSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Zero-based index of the current round; equals the number of rounds
    /// already resolved.
    #[must_use]
    pub fn round_index(&self) -> u32 {
        self.round_index
    }

    #[must_use]
    pub fn current_round(&self) -> Option<&RoundState> {
        self.round.as_ref()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == QuizPhase::Finished
    }

    #[must_use]
    pub fn score_recorded(&self) -> bool {
        self.score_recorded
    }

    /// Fraction of the session completed, clamped to [0, 1].
    #[must_use]
    pub fn progress(&self) -> f64 {
        (f64::from(self.round_index) / f64::from(TOTAL_ROUNDS)).clamp(0.0, 1.0)
    }

    /// Time spent in the current round, if one is in progress.
    #[must_use]
    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self.phase {
            QuizPhase::InRound => self.round.as_ref().map(|r| r.elapsed(now)),
            _ => None,
        }
    }

    /// Reset the session and enter the first round with the given question.
    ///
    /// Valid from any phase; restarting an in-flight session is allowed and
    /// discards all prior state.
    pub fn start(&mut self, question: TriviaQuestion, now: DateTime<Utc>) {
        *self = Self {
            phase: QuizPhase::InRound,
            round: Some(RoundState::new(question, now)),
            ..Self::default()
        };
    }

    /// Record the player's tentative choice for the current round.
    ///
    /// Recording is the only effect; resolution happens on [`Self::submit`]
    /// or on time expiry. Re-selecting overwrites the previous choice.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInRound` outside a round,
    /// `SessionError::NoOptions` for a sentinel round, and
    /// `SessionError::UnknownOption` for a choice not on the option list.
    pub fn select_option(&mut self, choice: &str) -> Result<(), SessionError> {
        if self.phase != QuizPhase::InRound {
            return Err(SessionError::NotInRound);
        }
        let round = self.round.as_mut().ok_or(SessionError::NotInRound)?;
        if !round.question().is_answerable() {
            return Err(SessionError::NoOptions);
        }
        if !round.question().options().iter().any(|o| o == choice) {
            return Err(SessionError::UnknownOption {
                choice: choice.to_owned(),
            });
        }
        round.select(choice.to_owned());
        Ok(())
    }

    /// Lazy time-expiry check, evaluated on each interaction.
    ///
    /// When the round clock has run out — or the round carries a sentinel
    /// question that can never be answered — the round resolves as a miss:
    /// streak resets, score is unchanged, the round counter advances.
    /// Returns the outcome when the round expired, `None` otherwise.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<RoundOutcome> {
        if self.phase != QuizPhase::InRound {
            return None;
        }
        let round = self.round.as_ref()?;
        let expired =
            !round.question().is_answerable() || round.elapsed(now) >= round_time_limit();
        if !expired {
            return None;
        }

        let correct_answer = round.question().correct_answer().to_owned();
        self.streak = 0;
        self.advance_round();
        Some(RoundOutcome {
            verdict: RoundVerdict::TimedOut,
            points_awarded: 0,
            correct_answer,
        })
    }

    /// Resolve the current round against the recorded choice.
    ///
    /// A correct answer increments the streak and awards `10 * streak`
    /// points; a miss resets the streak and leaves the score unchanged.
    /// Either way the round counter advances and the session moves to
    /// `RoundResolved`, or to `Finished` after the last round.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInRound` outside a round.
    pub fn submit(&mut self) -> Result<RoundOutcome, SessionError> {
        if self.phase != QuizPhase::InRound {
            return Err(SessionError::NotInRound);
        }
        let round = self.round.as_ref().ok_or(SessionError::NotInRound)?;

        let correct = round.is_correct();
        let correct_answer = round.question().correct_answer().to_owned();
        let points_awarded = if correct {
            self.streak = self.streak.saturating_add(1);
            let points = self.streak.saturating_mul(10);
            self.score = self.score.saturating_add(points);
            points
        } else {
            self.streak = 0;
            0
        };

        self.advance_round();
        Ok(RoundOutcome {
            verdict: if correct {
                RoundVerdict::Correct
            } else {
                RoundVerdict::Incorrect
            },
            points_awarded,
            correct_answer,
        })
    }

    /// Install the next question and restart the round clock.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::RoundNotResolved` unless the session is
    /// between rounds.
    pub fn begin_round(
        &mut self,
        question: TriviaQuestion,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if self.phase != QuizPhase::RoundResolved {
            return Err(SessionError::RoundNotResolved);
        }
        self.round = Some(RoundState::new(question, now));
        self.phase = QuizPhase::InRound;
        Ok(())
    }

    /// The final score, for forwarding to the leaderboard.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFinished` before the last round resolves and
    /// `SessionError::AlreadyRecorded` once the score has been persisted.
    pub fn final_score(&self) -> Result<u32, SessionError> {
        if self.phase != QuizPhase::Finished {
            return Err(SessionError::NotFinished);
        }
        if self.score_recorded {
            return Err(SessionError::AlreadyRecorded);
        }
        Ok(self.score)
    }

    /// Mark the final score as persisted. Called by the orchestrator only
    /// after the store accepted the row, so a failed insert stays retryable.
    pub fn mark_score_recorded(&mut self) {
        self.score_recorded = true;
    }

    fn advance_round(&mut self) {
        self.round = None;
        self.round_index = self.round_index.saturating_add(1);
        self.phase = if self.round_index >= TOTAL_ROUNDS {
            QuizPhase::Finished
        } else {
            QuizPhase::RoundResolved
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn question(answer: &str) -> TriviaQuestion {
        TriviaQuestion::new(
            "Who directed this film?",
            vec![answer.to_owned(), "someone else".to_owned()],
            answer,
            "Some Film",
        )
        .unwrap()
    }

    fn answer_correctly(session: &mut QuizSession) -> RoundOutcome {
        session.select_option("right").unwrap();
        session.submit().unwrap()
    }

    fn next_round(session: &mut QuizSession) {
        session.begin_round(question("right"), fixed_now()).unwrap();
    }

    #[test]
    fn start_resets_all_session_state() {
        let mut session = QuizSession::new();
        session.start(question("right"), fixed_now());
        answer_correctly(&mut session);
        assert!(session.score() > 0);

        session.start(question("right"), fixed_now());
        assert_eq!(session.score(), 0);
        assert_eq!(session.streak(), 0);
        assert_eq!(session.round_index(), 0);
        assert_eq!(session.phase(), QuizPhase::InRound);
    }

    #[test]
    fn streak_multiplier_awards_10_20_30() {
        let mut session = QuizSession::new();
        session.start(question("right"), fixed_now());

        let first = answer_correctly(&mut session);
        assert_eq!(first.points_awarded, 10);
        next_round(&mut session);
        let second = answer_correctly(&mut session);
        assert_eq!(second.points_awarded, 20);
        next_round(&mut session);
        let third = answer_correctly(&mut session);
        assert_eq!(third.points_awarded, 30);

        assert_eq!(session.score(), 60);
        assert_eq!(session.streak(), 3);
    }

    #[test]
    fn incorrect_submit_resets_streak_and_keeps_score() {
        let mut session = QuizSession::new();
        session.start(question("right"), fixed_now());
        for _ in 0..3 {
            answer_correctly(&mut session);
            next_round(&mut session);
        }
        assert_eq!(session.score(), 60);

        session.select_option("someone else").unwrap();
        let outcome = session.submit().unwrap();
        assert_eq!(outcome.verdict, RoundVerdict::Incorrect);
        assert_eq!(outcome.points_awarded, 0);
        assert_eq!(session.streak(), 0);
        assert_eq!(session.score(), 60);
    }

    #[test]
    fn submit_without_selection_is_a_miss() {
        let mut session = QuizSession::new();
        session.start(question("right"), fixed_now());
        let outcome = session.submit().unwrap();
        assert_eq!(outcome.verdict, RoundVerdict::Incorrect);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn round_index_increases_by_one_per_resolution() {
        let mut session = QuizSession::new();
        session.start(question("right"), fixed_now());
        for expected in 1..=TOTAL_ROUNDS {
            session.submit().unwrap();
            assert_eq!(session.round_index(), expected);
            if expected < TOTAL_ROUNDS {
                next_round(&mut session);
            }
        }
        assert!(session.is_finished());
    }

    #[test]
    fn session_finishes_exactly_at_total_rounds() {
        let mut session = QuizSession::new();
        session.start(question("right"), fixed_now());
        for i in 0..TOTAL_ROUNDS {
            assert!(!session.is_finished());
            session.submit().unwrap();
            if i + 1 < TOTAL_ROUNDS {
                next_round(&mut session);
            }
        }
        assert!(session.is_finished());
        assert!(session.submit().is_err());
    }

    #[test]
    fn progress_stays_in_unit_interval() {
        let mut session = QuizSession::new();
        session.start(question("right"), fixed_now());
        assert!((session.progress() - 0.0).abs() < f64::EPSILON);
        session.submit().unwrap();
        assert!((session.progress() - 0.1).abs() < f64::EPSILON);
        for _ in 1..TOTAL_ROUNDS {
            next_round(&mut session);
            session.submit().unwrap();
        }
        assert!((session.progress() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn tick_before_the_limit_does_nothing() {
        let mut session = QuizSession::new();
        session.start(question("right"), fixed_now());
        let almost = fixed_now() + Duration::seconds(ROUND_TIME_LIMIT_SECS - 1);
        assert_eq!(session.tick(almost), None);
        assert_eq!(session.phase(), QuizPhase::InRound);
    }

    #[test]
    fn tick_past_the_limit_is_a_timeout() {
        let mut session = QuizSession::new();
        session.start(question("right"), fixed_now());
        answer_correctly(&mut session);
        next_round(&mut session);
        assert_eq!(session.streak(), 1);

        let late = fixed_now() + Duration::seconds(ROUND_TIME_LIMIT_SECS);
        let outcome = session.tick(late).expect("round should expire");
        assert_eq!(outcome.verdict, RoundVerdict::TimedOut);
        assert_eq!(session.streak(), 0);
        assert_eq!(session.score(), 10);
        assert_eq!(session.round_index(), 2);
        assert_eq!(session.phase(), QuizPhase::RoundResolved);
    }

    #[test]
    fn sentinel_round_passes_through_on_tick() {
        let mut session = QuizSession::new();
        session.start(TriviaQuestion::sentinel(), fixed_now());

        assert!(matches!(
            session.select_option("anything"),
            Err(SessionError::NoOptions)
        ));
        // No valid choice exists, so the next tick advances immediately.
        let outcome = session.tick(fixed_now()).expect("pass-through");
        assert_eq!(outcome.verdict, RoundVerdict::TimedOut);
        assert_eq!(session.round_index(), 1);
    }

    #[test]
    fn sentinel_round_never_submits_correct() {
        let mut session = QuizSession::new();
        session.start(TriviaQuestion::sentinel(), fixed_now());
        let outcome = session.submit().unwrap();
        assert_eq!(outcome.verdict, RoundVerdict::Incorrect);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn select_rejects_unknown_options() {
        let mut session = QuizSession::new();
        session.start(question("right"), fixed_now());
        assert!(matches!(
            session.select_option("not listed"),
            Err(SessionError::UnknownOption { .. })
        ));
        session.select_option("someone else").unwrap();
        session.select_option("right").unwrap();
        assert_eq!(
            session.current_round().unwrap().selected(),
            Some("right")
        );
    }

    #[test]
    fn final_score_only_available_once_finished() {
        let mut session = QuizSession::new();
        session.start(question("right"), fixed_now());
        assert_eq!(session.final_score(), Err(SessionError::NotFinished));

        for i in 0..TOTAL_ROUNDS {
            answer_correctly(&mut session);
            if i + 1 < TOTAL_ROUNDS {
                next_round(&mut session);
            }
        }
        let score = session.final_score().unwrap();
        assert_eq!(score, (1..=TOTAL_ROUNDS).map(|n| n * 10).sum::<u32>());

        session.mark_score_recorded();
        assert_eq!(session.final_score(), Err(SessionError::AlreadyRecorded));
    }

    #[test]
    fn begin_round_requires_a_resolved_round() {
        let mut session = QuizSession::new();
        assert!(session.begin_round(question("right"), fixed_now()).is_err());
        session.start(question("right"), fixed_now());
        assert!(session.begin_round(question("right"), fixed_now()).is_err());
        session.submit().unwrap();
        session.begin_round(question("right"), fixed_now()).unwrap();
        assert_eq!(session.phase(), QuizPhase::InRound);
    }
}
