use chrono::{DateTime, Duration, Utc};

use crate::model::TriviaQuestion;

/// State of the round currently on screen.
///
/// Mutated only by the player's tentative selection and discarded when the
/// session advances to the next round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundState {
    question: TriviaQuestion,
    started_at: DateTime<Utc>,
    selected: Option<String>,
}

impl RoundState {
    #[must_use]
    pub fn new(question: TriviaQuestion, started_at: DateTime<Utc>) -> Self {
        Self {
            question,
            started_at,
            selected: None,
        }
    }

    #[must_use]
    pub fn question(&self) -> &TriviaQuestion {
        &self.question
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Time spent in this round so far. Computed, never stored.
    #[must_use]
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        now - self.started_at
    }

    pub(crate) fn select(&mut self, choice: String) {
        self.selected = Some(choice);
    }

    /// True when the recorded choice is an exact text match of the correct
    /// answer. A round without options has no valid choice and is never
    /// correct.
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.question.is_answerable()
            && self.selected.as_deref() == Some(self.question.correct_answer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn unselected_round_is_not_correct() {
        let q = TriviaQuestion::new(
            "Q",
            vec!["a".into(), "b".into()],
            "a",
            "T",
        )
        .unwrap();
        let round = RoundState::new(q, fixed_now());
        assert!(!round.is_correct());
    }

    #[test]
    fn sentinel_round_is_never_correct() {
        let mut round = RoundState::new(TriviaQuestion::sentinel(), fixed_now());
        // Even a choice matching the sentinel answer text must not count.
        round.select("No answer available".into());
        assert!(!round.is_correct());
    }

    #[test]
    fn elapsed_tracks_the_round_clock() {
        let q = TriviaQuestion::new("Q", vec!["a".into(), "b".into()], "a", "T").unwrap();
        let round = RoundState::new(q, fixed_now());
        let later = fixed_now() + Duration::seconds(12);
        assert_eq!(round.elapsed(later), Duration::seconds(12));
    }
}
