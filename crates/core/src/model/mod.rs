mod leaderboard;
mod question;
mod round;
mod session;

pub use leaderboard::LeaderboardEntry;
pub use question::{
    QuestionError, TriviaQuestion, MAX_OPTIONS, MIN_OPTIONS, SENTINEL_ANSWER, SENTINEL_PROMPT,
    SENTINEL_SUBJECT,
};
pub use round::RoundState;
pub use session::{
    QuizPhase, QuizSession, RoundOutcome, RoundVerdict, SessionError, ROUND_TIME_LIMIT_SECS,
    TOTAL_ROUNDS,
};
