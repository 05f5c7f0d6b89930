use std::sync::Arc;

use services::quiz_loop::QuizLoopService;
use services::question_service::QuestionSource;
use storage::repository::{InMemoryScoreStore, ScoreStore};
use trivia_core::model::{QuizPhase, RoundVerdict, TriviaQuestion, TOTAL_ROUNDS};
use trivia_core::time::fixed_clock;

struct ScriptedSource {
    question: TriviaQuestion,
}

#[async_trait::async_trait]
impl QuestionSource for ScriptedSource {
    async fn next_question(&self) -> TriviaQuestion {
        self.question.clone()
    }
}

fn known_question() -> TriviaQuestion {
    TriviaQuestion::new(
        "Who directed Do the Right Thing?",
        vec![
            "Spike Lee".to_owned(),
            "John Singleton".to_owned(),
            "Ernest Dickerson".to_owned(),
            "F. Gary Gray".to_owned(),
        ],
        "Spike Lee",
        "Do the Right Thing",
    )
    .unwrap()
}

fn quiz_loop(question: TriviaQuestion, store: &InMemoryScoreStore) -> QuizLoopService {
    QuizLoopService::new(
        fixed_clock(),
        Arc::new(ScriptedSource { question }),
        Arc::new(store.clone()),
    )
}

#[tokio::test]
async fn full_session_scores_streaks_and_persists() {
    let store = InMemoryScoreStore::new();
    let loop_svc = quiz_loop(known_question(), &store);

    let mut session = loop_svc.start_session().await;
    assert_eq!(session.phase(), QuizPhase::InRound);

    // Three correct answers in a row: 10 + 20 + 30.
    for expected in [10, 20, 30] {
        session.select_option("Spike Lee").unwrap();
        let res = loop_svc.submit_answer(&mut session).await.unwrap();
        assert_eq!(res.outcome.verdict, RoundVerdict::Correct);
        assert_eq!(res.outcome.points_awarded, expected);
    }
    assert_eq!(session.score(), 60);
    assert_eq!(session.streak(), 3);

    // One miss resets the streak but not the score.
    session.select_option("John Singleton").unwrap();
    let res = loop_svc.submit_answer(&mut session).await.unwrap();
    assert_eq!(res.outcome.verdict, RoundVerdict::Incorrect);
    assert_eq!(session.streak(), 0);
    assert_eq!(session.score(), 60);

    // Pass on the remaining rounds.
    while !session.is_finished() {
        loop_svc.submit_answer(&mut session).await.unwrap();
    }
    assert_eq!(session.round_index(), TOTAL_ROUNDS);
    assert_eq!(session.score(), 60);

    loop_svc.record_score(&mut session, "Alice").await.unwrap();
    let board = loop_svc.leaderboard().await.unwrap();
    assert_eq!(board[0].name, "Alice");
    assert_eq!(board[0].score, 60);

    // Exactly once per session.
    assert!(loop_svc.record_score(&mut session, "Alice").await.is_err());
}

#[tokio::test]
async fn unavailable_questions_never_block_a_session() {
    let store = InMemoryScoreStore::new();
    let loop_svc = quiz_loop(TriviaQuestion::sentinel(), &store);

    let mut session = loop_svc.start_session().await;
    assert!(!session.current_round().unwrap().question().is_answerable());

    // Each expiry check passes the unanswerable round through.
    for expected in 1..=TOTAL_ROUNDS {
        let outcome = loop_svc
            .check_expiry(&mut session)
            .await
            .unwrap()
            .expect("sentinel round should expire");
        assert_eq!(outcome.verdict, RoundVerdict::TimedOut);
        assert_eq!(session.round_index(), expected);
    }

    assert!(session.is_finished());
    assert_eq!(session.score(), 0);
    loop_svc.record_score(&mut session, "nobody").await.unwrap();
    assert_eq!(store.top(10).await.unwrap()[0].score, 0);
}

#[tokio::test]
async fn expiry_check_is_quiet_before_the_limit() {
    let store = InMemoryScoreStore::new();
    let loop_svc = quiz_loop(known_question(), &store);

    let mut session = loop_svc.start_session().await;
    // Fixed clock: no time has passed, the round is still live.
    assert!(loop_svc.check_expiry(&mut session).await.unwrap().is_none());
    assert_eq!(session.phase(), QuizPhase::InRound);
}

#[tokio::test]
async fn record_score_requires_a_finished_session() {
    let store = InMemoryScoreStore::new();
    let loop_svc = quiz_loop(known_question(), &store);

    let mut session = loop_svc.start_session().await;
    assert!(loop_svc.record_score(&mut session, "early").await.is_err());
    assert!(store.top(10).await.unwrap().is_empty());
}
