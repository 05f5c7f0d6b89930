use std::sync::Arc;

use storage::repository::Storage;
use trivia_core::Clock;

use crate::error::AppServicesError;
use crate::poster_service::{OmdbPosterService, PosterLookup};
use crate::question_service::{LlmQuestionService, QuestionSource};
use crate::quiz_loop::QuizLoopService;

/// Assembles app-facing services.
///
/// API keys are read from the environment once at build time; an absent key
/// leaves the corresponding service in degraded mode (sentinel questions,
/// absent posters) instead of failing startup.
#[derive(Clone)]
pub struct AppServices {
    quiz_loop: Arc<QuizLoopService>,
    posters: Arc<dyn PosterLookup>,
    questions_enabled: bool,
    posters_enabled: bool,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::with_storage(storage, clock))
    }

    #[must_use]
    pub fn with_storage(storage: Storage, clock: Clock) -> Self {
        let question_service = LlmQuestionService::from_env();
        let poster_service = OmdbPosterService::from_env();
        let questions_enabled = question_service.enabled();
        let posters_enabled = poster_service.enabled();

        let questions: Arc<dyn QuestionSource> = Arc::new(question_service);
        let posters: Arc<dyn PosterLookup> = Arc::new(poster_service);
        let quiz_loop = Arc::new(QuizLoopService::new(clock, questions, storage.scores));

        Self {
            quiz_loop,
            posters,
            questions_enabled,
            posters_enabled,
        }
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }

    #[must_use]
    pub fn posters(&self) -> Arc<dyn PosterLookup> {
        Arc::clone(&self.posters)
    }

    #[must_use]
    pub fn questions_enabled(&self) -> bool {
        self.questions_enabled
    }

    #[must_use]
    pub fn posters_enabled(&self) -> bool {
        self.posters_enabled
    }
}
