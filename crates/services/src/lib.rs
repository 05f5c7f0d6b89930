#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog;
pub mod error;
pub mod pages;
pub mod poster_service;
pub mod question_service;
pub mod quiz_loop;

pub use trivia_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, FetchError, QuizLoopError};
pub use pages::{Page, Router};
pub use poster_service::{OmdbPosterService, PosterLookup};
pub use question_service::{LlmQuestionService, QuestionSource};
pub use quiz_loop::{AnswerResult, QuizLoopService};
