use std::env;

use log::warn;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use trivia_core::model::{SENTINEL_ANSWER, SENTINEL_PROMPT, SENTINEL_SUBJECT, TriviaQuestion};

use crate::catalog::random_film;
use crate::error::FetchError;

/// Source of one trivia question per round.
///
/// Infallible by contract: every failure path degrades to
/// [`TriviaQuestion::sentinel`] rather than propagating.
#[async_trait::async_trait]
pub trait QuestionSource: Send + Sync {
    async fn next_question(&self) -> TriviaQuestion;
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl LlmConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("TRIVIA_LLM_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("TRIVIA_LLM_BASE_URL")
            .unwrap_or_else(|_| "https://api.anthropic.com".into());
        let model =
            env::var("TRIVIA_LLM_MODEL").unwrap_or_else(|_| "claude-3-5-sonnet-20240620".into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

/// Question source backed by an LLM text endpoint.
///
/// Picks a subject from the film catalog, asks the model for a JSON-shaped
/// question about it, and shape-checks the reply. Question quality and
/// uniqueness are entirely the model's problem.
#[derive(Clone)]
pub struct LlmQuestionService {
    client: Client,
    config: Option<LlmConfig>,
}

impl LlmQuestionService {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(LlmConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<LlmConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    async fn fetch_question(&self, film: &str) -> Result<TriviaQuestion, FetchError> {
        let config = self.config.as_ref().ok_or(FetchError::Disabled)?;

        let url = format!("{}/v1/messages", config.base_url.trim_end_matches('/'));
        let prompt = format!(
            "Generate a trivia question about Black cinema in JSON format with fields: \
             question, options (array), answer, and movie_title. Use the film \"{film}\" \
             and craft a unique and challenging (but not impossibly difficult) question \
             about its plot, characters, director, awards, or an interesting fact, along \
             with four possible answer options including the correct one. Ensure the \
             question hasn't been used before."
        );
        let payload = MessagesRequest {
            model: config.model.clone(),
            max_tokens: 300,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(url)
            .header("x-api-key", &config.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status()));
        }

        let body: MessagesResponse = response.json().await?;
        let text = body
            .content
            .into_iter()
            .next()
            .map(|block| block.text)
            .ok_or(FetchError::EmptyResponse)?;

        parse_question_text(&text)
    }
}

#[async_trait::async_trait]
impl QuestionSource for LlmQuestionService {
    async fn next_question(&self) -> TriviaQuestion {
        let film = random_film();
        match self.fetch_question(film).await {
            Ok(question) => question,
            Err(err) => {
                warn!("question generation for {film:?} degraded to sentinel: {err}");
                TriviaQuestion::sentinel()
            }
        }
    }
}

/// Extract the substring between the first `{` and the last `}`.
///
/// The model is allowed to wrap its JSON object in prose; anything outside
/// the outermost braces is discarded.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Parse the model's reply text into a validated question.
///
/// Missing keys substitute sentinel defaults; an answer that is not one of
/// the options (or an option list outside 2..=6 entries) is rejected as
/// malformed, which the caller maps to the full sentinel.
fn parse_question_text(text: &str) -> Result<TriviaQuestion, FetchError> {
    let json = extract_json_object(text)
        .ok_or_else(|| FetchError::Malformed("no JSON object in reply".into()))?;
    let raw: RawQuestion =
        serde_json::from_str(json).map_err(|e| FetchError::Malformed(e.to_string()))?;

    let prompt = raw.question.unwrap_or_else(|| SENTINEL_PROMPT.to_owned());
    let options = raw.options.unwrap_or_default();
    let answer = raw.answer.unwrap_or_else(|| SENTINEL_ANSWER.to_owned());
    let subject = raw
        .movie_title
        .unwrap_or_else(|| SENTINEL_SUBJECT.to_owned());

    TriviaQuestion::new(prompt, options, answer, subject)
        .map_err(|e| FetchError::Malformed(e.to_string()))
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    question: Option<String>,
    options: Option<Vec<String>>,
    answer: Option<String>,
    movie_title: Option<String>,
}
