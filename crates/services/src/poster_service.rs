use std::env;

use log::warn;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::FetchError;

/// Single keyed-by-title poster lookup.
///
/// Absent on any failure or missing field; never retried.
#[async_trait::async_trait]
pub trait PosterLookup: Send + Sync {
    async fn lookup(&self, title: &str) -> Option<Url>;
}

#[derive(Clone, Debug)]
pub struct OmdbConfig {
    pub base_url: String,
    pub api_key: String,
}

impl OmdbConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("TRIVIA_OMDB_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url =
            env::var("TRIVIA_OMDB_BASE_URL").unwrap_or_else(|_| "https://www.omdbapi.com".into());
        Some(Self { base_url, api_key })
    }
}

/// Poster lookup backed by the OMDb movie metadata service.
#[derive(Clone)]
pub struct OmdbPosterService {
    client: Client,
    config: Option<OmdbConfig>,
}

impl OmdbPosterService {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(OmdbConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<OmdbConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    async fn fetch_poster(&self, title: &str) -> Result<Option<Url>, FetchError> {
        let config = self.config.as_ref().ok_or(FetchError::Disabled)?;

        let response = self
            .client
            .get(&config.base_url)
            .query(&[("t", title), ("apikey", config.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status()));
        }

        let body: OmdbResponse = response.json().await?;
        Ok(poster_url(body.poster.as_deref()))
    }
}

#[async_trait::async_trait]
impl PosterLookup for OmdbPosterService {
    async fn lookup(&self, title: &str) -> Option<Url> {
        match self.fetch_poster(title).await {
            Ok(poster) => poster,
            Err(err) => {
                warn!("poster lookup for {title:?} failed: {err}");
                None
            }
        }
    }
}

/// OMDb marks a missing poster with the literal string "N/A".
fn poster_url(raw: Option<&str>) -> Option<Url> {
    let raw = raw?;
    if raw == "N/A" {
        return None;
    }
    Url::parse(raw).ok()
}

#[derive(Debug, Deserialize)]
struct OmdbResponse {
    #[serde(rename = "Poster")]
    poster: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_marker_and_bad_urls_are_absent() {
        assert_eq!(poster_url(None), None);
        assert_eq!(poster_url(Some("N/A")), None);
        assert_eq!(poster_url(Some("not a url")), None);
    }

    #[test]
    fn valid_poster_url_is_returned() {
        let url = poster_url(Some("https://m.media-amazon.com/images/M/x.jpg")).unwrap();
        assert_eq!(url.host_str(), Some("m.media-amazon.com"));
    }

    #[test]
    fn response_shape_tolerates_missing_field() {
        let body: OmdbResponse = serde_json::from_str(r#"{"Title": "Moonlight"}"#).unwrap();
        assert_eq!(body.poster, None);
    }

    #[tokio::test]
    async fn disabled_service_returns_none() {
        let service = OmdbPosterService::new(None);
        assert!(!service.enabled());
        assert_eq!(service.lookup("Moonlight").await, None);
    }
}
