// src/scoring/client.rs
use super::prompt::build_prompt;
use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("failed to build scoring prompt: {0}")]
    Prompt(#[from] serde_json::Error),
    #[error("language model request failed: {0}")]
    Request(String),
    #[error("could not parse score from response: '{0}'")]
    Unparseable(String),
}

/// Text generation backend.
#[rocket::async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[rocket::async_trait]
impl<M: LanguageModel + ?Sized> LanguageModel for Box<M> {
    async fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt).await
    }
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// Google Gemini `generateContent` client.
pub struct GeminiClient {
    client: Client,
    settings: GeminiSettings,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, settings })
    }
}

#[rocket::async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        );
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        info!("Sending scoring request to {}", self.settings.model);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.settings.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Gemini API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Gemini API error {}: {}", status, error_text);
            anyhow::bail!("Gemini API returned error {}: {}", status, error_text);
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse Gemini API response")?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default();
        Ok(text)
    }
}

/// Concatenate every ASCII digit in `text` and clamp the number to 0..=100.
///
/// Digits are taken from anywhere, so "about 8/10, i.e. 80%" reads as 8108
/// and clamps to 100. Signs are dropped. No digits at all is no score.
pub fn parse_score(text: &str) -> Option<u8> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }

    let significant = digits.trim_start_matches('0');
    if significant.len() > 3 {
        return Some(100);
    }
    let value: u16 = significant.parse().unwrap_or(0);
    Some(value.min(100) as u8)
}

/// Scores a profile against a job description through a language model.
/// One request per call, never retried.
pub struct ScoringClient<M: LanguageModel> {
    model: M,
}

impl<M: LanguageModel> ScoringClient<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub async fn score(&self, job_description: &Value, candidate: &Value) -> Result<u8, ScoringError> {
        let prompt = build_prompt(job_description, candidate)?;
        let response = self
            .model
            .generate(&prompt)
            .await
            .map_err(|e| ScoringError::Request(format!("{:#}", e)))?;

        parse_score(&response).ok_or(ScoringError::Unparseable(response))
    }

    /// Like `score`, with every failure logged and reported as no score.
    pub async fn score_or_absent(&self, job_description: &Value, candidate: &Value) -> Option<u8> {
        match self.score(job_description, candidate).await {
            Ok(score) => Some(score),
            Err(e) => {
                warn!("Scoring failed: {}", e);
                None
            }
        }
    }
}

/// Short verdict shown next to a score.
pub fn fit_note(score: u8) -> Option<&'static str> {
    if score >= 80 {
        Some("Strong match for this role.")
    } else if score < 50 {
        Some("You might not be a strong fit for this role based on the current scoring.")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Canned(&'static str);

    #[rocket::async_trait]
    impl LanguageModel for Canned {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Unavailable;

    #[rocket::async_trait]
    impl LanguageModel for Unavailable {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            anyhow::bail!("connection refused")
        }
    }

    #[test]
    fn test_parse_score_plain() {
        assert_eq!(parse_score("85"), Some(85));
        assert_eq!(parse_score("score: 72\n"), Some(72));
        assert_eq!(parse_score("0"), Some(0));
    }

    #[test]
    fn test_parse_score_clamps() {
        assert_eq!(parse_score("142"), Some(100));
        assert_eq!(parse_score("99999999999999999999999999"), Some(100));
        assert_eq!(parse_score("0042"), Some(42));
    }

    // Known-odd behaviour kept on purpose: digits anywhere are concatenated.
    #[test]
    fn test_parse_score_concatenates_all_digits() {
        assert_eq!(parse_score("It's about 8/10, i.e. 80%"), Some(100));
        assert_eq!(parse_score("-5 not a fit"), Some(5));
        assert_eq!(parse_score("1 or 2"), Some(12));
    }

    #[test]
    fn test_parse_score_without_digits_is_absent() {
        assert_eq!(parse_score("no idea"), None);
        assert_eq!(parse_score(""), None);
    }

    #[tokio::test]
    async fn test_score_with_model() {
        let client = ScoringClient::new(Canned("Score: 77"));
        let score = client.score(&json!({"job_title": "SRE"}), &json!({"name": "Jane"})).await;
        assert_eq!(score.unwrap(), 77);
    }

    #[tokio::test]
    async fn test_unparseable_response() {
        let client = ScoringClient::new(Canned("I cannot score this candidate."));
        let err = client.score(&json!({}), &json!({})).await.unwrap_err();
        assert!(matches!(err, ScoringError::Unparseable(_)));
        assert_eq!(client.score_or_absent(&json!({}), &json!({})).await, None);
    }

    #[tokio::test]
    async fn test_request_failure_is_absent() {
        let client = ScoringClient::new(Unavailable);
        let err = client.score(&json!({}), &json!({})).await.unwrap_err();
        assert!(matches!(err, ScoringError::Request(_)));
        assert_eq!(client.score_or_absent(&json!({}), &json!({})).await, None);
    }

    #[test]
    fn test_fit_note() {
        assert!(fit_note(80).is_some());
        assert!(fit_note(65).is_none());
        assert!(fit_note(10).unwrap().contains("not be a strong fit"));
    }
}
