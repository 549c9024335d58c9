//! Google Gemini `generateContent` client.
//!
//! Configuration comes from `GEMINI_API_KEY`, with optional
//! `STAYFIT_GEMINI_MODEL` and `STAYFIT_GEMINI_BASE_URL` overrides.

use std::env;
use std::fmt;

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::TextGenerator;

const API_KEY_ENV: &str = "GEMINI_API_KEY";
const MODEL_ENV: &str = "STAYFIT_GEMINI_MODEL";
const BASE_URL_ENV: &str = "STAYFIT_GEMINI_BASE_URL";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
/// Public Generative Language API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Longest slice of an error body quoted in error messages.
const ERROR_BODY_LIMIT: usize = 300;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Connection settings for [`GeminiClient`].
#[derive(Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Read the configuration from the environment.
    ///
    /// Returns `None` when `GEMINI_API_KEY` is unset or empty, meaning no
    /// generative service is available.
    pub fn from_env() -> Option<Self> {
        let api_key = env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty())?;
        let mut config = Self::new(api_key);
        if let Ok(model) = env::var(MODEL_ENV) {
            config = config.with_model(model);
        }
        if let Ok(base_url) = env::var(BASE_URL_ENV) {
            config = config.with_base_url(base_url);
        }
        Some(config)
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

fn build_request(prompt: &str) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![RequestContent {
            parts: vec![RequestPart { text: prompt }],
        }],
    }
}

/// Pull the first candidate's first text part out of a response body.
fn extract_text(body: &str) -> Result<String> {
    let response: GenerateResponse =
        serde_json::from_str(body).context("failed to decode Gemini response")?;

    if let Some(error) = response.error {
        bail!("Gemini API error: {}", error.message);
    }

    response
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| anyhow!("Gemini response contained no text"))
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// [`TextGenerator`] backed by the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, prompt), fields(model = %self.config.model))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(prompt_len = prompt.len(), "sending generateContent request");

        let response = self
            .client
            .post(self.config.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&build_request(prompt))
            .send()
            .await
            .context("Gemini request failed")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("failed to read Gemini response body")?;

        if !status.is_success() {
            bail!("Gemini returned HTTP {status}: {}", truncate(&body));
        }

        let text = extract_text(&body)?;
        debug!(response_len = text.len(), "received Gemini response");
        Ok(text)
    }
}
