// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Generative-language API client.
//!
//! Handles:
//! - Single-shot text generation against a named model
//! - Extraction of the API's error message for failure classification

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A failed generation attempt as reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    /// HTTP status, if the backend answered at all
    pub status: Option<u16>,
    pub message: String,
}

impl BackendError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "[{}] {}", status, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for BackendError {}

/// A text generation service addressed by model identifier.
///
/// Implementations make exactly one attempt per call.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, BackendError>;
}

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
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
struct ApiErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    status: Option<String>,
}

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    /// Turn an error body into a message, preferring the API's own wording.
    fn error_message(body: &str) -> String {
        match serde_json::from_str::<ApiErrorEnvelope>(body) {
            Ok(envelope) => match envelope.error.status {
                Some(status) => format!("{} ({})", envelope.error.message, status),
                None => envelope.error.message,
            },
            Err(_) if body.trim().is_empty() => "empty error response".to_string(),
            Err(_) => body.trim().to_string(),
        }
    }

    /// First text part of the first candidate.
    fn extract_text(response: GenerateResponse) -> Result<String, BackendError> {
        if let Some(error) = response.error {
            return Err(BackendError::new(None, error.message));
        }

        response
            .candidates
            .into_iter()
            .flatten()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
            .ok_or_else(|| BackendError::new(None, "No text content in generation response"))
    }
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, BackendError> {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };

        tracing::debug!(model, prompt_len = prompt.len(), "Sending generation request");

        let response = self
            .http
            .post(self.url(model))
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::new(None, format!("Request failed: {}", e.without_url())))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| {
                BackendError::new(None, format!("Failed to read response: {}", e.without_url()))
            })?;

        if !status.is_success() {
            return Err(BackendError::new(
                Some(status.as_u16()),
                Self::error_message(&text),
            ));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text).map_err(|e| {
            BackendError::new(None, format!("Unexpected generation response: {}", e))
        })?;

        let content = Self::extract_text(parsed)?;
        tracing::debug!(model, response_len = content.len(), "Generation response received");
        Ok(content)
    }
}
