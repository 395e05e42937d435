//! HTTP client for the vision gesture classifier.
//!
//! One sampled frame goes out as an inline JPEG with a one-word prompt; one
//! label word comes back. The public `classify` method never fails: any
//! transport, status, or payload problem is logged and reported as
//! `GestureLabel::None`, and the next sampler tick tries again.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gesture::GestureLabel;

use super::response::parse_label;

/// Environment variable holding the API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default API base URL.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model for gesture classification.
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default timeout for HTTP requests (15 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const PROMPT: &str = "Look at the hand in this image and reply with exactly one \
word: FIST if a closed fist is visible, OPEN if an open hand is visible, or \
NONE if neither is clearly visible.";

/// Errors from a single classification attempt. These stay internal: callers
/// of `classify` only ever see a label.
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("API key not set (set {GEMINI_API_KEY_ENV})")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response contained no text")]
    EmptyResponse,
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Part {
    Text(String),
    InlineData(InlineData),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Client for the gesture classification endpoint.
pub struct GestureClient {
    api_key: Option<String>,
    base_url: String,
    model: String,
    http_client: reqwest::Client,
}

impl GestureClient {
    /// Create a client reading the API key from the environment. A missing
    /// key is not an error here; classification will just return `None`.
    pub fn from_env() -> Result<Self, ClassifyError> {
        let api_key = std::env::var(GEMINI_API_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty());
        Self::build(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Create a client with an explicit key.
    pub fn with_api_key(api_key: String) -> Result<Self, ClassifyError> {
        if api_key.is_empty() {
            return Err(ClassifyError::MissingApiKey);
        }
        Self::build(Some(api_key), DEFAULT_BASE_URL.to_string())
    }

    /// Create a client with a custom base URL.
    ///
    /// Useful for testing against a mock server.
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, ClassifyError> {
        if api_key.is_empty() {
            return Err(ClassifyError::MissingApiKey);
        }
        Self::build(Some(api_key), base_url)
    }

    fn build(api_key: Option<String>, base_url: String) -> Result<Self, ClassifyError> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            api_key,
            base_url,
            model: DEFAULT_MODEL.to_string(),
            http_client,
        })
    }

    /// Whether a key is configured. Used to log a single startup hint.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Classify a JPEG-encoded frame. Never errors: every failure path
    /// degrades to `GestureLabel::None`.
    pub async fn classify(&self, jpeg: &[u8]) -> GestureLabel {
        match self.classify_inner(jpeg).await {
            Ok(label) => label,
            Err(e) => {
                warn!("gesture classification failed: {}", e);
                GestureLabel::None
            }
        }
    }

    async fn classify_inner(&self, jpeg: &[u8]) -> Result<GestureLabel, ClassifyError> {
        let api_key = self.api_key.as_ref().ok_or(ClassifyError::MissingApiKey)?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text(PROMPT.to_string()),
                    Part::InlineData(InlineData {
                        mime_type: "image/jpeg".to_string(),
                        data: BASE64.encode(jpeg),
                    }),
                ],
            }],
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, api_key
        );

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text = parsed
            .candidates
            .and_then(|mut c| c.drain(..).next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .and_then(|mut p| p.drain(..).next())
            .and_then(|p| p.text)
            .ok_or(ClassifyError::EmptyResponse)?;

        Ok(parse_label(&text))
    }
}
