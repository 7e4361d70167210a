/// LLM Client: the single point of entry for all Gemini API calls in ResumeMagic.
///
/// ARCHITECTURAL RULE: No other module may call the Generative Language API directly.
/// Callers depend on the `VisionModel` / `TextModel` traits, never on `GeminiClient`.
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use eventsource_stream::{EventStreamError, Eventsource};
use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const API_KEY_HEADER: &str = "x-goog-api-key";
const FINISH_REASON_STOP: &str = "STOP";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Prompt blocked by the model: {0}")]
    Blocked(String),

    #[error("Malformed event stream: {0}")]
    Stream(String),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Image + text in, text out.
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn generate_with_image(&self, prompt: &str, image_png: &[u8]) -> Result<String, LlmError>;
}

/// Text in, text out. `generate_streamed` drains the stream before returning.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    async fn generate_streamed(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage_metadata: Option<UsageMetadata>,
    /// Set when the API reports a failure inside a 200 response, e.g. mid-stream.
    pub error: Option<GeminiErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Concatenates every text part of the first candidate.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    fn finish_reason(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
    }

    /// Fails on an embedded API error, a blocked prompt, or a candidate that
    /// stopped for any reason other than `STOP`.
    fn check(&self) -> Result<(), LlmError> {
        if let Some(error) = &self.error {
            return Err(LlmError::Api {
                status: error.code,
                message: error.message.clone(),
            });
        }
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(LlmError::Blocked(reason.to_string()));
        }
        match self.finish_reason() {
            Some(reason) if reason != FINISH_REASON_STOP => {
                Err(LlmError::Blocked(format!("generation stopped: {reason}")))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct GeminiErrorBody {
    #[serde(default)]
    pub code: u16,
    pub message: String,
}

/// Client for one Gemini model. ResumeMagic builds two: a vision model and a text model.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        base_url: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, self.model, method)
    }

    async fn send(&self, url: &str, parts: Vec<RequestPart<'_>>) -> Result<reqwest::Response, LlmError> {
        let request_body = GenerateContentRequest {
            contents: vec![Content { role: "user", parts }],
        };

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    /// Single-shot `generateContent` call.
    async fn call(&self, parts: Vec<RequestPart<'_>>) -> Result<String, LlmError> {
        let response = self.send(&self.endpoint("generateContent"), parts).await?;
        let body: GenerateContentResponse = response.json().await?;

        if let Some(usage) = &body.usage_metadata {
            debug!(
                "Gemini call succeeded: model={}, prompt_tokens={}, output_tokens={}, finish_reason={:?}",
                self.model,
                usage.prompt_token_count,
                usage.candidates_token_count,
                body.finish_reason()
            );
        }

        into_text(&body)
    }

    /// `streamGenerateContent` over SSE, drained event by event into one string.
    async fn call_streamed(&self, parts: Vec<RequestPart<'_>>) -> Result<String, LlmError> {
        let url = format!("{}?alt=sse", self.endpoint("streamGenerateContent"));
        let response = self.send(&url, parts).await?;

        let mut events = std::pin::pin!(response.bytes_stream().eventsource());
        let mut text = String::new();
        let mut count = 0usize;

        while let Some(event) = events.next().await {
            let event = event.map_err(|e| match e {
                EventStreamError::Transport(e) => LlmError::Http(e),
                other => LlmError::Stream(other.to_string()),
            })?;
            if event.data.is_empty() {
                continue;
            }
            let chunk: GenerateContentResponse = serde_json::from_str(&event.data)?;
            chunk.check()?;
            text.push_str(&chunk.text());
            count += 1;
        }

        debug!("Gemini stream drained: model={}, events={count}", self.model);

        if text.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(text)
    }
}

fn into_text(body: &GenerateContentResponse) -> Result<String, LlmError> {
    body.check()?;
    let text = body.text();
    if text.trim().is_empty() {
        return Err(LlmError::EmptyContent);
    }
    Ok(text)
}

#[async_trait]
impl VisionModel for GeminiClient {
    async fn generate_with_image(&self, prompt: &str, image_png: &[u8]) -> Result<String, LlmError> {
        let parts = vec![
            RequestPart::Text { text: prompt },
            RequestPart::InlineData {
                inline_data: InlineData {
                    mime_type: "image/png",
                    data: general_purpose::STANDARD.encode(image_png),
                },
            },
        ];
        self.call(parts).await
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.call(vec![RequestPart::Text { text: prompt }]).await
    }

    async fn generate_streamed(&self, prompt: &str) -> Result<String, LlmError> {
        self.call_streamed(vec![RequestPart::Text { text: prompt }]).await
    }
}
