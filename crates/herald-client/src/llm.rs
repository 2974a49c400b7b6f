use std::time::Duration;

use herald_core::error::AppError;
use herald_core::headline::{HeadlinePrompt, parse_headline};
use herald_core::traits::Summarizer;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::http::{API_USER_AGENT, build_client, send_error};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(60);

/// Headline generator backed by an OpenAI-compatible chat completion API.
#[derive(Clone)]
pub struct OpenAiSummarizer {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
    prompt: HeadlinePrompt,
}

impl OpenAiSummarizer {
    pub fn new(api_key: &str, model: &str) -> Result<Self, AppError> {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: &str, model: &str, base_url: &str) -> Result<Self, AppError> {
        Self::build(api_key, model, base_url, DEFAULT_LLM_TIMEOUT)
    }

    pub fn with_timeout(self, timeout: Duration) -> Result<Self, AppError> {
        let prompt = self.prompt.clone();
        Ok(Self::build(&self.api_key, &self.model, &self.base_url, timeout)?.with_prompt(prompt))
    }

    pub fn with_prompt(mut self, prompt: HeadlinePrompt) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build(
        api_key: &str,
        model: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        Ok(Self {
            client: build_client(API_USER_AGENT, timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            timeout_secs: timeout.as_secs(),
            prompt: HeadlinePrompt::default(),
        })
    }

    fn request(&self, body: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system",
                    content: self.prompt.system().to_string(),
                },
                Message {
                    role: "user",
                    content: self.prompt.user(body),
                },
            ],
        }
    }
}

// ---- OpenAI API types ----

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl ChatResponse {
    fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, body: &str) -> Result<String, AppError> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request(body))
            .send()
            .await
            .map_err(|e| send_error(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            if status_code == 429 {
                return Err(AppError::RateLimitExceeded);
            }
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&raw)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {status_code}: {raw}"));
            return Err(AppError::LlmError {
                message,
                status_code,
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to parse LLM response: {e}")))?;

        let headline = parse_headline(chat.first_content())?;
        tracing::debug!(model = %self.model, %headline, "Headline generated");
        Ok(headline)
    }
}
