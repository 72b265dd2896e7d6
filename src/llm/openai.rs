//! OpenAI chat completions client

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::{Summarizer, build_prompt};
use crate::config::LlmConfig;
use crate::http_client;
use crate::models::DetailedForecast;
use crate::{ForecastError, Result};

const SERVICE: &str = "text generation";
// One summary is one billable generation call
const MAX_RETRIES: u32 = 0;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Summarizer backed by the OpenAI chat completions API
pub struct OpenAiSummarizer {
    client: ClientWithMiddleware,
    api_key: Option<String>,
    endpoint: String,
    model: String,
    system_prompt: String,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
}

impl OpenAiSummarizer {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = http_client::build(
            SERVICE,
            concat!("forecast-summary/", env!("CARGO_PKG_VERSION")),
            config.timeout_seconds,
            MAX_RETRIES,
        )?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint: http_client::join(&config.base_url, "chat/completions"),
            model: config.model.clone(),
            system_prompt: config.system_prompt.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    #[instrument(skip_all, fields(periods = forecast.periods.len()))]
    async fn summarize(&self, forecast: &DetailedForecast) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ForecastError::MissingCredential {
                variable: "OPENAI_API_KEY",
            })?;

        let prompt = build_prompt(forecast);
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: self.temperature,
            max_completion_tokens: self.max_output_tokens,
        };

        debug!(
            "Requesting chat completion from {} ({} prompt chars)",
            self.model,
            prompt.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ForecastError::summarization(format!("OpenAI request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ForecastError::summarization(format!(
                "OpenAI API error ({status}): {error_text}"
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            ForecastError::summarization(format!("Failed to parse OpenAI response: {e}"))
        })?;

        let summary = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ForecastError::summarization("No completion returned from OpenAI"))?;

        info!("Generated summary ({} chars)", summary.len());
        Ok(summary)
    }
}
