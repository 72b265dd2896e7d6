//! Google Gemini `generateContent` client

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
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Summarizer backed by the Gemini API
pub struct GeminiSummarizer {
    client: ClientWithMiddleware,
    api_key: Option<String>,
    endpoint: String,
    model: String,
    system_prompt: String,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
}

impl GeminiSummarizer {
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
            endpoint: http_client::join(
                &config.base_url,
                &format!("models/{}:generateContent", config.model),
            ),
            model: config.model.clone(),
            system_prompt: config.system_prompt.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    fn generation_config(&self) -> Option<GenerationConfig> {
        if self.temperature.is_none() && self.max_output_tokens.is_none() {
            return None;
        }
        Some(GenerationConfig {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        })
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    #[instrument(skip_all, fields(periods = forecast.periods.len()))]
    async fn summarize(&self, forecast: &DetailedForecast) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ForecastError::MissingCredential {
                variable: "GEMINI_API_KEY",
            })?;

        let prompt = build_prompt(forecast);
        let request = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &self.system_prompt,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: &prompt }],
            }],
            generation_config: self.generation_config(),
        };

        debug!(
            "Requesting content generation from {} ({} prompt chars)",
            self.model,
            prompt.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ForecastError::summarization(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ForecastError::summarization(format!(
                "Gemini API error ({status}): {error_text}"
            )));
        }

        let generated: GenerateContentResponse = response.json().await.map_err(|e| {
            ForecastError::summarization(format!("Failed to parse Gemini response: {e}"))
        })?;

        let summary: String = generated
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if summary.trim().is_empty() {
            return Err(ForecastError::summarization("No candidates returned from Gemini"));
        }

        info!("Generated summary ({} chars)", summary.len());
        Ok(summary)
    }
}
