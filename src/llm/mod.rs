//! Text-generation backends that turn a forecast into a short summary

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::config::{LlmConfig, LlmProvider};
use crate::models::DetailedForecast;

pub mod gemini;
pub mod openai;

pub use gemini::GeminiSummarizer;
pub use openai::OpenAiSummarizer;

/// Produces natural-language summaries of forecasts
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, forecast: &DetailedForecast) -> Result<String>;
}

/// Build the summarizer selected by `config.provider`
pub fn from_config(config: &LlmConfig) -> Result<Arc<dyn Summarizer>> {
    Ok(match config.provider {
        LlmProvider::OpenAi => Arc::new(OpenAiSummarizer::new(config)?),
        LlmProvider::Gemini => Arc::new(GeminiSummarizer::new(config)?),
    })
}

/// User prompt: an instruction followed by one line per forecast period
#[must_use]
pub fn build_prompt(forecast: &DetailedForecast) -> String {
    let mut prompt = String::from("Summarize this content:");
    for line in forecast.descriptions() {
        prompt.push_str("\n- ");
        prompt.push_str(&line);
    }
    prompt
}
