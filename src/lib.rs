//! `forecast-summary` - weather forecasts summarized by a language model
//!
//! This library provides the HTTP endpoint, the weather and text-generation
//! clients it chains together, and the configuration and logging around them.

pub mod api;
pub mod config;
pub mod error;
pub mod http_client;
pub mod llm;
pub mod models;
pub mod telemetry;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use config::ForecastConfig;
pub use error::ForecastError;
pub use llm::Summarizer;
pub use models::{Coordinates, DetailedForecast, ForecastPeriod};
pub use weather::ForecastProvider;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ForecastError>;
