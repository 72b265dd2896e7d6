//! Configuration management for the forecast summary service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::ForecastError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the service
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ForecastConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Weather API configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Text-generation API configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Trace export configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_server_host")]
    pub host: String,
    /// Port to bind
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Overall time budget for one request in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
    /// PEM certificate chain; TLS is served when both cert and key are set
    pub tls_cert_path: Option<PathBuf>,
    /// PEM private key
    pub tls_key_path: Option<PathBuf>,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL for weather API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// User agent sent with every request (api.weather.gov rejects anonymous clients)
    #[serde(default = "default_weather_user_agent")]
    pub user_agent: String,
    /// Request timeout in seconds
    #[serde(default = "default_upstream_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_upstream_max_retries")]
    pub max_retries: u32,
}

/// Supported text-generation backends
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    OpenAi,
    Gemini,
}

impl LlmProvider {
    /// Environment variable holding the credential for this backend
    #[must_use]
    pub fn credential_variable(self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "OPENAI_API_KEY",
            LlmProvider::Gemini => "GEMINI_API_KEY",
        }
    }

    #[must_use]
    pub fn default_base_url(self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "https://api.openai.com/v1",
            LlmProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }

    #[must_use]
    pub fn default_model(self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "gpt-4o-mini",
            LlmProvider::Gemini => "gemini-2.0-flash",
        }
    }
}

/// Text-generation API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Which backend to call
    #[serde(default)]
    pub provider: LlmProvider,
    /// API key; falls back to the provider's environment variable
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Base URL; empty means the provider default
    #[serde(default)]
    pub base_url: String,
    /// Model name; empty means the provider default
    #[serde(default)]
    pub model: String,
    /// System instruction sent ahead of the forecast
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Sampling temperature (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Upper bound on generated tokens
    pub max_output_tokens: Option<u32>,
    /// Request timeout in seconds. Requests are never retried.
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u32,
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default)]
    pub format: LogFormat,
}

/// OpenTelemetry trace export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// OTLP/HTTP traces endpoint (e.g. `http://localhost:4318/v1/traces`); export is off when unset
    pub otlp_endpoint: Option<String>,
    /// Service name reported with every span
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    5001
}

fn default_request_timeout() -> u32 {
    120
}

fn default_weather_base_url() -> String {
    "https://api.weather.gov".to_string()
}

fn default_weather_user_agent() -> String {
    format!("forecast-summary/{}", crate::VERSION)
}

fn default_upstream_timeout() -> u32 {
    30
}

fn default_upstream_max_retries() -> u32 {
    2
}

fn default_system_prompt() -> String {
    "You are a helpful assistant.".to_string()
}

fn default_llm_timeout() -> u32 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "forecast-summary".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            request_timeout_seconds: default_request_timeout(),
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            user_agent: default_weather_user_agent(),
            timeout_seconds: default_upstream_timeout(),
            max_retries: default_upstream_max_retries(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            api_key: None,
            base_url: String::new(),
            model: String::new(),
            system_prompt: default_system_prompt(),
            temperature: None,
            max_output_tokens: None,
            timeout_seconds: default_llm_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            otlp_endpoint: None,
            service_name: default_service_name(),
        }
    }
}

impl ForecastConfig {
    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // An explicit path must exist; the default location is optional
        match config_path {
            Some(path) => {
                builder = builder.add_source(
                    File::from(path)
                        .required(true)
                        .format(config::FileFormat::Toml),
                );
            }
            None => {
                let default_file = Self::get_config_path();
                if default_file.exists() {
                    builder = builder.add_source(
                        File::from(default_file)
                            .required(false)
                            .format(config::FileFormat::Toml),
                    );
                }
            }
        }

        // Environment overrides, e.g. FORECAST_SERVER__PORT=8080
        builder = builder.add_source(
            Environment::with_prefix("FORECAST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: ForecastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.resolve_api_key(|name| std::env::var(name).ok());
        config.validate()?;

        Ok(config)
    }

    /// Default configuration file path
    #[must_use]
    pub fn get_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.user_agent.is_empty() {
            self.weather.user_agent = default_weather_user_agent();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_upstream_timeout();
        }
        if self.llm.base_url.is_empty() {
            self.llm.base_url = self.llm.provider.default_base_url().to_string();
        }
        if self.llm.model.is_empty() {
            self.llm.model = self.llm.provider.default_model().to_string();
        }
        if self.llm.system_prompt.is_empty() {
            self.llm.system_prompt = default_system_prompt();
        }
        if self.llm.timeout_seconds == 0 {
            self.llm.timeout_seconds = default_llm_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.telemetry.service_name.is_empty() {
            self.telemetry.service_name = default_service_name();
        }
    }

    /// Fill the API key from the provider's environment variable when the
    /// config did not set one. Empty values count as unset.
    pub fn resolve_api_key<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let configured = self.llm.api_key.take().filter(|key| !key.trim().is_empty());
        self.llm.api_key = configured.or_else(|| {
            lookup(self.llm.provider.credential_variable()).filter(|key| !key.trim().is_empty())
        });
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials.
    ///
    /// A missing key is allowed here: the server starts and summaries fail
    /// per request until the key is provided.
    pub fn validate_api_keys(&self) -> Result<()> {
        if let Some(api_key) = &self.llm.api_key {
            if api_key.len() < 8 {
                return Err(ForecastError::config(format!(
                    "{} appears to be invalid (too short). Please check your API key.",
                    self.llm.provider.credential_variable()
                ))
                .into());
            }

            if api_key.chars().any(char::is_whitespace) {
                return Err(ForecastError::config(format!(
                    "{} must not contain whitespace.",
                    self.llm.provider.credential_variable()
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.request_timeout_seconds > 600 {
            return Err(ForecastError::config("Server request timeout cannot exceed 600 seconds").into());
        }

        if self.weather.timeout_seconds > 300 {
            return Err(ForecastError::config("Weather API timeout cannot exceed 300 seconds").into());
        }

        if self.llm.timeout_seconds > 300 {
            return Err(ForecastError::config("LLM API timeout cannot exceed 300 seconds").into());
        }

        if self.weather.max_retries > 10 {
            return Err(ForecastError::config("Weather API max retries cannot exceed 10").into());
        }

        if let Some(temperature) = self.llm.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ForecastError::config(format!(
                    "LLM temperature must be between 0.0 and 2.0, got: {temperature}"
                ))
                .into());
            }
        }

        if self.llm.max_output_tokens == Some(0) {
            return Err(ForecastError::config("LLM max output tokens must be positive").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ForecastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let urls = [
            ("Weather API base URL", Some(&self.weather.base_url)),
            ("LLM API base URL", Some(&self.llm.base_url)),
            ("OTLP endpoint", self.telemetry.otlp_endpoint.as_ref()),
        ];
        for (label, url) in urls {
            if let Some(url) = url {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(ForecastError::config(format!(
                        "{label} must be a valid HTTP or HTTPS URL"
                    ))
                    .into());
                }
            }
        }

        if self.server.tls_cert_path.is_some() != self.server.tls_key_path.is_some() {
            return Err(ForecastError::config(
                "TLS requires both tls_cert_path and tls_key_path",
            )
            .into());
        }

        Ok(())
    }
}
