//! HTTP routes: the forecast summary endpoint and a health check

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use tracing::{info, instrument};

use crate::config::ForecastConfig;
use crate::llm::{self, Summarizer};
use crate::models::Coordinates;
use crate::weather::{ForecastProvider, NwsClient};
use crate::Result;

/// Shared, immutable handler state
#[derive(Clone)]
pub struct AppState {
    pub forecasts: Arc<dyn ForecastProvider>,
    pub summarizer: Arc<dyn Summarizer>,
}

impl AppState {
    #[must_use]
    pub fn new(forecasts: Arc<dyn ForecastProvider>, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            forecasts,
            summarizer,
        }
    }

    /// Wire up the weather client and the configured summarizer
    pub fn from_config(config: &ForecastConfig) -> Result<Self> {
        Ok(Self::new(
            Arc::new(NwsClient::new(&config.weather)?),
            llm::from_config(&config.llm)?,
        ))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/forecast/{latitude}/{longitude}", get(get_forecast))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Forecast for the point, summarized by the language model.
///
/// The summarizer only runs once the weather lookup has succeeded.
#[instrument(skip(state))]
async fn get_forecast(
    State(state): State<AppState>,
    Path((latitude, longitude)): Path<(String, String)>,
) -> Result<String> {
    let coordinates = Coordinates::parse(&latitude, &longitude)?;

    let forecast = state.forecasts.detailed_forecast(&coordinates).await?;
    let summary = state.summarizer.summarize(&forecast).await?;

    info!(
        "Summarized {} periods for {}",
        forecast.periods.len(),
        coordinates.format_coordinates()
    );
    Ok(summary)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ForecastError;
    use crate::models::{DetailedForecast, ForecastPeriod};
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use std::sync::Mutex;
    use tower::ServiceExt;

    type CallLog = Arc<Mutex<Vec<&'static str>>>;

    struct FakeForecasts {
        calls: CallLog,
        fail_with: Option<u16>,
    }

    #[async_trait]
    impl ForecastProvider for FakeForecasts {
        async fn detailed_forecast(&self, coordinates: &Coordinates) -> Result<DetailedForecast> {
            self.calls.lock().unwrap().push("weather");
            if let Some(status) = self.fail_with {
                return Err(ForecastError::PointsLookup { status });
            }
            Ok(DetailedForecast::new(
                *coordinates,
                vec![ForecastPeriod::new("Today", "Mild and dry.")],
            ))
        }
    }

    struct FakeSummarizer {
        calls: CallLog,
    }

    #[async_trait]
    impl Summarizer for FakeSummarizer {
        async fn summarize(&self, forecast: &DetailedForecast) -> Result<String> {
            self.calls.lock().unwrap().push("summarize");
            Ok(format!("{} periods summarized", forecast.periods.len()))
        }
    }

    fn app(fail_with: Option<u16>) -> (Router, CallLog) {
        let calls: CallLog = Arc::default();
        let state = AppState::new(
            Arc::new(FakeForecasts {
                calls: calls.clone(),
                fail_with,
            }),
            Arc::new(FakeSummarizer {
                calls: calls.clone(),
            }),
        );
        (router(state), calls)
    }

    async fn send(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_weather_then_summary_once_each() {
        let (app, calls) = app(None);
        let (status, body) = send(app, "/forecast/40.7/-74.0").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "1 periods summarized");
        assert_eq!(*calls.lock().unwrap(), vec!["weather", "summarize"]);
    }

    #[tokio::test]
    async fn test_weather_failure_skips_summary() {
        let (app, calls) = app(Some(404));
        let (status, body) = send(app, "/forecast/40.7/-74.0").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Failed to retrieve forecast data."));
        assert_eq!(*calls.lock().unwrap(), vec!["weather"]);
    }

    #[tokio::test]
    async fn test_invalid_coordinates_make_no_calls() {
        let (app, calls) = app(None);
        let (status, body) = send(app, "/forecast/north/-74.0").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Invalid coordinates"));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_health_check() {
        let (app, _) = app(None);
        let (status, body) = send(app, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }
}
