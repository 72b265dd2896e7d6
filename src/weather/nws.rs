//! National Weather Service (api.weather.gov) client
//!
//! Forecasts are a two-step lookup: `/points/{lat},{lon}` names the
//! gridpoint forecast URL for the point, which then returns the periods.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::ForecastProvider;
use crate::config::WeatherConfig;
use crate::http_client;
use crate::models::{Coordinates, DetailedForecast, ForecastPeriod};
use crate::{ForecastError, Result};

const SERVICE: &str = "weather";
const GEO_JSON: &str = "application/geo+json";

/// `/points` response, trimmed to what we use
#[derive(Debug, Deserialize)]
struct PointsResponse {
    properties: PointProperties,
}

#[derive(Debug, Deserialize)]
struct PointProperties {
    forecast: Option<String>,
}

/// Gridpoint forecast response
#[derive(Debug, Deserialize)]
struct GridpointForecastResponse {
    properties: GridpointForecastProperties,
}

#[derive(Debug, Deserialize)]
struct GridpointForecastProperties {
    #[serde(default)]
    periods: Vec<ForecastPeriod>,
}

/// Weather API client for the National Weather Service
pub struct NwsClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl NwsClient {
    /// Create a new weather API client
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let client = http_client::build(
            SERVICE,
            &config.user_agent,
            config.timeout_seconds,
            config.max_retries,
        )?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// URL of the point metadata for `coordinates`
    #[must_use]
    pub fn points_url(&self, coordinates: &Coordinates) -> String {
        http_client::join(
            &self.base_url,
            &format!("points/{}", coordinates.format_coordinates()),
        )
    }

    /// Resolve the gridpoint forecast URL for a point
    #[instrument(skip(self))]
    async fn lookup_forecast_url(&self, coordinates: &Coordinates) -> Result<String> {
        let url = self.points_url(coordinates);
        debug!("NWS points request URL: {}", url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, GEO_JSON)
            .send()
            .await
            .map_err(|e| ForecastError::upstream(SERVICE, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Points lookup failed (HTTP {})", status);
            return Err(ForecastError::PointsLookup {
                status: status.as_u16(),
            });
        }

        let points: PointsResponse = response.json().await.map_err(|e| {
            ForecastError::upstream(SERVICE, format!("Failed to parse points response: {e}"))
        })?;

        // Points outside NWS coverage come back without a forecast link
        points.properties.forecast.ok_or_else(|| {
            warn!("No forecast office covers {}", coordinates.format_coordinates());
            ForecastError::PointsLookup { status: 404 }
        })
    }

    /// Fetch the forecast periods from a gridpoint forecast URL
    #[instrument(skip(self))]
    async fn fetch_periods(&self, forecast_url: &str) -> Result<Vec<ForecastPeriod>> {
        let response = self
            .client
            .get(forecast_url)
            .header(ACCEPT, GEO_JSON)
            .send()
            .await
            .map_err(|e| ForecastError::upstream(SERVICE, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Detailed forecast request failed (HTTP {})", status);
            return Err(ForecastError::DetailedForecast {
                status: status.as_u16(),
            });
        }

        let forecast: GridpointForecastResponse = response.json().await.map_err(|e| {
            ForecastError::upstream(SERVICE, format!("Failed to parse forecast response: {e}"))
        })?;

        Ok(forecast.properties.periods)
    }
}

#[async_trait]
impl ForecastProvider for NwsClient {
    #[instrument(skip(self), fields(lat = coordinates.latitude, lon = coordinates.longitude))]
    async fn detailed_forecast(&self, coordinates: &Coordinates) -> Result<DetailedForecast> {
        let start_time = Instant::now();

        let forecast_url = self.lookup_forecast_url(coordinates).await?;
        let periods = self.fetch_periods(&forecast_url).await?;

        info!(
            "Retrieved {} forecast periods in {:.3}s",
            periods.len(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(DetailedForecast::new(*coordinates, periods))
    }
}
