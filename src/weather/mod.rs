//! Weather forecast providers

use async_trait::async_trait;

use crate::Result;
use crate::models::{Coordinates, DetailedForecast};

pub mod nws;

pub use nws::NwsClient;

/// Source of multi-day forecasts for a point
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Fetch the forecast periods covering `coordinates`
    async fn detailed_forecast(&self, coordinates: &Coordinates) -> Result<DetailedForecast>;
}
