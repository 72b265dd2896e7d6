//! Multi-day forecast model handed from the weather provider to the summarizer

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::Coordinates;

/// One named forecast period, e.g. "Tonight" or "Wednesday"
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPeriod {
    #[serde(default)]
    pub number: Option<u32>,
    pub name: String,
    #[serde(default)]
    pub start_time: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub end_time: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub is_daytime: Option<bool>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub temperature_unit: Option<String>,
    #[serde(default)]
    pub wind_speed: Option<String>,
    #[serde(default)]
    pub wind_direction: Option<String>,
    #[serde(default)]
    pub short_forecast: Option<String>,
    #[serde(default)]
    pub detailed_forecast: String,
}

impl ForecastPeriod {
    /// Create a period with just the fields the summary prompt needs
    #[must_use]
    pub fn new(name: impl Into<String>, detailed_forecast: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detailed_forecast: detailed_forecast.into(),
            ..Self::default()
        }
    }

    /// Sentence used in the summary prompt
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} is going to be {}", self.name, self.detailed_forecast)
    }
}

/// Forecast for a point, as returned by the weather provider
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DetailedForecast {
    /// Point the forecast was requested for
    pub coordinates: Coordinates,
    /// Periods in provider order
    pub periods: Vec<ForecastPeriod>,
}

impl DetailedForecast {
    /// Create new forecast
    #[must_use]
    pub fn new(coordinates: Coordinates, periods: Vec<ForecastPeriod>) -> Self {
        Self {
            coordinates,
            periods,
        }
    }

    /// One line per period, in provider order
    #[must_use]
    pub fn descriptions(&self) -> Vec<String> {
        self.periods.iter().map(ForecastPeriod::describe).collect()
    }
}
