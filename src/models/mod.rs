//! Data models for the forecast summary service

pub mod coordinates;
pub mod forecast;

pub use coordinates::Coordinates;
pub use forecast::{DetailedForecast, ForecastPeriod};
