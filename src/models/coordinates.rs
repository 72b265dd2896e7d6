//! Coordinates taken from the request path

use serde::{Deserialize, Serialize};

use crate::{ForecastError, Result};

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    /// Create new coordinates
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Parse raw path segments.
    ///
    /// Only numeric shape is checked here. Whether a point is actually
    /// covered is up to the weather provider.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self> {
        Ok(Self::new(
            parse_component("latitude", latitude)?,
            parse_component("longitude", longitude)?,
        ))
    }

    /// Format as `lat,lon` with four decimal places, the precision the NWS points API accepts
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4},{:.4}", self.latitude, self.longitude)
    }
}

fn parse_component(label: &str, raw: &str) -> Result<f64> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| ForecastError::invalid_coordinates(format!("{label} '{raw}' is not a number")))?;

    if !value.is_finite() {
        return Err(ForecastError::invalid_coordinates(format!(
            "{label} '{raw}' is not a finite number"
        )));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("40.7", "-74.0", 40.7, -74.0)]
    #[case("35.000", "-110.000", 35.0, -110.0)]
    #[case(" 46.8182", "8.2275 ", 46.8182, 8.2275)]
    #[case("0", "0", 0.0, 0.0)]
    fn test_parse_valid(
        #[case] lat: &str,
        #[case] lon: &str,
        #[case] expected_lat: f64,
        #[case] expected_lon: f64,
    ) {
        let coords = Coordinates::parse(lat, lon).unwrap();
        assert_eq!(coords, Coordinates::new(expected_lat, expected_lon));
    }

    #[rstest]
    #[case("north", "-74.0")]
    #[case("40.7", "west")]
    #[case("", "-74.0")]
    #[case("NaN", "-74.0")]
    #[case("40.7", "inf")]
    fn test_parse_invalid(#[case] lat: &str, #[case] lon: &str) {
        let err = Coordinates::parse(lat, lon).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidCoordinates { .. }));
    }

    #[test]
    fn test_out_of_range_is_left_to_provider() {
        let coords = Coordinates::parse("91.0", "181.0").unwrap();
        assert_eq!(coords.latitude, 91.0);
        assert_eq!(coords.longitude, 181.0);
    }

    #[test]
    fn test_format_coordinates() {
        let coords = Coordinates::new(40.7, -74.0);
        assert_eq!(coords.format_coordinates(), "40.7000,-74.0000");

        let coords = Coordinates::new(46.818_234, 8.227_456);
        assert_eq!(coords.format_coordinates(), "46.8182,8.2275");
    }
}
