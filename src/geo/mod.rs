//! Geometry primitives for the sampling walk
//!
//! - `Coordinate` - validated (lat, lng) pair in degrees
//! - `cell_window` - sorted window of spatial cell ids around a coordinate
//! - `spiral` - square-spiral sampler producing the walk's sample points

pub mod cell_window;
pub mod spiral;

pub use cell_window::{cell_window, CellWindow, CELL_LEVEL, DEFAULT_RADIUS};
pub use spiral::SpiralSampler;

use serde::{Deserialize, Serialize};

/// Rejection reasons for a coordinate supplied from outside the process
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    InvalidNumber(String),
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidNumber(raw) => write!(f, "Not a coordinate value: {}", raw),
            ValidationError::LatitudeOutOfRange(lat) => {
                write!(f, "Latitude out of range: {}", lat)
            }
            ValidationError::LongitudeOutOfRange(lng) => {
                write!(f, "Longitude out of range: {}", lng)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// A point on the globe in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting non-finite or out-of-range values
    pub fn new(lat: f64, lng: f64) -> Result<Self, ValidationError> {
        let coordinate = Self { lat, lng };
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Parse a coordinate from the raw path segments of an ingress request
    pub fn parse(lat: &str, lng: &str) -> Result<Self, ValidationError> {
        let lat_value = parse_degrees(lat)?;
        let lng_value = parse_degrees(lng)?;
        Self::new(lat_value, lng_value)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.lng.is_finite() || self.lng.abs() > 180.0 {
            return Err(ValidationError::LongitudeOutOfRange(self.lng));
        }
        if !self.lat.is_finite() || self.lat.abs() > 90.0 {
            return Err(ValidationError::LatitudeOutOfRange(self.lat));
        }
        Ok(())
    }

    /// Shift by the given deltas, clamping latitude at the poles and
    /// wrapping longitude across the antimeridian
    pub fn offset(&self, dlat: f64, dlng: f64) -> Self {
        let lat = (self.lat + dlat).clamp(-90.0, 90.0);
        let mut lng = self.lng + dlng;
        if lng > 180.0 {
            lng -= 360.0;
        } else if lng < -180.0 {
            lng += 360.0;
        }
        Self { lat, lng }
    }
}

fn parse_degrees(raw: &str) -> Result<f64, ValidationError> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::InvalidNumber(raw.to_string())),
    }
}
