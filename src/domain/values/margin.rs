//! Signed percentage margin between the two sides of a fixture.
//!
//! `margin = (away - home) / home * 100`, so a negative margin means the home
//! side leads on that metric. The result is clamped to the strategy's scale.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest scale bound an author may configure.
pub const MIN_SCALE: f64 = 50.0;

/// Symmetric scale bound of a strategy; margins live in `[-value, +value]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaxMargin(f64);

impl MaxMargin {
    pub fn new(value: f64) -> Result<Self, String> {
        if !value.is_finite() || value < MIN_SCALE {
            return Err(format!(
                "Max margin must be a finite number >= {MIN_SCALE}, got {value}"
            ));
        }
        Ok(MaxMargin(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn contains(&self, endpoint: f64) -> bool {
        endpoint.is_finite() && (-self.0..=self.0).contains(&endpoint)
    }

    pub fn clamp(&self, margin: f64) -> f64 {
        margin.clamp(-self.0, self.0)
    }
}

impl Default for MaxMargin {
    fn default() -> Self {
        MaxMargin(MIN_SCALE)
    }
}

impl fmt::Display for MaxMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a margin could not be computed for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingCause {
    /// The fixture sample has no values for the metric.
    MetricAbsent,
    /// The home value is zero, so the percentage base is undefined.
    ZeroHomeValue,
    /// One of the values is NaN or infinite.
    NonFiniteValue,
}

impl fmt::Display for MissingCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingCause::MetricAbsent => write!(f, "metric absent"),
            MissingCause::ZeroHomeValue => write!(f, "home value is zero"),
            MissingCause::NonFiniteValue => write!(f, "non-finite value"),
        }
    }
}

/// Compute the clamped margin for one metric pair.
pub fn compute(home: f64, away: f64, scale: MaxMargin) -> Result<f64, MissingCause> {
    if !home.is_finite() || !away.is_finite() {
        return Err(MissingCause::NonFiniteValue);
    }
    if home == 0.0 {
        return Err(MissingCause::ZeroHomeValue);
    }
    let raw = (away - home) / home * 100.0;
    Ok(scale.clamp(raw))
}
