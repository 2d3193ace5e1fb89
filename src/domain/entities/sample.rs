use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub type FixtureId = String;

/// Raw comparable values for the two sides on one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricPair {
    pub home_value: f64,
    pub away_value: f64,
}

/// Metric values for one fixture, as delivered by a metric provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMetricSample {
    pub fixture_id: FixtureId,
    #[serde(default)]
    pub values: HashMap<String, MetricPair>,
}

impl MatchMetricSample {
    pub fn new(fixture_id: impl Into<FixtureId>) -> Self {
        Self {
            fixture_id: fixture_id.into(),
            values: HashMap::new(),
        }
    }

    pub fn with(mut self, metric_id: &str, home_value: f64, away_value: f64) -> Self {
        self.values.insert(
            metric_id.to_string(),
            MetricPair {
                home_value,
                away_value,
            },
        );
        self
    }

    pub fn get(&self, metric_id: &str) -> Option<&MetricPair> {
        self.values.get(metric_id)
    }
}
