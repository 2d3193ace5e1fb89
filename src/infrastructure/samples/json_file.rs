//! Pool files: JSON documents bundling fixture order and metric samples.
//!
//! Two shapes are accepted:
//!
//! ```json
//! { "fixtures": ["f1", "f2"], "samples": [{ "fixtureId": "f1", "values": { ... } }] }
//! [{ "fixtureId": "f1", "values": { ... } }]
//! ```
//!
//! Without an explicit `fixtures` list the sample order is the slip order.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::entities::sample::{FixtureId, MatchMetricSample};
use crate::domain::error::DomainError;
use crate::domain::ports::metric_provider::MetricProvider;

#[derive(Debug, Clone, Deserialize)]
pub struct PoolFile {
    #[serde(default)]
    pub fixtures: Option<Vec<FixtureId>>,
    #[serde(default)]
    pub samples: Vec<MatchMetricSample>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PoolFileRepr {
    Pool(PoolFile),
    Samples(Vec<MatchMetricSample>),
}

impl PoolFile {
    pub fn parse(json: &str) -> Result<Self, DomainError> {
        let repr: PoolFileRepr = serde_json::from_str(json)
            .map_err(|e| DomainError::Parse(format!("Invalid pool file: {e}")))?;
        Ok(match repr {
            PoolFileRepr::Pool(pool) => pool,
            PoolFileRepr::Samples(samples) => PoolFile {
                fixtures: None,
                samples,
            },
        })
    }

    pub fn fixture_order(&self) -> Vec<FixtureId> {
        match &self.fixtures {
            Some(order) => order.clone(),
            None => self.samples.iter().map(|s| s.fixture_id.clone()).collect(),
        }
    }
}

/// Metric provider reading a pool file from disk once, at open time.
pub struct JsonPoolProvider {
    path: PathBuf,
    pool: PoolFile,
}

impl JsonPoolProvider {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref().to_path_buf();
        let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
            DomainError::Provider(format!("Cannot read pool file {}: {e}", path.display()))
        })?;
        let pool = PoolFile::parse(&raw)?;
        Ok(Self { path, pool })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn fixture_order(&self) -> Vec<FixtureId> {
        self.pool.fixture_order()
    }
}

#[async_trait]
impl MetricProvider for JsonPoolProvider {
    fn name(&self) -> &str {
        "json_file"
    }

    async fn fetch(&self, fixtures: &[FixtureId]) -> Result<Vec<MatchMetricSample>, DomainError> {
        let wanted: HashSet<&str> = fixtures.iter().map(String::as_str).collect();
        Ok(self
            .pool
            .samples
            .iter()
            .filter(|s| wanted.contains(s.fixture_id.as_str()))
            .cloned()
            .collect())
    }
}
