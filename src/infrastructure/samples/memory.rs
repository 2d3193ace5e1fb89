use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::domain::entities::sample::{FixtureId, MatchMetricSample};
use crate::domain::error::DomainError;
use crate::domain::ports::metric_provider::MetricProvider;

/// Provider backed by samples held in memory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProvider {
    samples: HashMap<FixtureId, MatchMetricSample>,
}

impl InMemoryProvider {
    pub fn new(samples: impl IntoIterator<Item = MatchMetricSample>) -> Self {
        Self {
            samples: samples
                .into_iter()
                .map(|s| (s.fixture_id.clone(), s))
                .collect(),
        }
    }
}

#[async_trait]
impl MetricProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch(&self, fixtures: &[FixtureId]) -> Result<Vec<MatchMetricSample>, DomainError> {
        let mut seen = HashSet::new();
        Ok(fixtures
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .filter_map(|id| self.samples.get(id).cloned())
            .collect())
    }
}
