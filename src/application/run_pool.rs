//! Run use case: stored strategy + provider samples → slip.

use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::application::evaluator;
use crate::application::pool_runner::{PoolRunner, RunOptions};
use crate::domain::entities::recommendation::MatchRecommendation;
use crate::domain::entities::sample::{FixtureId, MatchMetricSample};
use crate::domain::entities::slip::SlipCandidate;
use crate::domain::entities::snapshot::StrategySnapshot;
use crate::domain::error::DomainError;
use crate::domain::ports::metric_provider::MetricProvider;
use crate::domain::ports::strategy_repository::StrategyRepository;

pub struct RunPoolUseCase {
    repo: Arc<dyn StrategyRepository>,
    provider: Arc<dyn MetricProvider>,
    options: RunOptions,
}

impl RunPoolUseCase {
    pub fn new(
        repo: Arc<dyn StrategyRepository>,
        provider: Arc<dyn MetricProvider>,
        options: RunOptions,
    ) -> Self {
        Self {
            repo,
            provider,
            options,
        }
    }

    fn snapshot(&self, strategy_id: &str) -> Result<StrategySnapshot, DomainError> {
        let strategy = self
            .repo
            .get(strategy_id)?
            .ok_or_else(|| DomainError::NotFound(format!("Strategy not found: {strategy_id}")))?;
        Ok(strategy.snapshot()?)
    }

    /// Snapshot the strategy, fetch samples for the pool and run it.
    ///
    /// The snapshot is taken before anything else, so edits made while the
    /// provider is being queried do not affect this run.
    pub async fn execute(
        &self,
        strategy_id: &str,
        fixture_order: Vec<FixtureId>,
        cancel: CancellationToken,
    ) -> Result<SlipCandidate, DomainError> {
        let snapshot = self.snapshot(strategy_id)?;

        let fetched = self.provider.fetch(&fixture_order).await?;
        info!(
            provider = self.provider.name(),
            requested = fixture_order.len(),
            fetched = fetched.len(),
            "samples fetched"
        );
        let samples = index_samples(fetched);

        let runner = PoolRunner::new(self.options);
        tokio::task::spawn_blocking(move || {
            runner.run_snapshot(&snapshot, &samples, &fixture_order, &cancel)
        })
        .await
        .map_err(|e| DomainError::Runtime(format!("Pool run task failed: {e}")))
    }

    /// Recommendation for a single fixture sample.
    pub fn evaluate_fixture(
        &self,
        strategy_id: &str,
        sample: &MatchMetricSample,
    ) -> Result<MatchRecommendation, DomainError> {
        let snapshot = self.snapshot(strategy_id)?;
        Ok(evaluator::evaluate(&snapshot, sample))
    }
}

fn index_samples(samples: Vec<MatchMetricSample>) -> HashMap<FixtureId, MatchMetricSample> {
    let mut map = HashMap::with_capacity(samples.len());
    for sample in samples {
        if let Some(previous) = map.insert(sample.fixture_id.clone(), sample) {
            warn!(fixture = %previous.fixture_id, "provider returned duplicate sample, keeping the last");
        }
    }
    map
}
