//! Port for the collaborator that sources per-fixture metric values.

use async_trait::async_trait;

use crate::domain::entities::sample::{FixtureId, MatchMetricSample};
use crate::domain::error::DomainError;

#[async_trait]
pub trait MetricProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch samples for the requested fixtures. Fixtures the provider knows
    /// nothing about are simply absent from the result.
    async fn fetch(&self, fixtures: &[FixtureId]) -> Result<Vec<MatchMetricSample>, DomainError>;
}
