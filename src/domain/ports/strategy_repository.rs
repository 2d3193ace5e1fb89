use crate::domain::entities::strategy::Strategy;
use crate::domain::error::DomainError;

/// Lightweight listing row; the full definition is loaded on demand.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StrategySummary {
    pub id: String,
    pub name: String,
    pub version: u32,
    pub steps: usize,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

pub trait StrategyRepository: Send + Sync {
    fn insert(&self, strategy: &Strategy) -> Result<(), DomainError>;
    /// Persist an edited strategy. Fails with [`DomainError::Conflict`] when the
    /// stored row is no longer at `expected_version`.
    fn update(&self, strategy: &Strategy, expected_version: u32) -> Result<(), DomainError>;
    fn get(&self, id: &str) -> Result<Option<Strategy>, DomainError>;
    fn list(&self) -> Result<Vec<StrategySummary>, DomainError>;
    fn delete(&self, id: &str) -> Result<(), DomainError>;
}
