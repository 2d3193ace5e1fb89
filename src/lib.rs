pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod telemetry;

use crate::application::authoring::AuthoringUseCase;
use crate::application::pool_runner::RunOptions;
use crate::application::run_pool::RunPoolUseCase;
use crate::domain::entities::recommendation::MatchRecommendation;
use crate::domain::entities::sample::{FixtureId, MatchMetricSample};
use crate::domain::entities::slip::SlipCandidate;
use crate::domain::entities::strategy::{Strategy, StrategyDefinition};
use crate::domain::error::{ConfigurationError, DomainError};
use crate::domain::ports::metric_provider::MetricProvider;
use crate::domain::ports::strategy_repository::{StrategyRepository, StrategySummary};
use crate::domain::values::branch::Branch;
use crate::domain::values::edge::BranchConfig;
use crate::domain::values::range::Range;
use crate::domain::values::step_id::StepId;
use crate::infrastructure::samples::memory::InMemoryProvider;
use crate::infrastructure::sqlite::migrations::run_migrations;
use crate::infrastructure::sqlite::strategy_repo::SqliteStrategyRepo;
use rusqlite::Connection;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct SlipCraft {
    authoring_uc: AuthoringUseCase,
    run_uc: RunPoolUseCase,
}

impl SlipCraft {
    /// Open the strategy store with an empty in-memory metric provider.
    pub fn new(db_path: &str, options: RunOptions) -> Result<Self, DomainError> {
        Self::with_provider(db_path, Arc::new(InMemoryProvider::default()), options)
    }

    pub fn with_provider(
        db_path: &str,
        provider: Arc<dyn MetricProvider>,
        options: RunOptions,
    ) -> Result<Self, DomainError> {
        let conn = Connection::open(db_path)
            .map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
        // WAL is unavailable for in-memory databases; ignore that case.
        if db_path != ":memory:" {
            conn.pragma_update(None, "journal_mode", "WAL")
                .map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;
        }
        run_migrations(&conn)?;

        let repo: Arc<dyn StrategyRepository> = Arc::new(SqliteStrategyRepo::new(conn));
        Ok(Self::with_repository(repo, provider, options))
    }

    pub fn with_repository(
        repo: Arc<dyn StrategyRepository>,
        provider: Arc<dyn MetricProvider>,
        options: RunOptions,
    ) -> Self {
        Self {
            authoring_uc: AuthoringUseCase::new(repo.clone()),
            run_uc: RunPoolUseCase::new(repo, provider, options),
        }
    }

    // Authoring
    pub fn create_strategy(&self, name: String, max_margin: f64) -> Result<Strategy, DomainError> {
        self.authoring_uc.create(name, max_margin)
    }

    pub fn import_strategy(
        &self,
        name: String,
        definition: StrategyDefinition,
    ) -> Result<Strategy, DomainError> {
        self.authoring_uc.import(name, definition)
    }

    pub fn strategy(&self, id: &str) -> Result<Strategy, DomainError> {
        self.authoring_uc.get(id)
    }

    pub fn strategies(&self) -> Result<Vec<StrategySummary>, DomainError> {
        self.authoring_uc.list()
    }

    pub fn delete_strategy(&self, id: &str) -> Result<(), DomainError> {
        self.authoring_uc.delete(id)
    }

    pub fn replace_definition(
        &self,
        id: &str,
        definition: StrategyDefinition,
        expected_version: u32,
    ) -> Result<Strategy, DomainError> {
        self.authoring_uc
            .replace_definition(id, definition, expected_version)
    }

    pub fn add_step(
        &self,
        id: &str,
        metric_id: Option<String>,
    ) -> Result<(Strategy, StepId), DomainError> {
        self.authoring_uc.add_step(id, metric_id)
    }

    pub fn remove_step(&self, id: &str, step: StepId) -> Result<Strategy, DomainError> {
        self.authoring_uc.remove_step(id, step)
    }

    pub fn move_step(&self, id: &str, step: StepId, index: usize) -> Result<Strategy, DomainError> {
        self.authoring_uc.move_step(id, step, index)
    }

    pub fn set_step_metric(
        &self,
        id: &str,
        step: StepId,
        metric_id: Option<String>,
    ) -> Result<Strategy, DomainError> {
        self.authoring_uc.set_step_metric(id, step, metric_id)
    }

    pub fn set_range(
        &self,
        id: &str,
        step: StepId,
        branch: Branch,
        range: Range,
    ) -> Result<Strategy, DomainError> {
        self.authoring_uc.set_range(id, step, branch, range)
    }

    pub fn set_branch_config(
        &self,
        id: &str,
        branch: Branch,
        step: StepId,
        config: BranchConfig,
    ) -> Result<Strategy, DomainError> {
        self.authoring_uc.set_branch_config(id, branch, step, config)
    }

    pub fn set_max_margin(&self, id: &str, max_margin: f64) -> Result<Strategy, DomainError> {
        self.authoring_uc.set_max_margin(id, max_margin)
    }

    /// `Ok(Err(_))` means the strategy exists but would be rejected by a run.
    pub fn validate_strategy(&self, id: &str) -> Result<Result<(), ConfigurationError>, DomainError> {
        Ok(self.authoring_uc.get(id)?.definition.validate())
    }

    // Evaluation
    pub async fn run_pool(
        &self,
        strategy_id: &str,
        fixture_order: Vec<FixtureId>,
        cancel: CancellationToken,
    ) -> Result<SlipCandidate, DomainError> {
        self.run_uc.execute(strategy_id, fixture_order, cancel).await
    }

    pub fn evaluate_fixture(
        &self,
        strategy_id: &str,
        sample: &MatchMetricSample,
    ) -> Result<MatchRecommendation, DomainError> {
        self.run_uc.evaluate_fixture(strategy_id, sample)
    }
}
