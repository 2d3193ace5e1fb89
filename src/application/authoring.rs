//! Authoring use case: the explicit edit operations on stored strategies.
//!
//! Every edit loads the current row, applies the change to the definition,
//! bumps the version and writes back conditionally on the version it read.
//! A concurrent writer therefore gets [`DomainError::Conflict`] instead of
//! silently overwriting someone else's edit.

use std::sync::Arc;

use tracing::info;

use crate::domain::entities::strategy::{Strategy, StrategyDefinition};
use crate::domain::error::DomainError;
use crate::domain::ports::strategy_repository::{StrategyRepository, StrategySummary};
use crate::domain::values::branch::Branch;
use crate::domain::values::edge::BranchConfig;
use crate::domain::values::range::Range;
use crate::domain::values::step_id::StepId;

pub struct AuthoringUseCase {
    repo: Arc<dyn StrategyRepository>,
}

impl AuthoringUseCase {
    pub fn new(repo: Arc<dyn StrategyRepository>) -> Self {
        Self { repo }
    }

    pub fn create(&self, name: String, max_margin: f64) -> Result<Strategy, DomainError> {
        let name = checked_name(name)?;
        let strategy = Strategy::new(name, StrategyDefinition::new(max_margin)?);
        self.repo.insert(&strategy)?;
        info!(strategy = %strategy.id, name = %strategy.name, "strategy created");
        Ok(strategy)
    }

    /// Store a definition produced elsewhere (e.g. exported from the canvas).
    /// Imports must satisfy every run-time invariant.
    pub fn import(
        &self,
        name: String,
        mut definition: StrategyDefinition,
    ) -> Result<Strategy, DomainError> {
        let name = checked_name(name)?;
        definition.validate()?;
        definition.reserve_step_ids(0);
        let strategy = Strategy::new(name, definition);
        self.repo.insert(&strategy)?;
        info!(
            strategy = %strategy.id,
            steps = strategy.definition.steps.len(),
            "strategy imported"
        );
        Ok(strategy)
    }

    pub fn get(&self, id: &str) -> Result<Strategy, DomainError> {
        self.repo
            .get(id)?
            .ok_or_else(|| DomainError::NotFound(format!("Strategy not found: {id}")))
    }

    pub fn list(&self) -> Result<Vec<StrategySummary>, DomainError> {
        self.repo.list()
    }

    pub fn delete(&self, id: &str) -> Result<(), DomainError> {
        self.repo.delete(id)?;
        info!(strategy = %id, "strategy deleted");
        Ok(())
    }

    /// Replace the whole rule set, provided the caller saw `expected_version`.
    pub fn replace_definition(
        &self,
        id: &str,
        mut definition: StrategyDefinition,
        expected_version: u32,
    ) -> Result<Strategy, DomainError> {
        let mut strategy = self.get(id)?;
        if strategy.version != expected_version {
            return Err(DomainError::Conflict(format!(
                "Strategy {id} is at version {}, not {expected_version}",
                strategy.version
            )));
        }
        definition.validate()?;
        // Ids handed out by the stored definition stay retired.
        strategy.definition.reserve_step_ids(0);
        definition.reserve_step_ids(strategy.definition.next_step_id);
        strategy.definition = definition;
        let expected = strategy.touch();
        self.repo.update(&strategy, expected)?;
        Ok(strategy)
    }

    pub fn add_step(
        &self,
        id: &str,
        metric_id: Option<String>,
    ) -> Result<(Strategy, StepId), DomainError> {
        self.edit(id, |def| def.add_step(metric_id))
    }

    pub fn remove_step(&self, id: &str, step: StepId) -> Result<Strategy, DomainError> {
        self.edit(id, |def| def.remove_step(step)).map(|(s, _)| s)
    }

    pub fn move_step(&self, id: &str, step: StepId, index: usize) -> Result<Strategy, DomainError> {
        self.edit(id, |def| def.move_step(step, index)).map(|(s, _)| s)
    }

    pub fn set_step_metric(
        &self,
        id: &str,
        step: StepId,
        metric_id: Option<String>,
    ) -> Result<Strategy, DomainError> {
        self.edit(id, |def| def.set_step_metric(step, metric_id))
            .map(|(s, _)| s)
    }

    pub fn set_range(
        &self,
        id: &str,
        step: StepId,
        branch: Branch,
        range: Range,
    ) -> Result<Strategy, DomainError> {
        self.edit(id, |def| def.set_range(step, branch, range))
            .map(|(s, _)| s)
    }

    pub fn set_branch_config(
        &self,
        id: &str,
        branch: Branch,
        step: StepId,
        config: BranchConfig,
    ) -> Result<Strategy, DomainError> {
        self.edit(id, |def| def.set_branch_config(branch, step, config))
            .map(|(s, _)| s)
    }

    pub fn set_max_margin(&self, id: &str, max_margin: f64) -> Result<Strategy, DomainError> {
        self.edit(id, |def| def.set_max_margin(max_margin))
            .map(|(s, _)| s)
    }

    fn edit<T>(
        &self,
        id: &str,
        apply: impl FnOnce(&mut StrategyDefinition) -> Result<T, DomainError>,
    ) -> Result<(Strategy, T), DomainError> {
        let mut strategy = self.get(id)?;
        let out = apply(&mut strategy.definition)?;
        let expected = strategy.touch();
        self.repo.update(&strategy, expected)?;
        info!(strategy = %strategy.id, version = strategy.version, "strategy edited");
        Ok((strategy, out))
    }
}

fn checked_name(name: String) -> Result<String, DomainError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err("Strategy name must not be empty".into());
    }
    Ok(name)
}
