//! Immutable, validated and compiled copy of a strategy used by runs.
//!
//! Compilation turns the editor's maps into a flat array of steps where each
//! step carries its three branch rules inline, indexed by [`Branch::index`].
//! The snapshot is reference counted so a pool run can hand it to worker
//! threads without copying, and edits to the source definition after
//! compilation are never observed.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::entities::strategy::StrategyDefinition;
use crate::domain::error::ConfigurationError;
use crate::domain::values::branch::Branch;
use crate::domain::values::edge::{Edge, EdgeType, Weight};
use crate::domain::values::margin::MaxMargin;
use crate::domain::values::range::Interval;
use crate::domain::values::step_id::StepId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchRule {
    pub interval: Interval,
    pub edge: Edge,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStep {
    pub id: StepId,
    pub metric_id: Option<String>,
    rules: [BranchRule; 3],
}

impl CompiledStep {
    pub fn rule(&self, branch: Branch) -> &BranchRule {
        &self.rules[branch.index()]
    }
}

#[derive(Debug)]
struct Compiled {
    strategy_id: Option<String>,
    version: Option<u32>,
    scale: MaxMargin,
    steps: Vec<CompiledStep>,
    positions: HashMap<StepId, usize>,
}

#[derive(Debug, Clone)]
pub struct StrategySnapshot {
    inner: Arc<Compiled>,
}

impl StrategySnapshot {
    pub fn compile(definition: &StrategyDefinition) -> Result<Self, ConfigurationError> {
        definition.validate()?;
        let scale = MaxMargin::new(definition.max_margin)
            .map_err(|_| ConfigurationError::ScaleTooSmall(definition.max_margin))?;

        let mut steps = Vec::with_capacity(definition.steps.len());
        let mut positions = HashMap::with_capacity(definition.steps.len());
        for (pos, step) in definition.steps.iter().enumerate() {
            let rule = |branch: Branch| -> Result<BranchRule, ConfigurationError> {
                let config = definition
                    .branch_configs
                    .get(branch, step.id)
                    .ok_or(ConfigurationError::MissingBranchConfig {
                        branch,
                        step: step.id,
                    })?;
                let edge = match config.edge_type {
                    EdgeType::Match => Edge::Match,
                    EdgeType::Weight => {
                        let raw = config.weight.ok_or(ConfigurationError::MissingWeight {
                            branch,
                            step: step.id,
                        })?;
                        let weight =
                            Weight::new(raw).map_err(|_| ConfigurationError::WeightOutOfRange {
                                branch,
                                step: step.id,
                                weight: raw,
                            })?;
                        Edge::Weight(weight)
                    }
                };
                Ok(BranchRule {
                    interval: step.ranges.get(branch).interval(),
                    edge,
                })
            };
            steps.push(CompiledStep {
                id: step.id,
                metric_id: step.metric_id.clone(),
                rules: [rule(Branch::Home)?, rule(Branch::Draw)?, rule(Branch::Away)?],
            });
            positions.insert(step.id, pos);
        }

        Ok(Self {
            inner: Arc::new(Compiled {
                strategy_id: None,
                version: None,
                scale,
                steps,
                positions,
            }),
        })
    }

    pub(crate) fn labelled(self, strategy_id: String, version: u32) -> Self {
        let mut compiled = Arc::try_unwrap(self.inner).unwrap_or_else(|shared| Compiled {
            strategy_id: shared.strategy_id.clone(),
            version: shared.version,
            scale: shared.scale,
            steps: shared.steps.clone(),
            positions: shared.positions.clone(),
        });
        compiled.strategy_id = Some(strategy_id);
        compiled.version = Some(version);
        Self {
            inner: Arc::new(compiled),
        }
    }

    pub fn strategy_id(&self) -> Option<&str> {
        self.inner.strategy_id.as_deref()
    }

    pub fn version(&self) -> Option<u32> {
        self.inner.version
    }

    pub fn scale(&self) -> MaxMargin {
        self.inner.scale
    }

    pub fn steps(&self) -> &[CompiledStep] {
        &self.inner.steps
    }

    pub fn step(&self, id: StepId) -> Option<&CompiledStep> {
        self.inner.positions.get(&id).map(|&pos| &self.inner.steps[pos])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::values::edge::BranchConfig;
    use crate::domain::values::range::Range;

    #[test]
    fn test_compile_inlines_branch_rules_in_order() {
        let mut def = StrategyDefinition::new(50.0).unwrap();
        let a = def.add_step(Some("shots".into())).unwrap();
        let b = def.add_step(None).unwrap();
        def.set_branch_config(Branch::Draw, b, BranchConfig::weighted(4))
            .unwrap();

        let snap = StrategySnapshot::compile(&def).unwrap();
        assert_eq!(snap.steps().len(), 2);
        assert_eq!(snap.steps()[0].id, a);
        assert_eq!(snap.steps()[1].id, b);
        assert_eq!(
            snap.step(b).unwrap().rule(Branch::Draw).edge,
            Edge::Weight(Weight::new(4).unwrap())
        );
        assert_eq!(snap.step(a).unwrap().rule(Branch::Home).edge, Edge::Match);
        assert_eq!(
            snap.step(a).unwrap().rule(Branch::Away).interval,
            Interval::AtLeast(15.0)
        );
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_edits() {
        let mut def = StrategyDefinition::new(50.0).unwrap();
        let id = def.add_step(None).unwrap();
        let snap = StrategySnapshot::compile(&def).unwrap();

        def.set_range(id, Branch::Draw, Range::closed(-1.0, 1.0))
            .unwrap();
        def.add_step(None).unwrap();

        assert_eq!(snap.steps().len(), 1);
        assert_eq!(
            snap.step(id).unwrap().rule(Branch::Draw).interval,
            Interval::Closed {
                min: -10.0,
                max: 10.0
            }
        );
    }

    #[test]
    fn test_compile_refuses_invalid_definition() {
        let def = StrategyDefinition::new(50.0).unwrap();
        assert_eq!(
            StrategySnapshot::compile(&def).unwrap_err(),
            ConfigurationError::NoSteps
        );
    }
}
