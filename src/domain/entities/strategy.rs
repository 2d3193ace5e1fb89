//! Strategy model: an ordered list of steps plus per-branch edge settings.
//!
//! [`StrategyDefinition`] is the rule set exactly as the editor exchanges it.
//! Edit operations keep its invariants intact; [`StrategyDefinition::validate`]
//! re-checks all of them for definitions that arrive from outside (imports,
//! stored rows written by older builds).

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::snapshot::StrategySnapshot;
use crate::domain::error::{ConfigurationError, DomainError};
use crate::domain::values::branch::Branch;
use crate::domain::values::edge::{BranchConfig, EdgeType, Weight};
use crate::domain::values::margin::MaxMargin;
use crate::domain::values::metric::MetricRegistry;
use crate::domain::values::range::Range;
use crate::domain::values::step_id::StepId;

/// Default thresholds for a freshly added step: home leads by 15%+, draw
/// within 10%, away leads by 15%+.
const DEFAULT_EDGE: f64 = 15.0;
const DEFAULT_DRAW_BAND: f64 = 10.0;

/// One range per branch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BranchRanges {
    pub home: Range,
    pub draw: Range,
    pub away: Range,
}

impl BranchRanges {
    pub fn defaults(scale: f64) -> Self {
        Self {
            home: Range::at_most(-scale, -DEFAULT_EDGE),
            draw: Range::closed(-DEFAULT_DRAW_BAND, DEFAULT_DRAW_BAND),
            away: Range::at_least(DEFAULT_EDGE, scale),
        }
    }

    pub fn get(&self, branch: Branch) -> &Range {
        match branch {
            Branch::Home => &self.home,
            Branch::Draw => &self.draw,
            Branch::Away => &self.away,
        }
    }

    pub fn get_mut(&mut self, branch: Branch) -> &mut Range {
        match branch {
            Branch::Home => &mut self.home,
            Branch::Draw => &mut self.draw,
            Branch::Away => &mut self.away,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: StepId,
    /// A step without a metric is inert during evaluation.
    #[serde(default)]
    pub metric_id: Option<String>,
    pub ranges: BranchRanges,
}

/// Edge configuration keyed by branch, then by step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BranchConfigs {
    #[serde(default)]
    pub home: BTreeMap<StepId, BranchConfig>,
    #[serde(default)]
    pub draw: BTreeMap<StepId, BranchConfig>,
    #[serde(default)]
    pub away: BTreeMap<StepId, BranchConfig>,
}

impl BranchConfigs {
    pub fn for_branch(&self, branch: Branch) -> &BTreeMap<StepId, BranchConfig> {
        match branch {
            Branch::Home => &self.home,
            Branch::Draw => &self.draw,
            Branch::Away => &self.away,
        }
    }

    pub fn for_branch_mut(&mut self, branch: Branch) -> &mut BTreeMap<StepId, BranchConfig> {
        match branch {
            Branch::Home => &mut self.home,
            Branch::Draw => &mut self.draw,
            Branch::Away => &mut self.away,
        }
    }

    pub fn get(&self, branch: Branch, step: StepId) -> Option<&BranchConfig> {
        self.for_branch(branch).get(&step)
    }
}

/// The rule set evaluated against fixtures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyDefinition {
    pub max_margin: f64,
    /// Next id handed out by [`StrategyDefinition::add_step`].
    #[serde(default)]
    pub next_step_id: u32,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub branch_configs: BranchConfigs,
}

impl StrategyDefinition {
    pub fn new(max_margin: f64) -> Result<Self, DomainError> {
        MaxMargin::new(max_margin).map_err(DomainError::InvalidInput)?;
        Ok(Self {
            max_margin,
            next_step_id: 1,
            steps: Vec::new(),
            branch_configs: BranchConfigs::default(),
        })
    }

    pub fn step(&self, id: StepId) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    fn position(&self, id: StepId) -> Result<usize, DomainError> {
        self.steps
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("Step not found: {id}")))
    }

    fn allocate_step_id(&mut self) -> Result<StepId, DomainError> {
        let exhausted = || DomainError::InvalidInput("Step id space exhausted".to_string());
        let past_highest = match self.steps.iter().map(|s| s.id.value()).max() {
            Some(highest) => highest.checked_add(1).ok_or_else(exhausted)?,
            None => 1,
        };
        let id = self.next_step_id.max(past_highest);
        self.next_step_id = id.checked_add(1).ok_or_else(exhausted)?;
        Ok(StepId(id))
    }

    /// Raise the id counter past every present step and past `floor`, so an
    /// id handed out earlier and since removed is never handed out again.
    pub fn reserve_step_ids(&mut self, floor: u32) {
        let past_highest = self
            .steps
            .iter()
            .map(|s| s.id.value().saturating_add(1))
            .max()
            .unwrap_or(1);
        self.next_step_id = self.next_step_id.max(floor).max(past_highest);
    }

    /// Append a step with default ranges and `Match` edges on every branch.
    pub fn add_step(&mut self, metric_id: Option<String>) -> Result<StepId, DomainError> {
        if let Some(metric) = &metric_id {
            ensure_known_metric(metric)?;
        }
        let id = self.allocate_step_id()?;
        self.steps.push(Step {
            id,
            metric_id,
            ranges: BranchRanges::defaults(self.max_margin),
        });
        for branch in Branch::PRIORITY {
            self.branch_configs
                .for_branch_mut(branch)
                .insert(id, BranchConfig::matching());
        }
        Ok(id)
    }

    /// Remove a step together with its three branch configs.
    pub fn remove_step(&mut self, id: StepId) -> Result<Step, DomainError> {
        let pos = self.position(id)?;
        for branch in Branch::PRIORITY {
            self.branch_configs.for_branch_mut(branch).remove(&id);
        }
        Ok(self.steps.remove(pos))
    }

    /// Move a step to `index` in evaluation order (clamped to the end).
    pub fn move_step(&mut self, id: StepId, index: usize) -> Result<(), DomainError> {
        let pos = self.position(id)?;
        let step = self.steps.remove(pos);
        let index = index.min(self.steps.len());
        self.steps.insert(index, step);
        Ok(())
    }

    pub fn set_step_metric(
        &mut self,
        id: StepId,
        metric_id: Option<String>,
    ) -> Result<(), DomainError> {
        if let Some(metric) = &metric_id {
            ensure_known_metric(metric)?;
        }
        let pos = self.position(id)?;
        self.steps[pos].metric_id = metric_id;
        Ok(())
    }

    pub fn set_range(&mut self, id: StepId, branch: Branch, range: Range) -> Result<(), DomainError> {
        let scale = MaxMargin::new(self.max_margin).map_err(DomainError::InvalidInput)?;
        check_range(branch, id, &range, scale)?;
        let pos = self.position(id)?;
        *self.steps[pos].ranges.get_mut(branch) = range;
        Ok(())
    }

    pub fn set_branch_config(
        &mut self,
        branch: Branch,
        id: StepId,
        config: BranchConfig,
    ) -> Result<(), DomainError> {
        self.position(id)?;
        let config = match config.edge_type {
            EdgeType::Match => BranchConfig::matching(),
            EdgeType::Weight => {
                let weight = config.weight.ok_or_else(|| {
                    DomainError::InvalidInput("Weight edges need a weight".to_string())
                })?;
                Weight::new(weight).map_err(DomainError::InvalidInput)?;
                BranchConfig::weighted(weight)
            }
        };
        self.branch_configs.for_branch_mut(branch).insert(id, config);
        Ok(())
    }

    /// Change the scale bound. Refused when an existing endpoint would fall
    /// outside the new scale.
    pub fn set_max_margin(&mut self, max_margin: f64) -> Result<(), DomainError> {
        let scale = MaxMargin::new(max_margin).map_err(DomainError::InvalidInput)?;
        for step in &self.steps {
            for branch in Branch::PRIORITY {
                check_range(branch, step.id, step.ranges.get(branch), scale)?;
            }
        }
        self.max_margin = max_margin;
        Ok(())
    }

    /// Check every invariant, reporting the first violation found.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let scale = MaxMargin::new(self.max_margin)
            .map_err(|_| ConfigurationError::ScaleTooSmall(self.max_margin))?;

        if self.steps.is_empty() {
            return Err(ConfigurationError::NoSteps);
        }

        let mut seen = HashSet::with_capacity(self.steps.len());
        for step in &self.steps {
            if !seen.insert(step.id) {
                return Err(ConfigurationError::DuplicateStep(step.id));
            }
            if let Some(metric) = &step.metric_id {
                if !MetricRegistry::contains(metric) {
                    return Err(ConfigurationError::UnknownMetric {
                        step: step.id,
                        metric_id: metric.clone(),
                    });
                }
            }
            for branch in Branch::PRIORITY {
                validate_range(branch, step.id, step.ranges.get(branch), scale)?;
                validate_config(branch, step.id, self.branch_configs.get(branch, step.id))?;
            }
        }

        for branch in Branch::PRIORITY {
            if let Some(orphan) = self
                .branch_configs
                .for_branch(branch)
                .keys()
                .find(|id| !seen.contains(*id))
            {
                return Err(ConfigurationError::UnknownStepConfig {
                    branch,
                    step: *orphan,
                });
            }
        }

        Ok(())
    }
}

fn ensure_known_metric(metric: &str) -> Result<(), DomainError> {
    if MetricRegistry::contains(metric) {
        Ok(())
    } else {
        Err(DomainError::InvalidInput(format!("Unknown metric: {metric}")))
    }
}

fn check_range(
    branch: Branch,
    step: StepId,
    range: &Range,
    scale: MaxMargin,
) -> Result<(), DomainError> {
    validate_range(branch, step, range, scale)
        .map_err(|e| DomainError::InvalidInput(e.to_string()))
}

fn validate_range(
    branch: Branch,
    step: StepId,
    range: &Range,
    scale: MaxMargin,
) -> Result<(), ConfigurationError> {
    for value in [range.min, range.max] {
        if !scale.contains(value) {
            return Err(ConfigurationError::RangeOutOfScale {
                branch,
                step,
                value,
                max_margin: scale.value(),
            });
        }
    }
    if range.min > range.max {
        return Err(ConfigurationError::InvertedRange {
            branch,
            step,
            min: range.min,
            max: range.max,
        });
    }
    Ok(())
}

fn validate_config(
    branch: Branch,
    step: StepId,
    config: Option<&BranchConfig>,
) -> Result<(), ConfigurationError> {
    let config = config.ok_or(ConfigurationError::MissingBranchConfig { branch, step })?;
    if config.edge_type == EdgeType::Weight {
        let weight = config
            .weight
            .ok_or(ConfigurationError::MissingWeight { branch, step })?;
        if Weight::new(weight).is_err() {
            return Err(ConfigurationError::WeightOutOfRange {
                branch,
                step,
                weight,
            });
        }
    }
    Ok(())
}

/// A stored, versioned strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub id: String,
    pub name: String,
    pub version: u32,
    pub definition: StrategyDefinition,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Strategy {
    pub fn new(name: String, definition: StrategyDefinition) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            version: 1,
            definition,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark an edit; returns the version the stored row must still have.
    pub fn touch(&mut self) -> u32 {
        let expected = self.version;
        self.version += 1;
        self.updated_at = Utc::now();
        expected
    }

    /// Validated immutable copy for evaluation runs.
    pub fn snapshot(&self) -> Result<StrategySnapshot, ConfigurationError> {
        StrategySnapshot::compile(&self.definition)
            .map(|s| s.labelled(self.id.clone(), self.version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition() -> StrategyDefinition {
        StrategyDefinition::new(50.0).unwrap()
    }

    #[test]
    fn test_new_rejects_small_scale() {
        assert!(StrategyDefinition::new(49.0).is_err());
    }

    #[test]
    fn test_add_step_creates_configs_for_every_branch() {
        let mut def = definition();
        let id = def.add_step(Some("goals_scored".into())).unwrap();
        for branch in Branch::PRIORITY {
            assert_eq!(
                def.branch_configs.get(branch, id),
                Some(&BranchConfig::matching())
            );
        }
        assert!(def.validate().is_ok());
    }

    #[test]
    fn test_add_step_rejects_unknown_metric() {
        let mut def = definition();
        assert!(def.add_step(Some("vibes".into())).is_err());
        assert!(def.steps.is_empty());
    }

    #[test]
    fn test_step_ids_are_never_reused() {
        let mut def = definition();
        let a = def.add_step(None).unwrap();
        let b = def.add_step(None).unwrap();
        def.remove_step(b).unwrap();
        let c = def.add_step(None).unwrap();
        assert_ne!(b, c);
        assert!(c > b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_remove_step_drops_its_configs() {
        let mut def = definition();
        let keep = def.add_step(None).unwrap();
        let gone = def.add_step(None).unwrap();
        def.remove_step(gone).unwrap();
        for branch in Branch::PRIORITY {
            assert!(def.branch_configs.get(branch, gone).is_none());
            assert!(def.branch_configs.get(branch, keep).is_some());
        }
        assert!(def.validate().is_ok());
    }

    #[test]
    fn test_move_step_changes_order() {
        let mut def = definition();
        let a = def.add_step(None).unwrap();
        let b = def.add_step(None).unwrap();
        let c = def.add_step(None).unwrap();
        def.move_step(c, 0).unwrap();
        let order: Vec<StepId> = def.steps.iter().map(|s| s.id).collect();
        assert_eq!(order, vec![c, a, b]);
        def.move_step(c, 99).unwrap();
        let order: Vec<StepId> = def.steps.iter().map(|s| s.id).collect();
        assert_eq!(order, vec![a, b, c]);
    }

    #[test]
    fn test_set_range_enforces_order_and_scale() {
        let mut def = definition();
        let id = def.add_step(None).unwrap();
        assert!(def
            .set_range(id, Branch::Draw, Range::closed(5.0, -5.0))
            .is_err());
        assert!(def
            .set_range(id, Branch::Draw, Range::closed(-60.0, 5.0))
            .is_err());
        def.set_range(id, Branch::Draw, Range::closed(-5.0, 5.0))
            .unwrap();
        assert_eq!(def.step(id).unwrap().ranges.draw, Range::closed(-5.0, 5.0));
    }

    #[test]
    fn test_set_branch_config_validates_weight() {
        let mut def = definition();
        let id = def.add_step(None).unwrap();
        assert!(def
            .set_branch_config(Branch::Away, id, BranchConfig::weighted(11))
            .is_err());
        assert!(def
            .set_branch_config(
                Branch::Away,
                id,
                BranchConfig {
                    edge_type: EdgeType::Weight,
                    weight: None
                }
            )
            .is_err());
        def.set_branch_config(Branch::Away, id, BranchConfig::weighted(7))
            .unwrap();
        assert_eq!(
            def.branch_configs.get(Branch::Away, id),
            Some(&BranchConfig::weighted(7))
        );
    }

    #[test]
    fn test_match_config_discards_weight() {
        let mut def = definition();
        let id = def.add_step(None).unwrap();
        def.set_branch_config(
            Branch::Home,
            id,
            BranchConfig {
                edge_type: EdgeType::Match,
                weight: Some(3),
            },
        )
        .unwrap();
        assert_eq!(def.branch_configs.get(Branch::Home, id).unwrap().weight, None);
    }

    #[test]
    fn test_set_max_margin_keeps_endpoints_in_scale() {
        let mut def = StrategyDefinition::new(100.0).unwrap();
        let id = def.add_step(None).unwrap();
        def.set_range(id, Branch::Away, Range::at_least(15.0, 100.0))
            .unwrap();
        assert!(def.set_max_margin(50.0).is_err());
        assert!(def.set_max_margin(40.0).is_err());
        def.set_max_margin(150.0).unwrap();
        assert_eq!(def.max_margin, 150.0);
    }

    #[test]
    fn test_validate_reports_each_violation() {
        let empty = definition();
        assert_eq!(empty.validate(), Err(ConfigurationError::NoSteps));

        let mut def = definition();
        let id = def.add_step(None).unwrap();

        let mut small = def.clone();
        small.max_margin = 10.0;
        assert_eq!(small.validate(), Err(ConfigurationError::ScaleTooSmall(10.0)));

        let mut missing = def.clone();
        missing.branch_configs.draw.remove(&id);
        assert_eq!(
            missing.validate(),
            Err(ConfigurationError::MissingBranchConfig {
                branch: Branch::Draw,
                step: id
            })
        );

        let mut heavy = def.clone();
        heavy.branch_configs.away.insert(id, BranchConfig::weighted(12));
        assert_eq!(
            heavy.validate(),
            Err(ConfigurationError::WeightOutOfRange {
                branch: Branch::Away,
                step: id,
                weight: 12
            })
        );

        let mut inverted = def.clone();
        inverted.steps[0].ranges.home = Range::closed(-10.0, -20.0);
        assert!(matches!(
            inverted.validate(),
            Err(ConfigurationError::InvertedRange { branch: Branch::Home, .. })
        ));

        let mut orphan = def.clone();
        orphan.branch_configs.home.insert(StepId(99), BranchConfig::matching());
        assert_eq!(
            orphan.validate(),
            Err(ConfigurationError::UnknownStepConfig {
                branch: Branch::Home,
                step: StepId(99)
            })
        );

        let mut duplicate = def.clone();
        duplicate.steps.push(duplicate.steps[0].clone());
        assert_eq!(duplicate.validate(), Err(ConfigurationError::DuplicateStep(id)));
    }

    #[test]
    fn test_definition_wire_format() {
        let json = serde_json::json!({
            "maxMargin": 50,
            "steps": [{
                "id": 1,
                "metricId": "possession",
                "ranges": {
                    "home": {"min": -50, "max": -15, "minIsOpen": true},
                    "draw": {"min": -10, "max": 10},
                    "away": {"min": 15, "max": 50, "maxIsOpen": true}
                }
            }],
            "branchConfigs": {
                "home": {"1": {"edgeType": "Match"}},
                "draw": {"1": {"edgeType": "Match"}},
                "away": {"1": {"edgeType": "Weight", "weight": 3}}
            }
        });
        let mut def: StrategyDefinition = serde_json::from_value(json).unwrap();
        assert!(def.validate().is_ok());
        assert_eq!(def.steps[0].metric_id.as_deref(), Some("possession"));
        assert_eq!(
            def.branch_configs.get(Branch::Away, StepId(1)),
            Some(&BranchConfig::weighted(3))
        );

        // Imported definitions without a counter still get fresh ids.
        assert_eq!(def.next_step_id, 0);
        assert_eq!(def.add_step(None).unwrap(), StepId(2));
    }

    #[test]
    fn test_reserve_step_ids_never_lowers_the_counter() {
        let mut def = definition();
        for _ in 0..3 {
            def.add_step(None).unwrap();
        }
        def.next_step_id = 0;
        def.reserve_step_ids(0);
        assert_eq!(def.next_step_id, 4);

        def.remove_step(StepId(3)).unwrap();
        def.reserve_step_ids(2);
        assert_eq!(def.next_step_id, 4);
        def.reserve_step_ids(9);
        assert_eq!(def.add_step(None).unwrap(), StepId(9));
    }

    #[test]
    fn test_add_step_reports_exhausted_id_space() {
        let mut def = definition();
        def.add_step(None).unwrap();
        def.steps[0].id = StepId(u32::MAX);
        def.next_step_id = 0;
        def.reserve_step_ids(0);
        let before = def.clone();

        assert!(matches!(def.add_step(None), Err(DomainError::InvalidInput(_))));
        assert_eq!(def, before);
    }

    #[test]
    fn test_touch_bumps_version() {
        let mut strategy = Strategy::new("Home bankers".into(), definition());
        assert_eq!(strategy.version, 1);
        assert_eq!(strategy.touch(), 1);
        assert_eq!(strategy.version, 2);
    }
}
