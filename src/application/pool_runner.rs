//! Pool runner: applies a strategy to every fixture of a pool.
//!
//! Fixture evaluations are independent, so the runner can fan them out over
//! a rayon pool. Results are always assembled back in `fixture_order`, so the
//! parallel and sequential paths produce identical slips.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::evaluator;
use crate::domain::entities::recommendation::MatchRecommendation;
use crate::domain::entities::sample::{FixtureId, MatchMetricSample};
use crate::domain::entities::slip::{Pick, RunSummary, SkipReason, SkippedFixture, SlipCandidate};
use crate::domain::entities::snapshot::StrategySnapshot;
use crate::domain::entities::strategy::StrategyDefinition;
use crate::domain::error::ConfigurationError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Evaluate fixtures on the rayon worker pool.
    pub parallel: bool,
}

enum Slot<'a> {
    Evaluate(&'a MatchMetricSample),
    Missing,
    Duplicate,
}

enum Outcome {
    Recommended(MatchRecommendation),
    Skipped(SkipReason, Option<MatchRecommendation>),
}

pub struct PoolRunner {
    options: RunOptions,
}

impl PoolRunner {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    /// Validate `definition`, then run it over the pool.
    pub fn run(
        &self,
        definition: &StrategyDefinition,
        samples: &HashMap<FixtureId, MatchMetricSample>,
        fixture_order: &[FixtureId],
    ) -> Result<SlipCandidate, ConfigurationError> {
        let snapshot = StrategySnapshot::compile(definition).map_err(|e| {
            warn!(error = %e, "strategy rejected before run");
            e
        })?;
        Ok(self.run_snapshot(&snapshot, samples, fixture_order, &CancellationToken::new()))
    }

    /// Run an already validated snapshot. Once `cancel` fires no further
    /// fixture is scheduled and the slip comes back marked partial.
    pub fn run_snapshot(
        &self,
        strategy: &StrategySnapshot,
        samples: &HashMap<FixtureId, MatchMetricSample>,
        fixture_order: &[FixtureId],
        cancel: &CancellationToken,
    ) -> SlipCandidate {
        info!(
            strategy = strategy.strategy_id().unwrap_or("-"),
            fixtures = fixture_order.len(),
            steps = strategy.steps().len(),
            parallel = self.options.parallel,
            "pool run started"
        );

        let slots = plan(samples, fixture_order);

        let outcomes: Vec<Option<Outcome>> = if self.options.parallel {
            slots
                .par_iter()
                .map(|slot| (!cancel.is_cancelled()).then(|| resolve(strategy, slot)))
                .collect()
        } else {
            let mut outcomes = Vec::with_capacity(slots.len());
            for slot in &slots {
                if cancel.is_cancelled() {
                    break;
                }
                outcomes.push(Some(resolve(strategy, slot)));
            }
            outcomes.resize_with(slots.len(), || None);
            outcomes
        };

        let slip = assemble(strategy, fixture_order, &slots, outcomes);
        if slip.partial {
            warn!(
                evaluated = slip.summary.fixtures_evaluated,
                requested = slip.summary.fixtures_requested,
                "pool run cancelled, returning partial slip"
            );
        } else {
            info!(
                picks = slip.summary.picks,
                skipped = slip.summary.skipped,
                "pool run finished"
            );
        }
        slip
    }
}

fn plan<'a>(
    samples: &'a HashMap<FixtureId, MatchMetricSample>,
    fixture_order: &[FixtureId],
) -> Vec<Slot<'a>> {
    let mut seen = HashSet::with_capacity(fixture_order.len());
    fixture_order
        .iter()
        .map(|id| {
            if !seen.insert(id.as_str()) {
                Slot::Duplicate
            } else {
                match samples.get(id) {
                    Some(sample) => Slot::Evaluate(sample),
                    None => Slot::Missing,
                }
            }
        })
        .collect()
}

fn resolve(strategy: &StrategySnapshot, slot: &Slot<'_>) -> Outcome {
    match slot {
        Slot::Missing => Outcome::Skipped(SkipReason::NoSampleData, None),
        Slot::Duplicate => Outcome::Skipped(SkipReason::DuplicateFixture, None),
        Slot::Evaluate(sample) => {
            let rec = evaluator::evaluate(strategy, sample);
            if rec.branch.is_some() {
                Outcome::Recommended(rec)
            } else {
                Outcome::Skipped(SkipReason::NoBranchPassed, Some(rec))
            }
        }
    }
}

fn assemble(
    strategy: &StrategySnapshot,
    fixture_order: &[FixtureId],
    slots: &[Slot<'_>],
    outcomes: Vec<Option<Outcome>>,
) -> SlipCandidate {
    let mut picks = Vec::new();
    let mut skipped = Vec::new();
    let mut partial = false;
    let mut evaluated = 0usize;

    for ((fixture_id, slot), outcome) in fixture_order.iter().zip(slots).zip(outcomes) {
        let Some(outcome) = outcome else {
            partial = true;
            continue;
        };
        if matches!(slot, Slot::Evaluate(_)) {
            evaluated += 1;
        }
        match outcome {
            Outcome::Recommended(rec) => {
                if let Some(branch) = rec.branch {
                    picks.push(Pick {
                        fixture_id: fixture_id.clone(),
                        branch,
                        recommendation: rec,
                    });
                }
            }
            Outcome::Skipped(reason, recommendation) => {
                debug!(fixture = %fixture_id, %reason, "fixture skipped");
                skipped.push(SkippedFixture {
                    fixture_id: fixture_id.clone(),
                    reason,
                    recommendation,
                });
            }
        }
    }

    let summary = RunSummary {
        fixtures_requested: fixture_order.len(),
        fixtures_evaluated: evaluated,
        picks: picks.len(),
        skipped: skipped.len(),
    };

    SlipCandidate {
        strategy_id: strategy.strategy_id().map(str::to_string),
        strategy_version: strategy.version(),
        picks,
        skipped,
        partial,
        summary,
    }
}
