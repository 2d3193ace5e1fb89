//! Branch evaluator: walks one branch's step chain for one fixture.

use tracing::trace;

use crate::domain::entities::recommendation::{BranchFailure, BranchResult};
use crate::domain::entities::sample::MatchMetricSample;
use crate::domain::entities::snapshot::StrategySnapshot;
use crate::domain::values::branch::Branch;
use crate::domain::values::edge::Edge;
use crate::domain::values::margin::{self, MissingCause};

/// Evaluate `branch` of `strategy` against one fixture's sample.
///
/// `Match` steps gate the chain: the first miss stops the branch and no
/// later step is looked at. `Weight` steps add their weight when satisfied
/// and never stop the chain. A margin that cannot be computed aborts the
/// branch with [`BranchFailure::MissingData`].
pub fn evaluate_branch(
    strategy: &StrategySnapshot,
    branch: Branch,
    sample: &MatchMetricSample,
) -> BranchResult {
    let scale = strategy.scale();
    let mut score: u32 = 0;

    for (i, step) in strategy.steps().iter().enumerate() {
        let steps_evaluated = i + 1;

        // Placeholder policy until product defines metric-less steps:
        // always satisfied, never scored, never stops.
        let Some(metric_id) = step.metric_id.as_deref() else {
            continue;
        };

        let margin = sample
            .get(metric_id)
            .ok_or(MissingCause::MetricAbsent)
            .and_then(|pair| margin::compute(pair.home_value, pair.away_value, scale));

        let margin = match margin {
            Ok(m) => m,
            Err(cause) => {
                trace!(
                    fixture = %sample.fixture_id,
                    %branch,
                    step = %step.id,
                    metric = metric_id,
                    %cause,
                    "missing data"
                );
                return BranchResult {
                    branch,
                    passed: false,
                    score,
                    stopped_at_step: Some(step.id),
                    failure: Some(BranchFailure::MissingData {
                        metric_id: metric_id.to_string(),
                        cause,
                    }),
                    steps_evaluated,
                };
            }
        };

        let rule = step.rule(branch);
        let satisfied = rule.interval.contains(margin);

        match rule.edge {
            Edge::Match => {
                if !satisfied {
                    trace!(
                        fixture = %sample.fixture_id,
                        %branch,
                        step = %step.id,
                        margin,
                        "match step failed"
                    );
                    return BranchResult {
                        branch,
                        passed: false,
                        score,
                        stopped_at_step: Some(step.id),
                        failure: Some(BranchFailure::ConditionFailed),
                        steps_evaluated,
                    };
                }
            }
            Edge::Weight(weight) => {
                if satisfied {
                    score += weight.value();
                }
            }
        }
    }

    BranchResult {
        branch,
        passed: true,
        score,
        stopped_at_step: None,
        failure: None,
        steps_evaluated: strategy.steps().len(),
    }
}
