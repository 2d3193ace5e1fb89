use serde::Serialize;

use crate::domain::entities::sample::FixtureId;
use crate::domain::values::branch::Branch;
use crate::domain::values::margin::MissingCause;
use crate::domain::values::step_id::StepId;

/// Why a branch did not pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "PascalCase")]
pub enum BranchFailure {
    /// A `Match` step's range test failed.
    ConditionFailed,
    /// The margin for a step could not be computed from the sample.
    #[serde(rename_all = "camelCase")]
    MissingData { metric_id: String, cause: MissingCause },
}

/// Outcome of walking one branch's step chain for one fixture.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchResult {
    pub branch: Branch,
    pub passed: bool,
    pub score: u32,
    pub stopped_at_step: Option<StepId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<BranchFailure>,
    /// Steps actually inspected, inert steps included.
    pub steps_evaluated: usize,
}

impl BranchResult {
    pub fn is_missing_data(&self) -> bool {
        matches!(self.failure, Some(BranchFailure::MissingData { .. }))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchResults {
    pub home: BranchResult,
    pub draw: BranchResult,
    pub away: BranchResult,
}

impl BranchResults {
    pub fn get(&self, branch: Branch) -> &BranchResult {
        match branch {
            Branch::Home => &self.home,
            Branch::Draw => &self.draw,
            Branch::Away => &self.away,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &BranchResult> {
        [&self.home, &self.draw, &self.away].into_iter()
    }
}

/// Recommendation for one fixture. `branch` is `None` when no branch passed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecommendation {
    pub fixture_id: FixtureId,
    pub branch: Option<Branch>,
    pub score: u32,
    pub branch_results: BranchResults,
}
