use serde::Serialize;
use std::fmt;

use crate::domain::entities::recommendation::MatchRecommendation;
use crate::domain::entities::sample::FixtureId;
use crate::domain::values::branch::Branch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// No metric sample was supplied for the fixture.
    NoSampleData,
    /// Every branch failed or lacked data.
    NoBranchPassed,
    /// The fixture id was already listed earlier in the pool.
    DuplicateFixture,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoSampleData => write!(f, "no sample data"),
            SkipReason::NoBranchPassed => write!(f, "no branch passed"),
            SkipReason::DuplicateFixture => write!(f, "duplicate fixture"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pick {
    pub fixture_id: FixtureId,
    pub branch: Branch,
    pub recommendation: MatchRecommendation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedFixture {
    pub fixture_id: FixtureId,
    pub reason: SkipReason,
    /// Diagnostics for `NoBranchPassed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<MatchRecommendation>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub fixtures_requested: usize,
    pub fixtures_evaluated: usize,
    pub picks: usize,
    pub skipped: usize,
}

/// Output of a pool run. `partial` is set when the run was cancelled before
/// every fixture was scheduled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlipCandidate {
    pub strategy_id: Option<String>,
    pub strategy_version: Option<u32>,
    pub picks: Vec<Pick>,
    pub skipped: Vec<SkippedFixture>,
    pub partial: bool,
    pub summary: RunSummary,
}

impl SlipCandidate {
    pub fn branch_for(&self, fixture_id: &str) -> Option<Branch> {
        self.picks
            .iter()
            .find(|p| p.fixture_id == fixture_id)
            .map(|p| p.branch)
    }

    pub fn skip_reason(&self, fixture_id: &str) -> Option<SkipReason> {
        self.skipped
            .iter()
            .find(|s| s.fixture_id == fixture_id)
            .map(|s| s.reason)
    }
}
