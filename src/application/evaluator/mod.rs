//! Strategy evaluator: runs all three branches for a fixture and picks one.

pub mod branch;

pub use branch::evaluate_branch;

use crate::domain::entities::recommendation::{BranchResult, BranchResults, MatchRecommendation};
use crate::domain::entities::sample::MatchMetricSample;
use crate::domain::entities::snapshot::StrategySnapshot;
use crate::domain::values::branch::Branch;

/// Evaluate home, draw and away and resolve a single recommendation.
///
/// The highest-scoring passed branch wins; a tie goes to the earlier branch
/// in `home > draw > away` order. No passed branch yields `branch: None`,
/// which is a valid outcome rather than an error.
pub fn evaluate(strategy: &StrategySnapshot, sample: &MatchMetricSample) -> MatchRecommendation {
    let [home, draw, away] = Branch::PRIORITY.map(|b| evaluate_branch(strategy, b, sample));
    let branch_results = BranchResults { home, draw, away };

    let winner = select_winner(branch_results.iter());

    MatchRecommendation {
        fixture_id: sample.fixture_id.clone(),
        branch: winner.map(|r| r.branch),
        score: winner.map(|r| r.score).unwrap_or(0),
        branch_results,
    }
}

/// `results` must arrive in priority order.
fn select_winner<'a>(results: impl Iterator<Item = &'a BranchResult>) -> Option<&'a BranchResult> {
    results
        .filter(|r| r.passed)
        .fold(None, |best: Option<&BranchResult>, r| match best {
            Some(b) if b.score >= r.score => Some(b),
            _ => Some(r),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::strategy::StrategyDefinition;
    use crate::domain::values::edge::BranchConfig;
    use crate::domain::values::range::Range;

    fn three_way() -> StrategyDefinition {
        let mut def = StrategyDefinition::new(50.0).unwrap();
        def.add_step(Some("goals_scored".into())).unwrap();
        def
    }

    #[test]
    fn test_picks_the_only_passing_branch() {
        let snap = StrategySnapshot::compile(&three_way()).unwrap();
        let sample = MatchMetricSample::new("fx").with("goals_scored", 2.0, 1.0);

        let rec = evaluate(&snap, &sample);
        assert_eq!(rec.branch, Some(Branch::Home));
        assert!(rec.branch_results.home.passed);
        assert!(!rec.branch_results.draw.passed);
        assert!(!rec.branch_results.away.passed);
    }

    #[test]
    fn test_highest_score_beats_priority() {
        let mut def = StrategyDefinition::new(50.0).unwrap();
        let id = def.add_step(Some("shots".into())).unwrap();
        for branch in Branch::PRIORITY {
            def.set_range(id, branch, Range::closed(-50.0, 50.0)).unwrap();
        }
        def.set_branch_config(Branch::Home, id, BranchConfig::weighted(2))
            .unwrap();
        def.set_branch_config(Branch::Away, id, BranchConfig::weighted(6))
            .unwrap();
        let snap = StrategySnapshot::compile(&def).unwrap();

        let rec = evaluate(&snap, &MatchMetricSample::new("fx").with("shots", 10.0, 10.0));
        assert_eq!(rec.branch, Some(Branch::Away));
        assert_eq!(rec.score, 6);
    }

    #[test]
    fn test_ties_resolve_by_priority() {
        let mut def = StrategyDefinition::new(50.0).unwrap();
        let id = def.add_step(Some("shots".into())).unwrap();
        for branch in [Branch::Draw, Branch::Away] {
            def.set_range(id, branch, Range::closed(-50.0, 50.0)).unwrap();
            def.set_branch_config(branch, id, BranchConfig::weighted(4))
                .unwrap();
        }
        let snap = StrategySnapshot::compile(&def).unwrap();

        let rec = evaluate(&snap, &MatchMetricSample::new("fx").with("shots", 10.0, 10.0));
        assert!(!rec.branch_results.home.passed);
        assert_eq!(rec.branch, Some(Branch::Draw));
        assert_eq!(rec.score, 4);
    }

    #[test]
    fn test_no_passing_branch_is_not_an_error() {
        let snap = StrategySnapshot::compile(&three_way()).unwrap();
        // Margin -12: outside every default range.
        let sample = MatchMetricSample::new("fx").with("goals_scored", 100.0, 88.0);

        let rec = evaluate(&snap, &sample);
        assert_eq!(rec.branch, None);
        assert_eq!(rec.score, 0);
        assert!(rec.branch_results.iter().all(|r| !r.passed));
    }
}
