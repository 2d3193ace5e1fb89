//! Shared test helpers.

#![allow(dead_code)]

use slipcraft::application::pool_runner::RunOptions;
use slipcraft::domain::entities::sample::MatchMetricSample;
use slipcraft::domain::entities::strategy::StrategyDefinition;
use slipcraft::domain::values::branch::Branch;
use slipcraft::domain::values::range::Range;
use slipcraft::domain::values::step_id::StepId;
use slipcraft::infrastructure::samples::memory::InMemoryProvider;
use slipcraft::SlipCraft;
use std::sync::Arc;

pub fn setup() -> SlipCraft {
    setup_with(Vec::new(), RunOptions::default())
}

pub fn setup_with(samples: Vec<MatchMetricSample>, options: RunOptions) -> SlipCraft {
    SlipCraft::with_provider(":memory:", Arc::new(InMemoryProvider::new(samples)), options)
        .unwrap()
}

/// One `goals_scored` step: home `<= -15`, draw `[-10, 10]`, away `>= 15`,
/// all `Match` edges, scale 50.
pub fn three_way_definition() -> (StrategyDefinition, StepId) {
    let mut def = StrategyDefinition::new(50.0).unwrap();
    let step = def.add_step(Some("goals_scored".into())).unwrap();
    def.set_range(step, Branch::Home, Range::at_most(-50.0, -15.0))
        .unwrap();
    def.set_range(step, Branch::Draw, Range::closed(-10.0, 10.0))
        .unwrap();
    def.set_range(step, Branch::Away, Range::at_least(15.0, 50.0))
        .unwrap();
    (def, step)
}

pub fn goals(fixture: &str, home: f64, away: f64) -> MatchMetricSample {
    MatchMetricSample::new(fixture).with("goals_scored", home, away)
}

pub fn ids(fixtures: &[&str]) -> Vec<String> {
    fixtures.iter().map(|f| f.to_string()).collect()
}
