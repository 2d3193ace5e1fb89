mod common;

use common::{goals, ids, setup_with, three_way_definition};
use slipcraft::application::pool_runner::RunOptions;
use slipcraft::domain::entities::sample::MatchMetricSample;
use slipcraft::domain::entities::slip::SkipReason;
use slipcraft::domain::error::DomainError;
use slipcraft::domain::values::branch::Branch;
use slipcraft::infrastructure::samples::json_file::JsonPoolProvider;
use slipcraft::SlipCraft;
use std::io::Write;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn pool_samples() -> Vec<MatchMetricSample> {
    (0..40)
        .map(|i| {
            // Margins sweep from -40 to +38 in steps of 2.
            let away = 60.0 + 2.0 * i as f64;
            goals(&format!("fx-{i:02}"), 100.0, away)
        })
        .collect()
}

fn pool_order() -> Vec<String> {
    let mut order: Vec<String> = (0..40).map(|i| format!("fx-{i:02}")).collect();
    order.insert(10, "no-data".into());
    order.push("fx-03".into());
    order
}

#[tokio::test]
async fn test_run_produces_ordered_picks_and_skips() {
    let sc = setup_with(pool_samples(), RunOptions::default());
    let (def, _) = three_way_definition();
    let strategy = sc.import_strategy("sweep".into(), def).unwrap();

    let slip = sc
        .run_pool(&strategy.id, pool_order(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(slip.strategy_id.as_deref(), Some(strategy.id.as_str()));
    assert_eq!(slip.strategy_version, Some(strategy.version));
    assert!(!slip.partial);
    assert_eq!(slip.summary.fixtures_requested, 42);
    assert_eq!(slip.summary.picks + slip.summary.skipped, 42);
    assert_eq!(slip.summary.picks, slip.picks.len());

    // fx-00 is margin -40, fx-12 is margin -16, fx-20 is margin 0.
    assert_eq!(slip.branch_for("fx-00"), Some(Branch::Home));
    assert_eq!(slip.branch_for("fx-12"), Some(Branch::Home));
    assert_eq!(slip.branch_for("fx-20"), Some(Branch::Draw));
    assert_eq!(slip.branch_for("fx-39"), Some(Branch::Away));
    // -12 sits between the home and draw ranges.
    assert_eq!(slip.skip_reason("fx-14"), Some(SkipReason::NoBranchPassed));
    assert_eq!(slip.skip_reason("no-data"), Some(SkipReason::NoSampleData));
    assert_eq!(
        slip.skipped
            .iter()
            .filter(|s| s.fixture_id == "fx-03")
            .map(|s| s.reason)
            .collect::<Vec<_>>(),
        vec![SkipReason::DuplicateFixture]
    );
    assert_eq!(slip.picks.iter().filter(|p| p.fixture_id == "fx-03").count(), 1);

    let order = pool_order();
    let positions: Vec<usize> = slip
        .picks
        .iter()
        .map(|p| order.iter().position(|id| *id == p.fixture_id).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_parallel_and_sequential_slips_match() {
    let (def, _) = three_way_definition();

    let parallel = setup_with(pool_samples(), RunOptions { parallel: true });
    let sequential = setup_with(pool_samples(), RunOptions { parallel: false });
    let p = parallel.import_strategy("p".into(), def.clone()).unwrap();
    let s = sequential.import_strategy("s".into(), def).unwrap();

    let mut a = parallel
        .run_pool(&p.id, pool_order(), CancellationToken::new())
        .await
        .unwrap();
    let mut b = sequential
        .run_pool(&s.id, pool_order(), CancellationToken::new())
        .await
        .unwrap();

    // Only the strategy ids differ between the two stores.
    a.strategy_id = None;
    b.strategy_id = None;
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_cancelled_run_returns_partial_slip() {
    let sc = setup_with(pool_samples(), RunOptions { parallel: false });
    let (def, _) = three_way_definition();
    let strategy = sc.import_strategy("sweep".into(), def).unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let slip = sc.run_pool(&strategy.id, pool_order(), cancel).await.unwrap();

    assert!(slip.partial);
    assert!(slip.picks.is_empty());
    assert_eq!(slip.summary.fixtures_evaluated, 0);
    assert_eq!(slip.summary.fixtures_requested, 42);
}

#[tokio::test]
async fn test_run_takes_a_snapshot_of_the_stored_version() {
    let sc = setup_with(pool_samples(), RunOptions::default());
    let (def, step) = three_way_definition();
    let strategy = sc.import_strategy("moving".into(), def).unwrap();

    let before = sc
        .run_pool(&strategy.id, pool_order(), CancellationToken::new())
        .await
        .unwrap();
    let edited = sc.remove_step(&strategy.id, step).unwrap();

    assert_eq!(before.strategy_version, Some(strategy.version));
    assert!(!before.picks.is_empty());
    assert!(matches!(
        sc.run_pool(&edited.id, pool_order(), CancellationToken::new())
            .await,
        Err(DomainError::Configuration(_))
    ));
}

#[tokio::test]
async fn test_unknown_strategy_is_not_found() {
    let sc = setup_with(Vec::new(), RunOptions::default());
    let result = sc
        .run_pool("missing", ids(&["fx"]), CancellationToken::new())
        .await;
    assert!(matches!(result, Err(DomainError::NotFound(_))));
}

#[tokio::test]
async fn test_run_from_pool_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "fixtures": ["arsenal-spurs", "leeds-derby", "ghost"],
            "samples": [
                {{"fixtureId": "leeds-derby", "values": {{"goals_scored": {{"homeValue": 10, "awayValue": 10}}}}}},
                {{"fixtureId": "arsenal-spurs", "values": {{"goals_scored": {{"homeValue": 20, "awayValue": 14}}}}}}
            ]
        }}"#
    )
    .unwrap();

    let provider = JsonPoolProvider::open(file.path()).await.unwrap();
    let order = provider.fixture_order();
    assert_eq!(order, ids(&["arsenal-spurs", "leeds-derby", "ghost"]));

    let sc = SlipCraft::with_provider(":memory:", Arc::new(provider), RunOptions::default())
        .unwrap();
    let (def, _) = three_way_definition();
    let strategy = sc.import_strategy("file".into(), def).unwrap();

    let slip = sc
        .run_pool(&strategy.id, order, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(slip.branch_for("arsenal-spurs"), Some(Branch::Home));
    assert_eq!(slip.branch_for("leeds-derby"), Some(Branch::Draw));
    assert_eq!(slip.skip_reason("ghost"), Some(SkipReason::NoSampleData));

    let json = serde_json::to_value(&slip).unwrap();
    assert_eq!(json["picks"][0]["fixtureId"], "arsenal-spurs");
    assert_eq!(json["picks"][0]["branch"], "home");
    assert_eq!(json["skipped"][0]["reason"], "NoSampleData");
}
