use std::collections::{BTreeSet, HashMap};

use defense_impact::aggregate::Bucket;
use defense_impact::delta::{compute_deltas, sort_by_delta_desc};
use defense_impact::engine::{EngineConfig, GameShots, aggregate_season, fold_game};
use defense_impact::aggregate::Aggregator;
use defense_impact::names::NameBook;
use defense_impact::ratings::ShooterQualityTable;
use defense_impact::shot::ShotRecord;
use defense_impact::synthetic_feed::synthetic_season;
use defense_impact::xg::XgSource;

// Hand-computed with the default model constants:
//   shot 1: (1 - 10/60) * 1.0 * 1.1             = 0.916667
//   shot 2: (1 - 40/60) * (1 - 30/90) * 0.8     = 0.177778
//   shot 3: min((1 - 5/60) * (1 - 5/90) * 1.3, 0.95) * 2.0 = 1.9
//   on  = 1 - (0.916667 + 1.9) / 2 = -0.408333
//   off = 1 - 0.177778             =  0.822222
const EXPECTED_ON: f64 = -0.408_333_333;
const EXPECTED_OFF: f64 = 0.822_222_222;
const EXPECTED_DELTA: f64 = -1.230_555_556;
const TOLERANCE: f64 = 1e-6;

fn shot(t: u32, d: f64, a: f64, ty: &str, shooter: &str, on: &[&str]) -> ShotRecord {
    ShotRecord {
        game_id: "e2e".into(),
        period: 1,
        timestamp: Some(t),
        distance: Some(d),
        angle: Some(a),
        shot_type: Some(ty.into()),
        shooter_id: Some(shooter.into()),
        defending_team: Some("D".into()),
        on_ice_defenders: on.iter().map(|s| s.to_string()).collect(),
        provider_xg: None,
    }
}

fn scenario() -> GameShots {
    GameShots {
        game_id: "e2e".into(),
        rosters: HashMap::from([("D".to_string(), BTreeSet::from(["X".to_string()]))]),
        shots: vec![
            shot(10, 10.0, 0.0, "wrist", "avg", &["X"]),
            shot(20, 40.0, 30.0, "slap", "avg", &[]),
            shot(30, 5.0, 5.0, "tip", "elite", &["X"]),
        ],
    }
}

#[test]
fn three_shot_scenario_matches_hand_computation() {
    let ratings = ShooterQualityTable::from_ratings([
        ("avg".to_string(), 1.0),
        ("elite".to_string(), 2.0),
    ]);
    let season = aggregate_season(&[scenario()], &ratings, &EngineConfig::default(), false);
    let report = compute_deltas(&season.aggregator, &NameBook::default());

    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.excluded, 0);
    let x = &report.rows[0];
    assert_eq!(x.player_id, "X");
    assert_eq!((x.shots_on, x.shots_off), (2, 1));
    assert!((x.exp_asv_on - EXPECTED_ON).abs() < TOLERANCE);
    assert!((x.exp_asv_off - EXPECTED_OFF).abs() < TOLERANCE);
    assert!((x.delta_exp_asv - EXPECTED_DELTA).abs() < TOLERANCE);
}

#[test]
fn shot_order_in_feed_does_not_change_result() {
    let ratings = ShooterQualityTable::from_ratings([("elite".to_string(), 2.0)]);
    let mut reversed = scenario();
    reversed.shots.reverse();

    let mut a = Aggregator::new();
    let mut b = Aggregator::new();
    fold_game(&scenario(), &ratings, &EngineConfig::default(), &mut a);
    fold_game(&reversed, &ratings, &EngineConfig::default(), &mut b);
    for bucket in [Bucket::On, Bucket::Off] {
        let x = a.exp_asv("X", bucket).unwrap();
        let y = b.exp_asv("X", bucket).unwrap();
        assert!((x - y).abs() < 1e-12);
    }
}

#[test]
fn defender_on_for_every_shot_gets_no_row() {
    let game = GameShots {
        game_id: "g".into(),
        rosters: HashMap::from([("D".to_string(), BTreeSet::from(["X".to_string()]))]),
        shots: vec![
            shot(1, 20.0, 0.0, "wrist", "s", &["X"]),
            shot(2, 30.0, 0.0, "wrist", "s", &["X"]),
        ],
    };
    let season = aggregate_season(
        &[game],
        &ShooterQualityTable::neutral(),
        &EngineConfig::default(),
        false,
    );
    let report = compute_deltas(&season.aggregator, &NameBook::default());
    assert!(report.rows.is_empty());
    assert_eq!(report.excluded, 1);
    assert_eq!(report.excluded_ids, vec!["X".to_string()]);
}

#[test]
fn provider_source_prefers_supplied_xg() {
    let mut game = scenario();
    for s in &mut game.shots {
        s.provider_xg = Some(0.1);
    }
    let cfg = EngineConfig {
        source: XgSource::Provider,
        ..Default::default()
    };
    let season = aggregate_season(&[game], &ShooterQualityTable::neutral(), &cfg, false);
    let on = season.aggregator.exp_asv("X", Bucket::On).unwrap();
    let off = season.aggregator.exp_asv("X", Bucket::Off).unwrap();
    assert!((on - 0.9).abs() < 1e-12);
    assert!((off - 0.9).abs() < 1e-12);
}

#[test]
fn synthetic_season_produces_ranked_table() {
    let mut names = NameBook::default();
    let games = synthetic_season(11, 24, &mut names);
    let season = aggregate_season(
        &games,
        &ShooterQualityTable::neutral(),
        &EngineConfig::default(),
        true,
    );
    assert_eq!(season.report.games, 24);
    assert_eq!(season.report.shots_skipped, 0);
    assert_eq!(
        season.ledger.len() as u64,
        season.report.on_increments + season.report.off_increments
    );

    let mut report = compute_deltas(&season.aggregator, &names);
    assert!(!report.rows.is_empty());
    sort_by_delta_desc(&mut report.rows);
    for pair in report.rows.windows(2) {
        assert!(pair[0].delta_exp_asv >= pair[1].delta_exp_asv);
    }
    assert!(report.rows[0].player_name.starts_with("Team "));
}
