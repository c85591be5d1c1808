use std::fs;
use std::path::PathBuf;

use defense_impact::aggregate::Bucket;
use defense_impact::delta::compute_deltas;
use defense_impact::engine::{EngineConfig, aggregate_season};
use defense_impact::names::NameBook;
use defense_impact::ratings::load_shooter_ratings;
use defense_impact::sportradar::{parse_pbp_json, parse_schedule_json};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("fixture file should be readable")
}

#[test]
fn parses_schedule_fixture() {
    let games = parse_schedule_json(&read_fixture("sportradar_schedule.json"))
        .expect("fixture should parse");
    assert_eq!(games.len(), 2);
    assert_eq!(games[0].id, "g-100");
    assert_eq!(games[0].home_id, "H");
    assert_eq!(games[0].away_id, "A");
    assert!(games[0].is_final());
    assert!(!games[1].is_final());
}

#[test]
fn parses_pbp_fixture_with_on_ice_sets() {
    let schedule = parse_schedule_json(&read_fixture("sportradar_schedule.json")).unwrap();
    let mut names = NameBook::default();
    let game = parse_pbp_json(&read_fixture("sportradar_pbp.json"), &schedule[0], &mut names)
        .expect("fixture should parse");

    assert_eq!(game.game_id, "g-100");
    assert_eq!(game.shots.len(), 3);
    assert_eq!(game.rosters["H"].len(), 3);
    assert_eq!(game.rosters["A"].len(), 2);
    assert_eq!(names.label("h3"), "Home Three");

    let first = &game.shots[0];
    assert_eq!(first.timestamp, Some(60));
    assert_eq!(first.distance, Some(12.0));
    assert_eq!(first.defending_team.as_deref(), Some("H"));
    assert_eq!(first.on_ice_defenders, vec!["h1".to_string(), "h2".to_string()]);
    let angle = first.angle.expect("angle from coordinates");
    assert!((angle - 5f64.atan2(9.0).to_degrees()).abs() < 1e-9);

    let second = &game.shots[1];
    assert_eq!(second.defending_team.as_deref(), Some("A"));
    assert_eq!(second.on_ice_defenders, vec!["a1".to_string(), "a2".to_string()]);
    assert!((second.distance.unwrap() - 29f64.hypot(20.0)).abs() < 1e-9);
    assert_eq!(second.provider_xg, Some(0.07));
    assert_eq!(second.shot_type.as_deref(), Some("Slap Shot"));

    let third = &game.shots[2];
    assert!(third.distance.is_none());
}

#[test]
fn fixture_season_skips_bad_shot_and_excludes_one_sided_defenders() {
    let schedule = parse_schedule_json(&read_fixture("sportradar_schedule.json")).unwrap();
    let mut names = NameBook::default();
    let game =
        parse_pbp_json(&read_fixture("sportradar_pbp.json"), &schedule[0], &mut names).unwrap();
    let ratings = load_shooter_ratings(&fixture_path("shooter_ratings.json")).unwrap();
    assert_eq!(ratings.rejected().len(), 1);

    let season = aggregate_season(&[game], &ratings, &EngineConfig::default(), true);
    assert_eq!(season.report.shots_folded, 2);
    assert_eq!(season.report.shots_skipped, 1);
    assert_eq!(season.ledger.len(), 5);

    let h3 = season.aggregator.get("h3").unwrap();
    assert_eq!((h3.shots_on, h3.shots_off), (0, 1));
    assert_eq!(season.aggregator.exp_asv("h3", Bucket::On), None);

    // Every defender saw only one side of a single shot each.
    let report = compute_deltas(&season.aggregator, &names);
    assert!(report.rows.is_empty());
    assert_eq!(report.excluded, 5);
}

#[test]
fn null_pbp_is_an_empty_game() {
    let schedule = parse_schedule_json(&read_fixture("sportradar_schedule.json")).unwrap();
    let mut names = NameBook::default();
    let game = parse_pbp_json("null", &schedule[0], &mut names).unwrap();
    assert!(game.shots.is_empty());
    assert!(parse_pbp_json("{not json", &schedule[0], &mut names).is_err());
}
