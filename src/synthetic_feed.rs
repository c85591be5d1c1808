use std::collections::{BTreeSet, HashMap};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engine::GameShots;
use crate::names::NameBook;
use crate::shifts::PERIOD_LENGTH_SECONDS;
use crate::shot::{PlayerId, ShotRecord};

const TEAMS: usize = 8;
const SKATERS_PER_TEAM: usize = 10;
const SKATERS_ON_ICE: usize = 5;
const SHIFT_SECONDS: u32 = 45;
const SHOT_TYPES: [&str; 6] = ["wrist", "snap", "slap", "backhand", "tip-in", "wrap-around"];

/// Deterministic stand-in season for runs without provider credentials.
/// The same seed always yields the same games.
pub fn synthetic_season(seed: u64, games: usize, names: &mut NameBook) -> Vec<GameShots> {
    let mut rng = StdRng::seed_from_u64(seed);
    let teams: Vec<Vec<PlayerId>> = (0..TEAMS)
        .map(|t| {
            (0..SKATERS_PER_TEAM)
                .map(|p| {
                    let id = format!("syn-t{t}-p{p}");
                    names.insert(id.clone(), format!("Team {} Skater {}", t + 1, p + 1));
                    id
                })
                .collect()
        })
        .collect();

    (0..games)
        .map(|g| {
            let home = g % TEAMS;
            let away = (g + 1 + (g / TEAMS) % (TEAMS - 1)) % TEAMS;
            synthetic_game(&mut rng, g, (home, &teams[home]), (away, &teams[away]))
        })
        .collect()
}

fn synthetic_game(
    rng: &mut StdRng,
    index: usize,
    home: (usize, &[PlayerId]),
    away: (usize, &[PlayerId]),
) -> GameShots {
    let game_id = format!("syn-g{index:04}");
    let team_id = |t: usize| format!("syn-t{t}");
    let game_len = PERIOD_LENGTH_SECONDS * 3;

    let mut rosters = HashMap::new();
    rosters.insert(team_id(home.0), home.1.iter().cloned().collect::<BTreeSet<_>>());
    rosters.insert(team_id(away.0), away.1.iter().cloned().collect::<BTreeSet<_>>());

    let shot_count = rng.gen_range(45..75);
    let mut times: Vec<u32> = (0..shot_count).map(|_| rng.gen_range(1..game_len)).collect();
    times.sort_unstable();

    let shots = times
        .into_iter()
        .map(|t| {
            let home_shoots = rng.gen_bool(0.5);
            let (att, def) = if home_shoots { (home, away) } else { (away, home) };
            let line = on_ice_line(def.1, t);
            let shooter = &att.1[rng.gen_range(0..att.1.len())];
            ShotRecord {
                game_id: game_id.clone(),
                period: (t / PERIOD_LENGTH_SECONDS + 1) as u8,
                timestamp: Some(t),
                distance: Some(rng.gen_range(4.0..70.0)),
                angle: Some(rng.gen_range(-75.0..75.0)),
                shot_type: Some(SHOT_TYPES[rng.gen_range(0..SHOT_TYPES.len())].to_string()),
                shooter_id: Some(shooter.clone()),
                defending_team: Some(team_id(def.0)),
                on_ice_defenders: line,
                provider_xg: None,
            }
        })
        .collect();

    GameShots {
        game_id,
        rosters,
        shots,
    }
}

// Lines rotate through the roster every shift, so every skater sees time
// both on and off the ice.
fn on_ice_line(roster: &[PlayerId], t: u32) -> Vec<PlayerId> {
    let shift = (t / SHIFT_SECONDS) as usize;
    (0..SKATERS_ON_ICE)
        .map(|k| roster[(shift * SKATERS_ON_ICE / 2 + k) % roster.len()].clone())
        .collect()
}
