use std::collections::HashMap;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::engine::GameShots;
use crate::http_cache::get_json_cached;
use crate::http_client::http_client;
use crate::names::NameBook;
use crate::shifts::{GameShifts, Substitution, clock_to_seconds};
use crate::shot::{ShotRecord, rink_geometry};

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledGame {
    pub id: String,
    pub status: String,
    pub home_id: String,
    pub away_id: String,
}

impl ScheduledGame {
    pub fn is_final(&self) -> bool {
        matches!(self.status.as_str(), "closed" | "complete" | "")
    }
}

/// Spaces requests so the provider's per-second quota is respected.
#[derive(Debug)]
pub struct Throttle {
    min_gap: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn per_second(max: u32) -> Self {
        Self {
            min_gap: Duration::from_secs_f64(1.0 / max.max(1) as f64),
            last: None,
        }
    }

    pub fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.min_gap {
                thread::sleep(self.min_gap - elapsed);
            }
        }
        self.last = Some(Instant::now());
    }
}

pub fn fetch_schedule(cfg: &AppConfig, throttle: &mut Throttle) -> Result<Vec<ScheduledGame>> {
    let key = cfg
        .api_key
        .as_deref()
        .context("SPORTSRADAR_API_KEY is not set")?;
    let url = format!(
        "{}/games/{}/{}/schedule.json",
        cfg.base_url, cfg.season, cfg.season_type
    );
    info!(season = %cfg.season, season_type = %cfg.season_type, "fetching schedule");
    throttle.wait();
    let body = get_json_cached(http_client()?, &url, &[(API_KEY_HEADER, key)])
        .context("schedule request failed")?;
    let games = parse_schedule_json(&body)?;
    info!(games = games.len(), "schedule retrieved");
    Ok(games)
}

pub fn fetch_game_pbp(cfg: &AppConfig, game_id: &str, throttle: &mut Throttle) -> Result<String> {
    let key = cfg
        .api_key
        .as_deref()
        .context("SPORTSRADAR_API_KEY is not set")?;
    let url = format!("{}/games/{}/pbp.json", cfg.base_url, game_id);
    throttle.wait();
    get_json_cached(http_client()?, &url, &[(API_KEY_HEADER, key)])
        .with_context(|| format!("pbp request failed for {game_id}"))
}

/// Fetches every final game of the configured season. A game whose
/// play-by-play cannot be fetched or parsed contributes an empty stream.
pub fn fetch_season(cfg: &AppConfig, names: &mut NameBook) -> Result<Vec<GameShots>> {
    let mut throttle = Throttle::per_second(cfg.max_requests_per_second);
    let mut schedule: Vec<ScheduledGame> = fetch_schedule(cfg, &mut throttle)?
        .into_iter()
        .filter(ScheduledGame::is_final)
        .collect();
    if let Some(limit) = cfg.game_limit {
        info!(limit, "limiting games");
        schedule.truncate(limit);
    }

    let mut out = Vec::with_capacity(schedule.len());
    for game in &schedule {
        info!(game_id = %game.id, "processing game");
        let parsed = fetch_game_pbp(cfg, &game.id, &mut throttle)
            .and_then(|raw| parse_pbp_json(&raw, game, names));
        match parsed {
            Ok(shots) => out.push(shots),
            Err(err) => {
                warn!(game_id = %game.id, error = %err, "no data for game");
                out.push(GameShots::empty(game.id.clone()));
            }
        }
    }
    Ok(out)
}

pub fn parse_schedule_json(raw: &str) -> Result<Vec<ScheduledGame>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let v: Value = serde_json::from_str(trimmed).context("invalid schedule json")?;
    let Some(arr) = v.get("games").and_then(|g| g.as_array()) else {
        return Ok(Vec::new());
    };
    Ok(arr.iter().filter_map(parse_scheduled_game).collect())
}

fn parse_scheduled_game(v: &Value) -> Option<ScheduledGame> {
    Some(ScheduledGame {
        id: str_field(v, "id")?,
        status: str_field(v, "status").unwrap_or_default(),
        home_id: v.get("home").and_then(|h| str_field(h, "id"))?,
        away_id: v.get("away").and_then(|a| str_field(a, "id"))?,
    })
}

struct FlatEvent<'a> {
    period: u8,
    time: Option<u32>,
    raw: &'a Value,
}

/// Turns one game's play-by-play into shot records with the defending side's
/// on-ice set attached. Player names seen along the way go into `names`.
pub fn parse_pbp_json(raw: &str, game: &ScheduledGame, names: &mut NameBook) -> Result<GameShots> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(GameShots::empty(game.id.clone()));
    }
    let v: Value = serde_json::from_str(trimmed).context("invalid pbp json")?;

    let mut events = Vec::new();
    for period in v.get("periods").and_then(|p| p.as_array()).into_iter().flatten() {
        let number = period
            .get("number")
            .and_then(|n| n.as_u64())
            .unwrap_or(0)
            .min(u8::MAX as u64) as u8;
        for ev in period.get("events").and_then(|e| e.as_array()).into_iter().flatten() {
            let clock = ev
                .get("clock_decimal")
                .or_else(|| ev.get("clock"))
                .and_then(|c| c.as_str());
            events.push(FlatEvent {
                period: number,
                time: clock.and_then(|c| clock_to_seconds(c, number)),
                raw: ev,
            });
        }
    }

    let mut subs = Vec::new();
    for ev in &events {
        if ev.raw.get("event_type").and_then(|t| t.as_str()) != Some("substitution") {
            continue;
        }
        let (Some(time), Some(team_id)) = (
            ev.time,
            ev.raw.get("attribution").and_then(|a| str_field(a, "id")),
        ) else {
            continue;
        };
        let mut players = Vec::new();
        for p in ev.raw.get("players").and_then(|p| p.as_array()).into_iter().flatten() {
            if let Some(id) = str_field(p, "id") {
                if let Some(name) = str_field(p, "full_name") {
                    names.insert(id.clone(), name);
                }
                players.push(id);
            }
        }
        subs.push(Substitution {
            time,
            team_id,
            players,
        });
    }

    let final_time = events.iter().filter_map(|e| e.time).max().unwrap_or(0);
    let shifts = GameShifts::from_substitutions(&subs, final_time);

    let mut shots = Vec::new();
    for ev in &events {
        for stat in ev.raw.get("statistics").and_then(|s| s.as_array()).into_iter().flatten() {
            if stat.get("type").and_then(|t| t.as_str()) != Some("shot") {
                continue;
            }
            let attacking = stat.get("team").and_then(|t| str_field(t, "id"));
            let defending = match attacking.as_deref() {
                Some(id) if id == game.home_id => Some(game.away_id.clone()),
                Some(id) if id == game.away_id => Some(game.home_id.clone()),
                _ => None,
            };
            let shooter = stat.get("player").and_then(|p| {
                let id = str_field(p, "id")?;
                if let Some(name) = str_field(p, "full_name") {
                    names.insert(id.clone(), name);
                }
                Some(id)
            });

            let details = ev.raw.get("details");
            let coords = ev.raw.get("location").and_then(|loc| {
                Some((num_field(loc, "coord_x")?, num_field(loc, "coord_y")?))
            });
            let geometry = coords.map(|(x, y)| rink_geometry(x, y));
            let distance = details
                .and_then(|d| num_field(d, "distance"))
                .or(geometry.map(|g| g.0));
            let angle = details
                .and_then(|d| num_field(d, "angle"))
                .or(geometry.map(|g| g.1));
            let shot_type = details
                .and_then(|d| str_field(d, "shot_type"))
                .or_else(|| str_field(stat, "shot_type"));

            let on_ice = match (defending.as_deref(), ev.time) {
                (Some(team), Some(t)) => shifts.on_ice_at(team, t).into_iter().collect(),
                _ => Vec::new(),
            };

            shots.push(ShotRecord {
                game_id: game.id.clone(),
                period: ev.period,
                timestamp: ev.time,
                distance,
                angle,
                shot_type,
                shooter_id: shooter,
                defending_team: defending,
                on_ice_defenders: on_ice,
                provider_xg: num_field(ev.raw, "expected_goals"),
            });
        }
    }

    let rosters: HashMap<_, _> = shifts
        .teams()
        .filter_map(|team| Some((team.clone(), shifts.roster(team)?.clone())))
        .collect();

    Ok(GameShots {
        game_id: game.id.clone(),
        rosters,
        shots,
    })
}

fn str_field(v: &Value, key: &str) -> Option<String> {
    match v.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn num_field(v: &Value, key: &str) -> Option<f64> {
    match v.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
