use std::env;
use std::path::PathBuf;

use anyhow::{Result, bail};

use crate::xg::XgSource;

const DEFAULT_BASE_URL: &str = "https://api.sportradar.us/nhl/production/v7/en";
const DEFAULT_SEASON: &str = "2024";
const DEFAULT_SEASON_TYPE: &str = "REG";
const DEFAULT_OUTPUT: &str = "defense_delta_expasv.csv";

/// Run settings read once at start-up. Everything downstream receives these
/// values explicitly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub season: String,
    pub season_type: String,
    pub game_limit: Option<usize>,
    pub max_requests_per_second: u32,
    pub ratings_path: Option<PathBuf>,
    pub names_path: Option<PathBuf>,
    pub model_path: Option<PathBuf>,
    pub xg_source: XgSource,
    pub output_path: PathBuf,
    pub ledger_path: Option<PathBuf>,
    pub synthetic_games: usize,
    pub synthetic_seed: u64,
    pub top_n: usize,
    /// Restricts output to these player ids; `None` ranks every defender.
    pub tracked_players: Option<Vec<String>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            season: DEFAULT_SEASON.to_string(),
            season_type: DEFAULT_SEASON_TYPE.to_string(),
            game_limit: None,
            max_requests_per_second: 10,
            ratings_path: None,
            names_path: None,
            model_path: None,
            xg_source: XgSource::Model,
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            ledger_path: None,
            synthetic_games: 40,
            synthetic_seed: 2024,
            top_n: 20,
            tracked_players: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env` but with an injectable lookup, for tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let d = AppConfig::default();

        let xg_source = match get("XG_SOURCE") {
            Some(raw) => match XgSource::from_label(&raw) {
                Some(src) => src,
                None => bail!("XG_SOURCE must be model, provider or buckets (got {raw})"),
            },
            None => d.xg_source,
        };

        Ok(Self {
            api_key: get("SPORTSRADAR_API_KEY"),
            base_url: get("SPORTSRADAR_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(d.base_url),
            season: get("NHL_SEASON").unwrap_or(d.season),
            season_type: get("NHL_SEASON_TYPE")
                .map(|s| s.to_ascii_uppercase())
                .unwrap_or(d.season_type),
            game_limit: get("GAME_LIMIT").and_then(|v| v.parse::<usize>().ok()),
            max_requests_per_second: get("MAX_REQUESTS_PER_SECOND")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(d.max_requests_per_second)
                .max(1),
            ratings_path: get("SHOOTER_RATINGS_PATH").map(PathBuf::from),
            names_path: get("PLAYER_NAMES_PATH").map(PathBuf::from),
            model_path: get("XG_MODEL_PATH").map(PathBuf::from),
            xg_source,
            output_path: get("OUTPUT_PATH").map(PathBuf::from).unwrap_or(d.output_path),
            ledger_path: get("LEDGER_PATH").map(PathBuf::from),
            synthetic_games: get("SYNTHETIC_GAMES")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(d.synthetic_games)
                .max(1),
            synthetic_seed: get("SYNTHETIC_SEED")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(d.synthetic_seed),
            top_n: get("TOP_N")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(d.top_n),
            tracked_players: get("TRACKED_PLAYERS").map(|raw| {
                raw.split(',')
                    .map(|id| id.trim().to_string())
                    .filter(|id| !id.is_empty())
                    .collect()
            }),
        })
    }
}
