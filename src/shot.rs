use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type PlayerId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotType {
    Wrist,
    Slap,
    Backhand,
    Tip,
    Other,
}

impl ShotType {
    pub const ALL: [ShotType; 5] = [
        ShotType::Wrist,
        ShotType::Slap,
        ShotType::Backhand,
        ShotType::Tip,
        ShotType::Other,
    ];

    /// Maps a provider label onto the closed set. Anything unrecognised is `Other`.
    pub fn from_label(raw: &str) -> Self {
        let k = raw.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match k.as_str() {
            "wrist" | "wrist-shot" | "snap" | "snap-shot" => ShotType::Wrist,
            "slap" | "slap-shot" | "slapshot" => ShotType::Slap,
            "backhand" | "back-hand" => ShotType::Backhand,
            "tip" | "tip-in" | "tipped" | "deflection" | "deflected" | "tip/deflection" => {
                ShotType::Tip
            }
            _ => ShotType::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShotType::Wrist => "wrist",
            ShotType::Slap => "slap",
            ShotType::Backhand => "backhand",
            ShotType::Tip => "tip",
            ShotType::Other => "other",
        }
    }
}

// Goal lines sit 89 ft either side of centre ice.
const GOAL_LINE_X: f64 = 89.0;

/// Distance (ft) and angle (degrees off the straight-on lane) from centre-ice
/// rink coordinates to the nearer goal.
pub fn rink_geometry(x: f64, y: f64) -> (f64, f64) {
    let goal_x = if x >= 0.0 { GOAL_LINE_X } else { -GOAL_LINE_X };
    let dx = (goal_x - x).abs();
    let dy = y.abs();
    let distance = dx.hypot(dy);
    let angle = if distance == 0.0 {
        0.0
    } else {
        dy.atan2(dx).to_degrees()
    };
    (distance, angle)
}

/// Raw shot descriptor as handed over by a game-data source.
///
/// Every scoring field is optional here; `ShotRecord::into_event` decides
/// whether the descriptor is usable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShotRecord {
    pub game_id: String,
    #[serde(default)]
    pub period: u8,
    #[serde(default)]
    pub timestamp: Option<u32>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub angle: Option<f64>,
    #[serde(default)]
    pub shot_type: Option<String>,
    #[serde(default)]
    pub shooter_id: Option<PlayerId>,
    #[serde(default)]
    pub defending_team: Option<String>,
    #[serde(default)]
    pub on_ice_defenders: Vec<PlayerId>,
    #[serde(default)]
    pub provider_xg: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShotError {
    #[error("shot in game {game_id} has no distance")]
    MissingDistance { game_id: String },
    #[error("shot in game {game_id} has no angle")]
    MissingAngle { game_id: String },
    #[error("shot in game {game_id} has no shot type")]
    MissingShotType { game_id: String },
    #[error("shot in game {game_id} has no timestamp")]
    MissingTimestamp { game_id: String },
    #[error("shot in game {game_id} has non-finite {field}: {value}")]
    NonFinite {
        game_id: String,
        field: &'static str,
        value: f64,
    },
}

/// One validated shot attempt. Transient: built per provider event and
/// dropped once folded.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotEvent {
    pub game_id: String,
    pub period: u8,
    pub timestamp: u32,
    pub distance: f64,
    pub angle: f64,
    pub shot_type: ShotType,
    pub shooter_id: Option<PlayerId>,
    pub shooter_quality: f64,
    pub defending_team: Option<String>,
    pub on_ice_defenders: BTreeSet<PlayerId>,
    pub provider_xg: Option<f64>,
}

impl ShotRecord {
    /// Validates the descriptor. `shooter_quality` comes from the ratings table
    /// lookup done by the caller.
    pub fn into_event(self, shooter_quality: f64) -> Result<ShotEvent, ShotError> {
        let game_id = self.game_id;
        let Some(distance) = self.distance else {
            return Err(ShotError::MissingDistance { game_id });
        };
        let Some(angle) = self.angle else {
            return Err(ShotError::MissingAngle { game_id });
        };
        let Some(shot_type) = self.shot_type else {
            return Err(ShotError::MissingShotType { game_id });
        };
        let Some(timestamp) = self.timestamp else {
            return Err(ShotError::MissingTimestamp { game_id });
        };
        if !distance.is_finite() {
            return Err(ShotError::NonFinite {
                game_id,
                field: "distance",
                value: distance,
            });
        }
        if !angle.is_finite() {
            return Err(ShotError::NonFinite {
                game_id,
                field: "angle",
                value: angle,
            });
        }

        Ok(ShotEvent {
            game_id,
            period: self.period,
            timestamp,
            // Non-positive distances are point-blank.
            distance: distance.max(f64::MIN_POSITIVE),
            angle,
            shot_type: ShotType::from_label(&shot_type),
            shooter_id: self.shooter_id,
            shooter_quality,
            defending_team: self.defending_team,
            on_ice_defenders: self.on_ice_defenders.into_iter().collect(),
            provider_xg: self.provider_xg.filter(|v| v.is_finite()),
        })
    }
}
