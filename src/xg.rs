use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::shot::{ShotEvent, ShotType};

// Shots beyond this distance (ft) carry no distance-driven danger.
const MAX_DANGEROUS_DISTANCE: f64 = 60.0;
const MIN_ANGLE_FACTOR: f64 = 0.1;
const MIN_XG: f64 = 0.01;
const MAX_XG: f64 = 0.95;

const TIP_MULTIPLIER: f64 = 1.3;
const WRIST_MULTIPLIER: f64 = 1.1;
const OTHER_MULTIPLIER: f64 = 1.0;
const BACKHAND_MULTIPLIER: f64 = 0.9;
const SLAP_MULTIPLIER: f64 = 0.8;

/// Fixed parameters of the parametric shot model.
///
/// Not fitted from data. The defaults are a reconstruction and stay stable
/// across runs so results are reproducible; override them with a JSON file
/// (see `load_model_config`) rather than editing the scoring code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XgModelConfig {
    pub max_dangerous_distance: f64,
    pub min_angle_factor: f64,
    pub min_xg: f64,
    pub max_xg: f64,
    pub type_multipliers: TypeMultipliers,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeMultipliers {
    pub wrist: f64,
    pub slap: f64,
    pub backhand: f64,
    pub tip: f64,
    pub other: f64,
}

impl Default for TypeMultipliers {
    fn default() -> Self {
        Self {
            wrist: WRIST_MULTIPLIER,
            slap: SLAP_MULTIPLIER,
            backhand: BACKHAND_MULTIPLIER,
            tip: TIP_MULTIPLIER,
            other: OTHER_MULTIPLIER,
        }
    }
}

impl TypeMultipliers {
    pub fn get(&self, shot_type: ShotType) -> f64 {
        match shot_type {
            ShotType::Wrist => self.wrist,
            ShotType::Slap => self.slap,
            ShotType::Backhand => self.backhand,
            ShotType::Tip => self.tip,
            ShotType::Other => self.other,
        }
    }
}

impl XgModelConfig {
    /// Rejects parameter sets that would make `estimate` panic or leave the
    /// unit interval.
    pub fn validate(&self) -> Result<()> {
        if !(self.max_dangerous_distance.is_finite() && self.max_dangerous_distance > 0.0) {
            bail!(
                "max_dangerous_distance must be positive (got {})",
                self.max_dangerous_distance
            );
        }
        if !(0.0..=1.0).contains(&self.min_angle_factor) {
            bail!(
                "min_angle_factor must lie in [0, 1] (got {})",
                self.min_angle_factor
            );
        }
        if !(0.0..=1.0).contains(&self.min_xg) || !(self.min_xg..=1.0).contains(&self.max_xg) {
            bail!(
                "xg clamps must satisfy 0 <= min_xg <= max_xg <= 1 (got {} / {})",
                self.min_xg,
                self.max_xg
            );
        }
        for ty in ShotType::ALL {
            let m = self.type_multipliers.get(ty);
            if !(m.is_finite() && m >= 0.0) {
                bail!("{} multiplier must be finite and non-negative (got {m})", ty.label());
            }
        }
        Ok(())
    }
}

impl Default for XgModelConfig {
    fn default() -> Self {
        Self {
            max_dangerous_distance: MAX_DANGEROUS_DISTANCE,
            min_angle_factor: MIN_ANGLE_FACTOR,
            min_xg: MIN_XG,
            max_xg: MAX_XG,
            type_multipliers: TypeMultipliers::default(),
        }
    }
}

/// Where a shot's goal probability comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XgSource {
    /// Parametric distance/angle/type model.
    #[default]
    Model,
    /// Provider-supplied xG when present, model otherwise.
    Provider,
    /// Coarse distance buckets, no angle or type.
    Buckets,
}

impl XgSource {
    pub fn from_label(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "model" | "parametric" => Some(XgSource::Model),
            "provider" | "api" => Some(XgSource::Provider),
            "buckets" | "bucket" | "distance" => Some(XgSource::Buckets),
            _ => None,
        }
    }
}

pub fn estimate(cfg: &XgModelConfig, distance: f64, angle: f64, shot_type: ShotType) -> f64 {
    let distance = if distance > 0.0 {
        distance
    } else {
        f64::MIN_POSITIVE
    };
    let cutoff = cfg.max_dangerous_distance.max(f64::MIN_POSITIVE);
    let base = (1.0 - distance / cutoff).clamp(0.0, 1.0);
    let angle_factor = (1.0 - angle.abs() / 90.0).clamp(cfg.min_angle_factor, 1.0);
    let raw = base * angle_factor * cfg.type_multipliers.get(shot_type);
    clamp_xg(cfg, raw)
}

pub fn estimate_event(cfg: &XgModelConfig, source: XgSource, event: &ShotEvent) -> f64 {
    match source {
        XgSource::Model => estimate(cfg, event.distance, event.angle, event.shot_type),
        XgSource::Provider => match event.provider_xg {
            Some(xg) => xg.clamp(0.0, 1.0),
            None => estimate(cfg, event.distance, event.angle, event.shot_type),
        },
        XgSource::Buckets => distance_bucket_xg(event.distance),
    }
}

pub fn distance_bucket_xg(distance: f64) -> f64 {
    if distance <= 10.0 {
        0.20
    } else if distance <= 20.0 {
        0.12
    } else if distance <= 30.0 {
        0.08
    } else if distance <= 40.0 {
        0.04
    } else {
        0.02
    }
}

pub fn load_model_config(path: &Path) -> Result<XgModelConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read xg model config {}", path.display()))?;
    let cfg = serde_json::from_str::<XgModelConfig>(&raw)
        .with_context(|| format!("parse xg model config {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid xg model config {}", path.display()))?;
    Ok(cfg)
}

fn clamp_xg(cfg: &XgModelConfig, raw: f64) -> f64 {
    raw.clamp(cfg.min_xg, cfg.max_xg)
}
