use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::shot::PlayerId;
use crate::weight::NEUTRAL_QUALITY;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RatingError {
    #[error("shooter {shooter_id}: negative quality {value}")]
    Negative { shooter_id: String, value: f64 },
    #[error("shooter {shooter_id}: non-numeric quality {raw}")]
    NonNumeric { shooter_id: String, raw: String },
}

/// Shooter id -> quality weight. Missing shooters rate as neutral.
#[derive(Debug, Clone, Default)]
pub struct ShooterQualityTable {
    by_id: HashMap<PlayerId, f64>,
    rejected: Vec<RatingError>,
}

impl ShooterQualityTable {
    pub fn neutral() -> Self {
        Self::default()
    }

    /// Builds the table from already-typed ratings. Invalid entries are dropped
    /// (so they rate neutral) and recorded.
    pub fn from_ratings<I>(ratings: I) -> Self
    where
        I: IntoIterator<Item = (PlayerId, f64)>,
    {
        let mut table = Self::default();
        for (id, q) in ratings {
            table.insert_checked(id, q);
        }
        table
    }

    /// Accepts the raw JSON shape `{ "<shooter id>": <quality>, ... }`. Numeric
    /// strings are accepted; anything else is rejected per entry.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let v: Value = serde_json::from_str(raw.trim()).context("invalid ratings json")?;
        let Some(obj) = v.as_object() else {
            anyhow::bail!("ratings json must be an object keyed by shooter id");
        };
        let mut table = Self::default();
        for (id, val) in obj {
            let parsed = match val {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            match parsed.filter(|q| q.is_finite()) {
                Some(q) => table.insert_checked(id.clone(), q),
                None => table.reject(RatingError::NonNumeric {
                    shooter_id: id.clone(),
                    raw: val.to_string(),
                }),
            }
        }
        Ok(table)
    }

    pub fn quality_for(&self, shooter_id: Option<&str>) -> f64 {
        shooter_id
            .and_then(|id| self.by_id.get(id))
            .copied()
            .unwrap_or(NEUTRAL_QUALITY)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn rejected(&self) -> &[RatingError] {
        &self.rejected
    }

    fn insert_checked(&mut self, id: PlayerId, q: f64) {
        if !q.is_finite() {
            self.reject(RatingError::NonNumeric {
                shooter_id: id,
                raw: q.to_string(),
            });
        } else if q < 0.0 {
            self.reject(RatingError::Negative {
                shooter_id: id,
                value: q,
            });
        } else {
            self.by_id.insert(id, q);
        }
    }

    fn reject(&mut self, err: RatingError) {
        warn!(error = %err, "shooter rating rejected, using neutral quality");
        self.rejected.push(err);
    }
}

pub fn load_shooter_ratings(path: &Path) -> Result<ShooterQualityTable> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read shooter ratings {}", path.display()))?;
    ShooterQualityTable::from_json_str(&raw)
        .with_context(|| format!("parse shooter ratings {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_ratings_fall_back_to_neutral() {
        let table = ShooterQualityTable::from_json_str(
            r#"{"a": 1.4, "b": -0.5, "c": "oops", "d": "0.7", "e": null}"#,
        )
        .unwrap();
        assert_eq!(table.quality_for(Some("a")), 1.4);
        assert_eq!(table.quality_for(Some("b")), NEUTRAL_QUALITY);
        assert_eq!(table.quality_for(Some("c")), NEUTRAL_QUALITY);
        assert_eq!(table.quality_for(Some("d")), 0.7);
        assert_eq!(table.quality_for(Some("e")), NEUTRAL_QUALITY);
        assert_eq!(table.quality_for(Some("unknown")), NEUTRAL_QUALITY);
        assert_eq!(table.quality_for(None), NEUTRAL_QUALITY);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rejected().len(), 3);
    }

    #[test]
    fn zero_quality_is_valid() {
        let table = ShooterQualityTable::from_ratings([("z".to_string(), 0.0)]);
        assert_eq!(table.quality_for(Some("z")), 0.0);
        assert!(table.rejected().is_empty());
    }

    #[test]
    fn infinite_quality_is_rejected() {
        let table = ShooterQualityTable::from_ratings([
            ("hot".to_string(), f64::INFINITY),
            ("cold".to_string(), f64::NEG_INFINITY),
            ("ok".to_string(), 1.1),
        ]);
        assert_eq!(table.quality_for(Some("hot")), NEUTRAL_QUALITY);
        assert_eq!(table.quality_for(Some("cold")), NEUTRAL_QUALITY);
        assert_eq!(table.len(), 1);
        assert!(matches!(
            table.rejected(),
            [RatingError::NonNumeric { .. }, RatingError::NonNumeric { .. }]
        ));
        assert!(ShooterQualityTable::neutral().is_empty());
    }

    #[test]
    fn non_object_json_is_an_error() {
        assert!(ShooterQualityTable::from_json_str("[1, 2]").is_err());
    }
}
