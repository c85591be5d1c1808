use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::shot::PlayerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    On,
    Off,
}

impl Bucket {
    pub fn label(self) -> &'static str {
        match self {
            Bucket::On => "on",
            Bucket::Off => "off",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerAccumulator {
    pub weighted_xg_on: f64,
    pub shots_on: u64,
    pub weighted_xg_off: f64,
    pub shots_off: u64,
}

impl PlayerAccumulator {
    pub fn add(&mut self, adjusted_xg: f64, bucket: Bucket) {
        match bucket {
            Bucket::On => {
                self.weighted_xg_on += adjusted_xg;
                self.shots_on += 1;
            }
            Bucket::Off => {
                self.weighted_xg_off += adjusted_xg;
                self.shots_off += 1;
            }
        }
    }

    pub fn merge(&mut self, other: &PlayerAccumulator) {
        self.weighted_xg_on += other.weighted_xg_on;
        self.shots_on += other.shots_on;
        self.weighted_xg_off += other.weighted_xg_off;
        self.shots_off += other.shots_off;
    }

    /// `1 - mean adjusted xG faced`, or `None` when the bucket saw no shots.
    pub fn exp_asv(&self, bucket: Bucket) -> Option<f64> {
        let (xg, shots) = match bucket {
            Bucket::On => (self.weighted_xg_on, self.shots_on),
            Bucket::Off => (self.weighted_xg_off, self.shots_off),
        };
        if shots == 0 {
            return None;
        }
        Some(1.0 - xg / shots as f64)
    }
}

/// Per-defender running totals for one run.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    players: HashMap<PlayerId, PlayerAccumulator>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold(&mut self, player_id: &str, adjusted_xg: f64, bucket: Bucket) {
        if let Some(acc) = self.players.get_mut(player_id) {
            acc.add(adjusted_xg, bucket);
            return;
        }
        let mut acc = PlayerAccumulator::default();
        acc.add(adjusted_xg, bucket);
        self.players.insert(player_id.to_string(), acc);
    }

    /// Sums another partial aggregation into this one. Folding is plain
    /// addition, so partials from disjoint game sets merge exactly.
    pub fn merge(mut self, other: Aggregator) -> Aggregator {
        for (id, acc) in other.players {
            self.players.entry(id).or_default().merge(&acc);
        }
        self
    }

    pub fn get(&self, player_id: &str) -> Option<&PlayerAccumulator> {
        self.players.get(player_id)
    }

    pub fn exp_asv(&self, player_id: &str, bucket: Bucket) -> Option<f64> {
        self.get(player_id).and_then(|acc| acc.exp_asv(bucket))
    }

    pub fn players(&self) -> impl Iterator<Item = (&PlayerId, &PlayerAccumulator)> {
        self.players.iter()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
