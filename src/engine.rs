use std::collections::{BTreeSet, HashMap};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::aggregate::{Aggregator, Bucket};
use crate::ledger::LedgerRow;
use crate::partition::{TrackedDefenders, partition};
use crate::ratings::ShooterQualityTable;
use crate::shot::{PlayerId, ShotRecord};
use crate::weight::weight;
use crate::xg::{XgModelConfig, XgSource, estimate_event};

/// One game's shot stream plus each side's dressed roster. An empty `shots`
/// list is how a failed fetch shows up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameShots {
    pub game_id: String,
    #[serde(default)]
    pub rosters: HashMap<String, BTreeSet<PlayerId>>,
    #[serde(default)]
    pub shots: Vec<ShotRecord>,
}

impl GameShots {
    pub fn empty(game_id: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            ..Default::default()
        }
    }
}

/// Immutable per-run settings for the scoring core.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub model: XgModelConfig,
    pub source: XgSource,
    pub tracked: TrackedDefenders,
}

#[derive(Debug, Clone, Default)]
pub struct FoldReport {
    pub games: usize,
    pub shots_folded: usize,
    pub shots_skipped: usize,
    pub on_increments: u64,
    pub off_increments: u64,
    pub warnings: Vec<String>,
}

impl FoldReport {
    pub fn absorb(mut self, other: FoldReport) -> FoldReport {
        self.games += other.games;
        self.shots_folded += other.shots_folded;
        self.shots_skipped += other.shots_skipped;
        self.on_increments += other.on_increments;
        self.off_increments += other.off_increments;
        self.warnings.extend(other.warnings);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct SeasonAggregate {
    pub aggregator: Aggregator,
    pub report: FoldReport,
    pub ledger: Vec<LedgerRow>,
}

/// Folds one game's shots, in game-time order, into `agg`. `on_increment`
/// sees every on/off increment as it happens.
pub fn fold_game_with<F>(
    game: &GameShots,
    ratings: &ShooterQualityTable,
    cfg: &EngineConfig,
    agg: &mut Aggregator,
    mut on_increment: F,
) -> FoldReport
where
    F: FnMut(LedgerRow),
{
    let mut report = FoldReport {
        games: 1,
        ..Default::default()
    };
    let empty = BTreeSet::new();

    let mut ordered: Vec<&ShotRecord> = game.shots.iter().collect();
    ordered.sort_by_key(|r| r.timestamp.unwrap_or(u32::MAX));

    for record in ordered {
        let quality = ratings.quality_for(record.shooter_id.as_deref());
        let event = match record.clone().into_event(quality) {
            Ok(ev) => ev,
            Err(err) => {
                warn!(game_id = %game.game_id, error = %err, "skipping malformed shot");
                report.warnings.push(err.to_string());
                report.shots_skipped += 1;
                continue;
            }
        };

        let xg = estimate_event(&cfg.model, cfg.source, &event);
        let adjusted = weight(xg, event.shooter_quality);
        let universe = event
            .defending_team
            .as_deref()
            .and_then(|team| game.rosters.get(team))
            .unwrap_or(&empty);

        for (pid, bucket) in partition(&event.on_ice_defenders, universe, &cfg.tracked) {
            agg.fold(pid, adjusted, bucket);
            match bucket {
                Bucket::On => report.on_increments += 1,
                Bucket::Off => report.off_increments += 1,
            }
            on_increment(LedgerRow {
                game_id: event.game_id.clone(),
                period: event.period,
                clock_seconds: event.timestamp,
                player_id: pid.to_string(),
                on_off: bucket,
                adjusted_xg: adjusted,
            });
        }
        debug!(
            game_id = %game.game_id,
            t = event.timestamp,
            xg,
            adjusted,
            shot_type = event.shot_type.label(),
            "shot folded"
        );
        report.shots_folded += 1;
    }

    info!(
        game_id = %game.game_id,
        shots = report.shots_folded,
        skipped = report.shots_skipped,
        rows = report.on_increments + report.off_increments,
        "game folded"
    );
    report
}

pub fn fold_game(
    game: &GameShots,
    ratings: &ShooterQualityTable,
    cfg: &EngineConfig,
    agg: &mut Aggregator,
) -> FoldReport {
    fold_game_with(game, ratings, cfg, agg, |_| {})
}

/// Aggregates every game independently and sums the partials. Games are
/// independent, so the merged totals equal a sequential pass.
pub fn aggregate_season(
    games: &[GameShots],
    ratings: &ShooterQualityTable,
    cfg: &EngineConfig,
    keep_ledger: bool,
) -> SeasonAggregate {
    let partials: Vec<SeasonAggregate> = games
        .par_iter()
        .map(|game| {
            let mut aggregator = Aggregator::new();
            let mut ledger = Vec::new();
            let report = fold_game_with(game, ratings, cfg, &mut aggregator, |row| {
                if keep_ledger {
                    ledger.push(row);
                }
            });
            SeasonAggregate {
                aggregator,
                report,
                ledger,
            }
        })
        .collect();

    // Summed in game order so float totals do not depend on thread scheduling.
    partials
        .into_iter()
        .fold(SeasonAggregate::default(), |mut acc, part| {
            acc.ledger.extend(part.ledger);
            SeasonAggregate {
                aggregator: acc.aggregator.merge(part.aggregator),
                report: acc.report.absorb(part.report),
                ledger: acc.ledger,
            }
        })
}
