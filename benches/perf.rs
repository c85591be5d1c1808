use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use defense_impact::delta::{compute_deltas, sort_by_delta_desc};
use defense_impact::engine::{EngineConfig, aggregate_season};
use defense_impact::names::NameBook;
use defense_impact::ratings::ShooterQualityTable;
use defense_impact::shot::ShotType;
use defense_impact::synthetic_feed::synthetic_season;
use defense_impact::xg::{XgModelConfig, estimate};

fn bench_estimate(c: &mut Criterion) {
    let cfg = XgModelConfig::default();
    c.bench_function("xg_estimate", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for d in 0..64 {
                for ty in ShotType::ALL {
                    acc += estimate(&cfg, black_box(d as f64), black_box(17.0), ty);
                }
            }
            black_box(acc);
        })
    });
}

fn bench_season(c: &mut Criterion) {
    let mut names = NameBook::default();
    let games = synthetic_season(2024, 400, &mut names);
    let ratings = ShooterQualityTable::neutral();
    let cfg = EngineConfig::default();

    c.bench_function("aggregate_season_400", |b| {
        b.iter(|| {
            let season = aggregate_season(black_box(&games), &ratings, &cfg, false);
            black_box(season.report.shots_folded);
        })
    });

    let season = aggregate_season(&games, &ratings, &cfg, false);
    c.bench_function("compute_deltas", |b| {
        b.iter(|| {
            let mut report = compute_deltas(black_box(&season.aggregator), &names);
            sort_by_delta_desc(&mut report.rows);
            black_box(report.rows.len());
        })
    });
}

criterion_group!(benches, bench_estimate, bench_season);
criterion_main!(benches);
