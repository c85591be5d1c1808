use anyhow::{Context, Result};
use tracing::{info, warn};

use defense_impact::config::AppConfig;
use defense_impact::delta::{compute_deltas, sort_by_delta_desc};
use defense_impact::engine::{EngineConfig, aggregate_season};
use defense_impact::names::{NameBook, load_names};
use defense_impact::partition::TrackedDefenders;
use defense_impact::ratings::{ShooterQualityTable, load_shooter_ratings};
use defense_impact::xg::{XgModelConfig, load_model_config};
use defense_impact::{export, ledger, logging, sportradar, synthetic_feed};

fn main() {
    dotenvy::dotenv().ok();
    if let Err(err) = logging::init() {
        eprintln!("error: {err}");
    }
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cfg = AppConfig::from_env()?;

    let model = match cfg.model_path.as_deref() {
        Some(path) => load_model_config(path)?,
        None => XgModelConfig::default(),
    };
    let ratings = match cfg.ratings_path.as_deref() {
        Some(path) => load_shooter_ratings(path)?,
        None => ShooterQualityTable::neutral(),
    };
    info!(
        shooters = ratings.len(),
        rejected = ratings.rejected().len(),
        "shooter ratings loaded"
    );
    if ratings.is_empty() {
        info!("no shooter ratings, every shooter counts at neutral quality");
    }

    let mut names = NameBook::default();
    let games = if cfg.api_key.is_some() {
        sportradar::fetch_season(&cfg, &mut names)?
    } else {
        warn!(
            games = cfg.synthetic_games,
            seed = cfg.synthetic_seed,
            "SPORTSRADAR_API_KEY not set, using synthetic season"
        );
        synthetic_feed::synthetic_season(cfg.synthetic_seed, cfg.synthetic_games, &mut names)
    };
    if let Some(path) = cfg.names_path.as_deref() {
        let mut explicit = load_names(path)?;
        explicit.extend_missing(names);
        names = explicit;
    }

    let tracked = match cfg.tracked_players.clone() {
        Some(ids) => TrackedDefenders::Only(ids.into_iter().collect()),
        None => TrackedDefenders::All,
    };
    let engine = EngineConfig {
        model,
        source: cfg.xg_source,
        tracked,
    };
    let season = aggregate_season(&games, &ratings, &engine, cfg.ledger_path.is_some());
    info!(
        games = season.report.games,
        shots = season.report.shots_folded,
        skipped = season.report.shots_skipped,
        on_rows = season.report.on_increments,
        off_rows = season.report.off_increments,
        defenders = season.aggregator.len(),
        "season aggregated"
    );
    if season.aggregator.is_empty() {
        warn!("no defender saw a shot, the result table will be empty");
    }

    if let Some(path) = cfg.ledger_path.as_deref() {
        ledger::write_ledger_file(path, &season.ledger)?;
        info!(rows = season.ledger.len(), path = %path.display(), "ledger written");
    }

    let mut report = compute_deltas(&season.aggregator, &names);
    sort_by_delta_desc(&mut report.rows);
    if report.excluded > 0 {
        warn!(
            excluded = report.excluded,
            "defenders without both on-ice and off-ice shots were left out"
        );
    }

    export::write_results(&cfg.output_path, &report.rows)
        .with_context(|| format!("export to {}", cfg.output_path.display()))?;
    info!(
        rows = report.rows.len(),
        path = %cfg.output_path.display(),
        "results written"
    );

    println!("{:<32} {:>10} {:>10} {:>10}", "player", "on", "off", "delta");
    for row in report.rows.iter().take(cfg.top_n) {
        println!(
            "{:<32} {:>10.4} {:>10.4} {:>+10.4}",
            row.player_name, row.exp_asv_on, row.exp_asv_off, row.delta_exp_asv
        );
    }
    println!(
        "{} defenders ranked, {} excluded for insufficient sample",
        report.rows.len(),
        report.excluded
    );
    Ok(())
}
