use std::path::PathBuf;

use anyhow::{Context, Result};

use defense_impact::delta::{compute_deltas, sort_by_delta_desc};
use defense_impact::ledger::{aggregate_ledger, read_ledger_file};
use defense_impact::names::{NameBook, load_names};
use defense_impact::logging;

const DEFAULT_LEDGER: &str = "nhl_defense_shot_data.csv";

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init()?;

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let path = arg_value(&args, "--ledger")
        .or_else(|| std::env::var("LEDGER_PATH").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LEDGER));
    let top = arg_value(&args, "--top")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(20);
    let names = match arg_value(&args, "--names").or_else(|| std::env::var("PLAYER_NAMES_PATH").ok())
    {
        Some(p) => load_names(&PathBuf::from(p))?,
        None => NameBook::default(),
    };

    let (rows, bad) =
        read_ledger_file(&path).with_context(|| format!("ledger {}", path.display()))?;
    let agg = aggregate_ledger(&rows);
    let mut report = compute_deltas(&agg, &names);
    sort_by_delta_desc(&mut report.rows);

    println!("Ledger: {} ({} rows, {} unreadable)", path.display(), rows.len(), bad);
    for row in report.rows.iter().take(top) {
        println!("{:<32} {:>+10.4}", row.player_name, row.delta_exp_asv);
    }
    if report.excluded > 0 {
        println!("Excluded (one-sided sample): {}", report.excluded);
    }
    Ok(())
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(v) = arg.strip_prefix(&prefix) {
            let v = v.trim();
            if !v.is_empty() {
                return Some(v.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
