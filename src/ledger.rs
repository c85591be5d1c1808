use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::aggregate::{Aggregator, Bucket};

/// One fanned-out increment: a single shot credited to one defender's bucket.
/// `adjusted_xg` is the shooter-quality-weighted value that was folded, not
/// the raw model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub game_id: String,
    pub period: u8,
    pub clock_seconds: u32,
    pub player_id: String,
    pub on_off: Bucket,
    pub adjusted_xg: f64,
}

pub fn write_ledger<W: Write>(out: W, rows: &[LedgerRow]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(row).context("write ledger row")?;
    }
    writer.flush().context("flush ledger")?;
    Ok(())
}

pub fn write_ledger_file(path: &Path, rows: &[LedgerRow]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("create ledger {}", path.display()))?;
    write_ledger(file, rows)
}

/// Reads ledger rows, skipping (and logging) rows that do not parse.
pub fn read_ledger<R: Read>(input: R) -> Result<(Vec<LedgerRow>, usize)> {
    let mut reader = csv::Reader::from_reader(input);
    let mut rows = Vec::new();
    let mut bad = 0usize;
    for (idx, rec) in reader.deserialize::<LedgerRow>().enumerate() {
        match rec {
            Ok(row) if row.adjusted_xg.is_finite() => rows.push(row),
            Ok(row) => {
                bad += 1;
                warn!(
                    line = idx + 2,
                    adjusted_xg = row.adjusted_xg,
                    "ledger row has non-finite xg"
                );
            }
            Err(err) => {
                bad += 1;
                warn!(line = idx + 2, error = %err, "unreadable ledger row");
            }
        }
    }
    Ok((rows, bad))
}

pub fn read_ledger_file(path: &Path) -> Result<(Vec<LedgerRow>, usize)> {
    let file =
        std::fs::File::open(path).with_context(|| format!("open ledger {}", path.display()))?;
    read_ledger(file)
}

pub fn aggregate_ledger(rows: &[LedgerRow]) -> Aggregator {
    let mut agg = Aggregator::new();
    for row in rows {
        agg.fold(&row.player_id, row.adjusted_xg, row.on_off);
    }
    agg
}
