use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::delta::ResultRow;

const HEADERS: [&str; 7] = [
    "player_id",
    "player_name",
    "expASV_on",
    "expASV_off",
    "delta_expASV",
    "shots_on",
    "shots_off",
];

/// Writes the table; `.xlsx` paths get a workbook, everything else CSV.
pub fn write_results(path: &Path, rows: &[ResultRow]) -> Result<()> {
    let is_xlsx = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
    if is_xlsx {
        write_results_xlsx(path, rows)
    } else {
        let file = std::fs::File::create(path)
            .with_context(|| format!("create results {}", path.display()))?;
        write_results_csv(file, rows)
    }
}

pub fn write_results_csv<W: Write>(out: W, rows: &[ResultRow]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(row).context("write result row")?;
    }
    writer.flush().context("flush results")?;
    Ok(())
}

pub fn write_results_xlsx(path: &Path, rows: &[ResultRow]) -> Result<()> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Delta expASV")?;
        write_sheet(sheet, rows)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(())
}

fn write_sheet(sheet: &mut Worksheet, rows: &[ResultRow]) -> Result<()> {
    for (col, h) in HEADERS.iter().enumerate() {
        sheet
            .write_string(0, col as u16, *h)
            .with_context(|| format!("write header {h}"))?;
    }
    for (idx, row) in rows.iter().enumerate() {
        let r = idx as u32 + 1;
        sheet.write_string(r, 0, &row.player_id)?;
        sheet.write_string(r, 1, &row.player_name)?;
        sheet.write_number(r, 2, row.exp_asv_on)?;
        sheet.write_number(r, 3, row.exp_asv_off)?;
        sheet.write_number(r, 4, row.delta_exp_asv)?;
        sheet.write_number(r, 5, row.shots_on as f64)?;
        sheet.write_number(r, 6, row.shots_off as f64)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_uses_published_column_names() {
        let rows = vec![ResultRow {
            player_id: "p1".into(),
            player_name: "Quinn Hughes".into(),
            exp_asv_on: 0.93,
            exp_asv_off: 0.91,
            delta_exp_asv: 0.02,
            shots_on: 40,
            shots_off: 60,
        }];
        let mut buf = Vec::new();
        write_results_csv(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, HEADERS.join(","));
        assert!(text.contains("Quinn Hughes"));
    }
}
