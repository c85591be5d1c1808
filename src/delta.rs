use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregator, Bucket};
use crate::names::NameBook;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub player_id: String,
    pub player_name: String,
    #[serde(rename = "expASV_on")]
    pub exp_asv_on: f64,
    #[serde(rename = "expASV_off")]
    pub exp_asv_off: f64,
    #[serde(rename = "delta_expASV")]
    pub delta_exp_asv: f64,
    pub shots_on: u64,
    pub shots_off: u64,
}

#[derive(Debug, Clone, Default)]
pub struct DeltaReport {
    pub rows: Vec<ResultRow>,
    /// Defenders dropped because one side had no shots.
    pub excluded: usize,
    pub excluded_ids: Vec<String>,
}

/// One row per defender with both sides defined. Rows come out sorted by id
/// so output order is stable across runs; use `sort_by_delta_desc` for ranking.
pub fn compute_deltas(agg: &Aggregator, names: &NameBook) -> DeltaReport {
    let mut report = DeltaReport::default();
    for (id, acc) in agg.players() {
        match (acc.exp_asv(Bucket::On), acc.exp_asv(Bucket::Off)) {
            (Some(on), Some(off)) => report.rows.push(ResultRow {
                player_id: id.clone(),
                player_name: names.label(id).to_string(),
                exp_asv_on: on,
                exp_asv_off: off,
                delta_exp_asv: on - off,
                shots_on: acc.shots_on,
                shots_off: acc.shots_off,
            }),
            _ => {
                report.excluded += 1;
                report.excluded_ids.push(id.clone());
            }
        }
    }
    report.rows.sort_by(|a, b| a.player_id.cmp(&b.player_id));
    report.excluded_ids.sort();
    report
}

/// Best defensive impact first; ties broken by id.
pub fn sort_by_delta_desc(rows: &mut [ResultRow]) {
    rows.sort_by(|a, b| {
        b.delta_exp_asv
            .partial_cmp(&a.delta_exp_asv)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.player_id.cmp(&b.player_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_sided_defenders_are_counted_not_emitted() {
        let mut agg = Aggregator::new();
        agg.fold("both", 0.1, Bucket::On);
        agg.fold("both", 0.3, Bucket::Off);
        agg.fold("only_on", 0.2, Bucket::On);
        agg.fold("only_off", 0.2, Bucket::Off);

        let report = compute_deltas(&agg, &NameBook::default());
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.excluded, 2);
        assert_eq!(report.excluded_ids, vec!["only_off", "only_on"]);
        let row = &report.rows[0];
        assert!((row.delta_exp_asv - 0.2).abs() < 1e-12);
        assert_eq!(row.player_name, "both");
    }

    #[test]
    fn sort_puts_best_delta_first() {
        let mk = |id: &str, d: f64| ResultRow {
            player_id: id.into(),
            player_name: id.into(),
            exp_asv_on: 0.0,
            exp_asv_off: 0.0,
            delta_exp_asv: d,
            shots_on: 1,
            shots_off: 1,
        };
        let mut rows = vec![mk("a", -0.1), mk("b", 0.3), mk("c", 0.3), mk("d", 0.0)];
        sort_by_delta_desc(&mut rows);
        let ids: Vec<&str> = rows.iter().map(|r| r.player_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "d", "a"]);
    }
}
