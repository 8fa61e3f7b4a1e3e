use std::cmp::Ordering;

use itertools::Itertools;

use crate::models::Interaction;

fn sorted_ascending(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

/// Median of the raw scores within one group. Even-sized groups take the
/// mean of the two middle values.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let sorted = sorted_ascending(values);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Product of the `top_n` smallest scores in the group. Groups smaller
/// than `top_n` multiply every score they have.
pub fn ranked_product(scores: &[f64], top_n: usize) -> f64 {
    sorted_ascending(scores).iter().take(top_n).product()
}

/// Collapses transcript- and site-level rows into one row per
/// (symbol, miRNA id) pair: median raw score, ranked product of the
/// normalized scores, first-encountered provenance. Output is ordered
/// by pair for determinism.
pub fn aggregate_pairs(rows: Vec<Interaction>, top_n: usize) -> Vec<Interaction> {
    let grouped = rows
        .into_iter()
        .map(|row| ((row.symbol.clone(), row.mirbase_id.clone()), row))
        .into_group_map();

    let mut pairs: Vec<Interaction> = grouped
        .into_iter()
        .map(|((symbol, mirbase_id), group)| {
            let raw: Vec<f64> = group.iter().map(|row| row.score).collect();
            let normalized: Vec<f64> = group.iter().map(|row| row.score_norm).collect();
            let first = &group[0];
            Interaction {
                symbol,
                mirbase_id,
                score: median(&raw),
                score_norm: ranked_product(&normalized, top_n),
                data_source: first.data_source.clone(),
                original_symbol: first.original_symbol.clone(),
                original_mirbase_id: first.original_mirbase_id.clone(),
            }
        })
        .collect();

    pairs.sort_by(|a, b| a.pair().cmp(&b.pair()));
    pairs
}
