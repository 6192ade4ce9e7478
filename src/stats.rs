//! Aggregations over a finished solution.

use crate::types::Solution;

/// Total wasted length. A leftover up to `allowance` per bar counts as
/// reusable stock rather than waste.
pub fn wasted_len(solution: &Solution, stock_len: f64, allowance: f64) -> f64 {
    solution
        .entries()
        .iter()
        .map(|(pattern, count)| {
            let waste = (stock_len - pattern.total_len() - allowance).max(0.0);
            waste * f64::from(*count)
        })
        .sum()
}

/// Total number of finished bars produced across all patterns.
pub fn total_pieces(solution: &Solution) -> u32 {
    solution
        .entries()
        .iter()
        .map(|(pattern, count)| pattern.cuts().unit_count() * count)
        .sum()
}

/// Finished bars of one specific length across all patterns.
pub fn pieces_of_length(solution: &Solution, length: f64) -> u32 {
    solution.covered_qty(length)
}
