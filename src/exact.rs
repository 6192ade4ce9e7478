//! Exhaustive search for a minimal-bar decomposition. Exponential in the
//! number of distinct lengths and their quantities, so it is only ever fed
//! small inputs: tiny whole problems or the residual demand left after
//! column generation.

use crate::EPSILON;
use crate::types::{DemandSet, Pattern, Window};

/// Minimal number of stock bars covering `demand`, with one pattern per bar.
/// An empty pattern list with non-empty demand means no progress is possible
/// (every remaining length exceeds the stock).
pub fn solve(demand: &DemandSet, stock_len: f64) -> (u32, Vec<Pattern>) {
    solve_filtered(demand, stock_len, None)
}

/// Same search, but candidate patterns whose leftover falls strictly inside
/// the forbidden window are discarded. Returns an empty list when no
/// window-respecting decomposition exists.
pub fn solve_windowed(demand: &DemandSet, stock_len: f64, window: Window) -> Vec<Pattern> {
    solve_filtered(demand, stock_len, Some(window)).1
}

fn solve_filtered(demand: &DemandSet, stock_len: f64, window: Option<Window>) -> (u32, Vec<Pattern>) {
    let mut sorted = demand.clone();
    sorted.sort_desc();

    let lengths: Vec<f64> = sorted.lines().iter().map(|l| l.length).collect();
    let qtys: Vec<u32> = sorted.lines().iter().map(|l| l.qty).collect();

    match solve_recursive(&lengths, &qtys, stock_len, window) {
        Some((bars, counts)) => {
            let patterns = counts
                .into_iter()
                .filter_map(|c| pattern_from_counts(&lengths, &c, stock_len))
                .collect();
            (bars, patterns)
        }
        None => (0, Vec::new()),
    }
}

fn pattern_from_counts(lengths: &[f64], counts: &[u32], stock_len: f64) -> Option<Pattern> {
    let mut cuts = DemandSet::new();
    for (length, count) in lengths.iter().zip(counts) {
        cuts.add(*length, *count);
    }
    Pattern::new(cuts, stock_len)
}

/// Returns the minimal bar count and one per-length count vector per bar, or
/// None when no candidate pattern makes progress.
fn solve_recursive(
    lengths: &[f64],
    qtys: &[u32],
    stock_len: f64,
    window: Option<Window>,
) -> Option<(u32, Vec<Vec<u32>>)> {
    if qtys.iter().all(|&q| q == 0) {
        return Some((0, Vec::new()));
    }

    let mut candidates = Vec::new();
    let mut current = vec![0u32; lengths.len()];
    enumerate_one_stock(lengths, qtys, 0, stock_len, &mut current, &mut candidates);

    if let Some(window) = window {
        candidates.retain(|counts| {
            let used: f64 = lengths
                .iter()
                .zip(counts)
                .map(|(&l, &c)| l * f64::from(c))
                .sum();
            window.permits(stock_len - used)
        });
    }

    let mut best: Option<(u32, Vec<Vec<u32>>)> = None;
    for counts in candidates {
        if counts.iter().all(|&c| c == 0) {
            // An empty pattern cannot reduce demand; descending into it
            // would never terminate.
            continue;
        }

        let remaining: Vec<u32> = qtys.iter().zip(&counts).map(|(&q, &c)| q - c).collect();
        let Some((sub_bars, mut sub_patterns)) =
            solve_recursive(lengths, &remaining, stock_len, window)
        else {
            continue;
        };

        // Strict comparison keeps the first-encountered minimum, which makes
        // ties deterministic given the canonical descending sort.
        if best.as_ref().is_none_or(|(bars, _)| sub_bars + 1 < *bars) {
            sub_patterns.push(counts);
            best = Some((sub_bars + 1, sub_patterns));
        }
    }

    best
}

/// Enumerate every maximal single-stock pattern: for the length at `idx`, try
/// each admissible repeat count and recurse over the rest. A branch emits its
/// pattern as soon as no remaining length fits the remaining capacity.
fn enumerate_one_stock(
    lengths: &[f64],
    qtys: &[u32],
    idx: usize,
    cap_left: f64,
    current: &mut Vec<u32>,
    out: &mut Vec<Vec<u32>>,
) {
    let can_cut = lengths.iter().enumerate().any(|(i, &l)| {
        qtys[i] - current[i] > 0 && l <= cap_left + EPSILON
    });
    if !can_cut {
        out.push(current.clone());
        return;
    }
    if idx == lengths.len() {
        // Something still fits but every count is already fixed: the pattern
        // is not maximal, so this branch yields nothing.
        return;
    }

    let length = lengths[idx];
    let max_fit = ((cap_left + EPSILON) / length).floor();
    let max_count = if max_fit <= 0.0 {
        0
    } else {
        (max_fit as u32).min(qtys[idx])
    };

    for count in 0..=max_count {
        current[idx] = count;
        enumerate_one_stock(
            lengths,
            qtys,
            idx + 1,
            cap_left - length * f64::from(count),
            current,
            out,
        );
    }
    current[idx] = 0;
}
