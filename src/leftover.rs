//! Valid-by-construction pattern building under a forbidden leftover band.
//! Each iteration packs one stock bar with a knapsack; when the greedy
//! max-fill pattern lands inside the band, a second knapsack deliberately
//! under-fills so the leftover clears the band's upper bound.

use crate::backend::LpBackend;
use crate::types::{DemandSet, Pattern, Solution, Window};
use crate::EPSILON;

/// Build patterns one stock bar at a time until demand is exhausted. An empty
/// Solution with non-empty demand means the demand cannot be cut without an
/// illegal leftover; that is an expected terminal state, not an error.
pub fn solve(
    demand: &DemandSet,
    stock_len: f64,
    window: Window,
    backend: &dyn LpBackend,
) -> Solution {
    // A line longer than the stock can never be part of any pattern, so the
    // demand as a whole is uncuttable.
    if demand
        .lines()
        .iter()
        .any(|l| l.length > stock_len + EPSILON)
    {
        return Solution::new();
    }

    let mut remaining = demand.clone();
    remaining.sort_desc();

    let mut solution = Solution::new();
    while !remaining.is_empty() {
        let Some(pattern) = optimize_to_one_stock(stock_len, &remaining, window, backend) else {
            return Solution::new();
        };
        let cuts = pattern.cuts().clone();
        solution.add(pattern, 1);
        let subtracted = remaining.try_subtract(&cuts);
        debug_assert!(subtracted, "pattern exceeded remaining demand");
    }

    solution
}

/// Best single-bar pattern with a legal leftover, or None if neither the
/// max-fill nor the forced-leftover attempt produces one.
pub fn optimize_to_one_stock(
    stock_len: f64,
    demand: &DemandSet,
    window: Window,
    backend: &dyn LpBackend,
) -> Option<Pattern> {
    // Greedily maximizing the cut length usually leaves a legal leftover.
    if let Some(pattern) = knapsack_pattern(stock_len, stock_len, demand, backend) {
        if !pattern.is_empty() && window.permits(pattern.leftover(stock_len)) {
            return Some(pattern);
        }
    }

    // Otherwise under-fill: capping the usable capacity forces the leftover
    // to at least max_leftover, the only remaining way to stay legal.
    let reduced = stock_len - window.max_leftover;
    if let Some(pattern) = knapsack_pattern(stock_len, reduced, demand, backend) {
        if !pattern.is_empty() && window.permits(pattern.leftover(stock_len)) {
            return Some(pattern);
        }
    }

    None
}

/// Max-total-length knapsack against `capacity`, validated as a pattern of
/// the full stock length.
fn knapsack_pattern(
    stock_len: f64,
    capacity: f64,
    demand: &DemandSet,
    backend: &dyn LpBackend,
) -> Option<Pattern> {
    let lengths: Vec<f64> = demand.lines().iter().map(|l| l.length).collect();
    let bounds: Vec<u32> = demand.lines().iter().map(|l| l.qty).collect();

    let result = backend.solve_knapsack(&lengths, &lengths, capacity, &bounds)?;

    let mut cuts = DemandSet::new();
    for (i, &count) in result.counts.iter().enumerate() {
        cuts.add(lengths[i], count);
    }
    Pattern::new(cuts, stock_len)
}
