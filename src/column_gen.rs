//! Gilmore-Gomory column generation: a square master LP over the current
//! pattern matrix alternates with an integer knapsack pricing step; entering
//! columns displace basis columns chosen by a ratio test. Fractional usage is
//! floored and the residual demand is closed exactly.

use crate::EPSILON;
use crate::backend::LpBackend;
use crate::exact;
use crate::types::{DemandSet, Pattern, Solution};

/// Runaway guard for the master/pricing loop. Hitting it is not fatal, the
/// solver proceeds with the best matrix found so far.
const MAX_ITER: usize = 100;

/// Solve the cutting stock problem: column generation for the bulk of the
/// demand, exact enumeration for the rounding residue.
pub fn solve(demand: &DemandSet, stock_len: f64, backend: &dyn LpBackend) -> Solution {
    let (mut solution, residual) = solve_by_linear_programming(demand, stock_len, backend);

    if !residual.is_empty() {
        let mut residual = residual;
        residual.sort_desc();
        let (_, patterns) = exact::solve(&residual, stock_len);
        for pattern in patterns {
            if !pattern.is_empty() {
                solution.add(pattern, 1);
            }
        }
    }

    solution
}

/// Master/pricing loop. Returns the integer part of the pattern assignment
/// plus the demand left uncovered after flooring.
pub fn solve_by_linear_programming(
    demand: &DemandSet,
    stock_len: f64,
    backend: &dyn LpBackend,
) -> (Solution, DemandSet) {
    let n = demand.lines().len();
    if n == 0 {
        return (Solution::new(), DemandSet::new());
    }

    let lengths: Vec<f64> = demand.lines().iter().map(|l| l.length).collect();
    let bounds: Vec<u32> = demand.lines().iter().map(|l| l.qty).collect();
    let qtys: Vec<f64> = bounds.iter().map(|&q| f64::from(q)).collect();

    // Trivially feasible diagonal basis: one pattern per length, repeating
    // only that length as often as the stock allows.
    let mut matrix = vec![vec![0.0; n]; n];
    for (r, &length) in lengths.iter().enumerate() {
        matrix[r][r] = (stock_len / length).floor();
    }

    let mut usage = vec![0.0; n];
    let mut iterations = 0;
    loop {
        if iterations == MAX_ITER {
            tracing::warn!("iteration cap reached, solution may not be optimal");
            break;
        }
        iterations += 1;

        let Some(master) = backend.solve_equality_lp(&matrix, &qtys) else {
            tracing::debug!("master infeasible, keeping previous basis");
            break;
        };
        usage = master.primal;

        let Some(pricing) = backend.solve_knapsack(&master.dual, &lengths, stock_len, &bounds)
        else {
            tracing::debug!("pricing failed, keeping previous basis");
            break;
        };
        if pricing.objective <= 1.0 + EPSILON {
            tracing::debug!(iterations, "relaxation optimal");
            break;
        }

        let entering: Vec<f64> = pricing.counts.iter().map(|&c| f64::from(c)).collect();
        let Some(leaving) = leaving_column(&matrix, &entering, &usage, backend) else {
            tracing::debug!("ratio test infeasible, keeping previous basis");
            break;
        };
        for r in 0..n {
            matrix[r][leaving] = entering[r];
        }
    }

    // Keep the integer part of each pattern count; whatever coverage that
    // loses becomes residual demand.
    let floored: Vec<u32> = usage.iter().map(|&u| u.floor() as u32).collect();

    let mut remaining = qtys.clone();
    for c in 0..n {
        for r in 0..n {
            remaining[r] -= matrix[r][c] * f64::from(floored[c]);
        }
    }

    let mut residual = DemandSet::new();
    for (r, &length) in lengths.iter().enumerate() {
        let qty = remaining[r].round();
        if qty >= 1.0 {
            residual.add(length, qty as u32);
        }
    }

    let mut solution = Solution::new();
    for c in 0..n {
        if floored[c] == 0 {
            continue;
        }
        let mut cuts = DemandSet::new();
        for (r, &length) in lengths.iter().enumerate() {
            if matrix[r][c] > 0.0 {
                cuts.add(length, matrix[r][c] as u32);
            }
        }
        if let Some(pattern) = Pattern::new(cuts, stock_len) {
            if !pattern.is_empty() {
                solution.add(pattern, floored[c]);
            }
        }
    }

    (solution, residual)
}

/// Revised-simplex style leaving choice: express the entering column in the
/// current basis, then take the minimum usage/coefficient ratio over rows
/// with a positive coefficient.
fn leaving_column(
    matrix: &[Vec<f64>],
    entering: &[f64],
    usage: &[f64],
    backend: &dyn LpBackend,
) -> Option<usize> {
    let representation = backend.solve_equality_lp(matrix, entering)?.primal;

    let mut best: Option<(usize, f64)> = None;
    for (i, &coef) in representation.iter().enumerate() {
        if coef <= EPSILON {
            continue;
        }
        let ratio = usage[i] / coef;
        if best.is_none_or(|(_, current)| ratio < current) {
            best = Some((i, ratio));
        }
    }
    best.map(|(i, _)| i)
}
