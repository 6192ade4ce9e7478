use crate::EPSILON;

/// Pivots smaller than this are treated as a singular system.
const PIVOT_EPS: f64 = 1e-10;

/// Slack for deciding that an eliminated solution component is negative
/// (infeasible) rather than rounding noise.
const FEASIBILITY_EPS: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct LpSolution {
    /// Bars to cut with each basis pattern.
    pub primal: Vec<f64>,
    /// Shadow price per demanded length.
    pub dual: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct KnapsackSolution {
    pub objective: f64,
    pub counts: Vec<u32>,
}

/// The LP/MIP capability the column-generation control loop is written
/// against. Any backend providing these two primitives can be swapped in
/// without touching the solvers.
pub trait LpBackend {
    /// Minimize the sum of variables subject to `matrix * x = rhs` with
    /// `x >= 0`, for a square coefficient matrix. Returns the primal solution
    /// and the dual price vector, or None when the system is singular or
    /// infeasible.
    fn solve_equality_lp(&self, matrix: &[Vec<f64>], rhs: &[f64]) -> Option<LpSolution>;

    /// Bounded integer knapsack: maximize `values . x` subject to
    /// `lengths . x <= capacity` and `0 <= x_i <= bounds_i`, integer.
    fn solve_knapsack(
        &self,
        values: &[f64],
        lengths: &[f64],
        capacity: f64,
        bounds: &[u32],
    ) -> Option<KnapsackSolution>;
}

/// Reference backend: Gaussian elimination for the square equality system
/// (the master basis is always square, so the LP reduces to a linear solve
/// plus a sign check) and depth-first branch-and-bound for the knapsack.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseBackend;

impl LpBackend for DenseBackend {
    fn solve_equality_lp(&self, matrix: &[Vec<f64>], rhs: &[f64]) -> Option<LpSolution> {
        let n = rhs.len();
        if n == 0 || matrix.len() != n || matrix.iter().any(|row| row.len() != n) {
            return None;
        }

        let mut primal = solve_linear(matrix.to_vec(), rhs.to_vec())?;
        if primal.iter().any(|v| *v < -FEASIBILITY_EPS) {
            // The unique solution of the square system has a negative
            // component, so the non-negative LP is infeasible.
            return None;
        }
        for v in &mut primal {
            if *v < 0.0 {
                *v = 0.0;
            }
        }

        let mut transpose = vec![vec![0.0; n]; n];
        for (r, row) in matrix.iter().enumerate() {
            for (c, coef) in row.iter().enumerate() {
                transpose[c][r] = *coef;
            }
        }
        let dual = solve_linear(transpose, vec![1.0; n])?;

        Some(LpSolution { primal, dual })
    }

    fn solve_knapsack(
        &self,
        values: &[f64],
        lengths: &[f64],
        capacity: f64,
        bounds: &[u32],
    ) -> Option<KnapsackSolution> {
        let n = values.len();
        if lengths.len() != n || bounds.len() != n || capacity < -EPSILON {
            return None;
        }

        let mut search = KnapsackSearch {
            values,
            lengths,
            bounds,
            best_counts: vec![0; n],
            best_value: 0.0,
            current: vec![0; n],
        };
        search.dfs(0, capacity, 0.0);

        Some(KnapsackSolution {
            objective: search.best_value,
            counts: search.best_counts,
        })
    }
}

struct KnapsackSearch<'a> {
    values: &'a [f64],
    lengths: &'a [f64],
    bounds: &'a [u32],
    best_counts: Vec<u32>,
    best_value: f64,
    current: Vec<u32>,
}

impl KnapsackSearch<'_> {
    fn dfs(&mut self, idx: usize, cap_left: f64, value: f64) {
        if idx == self.values.len() {
            // Strict improvement only, so the first-encountered solution wins
            // ties and the search stays deterministic.
            if value > self.best_value + EPSILON {
                self.best_value = value;
                self.best_counts.copy_from_slice(&self.current);
            }
            return;
        }

        if self.upper_bound(idx, cap_left, value) <= self.best_value + EPSILON {
            return;
        }

        let max_count = self.max_count(idx, cap_left);
        for count in (0..=max_count).rev() {
            self.current[idx] = count;
            self.dfs(
                idx + 1,
                cap_left - self.lengths[idx] * f64::from(count),
                value + self.values[idx] * f64::from(count),
            );
        }
        self.current[idx] = 0;
    }

    fn max_count(&self, idx: usize, cap_left: f64) -> u32 {
        let length = self.lengths[idx];
        if length <= 0.0 {
            return self.bounds[idx];
        }
        let fit = ((cap_left + EPSILON) / length).floor();
        if fit <= 0.0 {
            0
        } else {
            (fit as u32).min(self.bounds[idx])
        }
    }

    /// Optimistic completion value: every remaining item capped by its bound
    /// and by the remaining capacity independently.
    fn upper_bound(&self, idx: usize, cap_left: f64, value: f64) -> f64 {
        let mut bound = value;
        for i in idx..self.values.len() {
            if self.values[i] <= 0.0 {
                continue;
            }
            bound += self.values[i] * f64::from(self.max_count(i, cap_left));
        }
        bound
    }
}

fn solve_linear(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < PIVOT_EPS {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut acc = b[row];
        for k in row + 1..n {
            acc -= a[row][k] * x[k];
        }
        x[row] = acc / a[row][row];
    }
    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_solve_2x2() {
        let a = vec![vec![1.0, 1.0], vec![0.0, 2.0]];
        let x = solve_linear(a, vec![4.0, 5.0]).unwrap();
        assert!((x[0] - 1.5).abs() < 1e-9);
        assert!((x[1] - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_linear_solve_singular() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        assert!(solve_linear(a, vec![1.0, 2.0]).is_none());
    }

    #[test]
    fn test_equality_lp_diagonal_basis() {
        // Diagonal basis for lengths 600/200 against stock 1000.
        let matrix = vec![vec![1.0, 0.0], vec![0.0, 5.0]];
        let sol = DenseBackend
            .solve_equality_lp(&matrix, &[4.0, 5.0])
            .unwrap();
        assert!((sol.primal[0] - 4.0).abs() < 1e-9);
        assert!((sol.primal[1] - 1.0).abs() < 1e-9);
        // Duals solve the transposed system against the all-ones objective.
        assert!((sol.dual[0] - 1.0).abs() < 1e-9);
        assert!((sol.dual[1] - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_equality_lp_rejects_negative_solution() {
        let matrix = vec![vec![1.0, 1.0], vec![0.0, 1.0]];
        // x = (-1, 2): infeasible under x >= 0.
        assert!(DenseBackend.solve_equality_lp(&matrix, &[1.0, 2.0]).is_none());
    }

    #[test]
    fn test_knapsack_max_fill() {
        let lengths = [300.0, 200.0];
        let sol = DenseBackend
            .solve_knapsack(&lengths, &lengths, 1000.0, &[3, 3])
            .unwrap();
        assert!((sol.objective - 1000.0).abs() < 1e-9);
        let used: f64 = sol
            .counts
            .iter()
            .zip(&lengths)
            .map(|(&c, &l)| f64::from(c) * l)
            .sum();
        assert!(used <= 1000.0 + EPSILON);
    }

    #[test]
    fn test_knapsack_respects_bounds() {
        let sol = DenseBackend
            .solve_knapsack(&[150.0], &[150.0], 1000.0, &[3])
            .unwrap();
        assert_eq!(sol.counts, vec![3]);
        assert!((sol.objective - 450.0).abs() < 1e-9);
    }

    #[test]
    fn test_knapsack_nothing_fits() {
        let sol = DenseBackend
            .solve_knapsack(&[900.0], &[900.0], 800.0, &[10])
            .unwrap();
        assert_eq!(sol.counts, vec![0]);
        assert_eq!(sol.objective, 0.0);
    }

    #[test]
    fn test_knapsack_pricing_duals() {
        // Duals (1.0, 0.2) for lengths (600, 200): the best column is one 600
        // plus two 200s with reduced cost 1.4.
        let sol = DenseBackend
            .solve_knapsack(&[1.0, 0.2], &[600.0, 200.0], 1000.0, &[4, 5])
            .unwrap();
        assert_eq!(sol.counts, vec![1, 2]);
        assert!((sol.objective - 1.4).abs() < 1e-9);
    }

    #[test]
    fn test_knapsack_ignores_worthless_items() {
        let sol = DenseBackend
            .solve_knapsack(&[0.0, 1.0], &[100.0, 300.0], 1000.0, &[5, 2])
            .unwrap();
        assert_eq!(sol.counts[1], 2);
        assert!((sol.objective - 2.0).abs() < 1e-9);
    }
}
