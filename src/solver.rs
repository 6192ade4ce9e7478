//! Caller boundary: input validation, kerf normalization, solver dispatch
//! and kerf denormalization. Everything past this point works on kerf-padded
//! lengths and never mutates the caller's demand.

use crate::backend::{DenseBackend, LpBackend};
use crate::column_gen;
use crate::error::InputError;
use crate::leftover;
use crate::types::{DemandLine, DemandSet, Solution, Window};

#[derive(Debug, Clone)]
pub struct Solver {
    stock_len: f64,
    kerf: f64,
    demand: DemandSet,
    window: Option<Window>,
}

impl Solver {
    /// Validates the caller contract up front; the solvers themselves never
    /// raise.
    pub fn new(stock_len: f64, kerf: f64, demand: Vec<DemandLine>) -> Result<Self, InputError> {
        if !(stock_len > 0.0) {
            return Err(InputError::NonPositiveStock(stock_len));
        }
        if !(kerf >= 0.0) {
            return Err(InputError::NegativeKerf(kerf));
        }
        for line in &demand {
            if !(line.length > 0.0) {
                return Err(InputError::NonPositiveLength(line.length));
            }
        }
        Ok(Self {
            stock_len,
            kerf,
            demand: DemandSet::from_lines(demand),
            window: None,
        })
    }

    /// Restrict per-bar leftovers to the window's legal range.
    pub fn with_window(mut self, window: Window) -> Result<Self, InputError> {
        if window.max_leftover > self.stock_len {
            return Err(InputError::WindowExceedsStock {
                max: window.max_leftover,
                stock_len: self.stock_len,
            });
        }
        self.window = Some(window);
        Ok(self)
    }

    pub fn solve(&self) -> Solution {
        self.solve_with(&DenseBackend)
    }

    pub fn solve_with(&self, backend: &dyn LpBackend) -> Solution {
        tracing::info!(
            stock_len = self.stock_len,
            kerf = self.kerf,
            lines = self.demand.lines().len(),
            windowed = self.window.is_some(),
            "solving cutting stock problem"
        );

        // Padding every length with the kerf turns the saw-width problem
        // into a plain cutting stock problem.
        let stock_len = self.stock_len + self.kerf;
        let mut demand = self.demand.clone();
        demand.shift_lengths(self.kerf);

        let mut solution = match self.window {
            Some(window) => leftover::solve(&demand, stock_len, window, backend),
            None => column_gen::solve(&demand, stock_len, backend),
        };

        solution.denormalize(self.kerf);
        solution
    }
}
