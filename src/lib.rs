pub mod backend;
pub mod column_gen;
pub mod error;
pub mod exact;
pub mod leftover;
pub mod render;
pub mod solver;
pub mod stats;
pub mod types;

/// Tolerance for every floating-point comparison in the solvers: reduced-cost
/// optimality, capacity fits, and leftover-window membership. Callers must not
/// compare stricter than this.
pub const EPSILON: f64 = 1e-12;
