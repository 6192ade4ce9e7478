use thiserror::Error;

/// Caller contract violations, rejected at the boundary before any solver
/// runs. Everything the solvers themselves can hit (window infeasibility,
/// iteration cap, unsolvable master) is recoverable and encoded in return
/// values instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("stock length must be positive, got {0}")]
    NonPositiveStock(f64),

    #[error("kerf must be non-negative, got {0}")]
    NegativeKerf(f64),

    #[error("demand length must be positive, got {0}")]
    NonPositiveLength(f64),

    #[error("invalid leftover window: min {min} must satisfy 0 <= min <= max {max}")]
    InvalidWindow { min: f64, max: f64 },

    #[error("leftover window max {max} exceeds stock length {stock_len}")]
    WindowExceedsStock { max: f64, stock_len: f64 },
}
