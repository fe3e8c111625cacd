//! Unified error types for the hedge calculator.

use thiserror::Error;

/// Unified error type for the hedge calculator.
#[derive(Error, Debug)]
pub enum HedgeError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Unrecognized bet-type category.
    #[error(
        "invalid bet type {value:?}: must be either \"Qualifying bet\", \"Freebet\" or \"Risk-free bet\""
    )]
    InvalidBetType {
        /// The offending input.
        value: String,
    },

    /// Malformed numeric or structural input at the boundary.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Optimizer error.
    #[error("optimizer error: {0}")]
    Optimizer(#[from] OptimizerError),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Master optimizer errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizerError {
    /// The linear program solver did not reach a feasible, bounded optimum.
    #[error("optimization failed after {iterations} iterations: {diagnostic}")]
    OptimizationFailed {
        /// Why the solver gave up.
        diagnostic: SolverDiagnostic,
        /// Pivots performed before failing.
        iterations: usize,
    },

    /// Invariant violation inside the optimizer. Indicates a logic defect.
    #[error("optimizer internal error: {0}")]
    OptimizerInternal(String),
}

/// Solver status reported alongside [`OptimizerError::OptimizationFailed`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverDiagnostic {
    /// No stake vector satisfies the bounds and equal-payoff constraints.
    #[error("constraints are infeasible (phase one residual {residual:e})")]
    Infeasible {
        /// Sum of artificial variables left at the end of phase one.
        residual: f64,
    },

    /// The objective can be improved without limit.
    #[error("objective is unbounded along stake {column}")]
    Unbounded {
        /// Variable index that could grow without bound.
        column: usize,
    },

    /// Iteration cap hit before reaching optimality.
    #[error("iteration limit of {max_iterations} reached")]
    IterationLimit {
        /// Configured cap.
        max_iterations: usize,
    },

    /// The returned point violates an equality constraint beyond tolerance.
    #[error("constraint {row} violated by {violation:e}")]
    ConstraintViolation {
        /// Constraint row index.
        row: usize,
        /// Absolute residual.
        violation: f64,
    },

    /// The problem definition itself is inconsistent.
    #[error("malformed problem: {0}")]
    Malformed(String),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, HedgeError>;
