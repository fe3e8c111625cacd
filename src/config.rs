//! Calculator configuration loaded from environment variables.

use serde::Deserialize;

use crate::hedge::SolverOptions;

/// Calculator configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Solver ===
    /// Maximum simplex pivots per master calculation.
    #[serde(default = "default_max_iterations")]
    pub hedge_max_iterations: usize,

    /// Numerical tolerance for pivoting and feasibility checks.
    #[serde(default = "default_tolerance")]
    pub hedge_tolerance: f64,

    // === Betting Defaults ===
    /// Exchange commission used for lay stakes (e.g., 0.02).
    #[serde(default = "default_exchange_fee")]
    pub exchange_fee: f64,

    /// Risk-free refunds are paid as freebet credit.
    #[serde(default)]
    pub refund_as_freebet: bool,

    // === Logging ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_max_iterations() -> usize {
    500
}

fn default_tolerance() -> f64 {
    1e-9
}

fn default_exchange_fee() -> f64 {
    0.02
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hedge_max_iterations: default_max_iterations(),
            hedge_tolerance: default_tolerance(),
            exchange_fee: default_exchange_fee(),
            refund_as_freebet: false,
            rust_log: default_log_level(),
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.hedge_max_iterations == 0 {
            return Err("HEDGE_MAX_ITERATIONS must be at least 1".to_string());
        }

        if !(self.hedge_tolerance > 0.0) {
            return Err("HEDGE_TOLERANCE must be positive".to_string());
        }

        if !(0.0..1.0).contains(&self.exchange_fee) {
            return Err("EXCHANGE_FEE must be in [0, 1)".to_string());
        }

        Ok(())
    }
}

impl From<&Config> for SolverOptions {
    fn from(config: &Config) -> Self {
        Self {
            max_iterations: config.hedge_max_iterations,
            tolerance: config.hedge_tolerance,
        }
    }
}
