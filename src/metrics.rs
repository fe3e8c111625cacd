//! Metrics for hedge calculations.
//!
//! This module provides:
//! - Solve latency histogram
//! - Solver iteration histogram
//! - Counters for computed hedges, arbitrage branches and optimizer failures

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::debug;

// === Metric Name Constants ===

/// Master calculator latency metric name.
pub const METRIC_HEDGE_SOLVE_LATENCY: &str = "hedge_solve_latency_ms";
/// Simplex pivots per solve metric name.
pub const METRIC_SOLVER_ITERATIONS: &str = "hedge_solver_iterations";
/// Hedges computed counter metric name.
pub const METRIC_HEDGES_COMPUTED: &str = "hedges_computed_total";
/// Arbitrage branch counter metric name.
pub const METRIC_ARBITRAGE_BRANCH: &str = "hedge_arbitrage_branch_total";
/// Optimizer failures counter metric name.
pub const METRIC_OPTIMIZER_FAILURES: &str = "hedge_optimizer_failures_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_HEDGE_SOLVE_LATENCY,
        "Master calculator latency in milliseconds"
    );
    describe_histogram!(
        METRIC_SOLVER_ITERATIONS,
        "Simplex pivots performed per master calculation"
    );

    describe_counter!(
        METRIC_HEDGES_COMPUTED,
        "Total number of hedge recommendations computed"
    );
    describe_counter!(
        METRIC_ARBITRAGE_BRANCH,
        "Total number of calculations on markets with RTP >= 1"
    );
    describe_counter!(
        METRIC_OPTIMIZER_FAILURES,
        "Total number of master calculations that failed"
    );

    debug!("Metrics initialized");
}

/// Record simplex pivots for one solve.
pub fn record_solver_iterations(iterations: usize) {
    histogram!(METRIC_SOLVER_ITERATIONS).record(iterations as f64);
}

/// Increment hedges computed counter.
pub fn inc_hedges_computed(kind: &str) {
    counter!(METRIC_HEDGES_COMPUTED, "market" => kind.to_string()).increment(1);
}

/// Increment arbitrage branch counter.
pub fn inc_arbitrage_branch() {
    counter!(METRIC_ARBITRAGE_BRANCH).increment(1);
}

/// Increment optimizer failures counter.
pub fn inc_optimizer_failures() {
    counter!(METRIC_OPTIMIZER_FAILURES).increment(1);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        histogram!(self.metric_name).record(self.elapsed_ms());
    }
}

/// Create a latency timer for a master calculation.
pub fn timer_hedge_solve() -> LatencyTimer {
    LatencyTimer::new(METRIC_HEDGE_SOLVE_LATENCY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn recording_without_recorder_is_a_no_op() {
        init_metrics();
        inc_hedges_computed("2-way");
        inc_arbitrage_branch();
        inc_optimizer_failures();
        record_solver_iterations(3);
        drop(timer_hedge_solve());
    }

    #[test]
    fn latency_timer_measures_time() {
        let timer = LatencyTimer::new("test_metric");
        sleep(Duration::from_millis(10));
        let elapsed = timer.elapsed_ms();
        assert!(elapsed >= 9.0); // Allow some tolerance
        // Timer will record on drop
    }
}
