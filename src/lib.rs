//! Matched betting hedge-stake calculator.
//!
//! Given bets already placed with bookmakers (qualifying bets, freebets and
//! risk-free bets) and the best odds still available on every outcome, this
//! library computes the stakes to place on the remaining outcomes so the net
//! result is the same whichever outcome happens.
//!
//! # Example
//!
//! ```text
//! Qualifying bet: 100 @ 2.00 on outcome 1
//! Hedge odds:     1.90 / 1.90 (RTP 0.95)
//! ───────────────────────────────────────
//! Hedge stake:    0 on 1, 105 on 2
//! Payoff:         -5.26 either way
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`market`]: Outcomes, bet types and market odds
//! - [`betting`]: Placed bets and aggregated market positions
//! - [`hedge`]: Simple formulas, RTP and the master calculator
//! - [`metrics`]: Calculator metrics, recorded through the `metrics` facade.
//!   An embedding application installs a recorder and calls
//!   [`metrics::init_metrics`]; without one every sample is discarded.

pub mod betting;
pub mod config;
pub mod error;
pub mod hedge;
pub mod market;
pub mod metrics;

pub use config::Config;
pub use error::{HedgeError, Result};
