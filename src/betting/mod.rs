//! Committed bets and market positions.
//!
//! This module handles:
//! - Individual bookmaker bets
//! - Weighted aggregation per bet type and outcome
//! - The immutable market position fed to the optimizer

pub mod bet;
pub mod position;

pub use bet::{AggregatedPosition, Bet};
pub use position::{CategoryPositions, HedgeRequest, MarketPosition, RefundPolicy, FREEBET_REFUND_SHARE};
