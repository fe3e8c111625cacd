//! Market vocabulary for two-way and three-way betting markets.
//!
//! This module handles:
//! - Outcomes and market kinds
//! - Bet-type categories and their boundary parsing
//! - Current market odds for the hedge wager

pub mod odds;
pub mod types;

pub use odds::MarketOdds;
pub use types::{BetType, MarketKind, Outcome};
