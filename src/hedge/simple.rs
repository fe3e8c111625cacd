//! Closed-form hedges for a single placed bet.
//!
//! Each formula returns the stake on a remaining outcome that equalizes the
//! payoff of one bookmaker bet, with no aggregation across bookmakers.

use tracing::instrument;

use crate::error::HedgeError;
use crate::market::BetType;

/// Default exchange commission on net winnings.
pub const DEFAULT_EXCHANGE_FEE: f64 = 0.02;

/// Stake-weighted return that has to be matched on the other side.
///
/// Qualifying bets return stake × odds; freebets and risk-free bets only pay
/// net winnings, stake × (odds − 1).
fn covered_return(bet_type: BetType, stake: f64, odds: f64) -> f64 {
    if bet_type.returns_stake() {
        stake * odds
    } else {
        stake * (odds - 1.0)
    }
}

/// Hedge stake on the single remaining outcome of a two-way market.
pub fn hedge_2way(bet_type: BetType, stake: f64, odds: f64, odds_other: f64) -> f64 {
    covered_return(bet_type, stake, odds) / odds_other
}

/// Hedge stakes on both remaining outcomes of a three-way market.
pub fn hedge_3way(
    bet_type: BetType,
    stake: f64,
    odds: f64,
    odds_other_1: f64,
    odds_other_2: f64,
) -> [f64; 2] {
    let covered = covered_return(bet_type, stake, odds);
    [covered / odds_other_1, covered / odds_other_2]
}

/// Qualifying bet, two-way: stake × odds / odds_other.
pub fn qualifying_bet_2way(stake: f64, odds: f64, odds_other: f64) -> f64 {
    hedge_2way(BetType::QualifyingBet, stake, odds, odds_other)
}

/// Qualifying bet, three-way.
pub fn qualifying_bet_3way(stake: f64, odds: f64, odds_other_1: f64, odds_other_2: f64) -> [f64; 2] {
    hedge_3way(BetType::QualifyingBet, stake, odds, odds_other_1, odds_other_2)
}

/// Freebet, two-way: stake × (odds − 1) / odds_other.
pub fn freebet_2way(stake: f64, odds: f64, odds_other: f64) -> f64 {
    hedge_2way(BetType::Freebet, stake, odds, odds_other)
}

/// Freebet, three-way.
pub fn freebet_3way(stake: f64, odds: f64, odds_other_1: f64, odds_other_2: f64) -> [f64; 2] {
    hedge_3way(BetType::Freebet, stake, odds, odds_other_1, odds_other_2)
}

/// Risk-free bet, two-way: stake × (odds − 1) / odds_other.
pub fn risk_free_bet_2way(stake: f64, odds: f64, odds_other: f64) -> f64 {
    hedge_2way(BetType::RiskFreeBet, stake, odds, odds_other)
}

/// Risk-free bet, three-way.
pub fn risk_free_bet_3way(stake: f64, odds: f64, odds_other_1: f64, odds_other_2: f64) -> [f64; 2] {
    hedge_3way(BetType::RiskFreeBet, stake, odds, odds_other_1, odds_other_2)
}

/// Stake to lay on a betting exchange to neutralize a back bet.
///
/// The exchange commission reduces the effective lay odds. The result is
/// truncated to whole currency units.
#[instrument(level = "debug")]
pub fn lay_stake(
    bet_type: BetType,
    stake: f64,
    odds: f64,
    lay_odds: f64,
    fee: f64,
) -> Result<u64, HedgeError> {
    let effective_odds = lay_odds - fee;
    if effective_odds <= 0.0 || !effective_odds.is_finite() {
        return Err(HedgeError::InvalidInput(format!(
            "lay odds {lay_odds} minus fee {fee} must be positive"
        )));
    }

    let lay = covered_return(bet_type, stake, odds) / effective_odds;
    Ok(lay.max(0.0).trunc() as u64)
}
