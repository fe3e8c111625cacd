//! Individual bets and their aggregation per outcome and bet type.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::HedgeError;
use crate::market::{BetType, Outcome};

/// A bet already placed with a bookmaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bet {
    /// Outcome the bet was placed on.
    pub outcome: Outcome,
    /// Bet-type category.
    pub bet_type: BetType,
    /// Stake wagered.
    pub stake: Decimal,
    /// Decimal odds obtained.
    pub odds: Decimal,
    /// Bookmaker the bet was placed with.
    #[serde(default)]
    pub bookmaker: Option<String>,
}

impl Bet {
    /// Create a bet without bookmaker attribution.
    pub fn new(outcome: Outcome, bet_type: BetType, stake: Decimal, odds: Decimal) -> Self {
        Self {
            outcome,
            bet_type,
            stake,
            odds,
            bookmaker: None,
        }
    }

    /// Attach the bookmaker name.
    pub fn with_bookmaker(mut self, bookmaker: impl Into<String>) -> Self {
        self.bookmaker = Some(bookmaker.into());
        self
    }
}

/// Total stake and stake-weighted odds for one (bet type, outcome) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregatedPosition {
    /// Total stake across contributing bets.
    pub stake: f64,
    /// Stake-weighted average odds.
    pub odds: f64,
}

impl AggregatedPosition {
    /// No committed stake.
    pub const EMPTY: Self = Self {
        stake: 0.0,
        odds: 1.0,
    };

    /// Create an aggregate from a known total stake and average odds.
    pub fn new(stake: f64, odds: f64) -> Self {
        Self { stake, odds }
    }

    /// Fold `(stake, odds)` pairs into a single position.
    ///
    /// Weighted odds = Σ(stake × odds) / Σ stake. An empty or zero-stake
    /// input yields [`AggregatedPosition::EMPTY`].
    pub fn weighted<I>(bets: I) -> Result<Self, HedgeError>
    where
        I: IntoIterator<Item = (Decimal, Decimal)>,
    {
        let mut total_stake = Decimal::ZERO;
        let mut total_return = Decimal::ZERO;

        for (stake, odds) in bets {
            if stake < Decimal::ZERO {
                return Err(HedgeError::InvalidInput(format!(
                    "stake must be non-negative, got {stake}"
                )));
            }
            if odds < Decimal::ONE {
                return Err(HedgeError::InvalidInput(format!(
                    "odds must be at least 1.0, got {odds}"
                )));
            }
            total_stake += stake;
            total_return += stake * odds;
        }

        if total_stake.is_zero() {
            return Ok(Self::EMPTY);
        }

        let weighted_odds = total_return / total_stake;
        Ok(Self {
            stake: to_f64(total_stake)?,
            odds: to_f64(weighted_odds)?,
        })
    }

    /// Aggregate every bet in `bets` matching `bet_type` and `outcome`.
    pub fn from_bets(bets: &[Bet], bet_type: BetType, outcome: Outcome) -> Result<Self, HedgeError> {
        Self::weighted(
            bets.iter()
                .filter(|b| b.bet_type == bet_type && b.outcome == outcome)
                .map(|b| (b.stake, b.odds)),
        )
    }

    /// Net winnings if the outcome occurs: stake × (odds − 1).
    pub fn net_winnings(&self) -> f64 {
        self.stake * (self.odds - 1.0)
    }

    /// Whether any stake is committed.
    pub fn is_empty(&self) -> bool {
        self.stake == 0.0
    }
}

impl Default for AggregatedPosition {
    fn default() -> Self {
        Self::EMPTY
    }
}

fn to_f64(value: Decimal) -> Result<f64, HedgeError> {
    value
        .to_f64()
        .ok_or_else(|| HedgeError::InvalidInput(format!("{value} is not representable as f64")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn weighted_odds_across_bookmakers() {
        // (100 * 2.0 + 300 * 2.4) / 400 = 2.3
        let agg = AggregatedPosition::weighted([(dec!(100), dec!(2.0)), (dec!(300), dec!(2.4))])
            .unwrap();

        assert_eq!(agg.stake, 400.0);
        assert!((agg.odds - 2.3).abs() < 1e-12);
    }

    #[test]
    fn empty_input_is_empty_position() {
        let agg = AggregatedPosition::weighted(std::iter::empty()).unwrap();
        assert_eq!(agg, AggregatedPosition::EMPTY);
        assert!(agg.is_empty());
        assert_eq!(agg.net_winnings(), 0.0);
    }

    #[test]
    fn rejects_negative_stake_and_sub_unit_odds() {
        assert!(AggregatedPosition::weighted([(dec!(-5), dec!(2.0))]).is_err());
        assert!(AggregatedPosition::weighted([(dec!(5), dec!(0.9))]).is_err());
    }

    #[test]
    fn from_bets_filters_by_type_and_outcome() {
        let bets = vec![
            Bet::new(Outcome::One, BetType::QualifyingBet, dec!(50), dec!(2.0)),
            Bet::new(Outcome::One, BetType::QualifyingBet, dec!(150), dec!(3.0)).with_bookmaker("Unibet"),
            Bet::new(Outcome::One, BetType::Freebet, dec!(25), dec!(5.0)),
            Bet::new(Outcome::Two, BetType::QualifyingBet, dec!(10), dec!(1.5)),
        ];

        let agg = AggregatedPosition::from_bets(&bets, BetType::QualifyingBet, Outcome::One).unwrap();

        assert_eq!(agg.stake, 200.0);
        assert!((agg.odds - 2.75).abs() < 1e-12);
        assert!((agg.net_winnings() - 350.0).abs() < 1e-9);
    }
}
