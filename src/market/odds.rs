//! Current market odds used for the new hedge wager.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::types::{MarketKind, Outcome};
use crate::error::HedgeError;
use crate::hedge::rtp::return_to_player;

/// Best available decimal odds per outcome, in definition order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct MarketOdds {
    kind: MarketKind,
    odds: SmallVec<[f64; 3]>,
}

impl MarketOdds {
    /// Odds for a two-way market.
    pub fn two_way(odds_1: f64, odds_2: f64) -> Self {
        Self {
            kind: MarketKind::TwoWay,
            odds: SmallVec::from_slice(&[odds_1, odds_2]),
        }
    }

    /// Odds for a three-way market.
    pub fn three_way(odds_1: f64, odds_x: f64, odds_2: f64) -> Self {
        Self {
            kind: MarketKind::ThreeWay,
            odds: SmallVec::from_slice(&[odds_1, odds_x, odds_2]),
        }
    }

    /// Build from a slice of 2 or 3 odds.
    pub fn from_slice(odds: &[f64]) -> Result<Self, HedgeError> {
        let kind = MarketKind::from_len(odds.len()).ok_or_else(|| {
            HedgeError::InvalidInput(format!(
                "market odds need 2 or 3 entries, got {}",
                odds.len()
            ))
        })?;

        Ok(Self {
            kind,
            odds: SmallVec::from_slice(odds),
        })
    }

    /// Market kind implied by the number of odds.
    pub fn kind(&self) -> MarketKind {
        self.kind
    }

    /// Odds in definition order.
    pub fn as_slice(&self) -> &[f64] {
        &self.odds
    }

    /// Odds for one outcome.
    pub fn get(&self, outcome: Outcome) -> Option<f64> {
        outcome.index_in(self.kind).map(|i| self.odds[i])
    }

    /// Aggregate payout ratio of these odds.
    pub fn return_to_player(&self) -> f64 {
        return_to_player(&self.odds)
    }

    /// Check every price is a finite decimal odd above 1.0.
    pub fn validate(&self) -> Result<(), HedgeError> {
        for (outcome, odds) in self.kind.outcomes().iter().zip(&self.odds) {
            if !odds.is_finite() || *odds <= 1.0 {
                return Err(HedgeError::InvalidInput(format!(
                    "market odds for outcome {outcome} must be greater than 1.0, got {odds}"
                )));
            }
        }
        Ok(())
    }
}

impl TryFrom<Vec<f64>> for MarketOdds {
    type Error = HedgeError;

    fn try_from(odds: Vec<f64>) -> Result<Self, Self::Error> {
        MarketOdds::from_slice(&odds)
    }
}

impl From<MarketOdds> for Vec<f64> {
    fn from(odds: MarketOdds) -> Self {
        odds.odds.into_vec()
    }
}
