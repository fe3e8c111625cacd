//! Net payoff per outcome as a function of the hedge-stake vector.
//!
//! For outcome `k` and hedge stakes `w`:
//!
//! ```text
//! payoff_k(w) = Σ_c stake_c,k × (odds_c,k − 1)
//!             − Σ_{j≠k} [ qualifying_j + (1 − share) × risk_free_j ]
//!             + w_k × (market_odds_k − 1)
//!             − Σ_{j≠k} w_j
//! ```
//!
//! where `c` ranges over every bet type and `share` is the risk-free refund
//! share. Freebet stakes on losing outcomes cost nothing. The payoff is
//! linear in `w`.

use serde::Serialize;
use smallvec::SmallVec;

use crate::betting::MarketPosition;
use crate::market::{BetType, Outcome};

/// `constant + Σ coefficients_j × w_j` for one outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearPayoff {
    /// Outcome this payoff is realized on.
    pub outcome: Outcome,
    /// Payoff with no hedge placed.
    pub constant: f64,
    /// Marginal payoff per unit of hedge stake on each outcome.
    pub coefficients: SmallVec<[f64; 3]>,
}

impl LinearPayoff {
    /// Evaluate at a stake vector.
    pub fn evaluate(&self, stakes: &[f64]) -> f64 {
        self.constant
            + self
                .coefficients
                .iter()
                .zip(stakes)
                .map(|(c, w)| c * w)
                .sum::<f64>()
    }
}

/// Payoff functions over a fixed market position.
#[derive(Debug, Clone, Copy)]
pub struct PayoffModel<'a> {
    position: &'a MarketPosition,
}

impl<'a> PayoffModel<'a> {
    /// Model the payoffs of `position`.
    pub fn new(position: &'a MarketPosition) -> Self {
        Self { position }
    }

    /// Net payoff if `outcome` occurs after placing hedge `stakes`.
    ///
    /// Returns `None` when the outcome is not part of this market.
    pub fn payoff(&self, outcome: Outcome, stakes: &[f64]) -> Option<f64> {
        outcome
            .index_in(self.position.kind())
            .map(|k| self.payoff_at(k, stakes))
    }

    /// Net payoff of every outcome, in definition order.
    pub fn payoffs(&self, stakes: &[f64]) -> SmallVec<[f64; 3]> {
        (0..self.outcome_count())
            .map(|k| self.payoff_at(k, stakes))
            .collect()
    }

    /// Linear form of every outcome's payoff, in definition order.
    pub fn linear(&self) -> SmallVec<[LinearPayoff; 3]> {
        let n = self.outcome_count();
        let market_odds = self.position.market_odds().as_slice();

        self.position
            .kind()
            .outcomes()
            .iter()
            .enumerate()
            .map(|(k, outcome)| LinearPayoff {
                outcome: *outcome,
                constant: self.committed(k),
                coefficients: (0..n)
                    .map(|j| if j == k { market_odds[k] - 1.0 } else { -1.0 })
                    .collect(),
            })
            .collect()
    }

    fn outcome_count(&self) -> usize {
        self.position.kind().len()
    }

    fn payoff_at(&self, k: usize, stakes: &[f64]) -> f64 {
        let odds_k = self.position.market_odds().as_slice()[k];
        let hedge: f64 = stakes
            .iter()
            .enumerate()
            .map(|(j, w)| if j == k { w * (odds_k - 1.0) } else { -w })
            .sum();

        self.committed(k) + hedge
    }

    /// Payoff of the committed bets alone if outcome `k` occurs.
    fn committed(&self, k: usize) -> f64 {
        let qualifying = self.position.positions(BetType::QualifyingBet);
        let freebet = self.position.positions(BetType::Freebet);
        let risk_free = self.position.positions(BetType::RiskFreeBet);
        let lost_share = 1.0 - self.position.refund_policy().share_returned();

        let winnings =
            qualifying[k].net_winnings() + risk_free[k].net_winnings() + freebet[k].net_winnings();

        let losses: f64 = (0..self.outcome_count())
            .filter(|&j| j != k)
            .map(|j| qualifying[j].stake + lost_share * risk_free[j].stake)
            .sum();

        winnings - losses
    }
}
