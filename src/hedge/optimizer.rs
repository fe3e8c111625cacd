//! Master calculator: profit-maximizing hedge stakes across every committed
//! bet type and bookmaker.
//!
//! The hedge stakes `w` maximize `payoff_1(w)` subject to every outcome's
//! payoff being equal and `w >= 0`. When the market odds leave the bookmaker
//! an edge (RTP < 1) that program is bounded. When RTP >= 1 the equal-payoff
//! line grows without bound, so the outcome with the highest unhedged payoff
//! is pinned to a zero stake before solving.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, instrument, warn};

use super::payoff::PayoffModel;
use super::rtp::is_arbitrage;
use super::solver::{Bound, LinearProgram, SolverOptions};
use crate::betting::{CategoryPositions, MarketPosition, RefundPolicy};
use crate::error::{HedgeError, OptimizerError};
use crate::market::{MarketKind, MarketOdds, Outcome};
use crate::metrics;

/// Which side of the RTP = 1 boundary the market odds fall on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "branch", rename_all = "snake_case")]
pub enum MarketBranch {
    /// RTP < 1: plain equal-payoff maximization.
    Normal,
    /// RTP >= 1: no hedge on the dominant outcome.
    Arbitrage {
        /// Outcome with the highest payoff before hedging.
        dominant: Outcome,
    },
}

/// Whole-unit hedge stakes, one per outcome in definition order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HedgeStakeVector(SmallVec<[u64; 3]>);

impl HedgeStakeVector {
    /// Truncate raw solver stakes toward zero.
    pub fn truncate(raw: &[f64]) -> Self {
        Self(raw.iter().map(|w| w.max(0.0).trunc() as u64).collect())
    }

    /// Stakes in definition order.
    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    /// Fixed-size copy, if the length matches.
    pub fn to_array<const N: usize>(&self) -> Option<[u64; N]> {
        self.0.as_slice().try_into().ok()
    }

    /// Total amount to wager.
    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }
}

/// Result of a master calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HedgeRecommendation {
    /// Market kind.
    pub kind: MarketKind,
    /// Recommended whole-unit stakes.
    pub stakes: HedgeStakeVector,
    /// Untruncated solver stakes.
    pub raw_stakes: SmallVec<[f64; 3]>,
    /// Return-to-player of the hedge odds.
    pub return_to_player: f64,
    /// Branch taken.
    pub branch: MarketBranch,
    /// Payoff per outcome at the raw stakes.
    pub payoffs: SmallVec<[f64; 3]>,
    /// Simplex pivots used.
    pub iterations: usize,
}

impl HedgeRecommendation {
    /// Recommended stake on one outcome.
    pub fn stake(&self, outcome: Outcome) -> Option<u64> {
        outcome
            .index_in(self.kind)
            .and_then(|i| self.stakes.as_slice().get(i).copied())
    }

    /// Worst-case payoff at the raw stakes.
    pub fn guaranteed_payoff(&self) -> f64 {
        self.payoffs.iter().copied().fold(f64::INFINITY, f64::min)
    }
}

/// Index of the first maximal entry.
///
/// Fails when no entry equals the maximum, which only happens when every
/// payoff is NaN.
pub fn dominant_index(payoffs: &[f64]) -> Result<usize, OptimizerError> {
    let max = payoffs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    payoffs.iter().position(|p| *p == max).ok_or_else(|| {
        OptimizerError::OptimizerInternal(format!(
            "no maximal zero-hedge payoff among {payoffs:?}"
        ))
    })
}

/// Profit-maximizing hedge calculator.
#[derive(Debug, Clone, Copy, Default)]
pub struct MasterCalculator {
    options: SolverOptions,
}

impl MasterCalculator {
    /// Create a calculator with the given solver options.
    pub fn new(options: SolverOptions) -> Self {
        Self { options }
    }

    /// Solver options in use.
    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Compute the hedge stakes for `position`.
    #[instrument(skip(self, position), fields(kind = %position.kind()))]
    pub fn solve(&self, position: &MarketPosition) -> Result<HedgeRecommendation, OptimizerError> {
        let _timer = metrics::timer_hedge_solve();
        let kind = position.kind();
        let model = PayoffModel::new(position);
        let linear = model.linear();
        let rtp = position.market_odds().return_to_player();

        let (reference, others) = linear.split_first().ok_or_else(|| {
            OptimizerError::OptimizerInternal("market has no outcomes".to_string())
        })?;

        // Maximize payoff_1; the equality rows force every payoff to match it.
        let objective = reference.coefficients.iter().map(|c| -c).collect();
        let mut program = LinearProgram::minimize(objective);
        for other in others {
            let row = reference
                .coefficients
                .iter()
                .zip(&other.coefficients)
                .map(|(a, b)| a - b)
                .collect();
            program = program.subject_to(row, other.constant - reference.constant);
        }

        let branch = if !is_arbitrage(position.market_odds().as_slice()) {
            MarketBranch::Normal
        } else {
            let unhedged: SmallVec<[f64; 3]> = linear.iter().map(|p| p.constant).collect();
            let index = dominant_index(&unhedged)?;
            let dominant = kind.outcomes()[index];
            debug!(rtp, %dominant, ?unhedged, "odds admit arbitrage, pinning dominant outcome");
            metrics::inc_arbitrage_branch();
            program = program.with_bound(index, Bound::fixed(0.0));
            MarketBranch::Arbitrage { dominant }
        };

        let solution = program.solve(&self.options).map_err(|e| {
            warn!(rtp, error = %e, "master calculation failed");
            metrics::inc_optimizer_failures();
            e
        })?;

        let raw_stakes: SmallVec<[f64; 3]> = solution.x.iter().copied().collect();
        let stakes = HedgeStakeVector::truncate(&raw_stakes);
        let payoffs = model.payoffs(&raw_stakes);

        metrics::inc_hedges_computed(&kind.to_string());
        metrics::record_solver_iterations(solution.iterations);
        debug!(rtp, ?branch, ?raw_stakes, ?payoffs, "hedge computed");

        Ok(HedgeRecommendation {
            kind,
            stakes,
            raw_stakes,
            return_to_player: rtp,
            branch,
            payoffs,
            iterations: solution.iterations,
        })
    }
}

fn master_calculator<const N: usize>(
    positions: &CategoryPositions<N>,
    market_odds: MarketOdds,
    refund_as_freebet: bool,
) -> Result<[u64; N], HedgeError> {
    let position = MarketPosition::from_categories(
        positions,
        market_odds,
        RefundPolicy::from_freebet_flag(refund_as_freebet),
    )?;
    let recommendation = MasterCalculator::default().solve(&position)?;

    recommendation.stakes.to_array().ok_or_else(|| {
        OptimizerError::OptimizerInternal(format!(
            "expected {N} stakes, solver returned {}",
            recommendation.stakes.as_slice().len()
        ))
        .into()
    })
}

/// Hedge stakes `[outcome 1, outcome 2]` for a two-way market.
pub fn master_calculator_2way(
    positions: &CategoryPositions<2>,
    market_odds: [f64; 2],
    refund_as_freebet: bool,
) -> Result<[u64; 2], HedgeError> {
    let [odds_1, odds_2] = market_odds;
    master_calculator(positions, MarketOdds::two_way(odds_1, odds_2), refund_as_freebet)
}

/// Hedge stakes `[outcome 1, outcome X, outcome 2]` for a three-way market.
pub fn master_calculator_3way(
    positions: &CategoryPositions<3>,
    market_odds: [f64; 3],
    refund_as_freebet: bool,
) -> Result<[u64; 3], HedgeError> {
    let [odds_1, odds_x, odds_2] = market_odds;
    master_calculator(
        positions,
        MarketOdds::three_way(odds_1, odds_x, odds_2),
        refund_as_freebet,
    )
}
