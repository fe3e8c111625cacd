//! Committed positions across bet types and outcomes for one market.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use strum::IntoEnumIterator;

use super::bet::{AggregatedPosition, Bet};
use crate::error::HedgeError;
use crate::market::{BetType, MarketKind, MarketOdds, Outcome};

/// Effective value of a risk-free refund paid out as freebet credit.
///
/// A freebet of stake S is worth roughly 70% of S in cash once hedged, so a
/// refund in credits only offsets that share of the lost stake.
pub const FREEBET_REFUND_SHARE: f64 = 0.7;

/// How a losing risk-free bet's stake comes back to the bettor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundPolicy {
    /// Refunded as withdrawable cash.
    #[default]
    Cash,
    /// Refunded as freebet credit.
    FreebetCredit,
}

impl RefundPolicy {
    /// Policy from the "stake returned as freebet" flag.
    pub fn from_freebet_flag(returned_as_freebet: bool) -> Self {
        if returned_as_freebet {
            RefundPolicy::FreebetCredit
        } else {
            RefundPolicy::Cash
        }
    }

    /// Share of a lost risk-free stake that counts toward the payoff.
    pub fn share_returned(&self) -> f64 {
        match self {
            RefundPolicy::Cash => 1.0,
            RefundPolicy::FreebetCredit => FREEBET_REFUND_SHARE,
        }
    }
}

/// Fixed-size aggregated positions per bet type, indexed by outcome in
/// definition order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryPositions<const N: usize> {
    /// Qualifying bets.
    pub qualifying: [AggregatedPosition; N],
    /// Freebets.
    pub freebet: [AggregatedPosition; N],
    /// Risk-free bets.
    pub risk_free: [AggregatedPosition; N],
}

impl<const N: usize> Default for CategoryPositions<N> {
    fn default() -> Self {
        Self {
            qualifying: [AggregatedPosition::EMPTY; N],
            freebet: [AggregatedPosition::EMPTY; N],
            risk_free: [AggregatedPosition::EMPTY; N],
        }
    }
}

type PerOutcome = SmallVec<[AggregatedPosition; 3]>;

/// Everything the optimizer needs about one market: committed positions,
/// the odds available for hedging, and the risk-free refund policy.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketPosition {
    market_odds: MarketOdds,
    refund_policy: RefundPolicy,
    qualifying: PerOutcome,
    freebet: PerOutcome,
    risk_free: PerOutcome,
}

impl MarketPosition {
    /// A market with nothing committed yet.
    pub fn new(market_odds: MarketOdds, refund_policy: RefundPolicy) -> Self {
        let empty: PerOutcome = SmallVec::from_elem(AggregatedPosition::EMPTY, market_odds.kind().len());
        Self {
            market_odds,
            refund_policy,
            qualifying: empty.clone(),
            freebet: empty.clone(),
            risk_free: empty,
        }
    }

    /// Replace the aggregate for one (bet type, outcome) pair.
    pub fn with_position(
        mut self,
        bet_type: BetType,
        outcome: Outcome,
        position: AggregatedPosition,
    ) -> Result<Self, HedgeError> {
        let kind = self.kind();
        let index = outcome.index_in(kind).ok_or_else(|| {
            HedgeError::InvalidInput(format!("outcome {outcome} is not part of a {kind} market"))
        })?;
        self.slot_mut(bet_type)[index] = position;
        Ok(self)
    }

    /// Build from fixed-size category arrays.
    pub fn from_categories<const N: usize>(
        positions: &CategoryPositions<N>,
        market_odds: MarketOdds,
        refund_policy: RefundPolicy,
    ) -> Result<Self, HedgeError> {
        if market_odds.kind().len() != N {
            return Err(HedgeError::InvalidInput(format!(
                "{N} positions per bet type given for a {} market",
                market_odds.kind()
            )));
        }

        Ok(Self {
            market_odds,
            refund_policy,
            qualifying: SmallVec::from_slice(&positions.qualifying),
            freebet: SmallVec::from_slice(&positions.freebet),
            risk_free: SmallVec::from_slice(&positions.risk_free),
        })
    }

    /// Aggregate a flat list of bets into a position.
    pub fn from_bets(
        bets: &[Bet],
        market_odds: MarketOdds,
        refund_policy: RefundPolicy,
    ) -> Result<Self, HedgeError> {
        let kind = market_odds.kind();
        if let Some(stray) = bets.iter().find(|b| b.outcome.index_in(kind).is_none()) {
            return Err(HedgeError::InvalidInput(format!(
                "bet on outcome {} cannot be placed in a {kind} market",
                stray.outcome
            )));
        }

        let mut position = Self::new(market_odds, refund_policy);
        for bet_type in BetType::iter() {
            for (i, outcome) in kind.outcomes().iter().enumerate() {
                position.slot_mut(bet_type)[i] = AggregatedPosition::from_bets(bets, bet_type, *outcome)?;
            }
        }
        Ok(position)
    }

    /// Market kind.
    pub fn kind(&self) -> MarketKind {
        self.market_odds.kind()
    }

    /// Odds available for the hedge wager.
    pub fn market_odds(&self) -> &MarketOdds {
        &self.market_odds
    }

    /// Risk-free refund policy.
    pub fn refund_policy(&self) -> RefundPolicy {
        self.refund_policy
    }

    /// Aggregates for one bet type, indexed by outcome.
    pub fn positions(&self, bet_type: BetType) -> &[AggregatedPosition] {
        match bet_type {
            BetType::QualifyingBet => &self.qualifying,
            BetType::Freebet => &self.freebet,
            BetType::RiskFreeBet => &self.risk_free,
        }
    }

    /// Aggregate for one (bet type, outcome) pair.
    pub fn position(&self, bet_type: BetType, outcome: Outcome) -> Option<AggregatedPosition> {
        outcome
            .index_in(self.kind())
            .map(|i| self.positions(bet_type)[i])
    }

    /// Check odds and committed aggregates are usable.
    pub fn validate(&self) -> Result<(), HedgeError> {
        self.market_odds.validate()?;
        for bet_type in BetType::iter() {
            for (outcome, agg) in self.kind().outcomes().iter().zip(self.positions(bet_type)) {
                if !agg.stake.is_finite() || agg.stake < 0.0 {
                    return Err(HedgeError::InvalidInput(format!(
                        "{bet_type} stake on outcome {outcome} must be non-negative, got {}",
                        agg.stake
                    )));
                }
                if !agg.odds.is_finite() || agg.odds < 1.0 {
                    return Err(HedgeError::InvalidInput(format!(
                        "{bet_type} odds on outcome {outcome} must be at least 1.0, got {}",
                        agg.odds
                    )));
                }
            }
        }
        Ok(())
    }

    fn slot_mut(&mut self, bet_type: BetType) -> &mut PerOutcome {
        match bet_type {
            BetType::QualifyingBet => &mut self.qualifying,
            BetType::Freebet => &mut self.freebet,
            BetType::RiskFreeBet => &mut self.risk_free,
        }
    }
}

/// Serialized hedge request: current odds plus the bets already placed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HedgeRequest {
    /// Best available odds per outcome, 2 or 3 entries.
    pub market_odds: MarketOdds,
    /// Whether risk-free refunds are paid as freebet credit. Unset defers to
    /// the caller's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund_as_freebet: Option<bool>,
    /// Bets already placed.
    #[serde(default)]
    pub bets: Vec<Bet>,
}

impl HedgeRequest {
    /// Aggregate the request into a market position, with cash refunds
    /// unless the request says otherwise.
    pub fn into_position(self) -> Result<MarketPosition, HedgeError> {
        self.into_position_or(false)
    }

    /// Aggregate the request, using `default_refund_as_freebet` when the
    /// request leaves the refund policy unset.
    pub fn into_position_or(self, default_refund_as_freebet: bool) -> Result<MarketPosition, HedgeError> {
        let refund_as_freebet = self.refund_as_freebet.unwrap_or(default_refund_as_freebet);
        MarketPosition::from_bets(
            &self.bets,
            self.market_odds,
            RefundPolicy::from_freebet_flag(refund_as_freebet),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn refund_share_by_policy() {
        assert_eq!(RefundPolicy::from_freebet_flag(false).share_returned(), 1.0);
        assert_eq!(RefundPolicy::from_freebet_flag(true).share_returned(), 0.7);
    }

    #[test]
    fn new_position_is_empty_for_every_outcome() {
        let position = MarketPosition::new(MarketOdds::three_way(2.0, 3.5, 4.0), RefundPolicy::Cash);

        assert_eq!(position.positions(BetType::Freebet).len(), 3);
        assert_eq!(
            position.position(BetType::QualifyingBet, Outcome::Draw),
            Some(AggregatedPosition::EMPTY)
        );
    }

    #[test]
    fn with_position_rejects_draw_in_two_way_market() {
        let result = MarketPosition::new(MarketOdds::two_way(2.0, 1.9), RefundPolicy::Cash).with_position(
            BetType::Freebet,
            Outcome::Draw,
            AggregatedPosition::new(10.0, 4.0),
        );

        assert!(matches!(result, Err(HedgeError::InvalidInput(_))));
    }

    #[test]
    fn from_categories_checks_arity() {
        let positions = CategoryPositions::<3>::default();
        assert!(
            MarketPosition::from_categories(&positions, MarketOdds::two_way(2.0, 2.0), RefundPolicy::Cash)
                .is_err()
        );
    }

    #[test]
    fn from_bets_groups_by_type_and_outcome() {
        let bets = vec![
            Bet::new(Outcome::One, BetType::QualifyingBet, dec!(100), dec!(2.0)),
            Bet::new(Outcome::One, BetType::QualifyingBet, dec!(100), dec!(3.0)),
            Bet::new(Outcome::Two, BetType::RiskFreeBet, dec!(50), dec!(2.2)),
        ];

        let position =
            MarketPosition::from_bets(&bets, MarketOdds::two_way(2.1, 1.9), RefundPolicy::FreebetCredit).unwrap();

        let qb = position.position(BetType::QualifyingBet, Outcome::One).unwrap();
        assert_eq!(qb.stake, 200.0);
        assert!((qb.odds - 2.5).abs() < 1e-12);
        assert_eq!(position.position(BetType::RiskFreeBet, Outcome::Two).unwrap().stake, 50.0);
        assert!(position.position(BetType::Freebet, Outcome::One).unwrap().is_empty());
        assert_eq!(position.refund_policy(), RefundPolicy::FreebetCredit);
    }

    #[test]
    fn from_bets_rejects_draw_bet_in_two_way_market() {
        let bets = vec![Bet::new(Outcome::Draw, BetType::Freebet, dec!(10), dec!(3.0))];
        assert!(MarketPosition::from_bets(&bets, MarketOdds::two_way(2.0, 2.0), RefundPolicy::Cash).is_err());
    }

    #[test]
    fn hedge_request_from_json() {
        let json = r#"{
            "market_odds": [2.1, 2.1],
            "refund_as_freebet": true,
            "bets": [
                {"outcome": "1", "bet_type": "Risk-free bet", "stake": 100, "odds": 2.5, "bookmaker": "Betsson"}
            ]
        }"#;

        let request: HedgeRequest = serde_json::from_str(json).unwrap();
        let position = request.into_position().unwrap();

        assert_eq!(position.kind(), MarketKind::TwoWay);
        assert_eq!(position.refund_policy(), RefundPolicy::FreebetCredit);
        assert_eq!(position.position(BetType::RiskFreeBet, Outcome::One).unwrap().stake, 100.0);
    }

    #[test]
    fn explicit_refund_flag_beats_default() {
        let explicit: HedgeRequest =
            serde_json::from_str(r#"{"market_odds": [2.0, 2.0], "refund_as_freebet": false}"#).unwrap();
        let unset: HedgeRequest = serde_json::from_str(r#"{"market_odds": [2.0, 2.0]}"#).unwrap();

        assert_eq!(explicit.refund_as_freebet, Some(false));
        assert_eq!(unset.refund_as_freebet, None);
        assert_eq!(
            explicit.into_position_or(true).unwrap().refund_policy(),
            RefundPolicy::Cash
        );
        assert_eq!(
            unset.clone().into_position_or(true).unwrap().refund_policy(),
            RefundPolicy::FreebetCredit
        );
        assert_eq!(unset.into_position().unwrap().refund_policy(), RefundPolicy::Cash);
    }

    #[test]
    fn validate_catches_bad_aggregates() {
        let position = MarketPosition::new(MarketOdds::two_way(2.0, 2.0), RefundPolicy::Cash)
            .with_position(BetType::QualifyingBet, Outcome::One, AggregatedPosition::new(-1.0, 2.0))
            .unwrap();
        assert!(position.validate().is_err());
    }
}
