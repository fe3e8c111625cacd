//! Integration tests for the matched betting calculator.
//!
//! These exercise the public API end to end: JSON request parsing, bet
//! aggregation, the simple formulas and the master calculator.

use matched_betting::betting::{AggregatedPosition, CategoryPositions, HedgeRequest};
use matched_betting::config::Config;
use matched_betting::error::{HedgeError, OptimizerError};
use matched_betting::hedge::{
    freebet_2way, master_calculator_2way, master_calculator_3way, qualifying_bet_2way,
    qualifying_bet_3way, return_to_player_2way, MarketBranch, MasterCalculator, PayoffModel,
    SolverOptions,
};
use matched_betting::market::{BetType, Outcome};
use pretty_assertions::assert_eq;

fn request(json: &str) -> HedgeRequest {
    serde_json::from_str(json).expect("valid request json")
}

#[test]
fn qualifying_bet_split_across_bookmakers() {
    let position = request(
        r#"{
            "market_odds": [3.2, 3.4, 2.5],
            "bets": [
                {"outcome": "1", "bet_type": "Qualifying bet", "stake": 50, "odds": 2.8, "bookmaker": "Unibet"},
                {"outcome": "home", "bet_type": "QB", "stake": "50", "odds": "3.2", "bookmaker": "Betsson"}
            ]
        }"#,
    )
    .into_position()
    .unwrap();

    let rec = MasterCalculator::default().solve(&position).unwrap();

    assert_eq!(rec.branch, MarketBranch::Normal);
    assert_eq!(rec.stakes.as_slice(), &[0, 88, 120]);

    // Same as hedging one 100 @ 3.0 bet with the closed form.
    let [draw, away] = qualifying_bet_3way(100.0, 3.0, 3.4, 2.5);
    assert!((rec.raw_stakes[1] - draw).abs() < 1e-6);
    assert!((rec.raw_stakes[2] - away).abs() < 1e-6);
}

#[test]
fn two_way_wrapper_matches_simple_formulas() {
    let mut qualifying = CategoryPositions::<2>::default();
    qualifying.qualifying[0] = AggregatedPosition::new(100.0, 2.0);
    assert_eq!(
        master_calculator_2way(&qualifying, [1.9, 1.9], false).unwrap(),
        [0, qualifying_bet_2way(100.0, 2.0, 1.9) as u64]
    );

    let mut freebet = CategoryPositions::<2>::default();
    freebet.freebet[0] = AggregatedPosition::new(100.0, 3.0);
    assert_eq!(
        master_calculator_2way(&freebet, [1.9, 2.0], false).unwrap(),
        [0, freebet_2way(100.0, 3.0, 2.0) as u64]
    );
}

#[test]
fn arbitrage_odds_leave_dominant_outcome_unhedged() {
    assert!(return_to_player_2way(2.1, 2.1) > 1.0);

    let mut positions = CategoryPositions::<2>::default();
    positions.qualifying[0] = AggregatedPosition::new(100.0, 2.0);

    assert_eq!(master_calculator_2way(&positions, [2.1, 2.1], false).unwrap(), [0, 95]);
}

#[test]
fn risk_free_refund_as_freebet_needs_bigger_hedge() {
    let json = r#"{
        "market_odds": [2.0, 2.0],
        "refund_as_freebet": REFUND,
        "bets": [{"outcome": "1", "bet_type": "Risk-free bet", "stake": 100, "odds": 2.5}]
    }"#;

    let solve = |refund: &str| {
        let position = request(&json.replace("REFUND", refund)).into_position().unwrap();
        MasterCalculator::default().solve(&position).unwrap()
    };

    let cash = solve("false");
    let credit = solve("true");

    assert_eq!(cash.stake(Outcome::Two), Some(75));
    assert_eq!(credit.stake(Outcome::Two), Some(90));
    assert!(credit.guaranteed_payoff() < cash.guaranteed_payoff());
}

#[test]
fn mixed_three_way_position_has_equal_non_negative_payoffs() {
    let mut positions = CategoryPositions::<3>::default();
    positions.qualifying[0] = AggregatedPosition::new(200.0, 2.6);
    positions.freebet[1] = AggregatedPosition::new(50.0, 4.0);
    positions.risk_free[2] = AggregatedPosition::new(100.0, 3.4);

    let stakes = master_calculator_3way(&positions, [2.4, 3.3, 3.1], true).unwrap();
    assert_eq!(stakes, [0, 112, 80]);

    let position = request(
        r#"{
            "market_odds": [2.4, 3.3, 3.1],
            "refund_as_freebet": true,
            "bets": [
                {"outcome": "1", "bet_type": "Qualifying bet", "stake": 200, "odds": 2.6},
                {"outcome": "X", "bet_type": "Freebet", "stake": 50, "odds": 4.0},
                {"outcome": "2", "bet_type": "Risk-free bet", "stake": 100, "odds": 3.4}
            ]
        }"#,
    )
    .into_position()
    .unwrap();
    let rec = MasterCalculator::default().solve(&position).unwrap();
    let payoffs = PayoffModel::new(&position).payoffs(&rec.raw_stakes);

    assert_eq!(rec.stakes.to_array::<3>(), Some(stakes));
    assert!(payoffs.iter().all(|p| (p - payoffs[0]).abs() < 1e-6));
    assert!(rec.raw_stakes.iter().all(|w| *w >= 0.0));
}

#[test]
fn unknown_bet_type_is_rejected_at_parse_time() {
    let err = serde_json::from_str::<HedgeRequest>(
        r#"{"market_odds": [2.0, 2.0], "bets": [{"outcome": "1", "bet_type": "Boost", "stake": 10, "odds": 2.0}]}"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("invalid bet type"));

    assert!(matches!(
        BetType::parse_label("Boost"),
        Err(HedgeError::InvalidBetType { .. })
    ));
}

#[test]
fn config_drives_solver_options() {
    let config = Config {
        hedge_max_iterations: 0,
        ..Config::default()
    };
    assert!(config.validate().is_err());

    let position = request(
        r#"{"market_odds": [1.9, 1.9], "bets": [{"outcome": "1", "bet_type": "QB", "stake": 100, "odds": 2.0}]}"#,
    )
    .into_position()
    .unwrap();

    let result = MasterCalculator::new(SolverOptions::from(&config)).solve(&position);
    assert!(matches!(result, Err(OptimizerError::OptimizationFailed { .. })));
}
