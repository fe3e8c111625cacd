//! Return-to-player of a set of market odds.
//!
//! `RTP = 1 / Σ 1/odds_i`. Below 1.0 the bookmaker keeps an edge; at or
//! above 1.0 the combined odds admit an arbitrage.

/// Return-to-player over any number of outcomes.
pub fn return_to_player(odds: &[f64]) -> f64 {
    1.0 / odds.iter().map(|o| 1.0 / o).sum::<f64>()
}

/// Return-to-player of a two-way market.
pub fn return_to_player_2way(odds_1: f64, odds_2: f64) -> f64 {
    return_to_player(&[odds_1, odds_2])
}

/// Return-to-player of a three-way market.
pub fn return_to_player_3way(odds_1: f64, odds_x: f64, odds_2: f64) -> f64 {
    return_to_player(&[odds_1, odds_x, odds_2])
}

/// Whether the odds leave no bookmaker edge.
pub fn is_arbitrage(odds: &[f64]) -> bool {
    return_to_player(odds) >= 1.0
}
