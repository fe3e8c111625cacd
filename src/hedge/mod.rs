//! Hedge-stake calculation.
//!
//! - [`simple`]: closed-form hedges for a single bet, plus exchange lay stakes
//! - [`rtp`]: return-to-player of market odds
//! - [`payoff`]: per-outcome payoff of a whole position
//! - [`solver`]: small linear-program solver
//! - [`optimizer`]: the master calculator combining all of the above

pub mod optimizer;
pub mod payoff;
pub mod rtp;
pub mod simple;
pub mod solver;

pub use optimizer::{
    dominant_index, master_calculator_2way, master_calculator_3way, HedgeRecommendation,
    HedgeStakeVector, MarketBranch, MasterCalculator,
};
pub use payoff::{LinearPayoff, PayoffModel};
pub use rtp::{is_arbitrage, return_to_player, return_to_player_2way, return_to_player_3way};
pub use simple::{
    freebet_2way, freebet_3way, hedge_2way, hedge_3way, lay_stake, qualifying_bet_2way,
    qualifying_bet_3way, risk_free_bet_2way, risk_free_bet_3way, DEFAULT_EXCHANGE_FEE,
};
pub use solver::{Bound, LinearProgram, Solution, SolverOptions};
