//! Outcome and bet-type vocabulary for two-way and three-way markets.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::HedgeError;

/// A single market result.
///
/// Two-way markets use `One` and `Two`; three-way markets add `Draw` between
/// them. Definition order is always 1, X, 2.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Outcome {
    /// Home win / first outcome.
    #[strum(to_string = "1", serialize = "home")]
    #[serde(rename = "1", alias = "home")]
    One,
    /// Draw (three-way markets only).
    #[strum(to_string = "X", serialize = "draw")]
    #[serde(rename = "X", alias = "x", alias = "draw")]
    Draw,
    /// Away win / second outcome.
    #[strum(to_string = "2", serialize = "away")]
    #[serde(rename = "2", alias = "away")]
    Two,
}

impl Outcome {
    /// Position of this outcome in the stake vector of `kind`, if it belongs
    /// to that market.
    pub fn index_in(&self, kind: MarketKind) -> Option<usize> {
        kind.outcomes().iter().position(|o| o == self)
    }
}

/// Number of mutually exclusive outcomes in a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum MarketKind {
    /// Outcomes 1 and 2.
    #[strum(to_string = "2-way")]
    TwoWay,
    /// Outcomes 1, X and 2.
    #[strum(to_string = "3-way")]
    ThreeWay,
}

impl MarketKind {
    const TWO_WAY: [Outcome; 2] = [Outcome::One, Outcome::Two];
    const THREE_WAY: [Outcome; 3] = [Outcome::One, Outcome::Draw, Outcome::Two];

    /// Outcomes in definition order.
    pub fn outcomes(&self) -> &'static [Outcome] {
        match self {
            MarketKind::TwoWay => &Self::TWO_WAY,
            MarketKind::ThreeWay => &Self::THREE_WAY,
        }
    }

    /// Number of outcomes.
    pub fn len(&self) -> usize {
        self.outcomes().len()
    }

    /// Market kind with `n` outcomes.
    pub fn from_len(n: usize) -> Option<Self> {
        match n {
            2 => Some(MarketKind::TwoWay),
            3 => Some(MarketKind::ThreeWay),
            _ => None,
        }
    }
}

/// Category of an already-placed bookmaker bet.
///
/// Determines how the committed stake contributes to each outcome's payoff.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(try_from = "String", into = "String")]
#[strum(ascii_case_insensitive)]
pub enum BetType {
    /// Stake is at risk and returned with winnings on a win.
    #[strum(to_string = "Qualifying bet", serialize = "QB", serialize = "qualifying")]
    QualifyingBet,
    /// Stake is not at risk; only net winnings are paid.
    #[strum(to_string = "Freebet", serialize = "FB", serialize = "free bet")]
    Freebet,
    /// Net winnings on a win, (part of) the stake refunded on a loss.
    #[strum(to_string = "Risk-free bet", serialize = "RFB", serialize = "risk free bet")]
    RiskFreeBet,
}

impl BetType {
    /// Parse a user-facing label or alias.
    pub fn parse_label(value: &str) -> Result<Self, HedgeError> {
        value
            .trim()
            .parse()
            .map_err(|_: strum::ParseError| HedgeError::InvalidBetType {
                value: value.to_string(),
            })
    }

    /// Whether the stake itself is returned on a win.
    pub fn returns_stake(&self) -> bool {
        matches!(self, BetType::QualifyingBet)
    }
}

impl TryFrom<String> for BetType {
    type Error = HedgeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        BetType::parse_label(&value)
    }
}

impl From<BetType> for String {
    fn from(bet_type: BetType) -> Self {
        bet_type.to_string()
    }
}
