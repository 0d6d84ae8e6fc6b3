use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{Color, Digit, GameError, GameMode, InvalidArgument, Outcome, PeriodId, Size};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BetType {
    Color,
    Number,
    Size,
}

/// What a bet is placed on. The variant is the bet type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "choice", rename_all = "UPPERCASE")]
pub enum BetChoice {
    Color(Color),
    Size(Size),
    Number(Digit),
}

impl BetChoice {
    pub fn bet_type(&self) -> BetType {
        match self {
            BetChoice::Color(_) => BetType::Color,
            BetChoice::Size(_) => BetType::Size,
            BetChoice::Number(_) => BetType::Number,
        }
    }

    pub fn wins(&self, outcome: &Outcome) -> bool {
        match self {
            BetChoice::Color(color) => outcome.colors.contains(*color),
            BetChoice::Size(size) => outcome.size == *size,
            BetChoice::Number(digit) => outcome.digit == *digit,
        }
    }
}

impl fmt::Display for BetChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetChoice::Color(color) => color.fmt(f),
            BetChoice::Size(size) => size.fmt(f),
            BetChoice::Number(digit) => digit.fmt(f),
        }
    }
}

impl FromStr for BetChoice {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(color) = s.parse::<Color>() {
            return Ok(BetChoice::Color(color));
        }
        if let Ok(size) = s.parse::<Size>() {
            return Ok(BetChoice::Size(size));
        }
        let number = s
            .trim()
            .parse::<u8>()
            .map_err(|_| InvalidArgument::UnknownChoice(s.to_string()))?;
        Digit::new(number).map(BetChoice::Number)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BetStatus {
    Pending,
    Win,
    Loss,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bet {
    pub id: String,
    pub user_id: String,
    pub mode: GameMode,
    pub period_id: PeriodId,
    pub amount: u64,
    #[serde(flatten)]
    pub choice: BetChoice,
    pub status: BetStatus,
    pub win_amount: u64,
    pub placed_at: NaiveDateTime,
}

impl Bet {
    pub fn is_pending(&self) -> bool {
        self.status == BetStatus::Pending
    }

    /// Resolve against the round outcome. `payout` is the total return on a win.
    pub fn settle(&mut self, outcome: &Outcome, payout: u64) -> Result<bool, GameError> {
        if !self.is_pending() {
            return Err(GameError::BetAlreadySettled(self.id.clone()));
        }
        let won = self.choice.wins(outcome);
        if won {
            self.status = BetStatus::Win;
            self.win_amount = payout;
        } else {
            self.status = BetStatus::Loss;
        }
        Ok(won)
    }
}
