use serde::{Deserialize, Serialize};

use crate::{ColorSet, GameError, GameMode, Outcome, PeriodId, Size};

/// Maximum settled rounds kept per mode.
pub const HISTORY_LIMIT: usize = 100;

/// A round record: pending until its result is drawn, immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamePeriod {
    pub period_id: PeriodId,
    result: Option<Outcome>,
}

impl GamePeriod {
    pub fn pending(period_id: PeriodId) -> Self {
        Self {
            period_id,
            result: None,
        }
    }

    pub fn settled(period_id: PeriodId, outcome: Outcome) -> Self {
        Self {
            period_id,
            result: Some(outcome),
        }
    }

    /// Record the drawn result. A round is settled exactly once.
    pub fn settle(&mut self, outcome: Outcome) -> Result<(), GameError> {
        if self.result.is_some() {
            return Err(GameError::AlreadySettled(self.period_id.to_string()));
        }
        self.result = Some(outcome);
        Ok(())
    }

    pub fn is_settled(&self) -> bool {
        self.result.is_some()
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.result.as_ref()
    }

    pub fn result_number(&self) -> Option<u8> {
        self.result.map(|o| o.digit.get())
    }

    pub fn result_color(&self) -> Option<ColorSet> {
        self.result.map(|o| o.colors)
    }

    pub fn result_size(&self) -> Option<Size> {
        self.result.map(|o| o.size)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoundPhase {
    /// Bets accepted.
    Active,
    /// Inside the lock window before the boundary.
    Locked,
    /// Result drawn on this tick; the next round has begun.
    Result,
}

/// Live state of one mode as seen by the views.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub mode: GameMode,
    pub current_period_id: PeriodId,
    pub time_left: u32,
    pub phase: RoundPhase,
    /// Settled rounds, newest first.
    pub history: Vec<GamePeriod>,
}

impl GameState {
    pub fn new(mode: GameMode, current_period_id: PeriodId, time_left: u32) -> Self {
        Self {
            mode,
            current_period_id,
            time_left,
            phase: RoundPhase::Active,
            history: Vec::new(),
        }
    }

    pub fn push_history(&mut self, period: GamePeriod) {
        self.history.insert(0, period);
        self.history.truncate(HISTORY_LIMIT);
    }

    pub fn latest(&self) -> Option<&GamePeriod> {
        self.history.first()
    }
}
