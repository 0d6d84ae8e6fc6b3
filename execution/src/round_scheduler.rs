//! Round scheduler for the fixed-cadence game modes.
//!
//! Rounds are not started or stopped by anyone: every round of a mode is a
//! bucket of local wall-clock time (see [`colorbet_types::period_id`]). The
//! scheduler only answers where an instant falls inside its bucket.
//!
//! ## Phases
//!
//! A round progresses through three phases:
//! 1. **Active** - Bets accepted
//! 2. **Locked** - The last seconds before the boundary, no new bets
//! 3. **Result** - At the boundary the digit is drawn and the round settles;
//!    the next round begins immediately
//!
//! ## Usage
//!
//! ```rust,ignore
//! use colorbet_execution::round_scheduler::{PhaseConfig, RoundScheduler};
//! use colorbet_types::GameMode;
//!
//! let scheduler = RoundScheduler::new(PhaseConfig::default());
//! let now = chrono::Local::now().naive_local();
//!
//! if scheduler.is_betting_open(&now, GameMode::Fast) {
//!     // accept the bet for period_id(&now, GameMode::Fast)
//! }
//! ```

use chrono::{NaiveDateTime, TimeDelta, Timelike};
use colorbet_types::{time_left_secs, GameMode, RoundPhase};

/// Seconds before the boundary during which betting is closed.
pub const DEFAULT_LOCK_WINDOW_SECS: u32 = 5;

/// Time left below which the countdown is highlighted.
pub const URGENT_SECS: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseConfig {
    /// Betting is open while strictly more than this many seconds remain.
    pub lock_window_secs: u32,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            lock_window_secs: DEFAULT_LOCK_WINDOW_SECS,
        }
    }
}

impl PhaseConfig {
    pub fn new(lock_window_secs: u32) -> Self {
        Self { lock_window_secs }
    }

    /// The lock window must leave some betting time in every mode.
    pub fn validate(&self) -> Result<(), &'static str> {
        let shortest = GameMode::ALL
            .iter()
            .map(|mode| mode.cadence_secs())
            .min()
            .unwrap_or_default();
        if self.lock_window_secs >= shortest {
            return Err("lock_window_secs must be shorter than the shortest round");
        }
        Ok(())
    }
}

/// Pure phase logic over the wall clock. Holds no round state.
#[derive(Clone, Debug, Default)]
pub struct RoundScheduler {
    config: PhaseConfig,
}

impl RoundScheduler {
    pub fn new(config: PhaseConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PhaseConfig {
        &self.config
    }

    /// Phase of a live round given its remaining time.
    pub fn phase_for_time_left(&self, time_left: u32) -> RoundPhase {
        if time_left > self.config.lock_window_secs {
            RoundPhase::Active
        } else {
            RoundPhase::Locked
        }
    }

    /// Phase of the round that is current at `at`. Never `Result`: that
    /// phase belongs to the boundary instant, which the store reports when
    /// it settles.
    pub fn phase_at(&self, at: &NaiveDateTime, mode: GameMode) -> RoundPhase {
        self.phase_for_time_left(time_left_secs(at, mode))
    }

    pub fn is_betting_open(&self, at: &NaiveDateTime, mode: GameMode) -> bool {
        self.phase_at(at, mode) == RoundPhase::Active
    }

    /// Fraction of the round still to run, for the timer bar.
    pub fn progress(&self, time_left: u32, mode: GameMode) -> f64 {
        time_left.min(mode.cadence_secs()) as f64 / mode.cadence_secs() as f64
    }

    pub fn is_urgent(&self, time_left: u32) -> bool {
        time_left < URGENT_SECS
    }

    /// Instant at which the round containing `at` ends (whole seconds).
    pub fn next_boundary(&self, at: &NaiveDateTime, mode: GameMode) -> NaiveDateTime {
        let truncated = *at - TimeDelta::nanoseconds(at.nanosecond() as i64);
        truncated + TimeDelta::seconds(time_left_secs(at, mode) as i64)
    }
}
