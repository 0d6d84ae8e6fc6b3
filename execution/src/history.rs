use chrono::{NaiveDateTime, TimeDelta};
use colorbet_types::{period_id, GameMode, GamePeriod, Outcome};

use crate::draw::ResultSource;

/// Rounds shown before the first live settlement.
pub const DEFAULT_SEEDED_ROUNDS: usize = 20;

/// Settled records for the `count` rounds preceding the one current at
/// `now`, newest first.
pub fn seed_history<S: ResultSource + ?Sized>(
    now: &NaiveDateTime,
    mode: GameMode,
    count: usize,
    source: &mut S,
) -> Vec<GamePeriod> {
    let cadence = mode.cadence_secs() as i64;
    (1..=count as i64)
        .map(|i| {
            let past = *now - TimeDelta::seconds(i * cadence);
            let id = period_id(&past, mode);
            let digit = source.draw(mode, &id);
            GamePeriod::settled(id, Outcome::of(digit))
        })
        .collect()
}
