//! Test fixtures shared by the execution tests and downstream crates
//! (enable the `mocks` feature).

use chrono::{NaiveDate, NaiveDateTime};
use colorbet_types::{Digit, User};

use crate::{draw::FixedDraw, store::Store};

/// Fixed reference day for fixtures.
pub const MOCK_DATE: (i32, u32, u32) = (2024, 1, 15);

/// Local time on [`MOCK_DATE`].
pub fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    let (year, month, day) = MOCK_DATE;
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .expect("valid mock time")
}

/// Digits for a scripted draw. Panics on values above 9.
pub fn digits(values: &[u8]) -> Vec<Digit> {
    values
        .iter()
        .map(|value| Digit::new(*value).expect("mock digit in range"))
        .collect()
}

/// A user with the given balance; the display id is derived from `id`.
pub fn create_user(id: &str, balance: u64) -> User {
    let uid = format!("{:0>6}", id.to_uppercase());
    User {
        balance,
        email: format!("{id}@example.com"),
        mobile: "9876543210".to_string(),
        ..User::new(id.to_string(), uid, format!("Player {id}"))
    }
}

/// A store at `now` whose draws replay `script`.
pub fn create_store(now: &NaiveDateTime, script: &[u8]) -> Store<FixedDraw> {
    Store::new(now, FixedDraw::new(digits(script)))
}
