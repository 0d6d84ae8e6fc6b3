//! Colorbet execution layer.
//!
//! This crate owns the mutable side of the game: the round clock, result
//! draws, settlement and the wallet request queue. Screens talk to it through
//! [`Store::dispatch`] and read back through [`views`].
//!
//! ## Time
//! Nothing in this crate reads the clock on its own. Every operation takes
//! the local wall-clock instant it should act at, so a whole session can be
//! replayed from a list of `(Intent, NaiveDateTime)` pairs and a seed.
//! [`local_now`] is the one helper that reads the host clock, for binaries.
//!
//! ## Minimal session
//! ```rust,ignore
//! use colorbet_execution::{draw::SeededDraw, local_now, Intent, Store};
//!
//! let mut store = Store::new(&local_now(), SeededDraw::new(42));
//! loop {
//!     for event in store.dispatch(Intent::Tick, &local_now())? {
//!         println!("{event:?}");
//!     }
//!     std::thread::sleep(std::time::Duration::from_secs(1));
//! }
//! ```

use chrono::{Local, NaiveDateTime};
use colorbet_types::{period_id, GameMode, PeriodId};

pub mod draw;
pub mod history;
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
pub mod round_scheduler;
pub mod store;
pub mod views;

pub use draw::{FixedDraw, ResultSource, SeededDraw};
pub use round_scheduler::{PhaseConfig, RoundScheduler};
pub use store::{AppState, Event, Intent, Store, StoreError};

/// Current local wall-clock time.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Id of the round of `mode` that is live right now.
pub fn current_period_id(mode: GameMode) -> PeriodId {
    period_id(&local_now(), mode)
}
