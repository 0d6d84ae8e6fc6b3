//! Common types for colorbet.
//!
//! The period/outcome calculator lives here: [`period_id`] labels the round
//! that is current at a local wall-clock instant and [`classify_result`] maps
//! a drawn digit to its colours and size. Both are pure and safe to call from
//! any number of threads.

pub mod account;
pub mod bet;
mod error;
pub mod format;
pub mod game;
pub mod outcome;
pub mod period;

pub use account::{
    generate_uid, validate_name, AccountInvariantError, ReferralTier, Settings, Transaction,
    TransactionStatus, TransactionType, User, UserRole, WithdrawalDetails, WithdrawalMethod,
    AMOUNT_STEP, MAX_NAME_LENGTH, QUICK_AMOUNTS, REFERRAL_TIERS,
};
pub use bet::{Bet, BetChoice, BetStatus, BetType};
pub use error::{GameError, InvalidArgument};
pub use format::{format_countdown, format_inr, mask_mobile};
pub use game::{GamePeriod, GameState, RoundPhase, HISTORY_LIMIT};
pub use outcome::{
    classify_result, display_style, result_colors, result_size, Color, ColorSet, Digit,
    DisplayStyle, Outcome, Size,
};
pub use period::{period_id, round_index, time_left_secs, GameMode, PeriodId, MAX_ROUND_INDEX};
