use thiserror::Error as ThisError;

/// Rejected input to one of the calculator functions.
///
/// The calculator never substitutes a default for a bad input: a silently
/// wrong period label or colour would corrupt round bookkeeping.
#[derive(Clone, Debug, ThisError, PartialEq, Eq)]
pub enum InvalidArgument {
    #[error("unknown game mode: {0:?}")]
    UnknownMode(String),
    #[error("result digit out of range (got={0}, max=9)")]
    DigitOutOfRange(u32),
    #[error("round index out of range (got={got}, max={max})")]
    RoundIndexOutOfRange { got: u32, max: u32 },
    #[error("malformed period id: {0:?}")]
    MalformedPeriodId(String),
    #[error("unknown bet choice: {0:?}")]
    UnknownChoice(String),
    #[error("not a valid colour set: {0:?}")]
    InvalidColorSet(Vec<String>),
}

#[derive(Clone, Debug, ThisError, PartialEq, Eq)]
pub enum GameError {
    #[error("period {0} is already settled")]
    AlreadySettled(String),
    #[error("bet {0} is already settled")]
    BetAlreadySettled(String),
}
