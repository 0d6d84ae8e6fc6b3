//! Round labelling for the three fixed-cadence game modes.
//!
//! A period id is a pure function of a local wall-clock timestamp and a mode:
//!
//! ```text
//! YYYYMMDD  F|S|P  NNNN
//! 20240115  F      0001
//! ```
//!
//! The trailing index is the number of whole cadences elapsed since local
//! midnight, so it resets every day and is shared by every caller that looks
//! at the same second.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::InvalidArgument;

/// Exclusive upper bound of the four-digit round index.
pub const MAX_ROUND_INDEX: u32 = 10_000;

const SECONDS_PER_DAY: u32 = 86_400;
const PERIOD_ID_LEN: usize = 13;

/// Game mode, each bound to a fixed round duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GameMode {
    Fast,
    Std,
    Pro,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Fast, GameMode::Std, GameMode::Pro];

    /// Round duration in seconds.
    pub const fn cadence_secs(self) -> u32 {
        match self {
            GameMode::Fast => 30,
            GameMode::Std => 60,
            GameMode::Pro => 180,
        }
    }

    pub const fn letter(self) -> char {
        match self {
            GameMode::Fast => 'F',
            GameMode::Std => 'S',
            GameMode::Pro => 'P',
        }
    }

    /// Name shown on the mode selector.
    pub const fn label(self) -> &'static str {
        match self {
            GameMode::Fast => "Parity (30s)",
            GameMode::Std => "Sapre (1m)",
            GameMode::Pro => "Beacon (3m)",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            GameMode::Fast => "FAST",
            GameMode::Std => "STD",
            GameMode::Pro => "PRO",
        }
    }

    /// Number of rounds in one calendar day.
    pub const fn rounds_per_day(self) -> u32 {
        SECONDS_PER_DAY / self.cadence_secs()
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<char> for GameMode {
    type Error = InvalidArgument;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'F' => Ok(GameMode::Fast),
            'S' => Ok(GameMode::Std),
            'P' => Ok(GameMode::Pro),
            other => Err(InvalidArgument::UnknownMode(other.to_string())),
        }
    }
}

impl FromStr for GameMode {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FAST" | "F" => Ok(GameMode::Fast),
            "STD" | "S" => Ok(GameMode::Std),
            "PRO" | "P" => Ok(GameMode::Pro),
            _ => Err(InvalidArgument::UnknownMode(s.to_string())),
        }
    }
}

/// Identifier of one round of one mode on one calendar day.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeriodId(String);

impl PeriodId {
    /// Build an id from its components.
    pub fn from_parts(date: NaiveDate, mode: GameMode, index: u32) -> Result<Self, InvalidArgument> {
        if index >= MAX_ROUND_INDEX {
            return Err(InvalidArgument::RoundIndexOutOfRange {
                got: index,
                max: MAX_ROUND_INDEX - 1,
            });
        }
        Ok(Self::format(date, mode, index))
    }

    fn format(date: NaiveDate, mode: GameMode, index: u32) -> Self {
        Self(format!(
            "{:04}{:02}{:02}{}{:04}",
            date.year(),
            date.month(),
            date.day(),
            mode.letter(),
            index
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn date(&self) -> NaiveDate {
        // Validated on construction.
        let year = self.0[0..4].parse().unwrap_or_default();
        let month = self.0[4..6].parse().unwrap_or_default();
        let day = self.0[6..8].parse().unwrap_or_default();
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
    }

    pub fn mode(&self) -> GameMode {
        match self.0.as_bytes()[8] {
            b'F' => GameMode::Fast,
            b'P' => GameMode::Pro,
            _ => GameMode::Std,
        }
    }

    pub fn index(&self) -> u32 {
        self.0[9..].parse().unwrap_or_default()
    }

    /// Last four characters (the zero-padded round index).
    pub fn suffix(&self) -> &str {
        &self.0[9..]
    }
}

impl fmt::Display for PeriodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PeriodId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<PeriodId> for String {
    fn from(value: PeriodId) -> Self {
        value.0
    }
}

impl TryFrom<String> for PeriodId {
    type Error = InvalidArgument;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for PeriodId {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || InvalidArgument::MalformedPeriodId(s.to_string());
        if s.len() != PERIOD_ID_LEN || !s.is_ascii() {
            return Err(malformed());
        }
        let digits = |range: std::ops::Range<usize>| -> Result<u32, InvalidArgument> {
            let part = &s[range];
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            part.parse().map_err(|_| malformed())
        };
        let year = digits(0..4)?;
        let month = digits(4..6)?;
        let day = digits(6..8)?;
        let index = digits(9..13)?;
        let letter = s[8..9].chars().next().ok_or_else(malformed)?;
        let mode = GameMode::try_from(letter).map_err(|_| malformed())?;
        let date = NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(malformed)?;
        if index >= mode.rounds_per_day() {
            return Err(InvalidArgument::RoundIndexOutOfRange {
                got: index,
                max: mode.rounds_per_day() - 1,
            });
        }
        Ok(Self::format(date, mode, index))
    }
}

fn seconds_since_midnight(at: &NaiveDateTime) -> u32 {
    // A leap second reports 86399 here, keeping every index in range.
    at.num_seconds_from_midnight()
}

/// Round index of `at` within its calendar day.
pub fn round_index(at: &NaiveDateTime, mode: GameMode) -> u32 {
    let secs = seconds_since_midnight(at);
    match mode {
        GameMode::Std => at.hour() * 60 + at.minute(),
        GameMode::Fast | GameMode::Pro => secs / mode.cadence_secs(),
    }
}

/// Label of the round that is current at `at`.
pub fn period_id(at: &NaiveDateTime, mode: GameMode) -> PeriodId {
    let index = round_index(at, mode);
    debug_assert!(index < MAX_ROUND_INDEX, "round index {index} exceeds four digits");
    PeriodId::format(at.date(), mode, index)
}

/// Seconds until the round containing `at` ends, in `1..=cadence`.
pub fn time_left_secs(at: &NaiveDateTime, mode: GameMode) -> u32 {
    let cadence = mode.cadence_secs();
    cadence - seconds_since_midnight(at) % cadence
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_period_id_scenarios() {
        assert_eq!(period_id(&at(0, 0, 0), GameMode::Fast).as_str(), "20240115F0000");
        assert_eq!(period_id(&at(0, 0, 29), GameMode::Fast).as_str(), "20240115F0000");
        assert_eq!(period_id(&at(0, 0, 30), GameMode::Fast).as_str(), "20240115F0001");
        assert_eq!(period_id(&at(0, 1, 0), GameMode::Std).as_str(), "20240115S0001");
    }

    #[test]
    fn test_last_round_of_day() {
        let last = at(23, 59, 59);
        assert_eq!(period_id(&last, GameMode::Fast).as_str(), "20240115F2879");
        assert_eq!(period_id(&last, GameMode::Std).as_str(), "20240115S1439");
        assert_eq!(period_id(&last, GameMode::Pro).as_str(), "20240115P0479");
    }

    #[test]
    fn test_pro_buckets() {
        assert_eq!(period_id(&at(0, 2, 59), GameMode::Pro).as_str(), "20240115P0000");
        assert_eq!(period_id(&at(0, 3, 0), GameMode::Pro).as_str(), "20240115P0001");
        assert_eq!(period_id(&at(12, 0, 0), GameMode::Pro).as_str(), "20240115P0240");
    }

    #[test]
    fn test_time_left() {
        assert_eq!(time_left_secs(&at(12, 0, 0), GameMode::Fast), 30);
        assert_eq!(time_left_secs(&at(12, 0, 29), GameMode::Fast), 1);
        assert_eq!(time_left_secs(&at(12, 0, 30), GameMode::Fast), 30);
        assert_eq!(time_left_secs(&at(12, 0, 59), GameMode::Std), 1);
        assert_eq!(time_left_secs(&at(12, 1, 0), GameMode::Pro), 120);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("fast".parse::<GameMode>(), Ok(GameMode::Fast));
        assert_eq!("STD".parse::<GameMode>(), Ok(GameMode::Std));
        assert_eq!(" Pro ".parse::<GameMode>(), Ok(GameMode::Pro));
        assert!(matches!(
            "turbo".parse::<GameMode>(),
            Err(InvalidArgument::UnknownMode(_))
        ));
        assert!(GameMode::try_from('X').is_err());
    }

    #[test]
    fn test_period_id_parse() {
        let id: PeriodId = "20240115F0001".parse().unwrap();
        assert_eq!(id.mode(), GameMode::Fast);
        assert_eq!(id.index(), 1);
        assert_eq!(id.suffix(), "0001");
        assert_eq!(id.date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(id, period_id(&at(0, 0, 45), GameMode::Fast));
    }

    #[test]
    fn test_period_id_parse_rejects_malformed() {
        for bad in [
            "",
            "20240115F001",
            "20240115X0001",
            "20241315F0001",
            "2024011SF0001",
            "20240115F00a1",
            "20240115F0001 ",
        ] {
            assert!(
                matches!(bad.parse::<PeriodId>(), Err(InvalidArgument::MalformedPeriodId(_))),
                "accepted {bad:?}"
            );
        }
        // Unreachable index for the mode.
        assert!(matches!(
            "20240115P0480".parse::<PeriodId>(),
            Err(InvalidArgument::RoundIndexOutOfRange { got: 480, max: 479 })
        ));
    }

    #[test]
    fn test_from_parts_rejects_wide_index() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert!(PeriodId::from_parts(date, GameMode::Fast, 9_999).is_ok());
        assert_eq!(
            PeriodId::from_parts(date, GameMode::Fast, 10_000),
            Err(InvalidArgument::RoundIndexOutOfRange { got: 10_000, max: 9_999 })
        );
    }

    #[test]
    fn test_serde_representation() {
        let id = period_id(&at(0, 0, 30), GameMode::Fast);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"20240115F0001\"");
        assert_eq!(serde_json::from_str::<PeriodId>(&json).unwrap(), id);
        assert!(serde_json::from_str::<PeriodId>("\"nope\"").is_err());
        assert_eq!(serde_json::to_string(&GameMode::Std).unwrap(), "\"STD\"");
    }
}
