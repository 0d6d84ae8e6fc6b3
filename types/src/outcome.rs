//! Classification of a drawn result digit.
//!
//! Colours follow a fixed table rather than parity: 0 and 5 are the dual
//! colour numbers, the other eight split evenly between green and red.
//!
//! | digit | colours        | size  |
//! |-------|----------------|-------|
//! | 0     | red, violet    | small |
//! | 1,3   | green          | small |
//! | 2,4   | red            | small |
//! | 5     | green, violet  | big   |
//! | 7,9   | green          | big   |
//! | 6,8   | red            | big   |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::InvalidArgument;

/// Green digits other than the dual-colour 5.
const GREEN_DIGITS: [u8; 4] = [1, 3, 7, 9];

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Green,
    Violet,
}

impl Color {
    pub const fn as_str(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Violet => "violet",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Color {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "violet" => Ok(Color::Violet),
            _ => Err(InvalidArgument::UnknownChoice(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    Big,
    Small,
}

impl Size {
    pub fn of(digit: Digit) -> Self {
        if digit.get() >= 5 {
            Size::Big
        } else {
            Size::Small
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Size::Big => "big",
            Size::Small => "small",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Size {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "big" => Ok(Size::Big),
            "small" => Ok(Size::Small),
            _ => Err(InvalidArgument::UnknownChoice(s.to_string())),
        }
    }
}

/// A result digit, always within `0..=9`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Digit(u8);

impl Digit {
    pub const MAX: u8 = 9;

    pub fn new(value: u8) -> Result<Self, InvalidArgument> {
        if value > Self::MAX {
            return Err(InvalidArgument::DigitOutOfRange(value as u32));
        }
        Ok(Self(value))
    }

    /// The last decimal digit of `value`.
    pub const fn wrapping(value: u8) -> Self {
        Self(value % 10)
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// All ten digits in ascending order.
    pub fn all() -> impl Iterator<Item = Digit> {
        (0..=Self::MAX).map(Digit)
    }
}

impl TryFrom<u8> for Digit {
    type Error = InvalidArgument;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Digit::new(value)
    }
}

impl From<Digit> for u8 {
    fn from(value: Digit) -> Self {
        value.0
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four colour sets a digit can map to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Color>", into = "Vec<Color>")]
pub enum ColorSet {
    RedViolet,
    GreenViolet,
    Green,
    Red,
}

impl ColorSet {
    pub const fn colors(self) -> &'static [Color] {
        match self {
            ColorSet::RedViolet => &[Color::Red, Color::Violet],
            ColorSet::GreenViolet => &[Color::Green, Color::Violet],
            ColorSet::Green => &[Color::Green],
            ColorSet::Red => &[Color::Red],
        }
    }

    pub fn contains(self, color: Color) -> bool {
        self.colors().contains(&color)
    }

    pub fn of(digit: Digit) -> Self {
        match digit.get() {
            0 => ColorSet::RedViolet,
            5 => ColorSet::GreenViolet,
            d if GREEN_DIGITS.contains(&d) => ColorSet::Green,
            _ => ColorSet::Red,
        }
    }
}

impl From<ColorSet> for Vec<Color> {
    fn from(value: ColorSet) -> Self {
        value.colors().to_vec()
    }
}

impl TryFrom<Vec<Color>> for ColorSet {
    type Error = InvalidArgument;

    fn try_from(mut value: Vec<Color>) -> Result<Self, Self::Error> {
        value.sort();
        value.dedup();
        match value.as_slice() {
            [Color::Red, Color::Violet] => Ok(ColorSet::RedViolet),
            [Color::Green, Color::Violet] => Ok(ColorSet::GreenViolet),
            [Color::Green] => Ok(ColorSet::Green),
            [Color::Red] => Ok(ColorSet::Red),
            other => Err(InvalidArgument::InvalidColorSet(
                other.iter().map(|c| c.to_string()).collect(),
            )),
        }
    }
}

impl fmt::Display for ColorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, color) in self.colors().iter().enumerate() {
            if idx > 0 {
                f.write_str("+")?;
            }
            write!(f, "{color}")?;
        }
        Ok(())
    }
}

/// Full classification of a settled round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Outcome {
    pub digit: Digit,
    pub colors: ColorSet,
    pub size: Size,
}

impl Outcome {
    pub fn of(digit: Digit) -> Self {
        Self {
            digit,
            colors: ColorSet::of(digit),
            size: Size::of(digit),
        }
    }
}

pub fn result_colors(number: u8) -> Result<ColorSet, InvalidArgument> {
    Digit::new(number).map(ColorSet::of)
}

pub fn result_size(number: u8) -> Result<Size, InvalidArgument> {
    Digit::new(number).map(Size::of)
}

/// Colours and size for a drawn number; fails on anything outside `0..=9`.
pub fn classify_result(number: u8) -> Result<Outcome, InvalidArgument> {
    Digit::new(number).map(Outcome::of)
}

/// Visual token for a result badge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStyle {
    Neutral,
    RedViolet,
    GreenViolet,
    Green,
    Red,
}

impl DisplayStyle {
    pub const fn css_class(self) -> &'static str {
        match self {
            DisplayStyle::Neutral => "bg-slate-700",
            DisplayStyle::RedViolet => "bg-gradient-to-r from-red-500 to-violet-500",
            DisplayStyle::GreenViolet => "bg-gradient-to-r from-green-500 to-violet-500",
            DisplayStyle::Green => "bg-emerald-500",
            DisplayStyle::Red => "bg-rose-500",
        }
    }
}

impl From<ColorSet> for DisplayStyle {
    fn from(value: ColorSet) -> Self {
        match value {
            ColorSet::RedViolet => DisplayStyle::RedViolet,
            ColorSet::GreenViolet => DisplayStyle::GreenViolet,
            ColorSet::Green => DisplayStyle::Green,
            ColorSet::Red => DisplayStyle::Red,
        }
    }
}

/// Style for a possibly-unsettled round.
pub fn display_style(colors: Option<ColorSet>) -> DisplayStyle {
    colors.map_or(DisplayStyle::Neutral, DisplayStyle::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_table() {
        let expected = [
            (0, ColorSet::RedViolet),
            (1, ColorSet::Green),
            (2, ColorSet::Red),
            (3, ColorSet::Green),
            (4, ColorSet::Red),
            (5, ColorSet::GreenViolet),
            (6, ColorSet::Red),
            (7, ColorSet::Green),
            (8, ColorSet::Red),
            (9, ColorSet::Green),
        ];
        for (number, colors) in expected {
            assert_eq!(result_colors(number), Ok(colors), "digit {number}");
        }
    }

    #[test]
    fn test_size_threshold() {
        for n in 0..=4 {
            assert_eq!(result_size(n), Ok(Size::Small));
        }
        for n in 5..=9 {
            assert_eq!(result_size(n), Ok(Size::Big));
        }
    }

    #[test]
    fn test_classify_scenarios() {
        let zero = classify_result(0).unwrap();
        assert_eq!(zero.colors.colors(), &[Color::Red, Color::Violet]);
        assert_eq!(zero.size, Size::Small);

        let five = classify_result(5).unwrap();
        assert_eq!(five.colors.colors(), &[Color::Green, Color::Violet]);
        assert_eq!(five.size, Size::Big);

        let seven = classify_result(7).unwrap();
        assert_eq!(seven.colors.colors(), &[Color::Green]);
        assert_eq!(seven.size, Size::Big);
    }

    #[test]
    fn test_out_of_range_fails() {
        assert_eq!(classify_result(10), Err(InvalidArgument::DigitOutOfRange(10)));
        assert_eq!(result_colors(255), Err(InvalidArgument::DigitOutOfRange(255)));
        assert!(result_size(42).is_err());
        assert!(Digit::new(10).is_err());
    }

    #[test]
    fn test_display_style_one_per_set() {
        assert_eq!(display_style(None), DisplayStyle::Neutral);
        let mut seen = Vec::new();
        for digit in Digit::all() {
            let style = display_style(Some(ColorSet::of(digit)));
            assert_ne!(style, DisplayStyle::Neutral);
            if !seen.contains(&style) {
                seen.push(style);
            }
        }
        assert_eq!(seen.len(), 4);
        assert_eq!(
            display_style(result_colors(0).ok()).css_class(),
            "bg-gradient-to-r from-red-500 to-violet-500"
        );
        assert_eq!(display_style(result_colors(8).ok()).css_class(), "bg-rose-500");
    }

    #[test]
    fn test_color_set_serde() {
        let json = serde_json::to_string(&ColorSet::RedViolet).unwrap();
        assert_eq!(json, r#"["red","violet"]"#);
        let parsed: ColorSet = serde_json::from_str(r#"["violet","green"]"#).unwrap();
        assert_eq!(parsed, ColorSet::GreenViolet);
        assert!(serde_json::from_str::<ColorSet>(r#"["red","green"]"#).is_err());
        assert!(serde_json::from_str::<ColorSet>("[]").is_err());
    }

    #[test]
    fn test_digit_serde_rejects_out_of_range() {
        assert_eq!(serde_json::from_str::<Digit>("7").unwrap().get(), 7);
        assert!(serde_json::from_str::<Digit>("12").is_err());
    }
}
