//! Core value types shared across the crate.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use ordinalizer::Ordinal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum_macros::{EnumCount, EnumIter};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Score {
    pub home: u8,
    pub away: u8,
}
impl Score {
    pub fn new(home: u8, away: u8) -> Self {
        Self { home, away }
    }

    pub fn nil_all() -> Self {
        Self { home: 0, away: 0 }
    }

    pub fn total(&self) -> u16 {
        self.home as u16 + self.away as u16
    }

    pub fn goals(&self, side: &Side) -> u8 {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.home, self.away)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed scoreline '{0}'")]
pub struct MalformedScore(pub String);

impl FromStr for Score {
    type Err = MalformedScore;

    /// Accepts `h:a` or `h-a`, with whitespace around either token. Goal counts must be plain
    /// decimal digits without a leading zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || MalformedScore(s.to_string());
        let (home, away) = s
            .trim()
            .split_once([':', '-'])
            .ok_or_else(malformed)?;
        let home = parse_goals(home.trim()).ok_or_else(malformed)?;
        let away = parse_goals(away.trim()).ok_or_else(malformed)?;
        Ok(Self { home, away })
    }
}

fn parse_goals(token: &str) -> Option<u8> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if token.len() > 1 && token.starts_with('0') {
        return None;
    }
    token.parse().ok()
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        encoded.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}
impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

/// The bookmaker's identifier of a market, as it appears in price feeds.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OddId(pub String);

impl From<&str> for OddId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Display for OddId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Settlement of a single bet against a final score.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Ordinal, EnumCount, EnumIter, Serialize, Deserialize)]
pub enum MarketOutcome {
    Win,
    Push,
    Loss,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Over,
    Under,
}

/// A betting line, held in half-goal units so that whole and half lines compare exactly
/// against integer scores.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Line(i16);
impl Line {
    pub fn from_halves(halves: i16) -> Self {
        Self(halves)
    }

    pub fn halves(&self) -> i16 {
        self.0
    }

    pub fn is_whole(&self) -> bool {
        self.0 % 2 == 0
    }

    pub fn value(&self) -> f64 {
        self.0 as f64 / 2.0
    }
}

impl Display for Line {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_whole() {
            write!(f, "{}", self.0 / 2)
        } else {
            write!(f, "{:.1}", self.value())
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported line '{0}'")]
pub struct UnsupportedLine(pub String);

impl FromStr for Line {
    type Err = UnsupportedLine;

    /// Parses an optionally signed decimal such as `2`, `+1`, `-1.5` or `0.50`. Only whole and
    /// half lines are supported.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unsupported = || UnsupportedLine(s.to_string());
        let (negative, unsigned) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        let all_digits = |token: &str| token.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
            return Err(unsupported());
        }
        if unsigned.ends_with('.') {
            return Err(unsupported());
        }
        let whole: i16 = whole.parse().map_err(|_| unsupported())?;
        let fraction = fraction.trim_end_matches('0');
        let half = match fraction {
            "" => 0,
            "5" => 1,
            _ => return Err(unsupported()),
        };
        let halves = whole
            .checked_mul(2)
            .and_then(|doubled| doubled.checked_add(half))
            .ok_or_else(unsupported)?;
        Ok(Self(if negative { -halves } else { halves }))
    }
}
