//! Market rules: parsing bookmaker market names into a structured rule, and settling a
//! scoreline against that rule.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::domain::{Direction, Line, MarketOutcome, Score, Side};

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Moneyline {
    Home,
    Draw,
    Away,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoubleChance {
    HomeOrDraw,
    HomeOrAway,
    AwayOrDraw,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketRule {
    Moneyline(Moneyline),
    DoubleChance(DoubleChance),
    Total(Direction, Line),
    TeamTotal(Side, Direction, Line),
    Handicap(Side, Line),
    BothTeamsScore(bool),
    ScoringDraw(bool),
    /// A name that matches none of the known forms. Always settles as a loss.
    Unrecognized(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized market '{0}'")]
pub struct UnrecognizedMarket(pub String);

const OVER: &str = "Б";
const UNDER: &str = "М";
const TOTAL: &str = "Т";
const TEAM_TOTAL: &str = "ИТ";
const HANDICAP: &str = "Ф";

impl FromStr for MarketRule {
    type Err = UnrecognizedMarket;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let rule = match name {
            "Победа 1" => Some(MarketRule::Moneyline(Moneyline::Home)),
            "Победа 2" => Some(MarketRule::Moneyline(Moneyline::Away)),
            "Ничья" => Some(MarketRule::Moneyline(Moneyline::Draw)),
            "1X" => Some(MarketRule::DoubleChance(DoubleChance::HomeOrDraw)),
            "12" => Some(MarketRule::DoubleChance(DoubleChance::HomeOrAway)),
            "2X" => Some(MarketRule::DoubleChance(DoubleChance::AwayOrDraw)),
            "ОЗ Да" => Some(MarketRule::BothTeamsScore(true)),
            "ОЗ Нет" => Some(MarketRule::BothTeamsScore(false)),
            "Результативная ничья Да" => Some(MarketRule::ScoringDraw(true)),
            "Результативная ничья Нет" => Some(MarketRule::ScoringDraw(false)),
            _ => parse_team_total(name)
                .or_else(|| parse_total(name))
                .or_else(|| parse_handicap(name)),
        };
        rule.ok_or_else(|| UnrecognizedMarket(name.to_string()))
    }
}

/// `ТБ2.5`, `ТБ 2.5`, `ТМ1`.
fn parse_total(name: &str) -> Option<MarketRule> {
    let rest = name.strip_prefix(TOTAL)?;
    let (direction, rest) = parse_direction(rest)?;
    let rest = rest.strip_prefix(' ').unwrap_or(rest);
    let line = parse_unsigned_line(rest)?;
    Some(MarketRule::Total(direction, line))
}

/// `ИТ1Б0.5`, `ИТ2М1`.
fn parse_team_total(name: &str) -> Option<MarketRule> {
    let rest = name.strip_prefix(TEAM_TOTAL)?;
    let (side, rest) = parse_side(rest)?;
    let (direction, rest) = parse_direction(rest)?;
    let line = parse_unsigned_line(rest)?;
    Some(MarketRule::TeamTotal(side, direction, line))
}

/// `Ф1 -1`, `Ф2 +1.5`, `Ф1 (-1.5)`, `Ф2 0`.
fn parse_handicap(name: &str) -> Option<MarketRule> {
    let rest = name.strip_prefix(HANDICAP)?;
    let (side, rest) = parse_side(rest)?;
    let rest = rest.strip_prefix(' ')?;
    let rest = match rest.strip_prefix('(') {
        Some(parenthesised) => parenthesised.strip_suffix(')')?,
        None => rest,
    };
    let line = rest.parse().ok()?;
    Some(MarketRule::Handicap(side, line))
}

fn parse_side(s: &str) -> Option<(Side, &str)> {
    if let Some(rest) = s.strip_prefix('1') {
        Some((Side::Home, rest))
    } else {
        s.strip_prefix('2').map(|rest| (Side::Away, rest))
    }
}

fn parse_direction(s: &str) -> Option<(Direction, &str)> {
    if let Some(rest) = s.strip_prefix(OVER) {
        Some((Direction::Over, rest))
    } else {
        s.strip_prefix(UNDER).map(|rest| (Direction::Under, rest))
    }
}

fn parse_unsigned_line(s: &str) -> Option<Line> {
    if s.starts_with(['+', '-']) {
        return None;
    }
    s.parse().ok()
}

impl MarketRule {
    /// Parses a market name, falling back to [`MarketRule::Unrecognized`] for names that
    /// match no known form.
    pub fn parse_or_unrecognized(name: &str) -> Self {
        name.parse()
            .unwrap_or_else(|_| MarketRule::Unrecognized(name.to_string()))
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, MarketRule::Unrecognized(_))
    }

    /// Settles a final score against this rule.
    pub fn classify(&self, score: &Score) -> MarketOutcome {
        let (home, away) = (score.home, score.away);
        match self {
            MarketRule::Moneyline(Moneyline::Home) => win_if(home > away),
            MarketRule::Moneyline(Moneyline::Draw) => win_if(home == away),
            MarketRule::Moneyline(Moneyline::Away) => win_if(away > home),
            MarketRule::DoubleChance(DoubleChance::HomeOrDraw) => win_if(home >= away),
            MarketRule::DoubleChance(DoubleChance::HomeOrAway) => win_if(home != away),
            MarketRule::DoubleChance(DoubleChance::AwayOrDraw) => win_if(away >= home),
            MarketRule::Total(direction, line) => settle_total(score.total() as i32, direction, line),
            MarketRule::TeamTotal(side, direction, line) => {
                settle_total(score.goals(side) as i32, direction, line)
            }
            MarketRule::Handicap(side, line) => {
                let adjusted = 2 * score.goals(side) as i32 + line.halves() as i32;
                let opponent = 2 * score.goals(&side.opponent()) as i32;
                settle(adjusted.cmp(&opponent))
            }
            MarketRule::BothTeamsScore(yes) => win_if((home > 0 && away > 0) == *yes),
            MarketRule::ScoringDraw(yes) => win_if((home == away && home > 0) == *yes),
            MarketRule::Unrecognized(_) => MarketOutcome::Loss,
        }
    }
}

impl Display for MarketRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketRule::Moneyline(Moneyline::Home) => f.write_str("Победа 1"),
            MarketRule::Moneyline(Moneyline::Away) => f.write_str("Победа 2"),
            MarketRule::Moneyline(Moneyline::Draw) => f.write_str("Ничья"),
            MarketRule::DoubleChance(DoubleChance::HomeOrDraw) => f.write_str("1X"),
            MarketRule::DoubleChance(DoubleChance::HomeOrAway) => f.write_str("12"),
            MarketRule::DoubleChance(DoubleChance::AwayOrDraw) => f.write_str("2X"),
            MarketRule::Total(direction, line) => {
                write!(f, "{TOTAL}{} {line}", direction_token(direction))
            }
            MarketRule::TeamTotal(side, direction, line) => write!(
                f,
                "{TEAM_TOTAL}{}{}{line}",
                side_token(side),
                direction_token(direction)
            ),
            MarketRule::Handicap(side, line) => {
                if line.halves() > 0 {
                    write!(f, "{HANDICAP}{} +{line}", side_token(side))
                } else {
                    write!(f, "{HANDICAP}{} {line}", side_token(side))
                }
            }
            MarketRule::BothTeamsScore(yes) => write!(f, "ОЗ {}", yes_no(*yes)),
            MarketRule::ScoringDraw(yes) => write!(f, "Результативная ничья {}", yes_no(*yes)),
            MarketRule::Unrecognized(name) => f.write_str(name),
        }
    }
}

fn side_token(side: &Side) -> &'static str {
    match side {
        Side::Home => "1",
        Side::Away => "2",
    }
}

fn direction_token(direction: &Direction) -> &'static str {
    match direction {
        Direction::Over => OVER,
        Direction::Under => UNDER,
    }
}

fn yes_no(yes: bool) -> &'static str {
    if yes {
        "Да"
    } else {
        "Нет"
    }
}

#[inline]
fn win_if(condition: bool) -> MarketOutcome {
    if condition {
        MarketOutcome::Win
    } else {
        MarketOutcome::Loss
    }
}

#[inline]
fn settle(ordering: Ordering) -> MarketOutcome {
    match ordering {
        Ordering::Greater => MarketOutcome::Win,
        Ordering::Equal => MarketOutcome::Push,
        Ordering::Less => MarketOutcome::Loss,
    }
}

#[inline]
fn settle_total(goals: i32, direction: &Direction, line: &Line) -> MarketOutcome {
    let ordering = (2 * goals).cmp(&(line.halves() as i32));
    match direction {
        Direction::Over => settle(ordering),
        Direction::Under => settle(ordering.reverse()),
    }
}

/// Parses `name` and settles `(home, away)` against it. Unrecognized names settle as a loss
/// and are reported on every call; prefer parsing once via [`MarketRule`] when classifying
/// repeatedly.
pub fn classify_name(home: u8, away: u8, name: &str) -> MarketOutcome {
    let rule = MarketRule::parse_or_unrecognized(name);
    if !rule.is_recognized() {
        warn!("classifying against unrecognized market '{name}' as a loss");
    }
    rule.classify(&Score::new(home, away))
}
