//! The immutable market catalogue. Rules are parsed once, when the catalogue is built.

use std::ops::Index;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{OddId, Score};
use crate::file;
use crate::hash_lookup::HashLookup;
use crate::market::MarketRule;

/// A catalogue row as supplied by configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketDefinition {
    pub name: String,
    #[serde(rename = "odd")]
    pub odd_id: OddId,
    #[serde(default)]
    pub series: Option<String>,
    pub period: u8,
    /// Scorelines enumerated as winning for this market, in `h:a` form.
    #[serde(default)]
    pub scores: Vec<String>,
}

/// Position of a market within its catalogue.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarketId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Market {
    pub id: MarketId,
    pub name: String,
    pub odd_id: OddId,
    pub series: Option<String>,
    pub period: u8,
    pub rule: MarketRule,
    pub listed_scores: Vec<Score>,
}
impl Market {
    pub fn lists(&self, score: &Score) -> bool {
        self.listed_scores.contains(score)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogueError {
    #[error("malformed scoreline '{score}' listed for market '{market}'")]
    MalformedScore { market: String, score: String },

    #[error("odd id {odd_id} of market '{market}' is already taken")]
    DuplicateOddId { market: String, odd_id: OddId },

    #[error("catalogue has no markets")]
    Empty,

    #[error("cannot read catalogue: {0}")]
    Unreadable(String),
}

#[derive(Debug, Clone)]
pub struct Catalogue {
    markets: Vec<Market>,
    odd_ids: HashLookup<OddId>,
}
impl Catalogue {
    pub fn try_from_definitions(
        definitions: Vec<MarketDefinition>,
    ) -> Result<Self, CatalogueError> {
        if definitions.is_empty() {
            return Err(CatalogueError::Empty);
        }
        let mut markets = Vec::with_capacity(definitions.len());
        let mut odd_ids = HashLookup::with_capacity(definitions.len());
        for (index, definition) in definitions.into_iter().enumerate() {
            if odd_ids.contains(&definition.odd_id) {
                return Err(CatalogueError::DuplicateOddId {
                    market: definition.name,
                    odd_id: definition.odd_id,
                });
            }
            let listed_scores = definition
                .scores
                .iter()
                .map(|score| {
                    score.parse().map_err(|_| CatalogueError::MalformedScore {
                        market: definition.name.clone(),
                        score: score.clone(),
                    })
                })
                .collect::<Result<Vec<Score>, _>>()?;
            let rule = MarketRule::parse_or_unrecognized(&definition.name);
            if !rule.is_recognized() {
                warn!(
                    "market '{}' (odd {}) has an unrecognized name and will always settle as a loss",
                    definition.name, definition.odd_id
                );
            }
            odd_ids.push(definition.odd_id.clone());
            markets.push(Market {
                id: MarketId(index),
                name: definition.name,
                odd_id: definition.odd_id,
                series: definition.series,
                period: definition.period,
                rule,
                listed_scores,
            });
        }
        debug!("loaded catalogue of {} markets", markets.len());
        Ok(Self { markets, odd_ids })
    }

    /// Reads a JSON array of [`MarketDefinition`]s.
    pub fn read_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogueError> {
        let definitions: Vec<MarketDefinition> = file::read_json(path)
            .map_err(|err| CatalogueError::Unreadable(err.to_string()))?;
        Self::try_from_definitions(definitions)
    }

    /// The standard full-time catalogue.
    pub fn builtin() -> Self {
        Self::try_from_definitions(builtin_definitions())
            .unwrap_or_else(|err| panic!("built-in catalogue is invalid: {err}"))
    }

    pub fn markets(&self) -> &[Market] {
        &self.markets
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    pub fn get(&self, id: MarketId) -> Option<&Market> {
        self.markets.get(id.0)
    }

    pub fn by_odd_id(&self, odd_id: &OddId) -> Option<&Market> {
        self.odd_ids
            .index_of(odd_id)
            .map(|index| &self.markets[index])
    }

    /// Markets whose names could not be parsed into a rule.
    pub fn unrecognized(&self) -> impl Iterator<Item = &Market> {
        self.markets
            .iter()
            .filter(|market| !market.rule.is_recognized())
    }
}

impl Index<MarketId> for Catalogue {
    type Output = Market;

    fn index(&self, id: MarketId) -> &Self::Output {
        self.get(id)
            .unwrap_or_else(|| panic!("no market with id {}", id.0))
    }
}

const FULL_TIME: u8 = 3;

type BuiltinRow = (&'static str, &'static str, Option<&'static str>, &'static [&'static str]);

const BUILTIN: &[BuiltinRow] = &[
    ("Победа 1", "1", Some("2"), &["1:0", "2:0", "3:0", "2:1", "3:1", "3:2"]),
    ("Победа 2", "2", Some("2"), &["0:1", "0:2", "0:3", "1:2", "1:3", "2:3"]),
    ("Ничья", "3", Some("3"), &["0:0", "1:1", "2:2"]),
    ("1X", "4", Some("4"), &["0:0", "1:1", "2:2", "1:0", "2:0", "3:0", "2:1", "3:1", "3:2"]),
    ("2X", "5", Some("4"), &["0:0", "1:1", "2:2", "0:1", "0:2", "0:3", "1:2", "1:3", "2:3"]),
    ("12", "6", Some("6"), &["1:0", "2:0", "3:0", "2:1", "3:1", "0:1", "0:2", "0:3", "1:2", "1:3", "2:3", "3:2"]),
    ("ТБ 0.5", "7", Some("8"), &["1:1", "2:2", "1:0", "2:0", "3:0", "2:1", "3:1", "0:1", "0:2", "0:3", "1:2", "1:3", "2:3", "3:2"]),
    ("ТМ 0.5", "8", Some("9"), &["0:0"]),
    ("ТБ 1", "9", Some("10"), &["1:1", "2:2", "2:0", "3:0", "2:1", "3:1", "0:2", "0:3", "1:2", "1:3", "2:3", "3:2"]),
    ("ТМ1", "10", Some("11"), &["0:0"]),
    ("ТМ 1.5", "12", None, &["1:0", "0:0", "0:1"]),
    ("ТБ 1.5", "11", Some("12"), &["1:1", "2:2", "2:0", "3:0", "2:1", "3:1", "0:2", "0:3", "1:2", "1:3", "3:2", "2:3"]),
    ("ТБ 2", "13", Some("14"), &["2:2", "3:0", "2:1", "3:1", "0:3", "1:2", "1:3", "2:3", "3:2"]),
    ("ТМ 2", "14", Some("15"), &["0:0", "1:0", "0:1"]),
    ("ТБ 2.5", "15", Some("16"), &["2:2", "2:1", "3:1", "1:2", "1:3", "0:3", "3:0", "2:3", "3:2"]),
    ("ТМ 2.5", "16", Some("17"), &["0:0", "1:1", "1:0", "2:0", "0:1", "0:2"]),
    ("ТБ 3", "17", Some("18"), &["2:2", "3:1", "1:3", "3:2", "2:3"]),
    ("ТМ 3", "18", Some("19"), &["0:0", "1:1", "1:0", "2:0", "0:2", "0:1"]),
    ("ТБ 3.5", "19", Some("20"), &["2:2", "3:1", "1:3", "3:2", "2:3"]),
    ("ТМ 3.5", "20", Some("21"), &["0:0", "1:1", "1:0", "2:0", "3:0", "2:1", "0:1", "0:2", "0:3", "1:2"]),
    ("ИТ1Б0.5", "29", Some("43"), &["1:1", "2:2", "1:0", "2:0", "3:0", "2:1", "3:1", "1:2", "1:3", "3:2", "2:3"]),
    ("ИТ1М0.5", "30", None, &["0:0", "0:1", "0:2", "0:3"]),
    ("ИТ1Б1", "31", None, &["2:2", "2:0", "3:0", "2:1", "3:1", "3:2", "2:3"]),
    ("ИТ1М1", "32", None, &["0:0", "0:1", "0:2", "0:3"]),
    ("ИТ1Б1.5", "33", Some("47"), &["2:2", "2:0", "3:0", "2:1", "3:1", "3:2", "2:3"]),
    ("ИТ1М1.5", "34", Some("48"), &["0:0", "1:1", "1:0", "0:1", "0:2", "0:3", "1:2", "1:3"]),
    ("ИТ1М2", "36", None, &["0:0", "1:1", "1:0", "0:1", "0:2", "0:3", "1:2", "1:3"]),
    ("ИТ1М2.5", "38", Some("52"), &["0:0", "1:1", "2:2", "1:0", "2:0", "2:1", "0:1", "0:2", "0:3", "1:2", "1:3"]),
    ("ИТ2Б0.5", "51", None, &["1:1", "2:2", "2:1", "3:1", "0:1", "0:2", "0:3", "1:2", "1:3", "2:3", "3:2"]),
    ("ИТ2М0.5", "52", None, &["0:0", "1:0", "2:0", "3:0"]),
    ("ИТ2Б1", "53", None, &["2:2", "0:2", "0:3", "1:2", "1:3", "2:3", "3:2"]),
    ("ИТ2М1", "54", None, &["0:0", "1:0", "2:0", "3:0"]),
    ("ИТ2Б1.5", "55", None, &["2:2", "0:2", "0:3", "1:2", "1:3", "2:3", "3:2"]),
    ("ИТ2М1.5", "56", None, &["0:0", "1:1", "1:0", "2:0", "3:0", "2:1", "3:1", "0:1"]),
    ("ИТ2М2", "58", None, &["0:0", "1:1", "1:0", "2:0", "3:0", "2:1", "3:1", "0:1"]),
    ("ИТ2М2.5", "60", None, &["0:0", "1:1", "2:2", "1:0", "2:0", "3:0", "2:1", "3:1", "0:1", "0:2", "1:2"]),
    ("Ф1 0", "73", None, &["1:0", "2:0", "3:0", "2:1", "3:1", "3:2"]),
    ("Ф1 +1", "74", None, &["1:1", "2:2", "0:0", "1:0", "2:0", "3:0", "2:1", "3:1", "3:2"]),
    ("Ф1 -1", "75", None, &["2:0", "3:0", "3:1"]),
    ("Ф1 +1.5", "76", Some("39"), &["0:0", "1:1", "2:2", "1:0", "2:0", "3:0", "2:1", "3:1", "0:1", "1:2", "3:2"]),
    ("Ф1 -1.5", "77", Some("38"), &["2:0", "3:0", "3:1"]),
    ("Ф1 +2", "78", None, &["0:0", "1:1", "2:2", "1:0", "2:0", "3:0", "2:1", "3:1", "0:3", "3:2"]),
    ("Ф1 +2.5", "80", None, &["0:0", "1:1", "2:2", "1:0", "2:0", "3:0", "2:1", "3:1", "0:3", "3:2"]),
    ("Ф2 0", "86", None, &["0:1", "0:2", "0:3", "1:2", "1:3", "2:3"]),
    ("Ф2 +1", "87", None, &["0:1", "0:2", "0:3", "1:2", "1:3", "0:0", "1:1", "2:2", "2:3"]),
    ("Ф2 -1", "88", None, &["0:2", "0:3", "1:3"]),
    ("Ф2 +1.5", "89", None, &["0:0", "1:1", "2:2", "0:1", "0:2", "0:3", "1:2", "1:3", "1:0", "2:1", "2:3"]),
    ("Ф2 -1.5", "90", None, &["0:2", "0:3", "1:3"]),
    ("Ф2 +2", "91", None, &["0:0", "1:1", "2:2", "0:1", "0:2", "0:3", "1:2", "1:3", "1:0", "2:1", "2:3"]),
    ("Ф2 +2.5", "93", None, &["0:0", "1:1", "2:2", "0:1", "0:2", "0:3", "1:2", "1:3", "1:0", "2:0", "2:1", "3:1", "2:3"]),
    ("ОЗ Да", "99", Some("81"), &["1:1", "2:2", "2:1", "3:1", "1:2", "1:3", "3:2", "2:3"]),
    ("ОЗ Нет", "100", Some("82"), &["0:0", "1:0", "2:0", "3:0", "0:1", "0:2", "0:3"]),
    ("Результативная ничья Да", "101", None, &["1:1", "2:2"]),
    ("Результативная ничья Нет", "102", None, &["0:0"]),
];

pub fn builtin_definitions() -> Vec<MarketDefinition> {
    BUILTIN
        .iter()
        .map(|&(name, odd, series, scores)| MarketDefinition {
            name: name.to_string(),
            odd_id: OddId::from(odd),
            series: series.map(str::to_string),
            period: FULL_TIME,
            scores: scores.iter().map(|score| score.to_string()).collect(),
        })
        .collect()
}
