//! Opening-to-latest price movement of catalogue markets.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::catalogue::Catalogue;
use crate::domain::OddId;
use crate::prices::PriceHistory;
use crate::probs::HUNDRED;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Only markets whose latest price falls in this band are reported.
    pub price_band: RangeInclusive<f64>,
    /// Absolute percentage change above which a movement is significant.
    pub significance_pct: f64,
}
impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            price_band: 1.4..=3.3,
            significance_pct: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Rise,
    Drop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceMovement {
    pub market_name: String,
    pub odd_id: OddId,
    pub opening_price: f64,
    pub opening_timestamp: i64,
    pub latest_price: f64,
    pub latest_timestamp: i64,
    pub change_pct: f64,
    pub trend: Trend,
    pub significant: bool,
}

pub fn change_pct(opening: f64, latest: f64) -> f64 {
    (latest - opening) / opening * HUNDRED
}

/// Summarises the movement of every market with at least two observations, sorted by market
/// name.
pub fn summarise(
    catalogue: &Catalogue,
    prices: &PriceHistory,
    config: &MovementConfig,
) -> Vec<PriceMovement> {
    let mut movements = catalogue
        .markets()
        .iter()
        .filter(|market| prices.observations(&market.odd_id).len() >= 2)
        .filter_map(|market| {
            let opening = prices.opening(&market.odd_id)?;
            let latest = prices.latest(&market.odd_id)?;
            if !config.price_band.contains(&latest.price) {
                return None;
            }
            let change_pct = change_pct(opening.price, latest.price);
            Some(PriceMovement {
                market_name: market.name.clone(),
                odd_id: market.odd_id.clone(),
                opening_price: opening.price,
                opening_timestamp: opening.timestamp,
                latest_price: latest.price,
                latest_timestamp: latest.timestamp,
                change_pct,
                trend: if change_pct >= 0.0 {
                    Trend::Rise
                } else {
                    Trend::Drop
                },
                significant: change_pct.abs() > config.significance_pct,
            })
        })
        .collect::<Vec<_>>();
    movements.sort_by(|a, b| a.market_name.cmp(&b.market_name));
    movements
}
