//! Win/push/loss probabilities and fair prices of catalogue markets over a scoregrid.

use ordinalizer::Ordinal;
use serde::{Deserialize, Serialize};
use strum::EnumCount;
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalogue::{Catalogue, Market, MarketId};
use crate::domain::{MarketOutcome, OddId};
use crate::market::MarketRule;
use crate::probs::{clamp_pct, to_pct, HUNDRED};
use crate::scoregrid::Scoregrid;

/// Push percentages below this are treated as no push when pricing.
const PUSH_PRICING_THRESHOLD: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketResult {
    pub win_pct: f64,
    pub push_pct: f64,
    pub loss_pct: f64,
}
impl MarketResult {
    pub fn from_probs(win_prob: f64, push_prob: f64) -> Self {
        let win_pct = to_pct(win_prob);
        let push_pct = to_pct(push_prob);
        let loss_pct = clamp_pct(HUNDRED - win_pct - push_pct);
        Self {
            win_pct,
            push_pct,
            loss_pct,
        }
    }

    /// The break-even decimal price. With a material push probability, the stake returned on a
    /// push is netted out: `(100 − push) / win`.
    pub fn fair_price(&self) -> Option<f64> {
        if self.win_pct <= 0.0 {
            None
        } else if self.push_pct < PUSH_PRICING_THRESHOLD {
            Some(HUNDRED / self.win_pct)
        } else {
            Some((HUNDRED - self.push_pct) / self.win_pct)
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Serialize, Deserialize)]
#[error("market '{name}' has no chance of winning; its fair price is undefined")]
pub struct DegenerateMarket {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedMarket {
    pub result: MarketResult,
    pub fair_price: f64,
}

/// The evaluation of one catalogue market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEvaluation {
    pub market_id: MarketId,
    pub name: String,
    pub odd_id: OddId,
    pub outcome: Result<PricedMarket, DegenerateMarket>,
}
impl MarketEvaluation {
    pub fn fair_price(&self) -> Option<f64> {
        self.outcome.as_ref().ok().map(|priced| priced.fair_price)
    }
}

/// Integrates the settlement of `rule` over all scorelines, yielding win/push/loss percentages.
pub fn gather(rule: &MarketRule, scoregrid: &Scoregrid) -> MarketResult {
    let mut tallies = [0.0; MarketOutcome::COUNT];
    for (score, prob) in scoregrid.iter() {
        tallies[rule.classify(&score).ordinal()] += prob;
    }
    MarketResult::from_probs(
        tallies[MarketOutcome::Win.ordinal()],
        tallies[MarketOutcome::Push.ordinal()],
    )
}

pub fn evaluate(market: &Market, scoregrid: &Scoregrid) -> MarketEvaluation {
    let result = gather(&market.rule, scoregrid);
    let outcome = match result.fair_price() {
        Some(fair_price) => Ok(PricedMarket { result, fair_price }),
        None => {
            warn!("market '{}' has zero win probability", market.name);
            Err(DegenerateMarket {
                name: market.name.clone(),
            })
        }
    };
    debug!("{}: {result:?}", market.name);
    MarketEvaluation {
        market_id: market.id,
        name: market.name.clone(),
        odd_id: market.odd_id.clone(),
        outcome,
    }
}

/// Evaluates every catalogue market. A degenerate market does not affect the others.
pub fn evaluate_all(catalogue: &Catalogue, scoregrid: &Scoregrid) -> Vec<MarketEvaluation> {
    catalogue
        .markets()
        .iter()
        .map(|market| evaluate(market, scoregrid))
        .collect()
}
