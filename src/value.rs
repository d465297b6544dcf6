//! Coverage and value scoring of markets against ranked candidate scorelines.
//!
//! A market's _coverage_ over a window of candidates is the share of the window's confidence held
//! by scorelines that the market wins on. Its _value_ is the coverage, taken as a probability,
//! divided by the probability implied by the market's latest price.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::candidates::{total_confidence, CandidateScore};
use crate::catalogue::{Catalogue, Market, MarketId};
use crate::domain::{MarketOutcome, OddId};
use crate::pricing::MarketEvaluation;
use crate::prices::PriceHistory;
use crate::probs::{clamp_pct, implied_prob, HUNDRED};

/// How a market is judged to cover a scoreline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageBasis {
    /// The market's rule settles the scoreline as a win.
    #[default]
    Classified,
    /// The scoreline appears in the market's literal score list.
    Listed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    pub top_window: usize,
    pub min_price: f64,
    pub top_recommendations: usize,
    pub highlight_value: f64,
    pub basis: CoverageBasis,
}
impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            top_window: 5,
            min_price: 1.3,
            top_recommendations: 3,
            highlight_value: 1.1,
            basis: CoverageBasis::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationEntry {
    pub market_id: MarketId,
    pub market_name: String,
    pub odd_id: OddId,
    pub latest_price: f64,
    pub coverage_top: f64,
    pub coverage_all: f64,
    pub value_score: f64,
    pub fair_price: Option<f64>,
    pub highlighted: bool,
    /// Candidates from the full window that the market covers, in rank order.
    pub contributing: Vec<CandidateScore>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    /// All qualifying markets, by descending full-window coverage.
    pub by_coverage: Vec<RecommendationEntry>,
    /// The best qualifying markets by descending value score.
    pub by_value: Vec<RecommendationEntry>,
}
impl Recommendations {
    pub fn is_empty(&self) -> bool {
        self.by_coverage.is_empty()
    }
}

pub fn covers(basis: CoverageBasis, market: &Market, candidate: &CandidateScore) -> bool {
    match basis {
        CoverageBasis::Classified => market.rule.classify(&candidate.score) == MarketOutcome::Win,
        CoverageBasis::Listed => market.lists(&candidate.score),
    }
}

/// Percentage of the window's confidence covered by `market`. An empty window, or one with no
/// confidence, has zero coverage.
pub fn coverage(basis: CoverageBasis, market: &Market, window: &[CandidateScore]) -> f64 {
    let total = total_confidence(window);
    if total <= 0.0 {
        return 0.0;
    }
    let covered: f64 = window
        .iter()
        .filter(|candidate| covers(basis, market, candidate))
        .map(|candidate| candidate.confidence)
        .sum();
    clamp_pct(covered / total * HUNDRED)
}

/// The ratio of the estimated win probability to the one implied by `price`.
#[inline]
pub fn value_score(coverage_all: f64, price: f64) -> f64 {
    (coverage_all / HUNDRED) / implied_prob(price)
}

/// Ranks catalogue markets by how well they cover the `ranked` candidates and by the value their
/// latest price offers. `ranked` must already be ordered by descending confidence. Markets
/// without a price are never recommended. Fair prices from `evaluations` annotate the entries
/// when available.
pub fn score(
    ranked: &[CandidateScore],
    catalogue: &Catalogue,
    prices: &PriceHistory,
    evaluations: &[MarketEvaluation],
    config: &CoverageConfig,
) -> Recommendations {
    if ranked.is_empty() {
        debug!("no candidates; nothing to recommend");
        return Recommendations::default();
    }
    let top = &ranked[..ranked.len().min(config.top_window)];
    let fair_prices = evaluations
        .iter()
        .filter_map(|evaluation| {
            evaluation
                .fair_price()
                .map(|fair_price| (evaluation.market_id, fair_price))
        })
        .collect::<FxHashMap<_, _>>();

    let mut by_coverage = vec![];
    for market in catalogue.markets() {
        let coverage_all = coverage(config.basis, market, ranked);
        if coverage_all <= 0.0 {
            continue;
        }
        let Some(latest) = prices.latest(&market.odd_id) else {
            continue;
        };
        let latest_price = latest.price;
        if !(latest_price > config.min_price) {
            continue;
        }
        let value_score = value_score(coverage_all, latest_price);
        if !(value_score > 0.0) {
            continue;
        }
        by_coverage.push(RecommendationEntry {
            market_id: market.id,
            market_name: market.name.clone(),
            odd_id: market.odd_id.clone(),
            latest_price,
            coverage_top: coverage(config.basis, market, top),
            coverage_all,
            value_score,
            fair_price: fair_prices.get(&market.id).copied(),
            highlighted: value_score > config.highlight_value,
            contributing: ranked
                .iter()
                .filter(|candidate| covers(config.basis, market, candidate))
                .cloned()
                .collect(),
        });
    }
    // stable sorts; ties stay in catalogue order
    by_coverage.sort_by(|a, b| b.coverage_all.total_cmp(&a.coverage_all));

    let mut by_value = by_coverage.clone();
    by_value.sort_by(|a, b| b.value_score.total_cmp(&a.value_score));
    by_value.truncate(config.top_recommendations);

    debug!(
        "{} of {} markets qualify for recommendation",
        by_coverage.len(),
        catalogue.len()
    );
    Recommendations {
        by_coverage,
        by_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::{aggregate, RawCandidate};
    use crate::catalogue::MarketDefinition;
    use crate::domain::Score;
    use crate::prices::PriceObservation;
    use assert_float_eq::*;

    fn candidate(score: &str, confidence: f64) -> CandidateScore {
        CandidateScore {
            score: score.parse().unwrap(),
            confidence,
        }
    }

    fn definition(name: &str, odd: &str, scores: &[&str]) -> MarketDefinition {
        MarketDefinition {
            name: name.to_string(),
            odd_id: OddId::from(odd),
            series: None,
            period: 3,
            scores: scores.iter().map(|score| score.to_string()).collect(),
        }
    }

    fn prices(quotes: &[(&str, f64)]) -> PriceHistory {
        quotes
            .iter()
            .flat_map(|&(odd, price)| {
                [
                    (OddId::from(odd), PriceObservation::new(1_000, 9.9)),
                    (OddId::from(odd), PriceObservation::new(2_000, price)),
                ]
            })
            .collect()
    }

    fn names(entries: &[RecommendationEntry]) -> Vec<&str> {
        entries.iter().map(|entry| entry.market_name.as_str()).collect()
    }

    fn ranked() -> Vec<CandidateScore> {
        vec![
            candidate("2:1", 30.0),
            candidate("1:1", 25.0),
            candidate("1:0", 20.0),
            candidate("0:0", 10.0),
            candidate("2:2", 10.0),
            candidate("0:2", 5.0),
        ]
    }

    #[test]
    fn coverage_of_window() {
        let catalogue = Catalogue::builtin();
        let market = catalogue.by_odd_id(&OddId::from("15")).unwrap();
        assert_eq!("ТБ 2.5", market.name);
        let ranked = ranked();
        assert_float_absolute_eq!(40.0, coverage(CoverageBasis::Classified, market, &ranked), 1e-9);
        assert_float_absolute_eq!(
            40.0 / 95.0 * 100.0,
            coverage(CoverageBasis::Classified, market, &ranked[..5]),
            1e-9
        );
        assert_eq!(0.0, coverage(CoverageBasis::Classified, market, &[]));
        assert_eq!(
            0.0,
            coverage(CoverageBasis::Classified, market, &[candidate("3:3", 0.0)])
        );
    }

    #[test]
    fn bases_can_disagree() {
        let catalogue = Catalogue::builtin();
        // the literal list of 'ТБ 0.5' omits 4:0
        let market = catalogue.by_odd_id(&OddId::from("7")).unwrap();
        let window = [candidate("4:0", 50.0), candidate("0:0", 50.0)];
        assert_eq!(50.0, coverage(CoverageBasis::Classified, market, &window));
        assert_eq!(0.0, coverage(CoverageBasis::Listed, market, &window));
    }

    #[test]
    fn value_of_price() {
        assert_float_absolute_eq!(1.0, value_score(50.0, 2.0), 1e-12);
        assert_float_absolute_eq!(1.2, value_score(40.0, 3.0), 1e-12);
    }

    #[test]
    fn empty_candidates() {
        let recommendations = score(
            &aggregate(&[]),
            &Catalogue::builtin(),
            &prices(&[("1", 2.0)]),
            &[],
            &CoverageConfig::default(),
        );
        assert!(recommendations.is_empty());
        assert!(recommendations.by_value.is_empty());
    }

    #[test]
    fn zero_coverage_never_recommended() {
        let catalogue = Catalogue::try_from_definitions(vec![
            definition("Победа 2", "2", &["0:1"]),
            definition("Победа 1", "1", &["1:0"]),
        ])
        .unwrap();
        let ranked = [candidate("1:0", 100.0)];
        let recommendations = score(
            &ranked,
            &catalogue,
            &prices(&[("1", 1.5), ("2", 1000.0)]),
            &[],
            &CoverageConfig::default(),
        );
        assert_eq!(vec!["Победа 1"], names(&recommendations.by_coverage));
        assert_eq!(vec!["Победа 1"], names(&recommendations.by_value));
    }

    #[test]
    fn filters_short_and_missing_prices() {
        let catalogue = Catalogue::try_from_definitions(vec![
            definition("ТБ 0.5", "7", &[]),
            definition("1X", "4", &[]),
            definition("12", "6", &[]),
        ])
        .unwrap();
        let ranked = [candidate("1:0", 100.0)];
        let recommendations = score(
            &ranked,
            &catalogue,
            &prices(&[("7", 1.3), ("4", 1.31)]),
            &[],
            &CoverageConfig::default(),
        );
        assert_eq!(vec!["1X"], names(&recommendations.by_coverage));
        let entry = &recommendations.by_coverage[0];
        assert_eq!(1.31, entry.latest_price);
        assert_eq!(100.0, entry.coverage_top);
        assert_eq!(100.0, entry.coverage_all);
        assert_float_absolute_eq!(1.31, entry.value_score, 1e-12);
        assert!(entry.highlighted);
    }

    #[test]
    fn orderings() {
        let catalogue = Catalogue::builtin();
        let quotes = [
            ("1", 2.2),  // Победа 1, covers 2:1, 1:0 = 50%
            ("3", 3.4),  // Ничья, covers 1:1, 0:0, 2:2 = 45%
            ("15", 1.9), // ТБ 2.5, covers 2:1, 2:2 = 40%
            ("4", 1.35), // 1X, covers everything but 0:2 = 95%
            ("99", 1.8), // ОЗ Да, covers 2:1, 1:1, 2:2 = 65%
            ("2", 4.5),  // Победа 2, covers 0:2 = 5%
        ];
        let recommendations = score(
            &ranked(),
            &catalogue,
            &prices(&quotes),
            &[],
            &CoverageConfig::default(),
        );
        assert_eq!(
            vec!["1X", "ОЗ Да", "Победа 1", "Ничья", "ТБ 2.5", "Победа 2"],
            names(&recommendations.by_coverage)
        );
        assert_eq!(
            vec!["Ничья", "1X", "ОЗ Да"],
            names(&recommendations.by_value)
        );
        let draw = &recommendations.by_value[0];
        assert_float_absolute_eq!(1.53, draw.value_score, 1e-9);
        assert!(draw.highlighted);
        assert_eq!(
            vec![Score::new(1, 1), Score::new(0, 0), Score::new(2, 2)],
            draw.contributing.iter().map(|candidate| candidate.score).collect::<Vec<_>>()
        );
        assert_float_absolute_eq!(45.0 / 95.0 * 100.0, draw.coverage_top, 1e-9);
        let over = recommendations
            .by_coverage
            .iter()
            .find(|entry| entry.market_name == "ТБ 2.5")
            .unwrap();
        assert!(!over.highlighted);
    }

    #[test]
    fn ties_keep_catalogue_order() {
        let catalogue = Catalogue::try_from_definitions(vec![
            definition("ТБ 1.5", "11", &[]),
            definition("ТБ 0.5", "7", &[]),
            definition("ТБ 2", "13", &[]),
        ])
        .unwrap();
        let ranked = [candidate("2:1", 100.0)];
        let recommendations = score(
            &ranked,
            &catalogue,
            &prices(&[("7", 2.0), ("11", 2.0), ("13", 2.0)]),
            &[],
            &CoverageConfig::default(),
        );
        assert_eq!(vec!["ТБ 1.5", "ТБ 0.5", "ТБ 2"], names(&recommendations.by_coverage));
        assert_eq!(vec!["ТБ 1.5", "ТБ 0.5", "ТБ 2"], names(&recommendations.by_value));
    }

    #[test]
    fn deterministic() {
        let raw = [
            RawCandidate::new("2-1", 30.0),
            RawCandidate::new("1:1", 25.0),
            RawCandidate::new("1:0", 25.0),
            RawCandidate::new("0:0", "10%"),
        ];
        let catalogue = Catalogue::builtin();
        let prices = prices(&[("1", 2.2), ("3", 3.4), ("15", 1.9), ("99", 1.8), ("16", 1.95)]);
        let first = score(&aggregate(&raw), &catalogue, &prices, &[], &CoverageConfig::default());
        let second = score(&aggregate(&raw), &catalogue, &prices, &[], &CoverageConfig::default());
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn listed_basis() {
        let catalogue = Catalogue::builtin();
        let config = CoverageConfig {
            basis: CoverageBasis::Listed,
            ..CoverageConfig::default()
        };
        let ranked = [candidate("4:0", 60.0), candidate("1:0", 40.0)];
        let recommendations = score(&ranked, &catalogue, &prices(&[("1", 2.0)]), &[], &config);
        let entry = &recommendations.by_coverage[0];
        assert_eq!("Победа 1", entry.market_name);
        assert_eq!(40.0, entry.coverage_all);
        assert_eq!(vec![Score::new(1, 0)], entry.contributing.iter().map(|c| c.score).collect::<Vec<_>>());
    }

    #[test]
    fn annotates_fair_prices() {
        use crate::intensity::ScoringIntensities;
        use crate::pricing::evaluate_all;
        use crate::scoregrid::DistributionMode;

        let catalogue = Catalogue::builtin();
        let scoregrid = DistributionMode::Exact.build(
            &ScoringIntensities {
                home: 1.4,
                away: 1.1,
            },
            10,
        );
        let evaluations = evaluate_all(&catalogue, &scoregrid);
        let recommendations = score(
            &[candidate("1:0", 100.0)],
            &catalogue,
            &prices(&[("1", 2.0)]),
            &evaluations,
            &CoverageConfig::default(),
        );
        let entry = &recommendations.by_coverage[0];
        assert_eq!(evaluations[0].fair_price(), entry.fair_price);
        assert!(entry.fair_price.is_some());
    }
}
