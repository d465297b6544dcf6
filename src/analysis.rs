//! End-to-end analysis of a single fixture.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::candidates::{aggregate, CandidateScore, RawCandidate};
use crate::catalogue::Catalogue;
use crate::config::{AnalysisConfig, ConfigError};
use crate::domain::Score;
use crate::intensity::{estimate, EstimationError, ScoringIntensities, TeamRateSample};
use crate::movement::{summarise, PriceMovement};
use crate::prices::PriceHistory;
use crate::pricing::{evaluate_all, MarketEvaluation};
use crate::value::{score, Recommendations};

/// Number of most likely scorelines included in a report.
pub const TOP_SCORELINES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub home: TeamRateSample,
    pub away: TeamRateSample,
    #[serde(default)]
    pub prices: PriceHistory,
    #[serde(default)]
    pub candidates: Vec<RawCandidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorelineMass {
    pub score: Score,
    pub prob: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub intensities: ScoringIntensities,
    pub most_likely: Vec<ScorelineMass>,
    pub markets: Vec<MarketEvaluation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// The fitted model, or the reason it could not be fitted.
    pub model: Result<Model, EstimationError>,
    pub candidates: Vec<CandidateScore>,
    pub recommendations: Recommendations,
    pub movements: Vec<PriceMovement>,
}
impl AnalysisReport {
    pub fn markets(&self) -> &[MarketEvaluation] {
        self.model
            .as_ref()
            .map(|model| model.markets.as_slice())
            .unwrap_or_default()
    }
}

fn fit(
    request: &AnalysisRequest,
    catalogue: &Catalogue,
    config: &AnalysisConfig,
) -> Result<Model, EstimationError> {
    let intensities = estimate(&request.home, &request.away).map_err(|err| {
        warn!("cannot estimate scoring intensities: {err}");
        err
    })?;
    let scoregrid = config.distribution.build(&intensities, config.max_goals);
    let most_likely = scoregrid
        .most_likely(TOP_SCORELINES)
        .into_iter()
        .map(|(score, prob)| ScorelineMass { score, prob })
        .collect();
    let markets = evaluate_all(catalogue, &scoregrid);
    Ok(Model {
        intensities,
        most_likely,
        markets,
    })
}

/// Runs the full pipeline. A failure to fit the model is recorded in the report; candidate
/// ranking, recommendations and price movement are produced regardless.
pub fn run(
    request: &AnalysisRequest,
    catalogue: &Catalogue,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, ConfigError> {
    config.validate()?;
    let model = fit(request, catalogue, config);
    let candidates = aggregate(&request.candidates);
    let evaluations = model
        .as_ref()
        .map(|model| model.markets.as_slice())
        .unwrap_or_default();
    let recommendations = score(
        &candidates,
        catalogue,
        &request.prices,
        evaluations,
        &config.coverage,
    );
    let movements = summarise(catalogue, &request.prices, &config.movement);
    debug!(
        "analysed {} markets, {} recommendations, {} movements",
        evaluations.len(),
        recommendations.by_coverage.len(),
        movements.len()
    );
    Ok(AnalysisReport {
        model,
        candidates,
        recommendations,
        movements,
    })
}
