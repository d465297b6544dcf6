//! Aggregation of candidate scorelines from uncertain sources.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::Score;
use crate::hash_lookup::HashLookup;

/// Confidence as supplied upstream: either a number or free text such as `"60"` or `"60%"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawConfidence {
    Number(f64),
    Text(String),
}
impl RawConfidence {
    /// The numeric confidence, if it is finite and non-negative.
    pub fn value(&self) -> Option<f64> {
        let value = match self {
            RawConfidence::Number(value) => *value,
            RawConfidence::Text(text) => {
                let text = text.trim();
                let text = text.strip_suffix('%').unwrap_or(text).trim_end();
                text.parse().ok()?
            }
        };
        if value.is_finite() && value >= 0.0 {
            Some(value)
        } else {
            None
        }
    }
}

impl From<f64> for RawConfidence {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RawConfidence {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCandidate {
    #[serde(default)]
    pub score: Option<String>,
    pub confidence: RawConfidence,
}
impl RawCandidate {
    pub fn new(score: &str, confidence: impl Into<RawConfidence>) -> Self {
        Self {
            score: Some(score.to_string()),
            confidence: confidence.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub score: Score,
    pub confidence: f64,
}

/// Merges candidates by scoreline, summing their confidence. The result is ordered by descending
/// confidence; equal confidences keep the order in which the scorelines were first encountered.
pub fn aggregate(raw: &[RawCandidate]) -> Vec<CandidateScore> {
    let mut scores = HashLookup::with_capacity(raw.len());
    let mut confidences: Vec<f64> = Vec::with_capacity(raw.len());
    for candidate in raw {
        let Some(encoded) = candidate.score.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            warn!("discarding candidate without a scoreline: {candidate:?}");
            continue;
        };
        let score: Score = match encoded.parse() {
            Ok(score) => score,
            Err(err) => {
                warn!("discarding candidate: {err}");
                continue;
            }
        };
        let Some(confidence) = candidate.confidence.value() else {
            warn!(
                "discarding candidate {score} with invalid confidence {:?}",
                candidate.confidence
            );
            continue;
        };
        let (index, pushed) = scores.index_or_push(score);
        if pushed {
            confidences.push(confidence);
        } else {
            confidences[index] += confidence;
        }
    }

    let mut aggregated = scores
        .items()
        .iter()
        .zip(confidences)
        .map(|(&score, confidence)| CandidateScore { score, confidence })
        .collect::<Vec<_>>();
    // stable, so ties stay in first-encountered order
    aggregated.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    debug!("aggregated {} candidates into {} scorelines", raw.len(), aggregated.len());
    aggregated
}

/// Sum of confidences across `candidates`.
pub fn total_confidence(candidates: &[CandidateScore]) -> f64 {
    candidates.iter().map(|candidate| candidate.confidence).sum()
}
