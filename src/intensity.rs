//! Expected-goals rates and the scoring intensities derived from them.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::Side;

/// Aggregated expected-goals totals for one side, taken over its recent home (or away) games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRateSample {
    pub xg_for_sum: f64,
    pub xg_against_sum: f64,
    pub games_played: u32,
}
impl TeamRateSample {
    pub fn validate(&self, side: Side) -> Result<(), InvalidInput> {
        if self.games_played == 0 {
            return Err(InvalidInput::NoGames { side });
        }
        for (field, value) in [
            ("xg_for_sum", self.xg_for_sum),
            ("xg_against_sum", self.xg_against_sum),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(InvalidInput::InvalidTotal {
                    side,
                    field: field.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }

    /// Goals generated per game. Only meaningful for a validated sample.
    pub fn attack_rate(&self) -> f64 {
        self.xg_for_sum / self.games_played as f64
    }

    /// Goals conceded per game. Only meaningful for a validated sample.
    pub fn defense_rate(&self) -> f64 {
        self.xg_against_sum / self.games_played as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringIntensities {
    pub home: f64,
    pub away: f64,
}

#[derive(Debug, Clone, Error, PartialEq, Serialize, Deserialize)]
pub enum InvalidInput {
    #[error("no games played by the {side:?} side")]
    NoGames { side: Side },

    #[error("{field} of the {side:?} side must be finite and non-negative, got {value}")]
    InvalidTotal {
        side: Side,
        field: String,
        value: f64,
    },
}

#[derive(Debug, Clone, Error, PartialEq, Serialize, Deserialize)]
pub enum EstimationError {
    #[error("{0}")]
    InvalidInput(#[from] InvalidInput),

    #[error("{side:?} scoring intensity is not a finite non-negative number: {value}")]
    NonFiniteIntensity { side: Side, value: f64 },
}

/// Crosses each side's attacking rate with the opponent's concession rate via a geometric
/// mean: `λ_home = √(home_attack · away_defense)` and `λ_away = √(away_attack · home_defense)`.
pub fn estimate(
    home: &TeamRateSample,
    away: &TeamRateSample,
) -> Result<ScoringIntensities, EstimationError> {
    home.validate(Side::Home)?;
    away.validate(Side::Away)?;

    let intensities = ScoringIntensities {
        home: f64::sqrt(home.attack_rate() * away.defense_rate()),
        away: f64::sqrt(away.attack_rate() * home.defense_rate()),
    };
    for (side, value) in [
        (Side::Home, intensities.home),
        (Side::Away, intensities.away),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(EstimationError::NonFiniteIntensity { side, value });
        }
    }
    debug!("estimated intensities: {intensities:?}");
    Ok(intensities)
}
