//! Tunables of the analysis pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::factorial::MAX_FACTORIAL;
use crate::movement::MovementConfig;
use crate::scoregrid::DistributionMode;
use crate::value::CoverageConfig;

pub const DEFAULT_MAX_GOALS: u8 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Largest goal count per side represented in the scoregrid.
    pub max_goals: u8,
    pub distribution: DistributionMode,
    pub coverage: CoverageConfig,
    pub movement: MovementConfig,
}
impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_goals > MAX_FACTORIAL {
            return Err(ConfigError::MaxGoalsTooLarge(self.max_goals));
        }
        if let DistributionMode::Simulation { trials: 0, .. } = self.distribution {
            return Err(ConfigError::NoTrials);
        }
        if self.coverage.top_window == 0 {
            return Err(ConfigError::EmptyTopWindow);
        }
        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_goals: DEFAULT_MAX_GOALS,
            distribution: DistributionMode::default(),
            coverage: CoverageConfig::default(),
            movement: MovementConfig::default(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max goals {0} exceeds {}", MAX_FACTORIAL)]
    MaxGoalsTooLarge(u8),

    #[error("simulation requires at least one trial")]
    NoTrials,

    #[error("top window must hold at least one candidate")]
    EmptyTopWindow,
}
