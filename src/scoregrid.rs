//! Probability mass over final scorelines, and the strategies that populate it.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};
use tinyrand::{Rand, Seeded, StdRand};
use tracing::debug;

use crate::domain::Score;
use crate::factorial::{Factorial, Memo};
use crate::intensity::ScoringIntensities;
use crate::poisson;

/// A square grid of probability mass, indexed by `(home, away)` goals in `0..=max_goals`.
/// Mass beyond the cutoff is not represented.
#[derive(Debug, Clone, PartialEq)]
pub struct Scoregrid {
    data: Vec<f64>,
    max_goals: u8,
}
impl Scoregrid {
    pub fn allocate(max_goals: u8) -> Self {
        let dim = max_goals as usize + 1;
        Self {
            data: vec![0.0; dim * dim],
            max_goals,
        }
    }

    pub fn max_goals(&self) -> u8 {
        self.max_goals
    }

    fn dim(&self) -> usize {
        self.max_goals as usize + 1
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    pub fn flatten(&self) -> &[f64] {
        &self.data
    }

    /// Iterates over every scoreline in row-major order (home goals outermost).
    pub fn iter(&self) -> impl Iterator<Item = (Score, f64)> + '_ {
        let dim = self.dim();
        self.data.iter().enumerate().map(move |(index, &prob)| {
            (Score::new((index / dim) as u8, (index % dim) as u8), prob)
        })
    }

    /// Elementwise addition of another grid of the same dimensions.
    pub fn merge(&mut self, other: &Scoregrid) {
        assert_eq!(
            self.max_goals, other.max_goals,
            "cannot merge a {}-goal grid into a {}-goal grid",
            other.max_goals, self.max_goals
        );
        for (mine, theirs) in self.data.iter_mut().zip(other.data.iter()) {
            *mine += theirs;
        }
    }

    /// Zeroes every cell.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    pub fn scale(&mut self, factor: f64) {
        for element in &mut self.data {
            *element *= factor;
        }
    }

    /// The `n` most likely scorelines, by descending mass. Equal masses are ordered by score.
    pub fn most_likely(&self, n: usize) -> Vec<(Score, f64)> {
        let mut entries = self.iter().collect::<Vec<_>>();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        entries.truncate(n);
        entries
    }

    fn validate_score(&self, score: &Score) -> bool {
        assert!(
            score.home <= self.max_goals && score.away <= self.max_goals,
            "score {score} outside a {}-goal grid",
            self.max_goals
        );
        true
    }
}

impl Index<Score> for Scoregrid {
    type Output = f64;

    #[inline]
    fn index(&self, score: Score) -> &Self::Output {
        debug_assert!(self.validate_score(&score));
        &self.data[score.home as usize * self.dim() + score.away as usize]
    }
}

impl IndexMut<Score> for Scoregrid {
    #[inline]
    fn index_mut(&mut self, score: Score) -> &mut Self::Output {
        debug_assert!(self.validate_score(&score));
        let dim = self.dim();
        &mut self.data[score.home as usize * dim + score.away as usize]
    }
}

/// Populates a scoregrid from a pair of scoring intensities.
pub trait Strategy {
    fn populate(&mut self, intensities: &ScoringIntensities, scoregrid: &mut Scoregrid);
}

/// Closed-form product of two independent Poisson marginals.
#[derive(Default)]
pub struct Exact {
    factorial: Memo,
}

impl Strategy for Exact {
    fn populate(&mut self, intensities: &ScoringIntensities, scoregrid: &mut Scoregrid) {
        from_univariate_poisson(
            intensities.home,
            intensities.away,
            &self.factorial,
            scoregrid,
        );
    }
}

pub fn from_univariate_poisson(
    home_rate: f64,
    away_rate: f64,
    factorial: &impl Factorial,
    scoregrid: &mut Scoregrid,
) {
    let max_goals = scoregrid.max_goals();
    let away_probs = (0..=max_goals)
        .map(|away_goals| poisson::univariate(away_goals, away_rate, factorial))
        .collect::<Vec<_>>();
    for home_goals in 0..=max_goals {
        let home_prob = poisson::univariate(home_goals, home_rate, factorial);
        for (away_goals, away_prob) in away_probs.iter().enumerate() {
            scoregrid[Score::new(home_goals, away_goals as u8)] = home_prob * away_prob;
        }
    }
}

/// Monte Carlo estimate from independently sampled home and away goal counts.
pub struct Simulation<R: Rand> {
    trials: u64,
    rand: R,
    overflow: u64,
}
impl<R: Rand> Simulation<R> {
    pub fn new(trials: u64, rand: R) -> Self {
        assert!(trials > 0, "at least one trial is required");
        Self {
            trials,
            rand,
            overflow: 0,
        }
    }

    /// Draws that landed beyond the grid's cutoff across all runs so far.
    pub fn overflow(&self) -> u64 {
        self.overflow
    }
}

impl Simulation<StdRand> {
    pub fn seeded(trials: u64, seed: u64) -> Self {
        Self::new(trials, StdRand::seed(seed))
    }
}

impl<R: Rand> Strategy for Simulation<R> {
    fn populate(&mut self, intensities: &ScoringIntensities, scoregrid: &mut Scoregrid) {
        scoregrid.clear();
        let overflow = tally(
            intensities.home,
            intensities.away,
            self.trials,
            &mut self.rand,
            scoregrid,
        );
        scoregrid.scale(1.0 / self.trials as f64);
        self.overflow += overflow;
        debug!(
            "simulated {} trials, {overflow} beyond {} goals",
            self.trials,
            scoregrid.max_goals()
        );
    }
}

/// Accumulates raw trial counts into `histogram` without normalising. Returns the number of
/// trials whose score fell outside the grid. Histograms from independent batches may be
/// combined with [`Scoregrid::merge`].
pub fn tally(
    home_rate: f64,
    away_rate: f64,
    trials: u64,
    rand: &mut impl Rand,
    histogram: &mut Scoregrid,
) -> u64 {
    let max_goals = histogram.max_goals() as u32;
    let mut overflow = 0;
    for _ in 0..trials {
        let home_goals = poisson::sample(home_rate, rand);
        let away_goals = poisson::sample(away_rate, rand);
        if home_goals > max_goals || away_goals > max_goals {
            overflow += 1;
        } else {
            histogram[Score::new(home_goals as u8, away_goals as u8)] += 1.0;
        }
    }
    overflow
}

/// Selects how the scoregrid is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionMode {
    Exact,
    Simulation {
        #[serde(default = "DistributionMode::default_trials")]
        trials: u64,
        #[serde(default)]
        seed: u64,
    },
}
impl DistributionMode {
    pub const DEFAULT_TRIALS: u64 = 10_000;

    fn default_trials() -> u64 {
        Self::DEFAULT_TRIALS
    }

    pub fn build(&self, intensities: &ScoringIntensities, max_goals: u8) -> Scoregrid {
        let mut scoregrid = Scoregrid::allocate(max_goals);
        match self {
            DistributionMode::Exact => Exact::default().populate(intensities, &mut scoregrid),
            DistributionMode::Simulation { trials, seed } => {
                Simulation::seeded(*trials, *seed).populate(intensities, &mut scoregrid)
            }
        }
        debug!("{self:?} scoregrid sum: {}", scoregrid.sum());
        scoregrid
    }
}

impl Default for DistributionMode {
    fn default() -> Self {
        Self::Exact
    }
}

#[cfg(test)]
mod tests;
