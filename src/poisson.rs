//! The Poisson distribution: exact mass and sampling.

use std::f64::consts::TAU;

use tinyrand::Rand;

use crate::factorial::Factorial;

/// Rates above this are sampled from the normal approximation. Below it, `e^-lambda` stays
/// well clear of underflow and the multiplicative method is exact.
pub const NORMAL_APPROXIMATION_RATE: f64 = 500.0;

/// Probability of exactly `k` events given a mean rate of `lambda`.
///
/// Falls back to log space when the direct product cannot be represented, so very large rates
/// yield a (vanishing) finite mass rather than `NaN`.
#[inline]
pub fn univariate(k: u8, lambda: f64, factorial: &impl Factorial) -> f64 {
    let mass = lambda.powi(k as i32) * f64::exp(-lambda) / factorial.get(k) as f64;
    if mass.is_finite() {
        return mass;
    }
    log_univariate(k, lambda, factorial).exp()
}

#[inline]
fn log_univariate(k: u8, lambda: f64, factorial: &impl Factorial) -> f64 {
    if k == 0 {
        -lambda
    } else {
        k as f64 * lambda.ln() - lambda - (factorial.get(k) as f64).ln()
    }
}

/// Draws a Poisson-distributed count.
///
/// Up to [`NORMAL_APPROXIMATION_RATE`], uniform variates are multiplied until the running
/// product falls below `e^-lambda`; the number of multiplications before that point is the
/// sample. Larger rates are drawn from `N(lambda, lambda)`, rounded and clamped at zero.
#[inline]
pub fn sample(lambda: f64, rand: &mut impl Rand) -> u32 {
    if lambda > NORMAL_APPROXIMATION_RATE {
        return sample_normal_approximation(lambda, rand);
    }
    let limit = f64::exp(-lambda);
    let mut product = random_f64(rand);
    let mut count = 0;
    while product >= limit {
        count += 1;
        product *= random_f64(rand);
    }
    count
}

/// Box-Muller draw of a standard normal, scaled to the Poisson mean and variance.
fn sample_normal_approximation(lambda: f64, rand: &mut impl Rand) -> u32 {
    let u1 = f64::max(1.0 - random_f64(rand), f64::MIN_POSITIVE);
    let u2 = random_f64(rand);
    let z = f64::sqrt(-2.0 * u1.ln()) * f64::cos(TAU * u2);
    let draw = (lambda + lambda.sqrt() * z).round();
    draw.clamp(0.0, u32::MAX as f64) as u32
}

#[inline]
fn random_f64(rand: &mut impl Rand) -> f64 {
    rand.next_u64() as f64 / u64::MAX as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factorial::Calculator;
    use assert_float_eq::*;
    use tinyrand::{Seeded, StdRand};

    #[test]
    pub fn test_univariate() {
        assert_float_relative_eq!(0.36787944117144233, univariate(0, 1.0, &Calculator));
        assert_float_relative_eq!(0.36787944117144233, univariate(1, 1.0, &Calculator));
        assert_float_relative_eq!(0.18393972058572117, univariate(2, 1.0, &Calculator));
        assert_float_relative_eq!(0.0820849986238988, univariate(0, 2.5, &Calculator));
        assert_float_relative_eq!(0.205212496559747, univariate(1, 2.5, &Calculator));
        assert_float_relative_eq!(0.25651562069968376, univariate(2, 2.5, &Calculator));
    }

    #[test]
    fn univariate_zero_rate() {
        assert_eq!(1.0, univariate(0, 0.0, &Calculator));
        assert_eq!(0.0, univariate(3, 0.0, &Calculator));
    }

    #[test]
    fn sample_zero_rate() {
        let mut rand = StdRand::seed(7);
        for _ in 0..100 {
            assert_eq!(0, sample(0.0, &mut rand));
        }
    }

    #[test]
    fn sample_mean_approaches_rate() {
        const TRIALS: u32 = 100_000;
        let mut rand = StdRand::seed(42);
        let total: u64 = (0..TRIALS).map(|_| sample(1.4, &mut rand) as u64).sum();
        let mean = total as f64 / TRIALS as f64;
        assert_float_absolute_eq!(1.4, mean, 0.02);
    }

    #[test]
    fn sample_reproducible_under_seed() {
        let draws = |seed| {
            let mut rand = StdRand::seed(seed);
            (0..50).map(|_| sample(2.1, &mut rand)).collect::<Vec<_>>()
        };
        assert_eq!(draws(3), draws(3));
    }

    #[test]
    fn univariate_large_rate_is_finite() {
        for lambda in [800.0, 1e6, 1e31, 1e300] {
            for k in [0, 1, 10, 34] {
                let mass = univariate(k, lambda, &Calculator);
                assert!(mass.is_finite(), "k={k}, lambda={lambda}, mass={mass}");
                assert!((0.0..1e-100).contains(&mass), "k={k}, lambda={lambda}, mass={mass}");
            }
        }
    }

    #[test]
    fn sample_large_rate_terminates() {
        const TRIALS: u32 = 10_000;
        let mut rand = StdRand::seed(42);
        let total: u64 = (0..TRIALS).map(|_| sample(800.0, &mut rand) as u64).sum();
        let mean = total as f64 / TRIALS as f64;
        assert_float_absolute_eq!(800.0, mean, 2.0);
    }

    #[test]
    fn sample_huge_rate_terminates() {
        let mut rand = StdRand::seed(9);
        for _ in 0..100 {
            assert!(sample(1e31, &mut rand) > 1_000_000);
        }
    }
}
