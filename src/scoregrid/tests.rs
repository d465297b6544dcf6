use super::*;
use crate::factorial::Calculator;
use crate::testing::assert_slice_f64_absolute;
use assert_float_eq::*;

const INTENSITIES: ScoringIntensities = ScoringIntensities {
    home: 1.4,
    away: 1.1,
};
const MAX_GOALS: u8 = 10;

fn exact_scoregrid(intensities: &ScoringIntensities) -> Scoregrid {
    let mut scoregrid = Scoregrid::allocate(MAX_GOALS);
    Exact::default().populate(intensities, &mut scoregrid);
    scoregrid
}

#[test]
fn index_by_score() {
    let mut scoregrid = Scoregrid::allocate(2);
    assert_eq!(9, scoregrid.flatten().len());
    scoregrid[Score::new(2, 1)] = 0.5;
    assert_eq!(0.5, scoregrid[Score::new(2, 1)]);
    assert_eq!(0.5, scoregrid.flatten()[7]);
    assert_eq!(0.0, scoregrid[Score::new(1, 2)]);
}

#[test]
#[should_panic(expected = "score 3:0 outside a 2-goal grid")]
fn index_out_of_bounds() {
    let scoregrid = Scoregrid::allocate(2);
    scoregrid[Score::new(3, 0)];
}

#[test]
fn iter_row_major() {
    let scoregrid = Scoregrid::allocate(1);
    let scores = scoregrid.iter().map(|(score, _)| score).collect::<Vec<_>>();
    assert_eq!(
        vec![
            Score::new(0, 0),
            Score::new(0, 1),
            Score::new(1, 0),
            Score::new(1, 1)
        ],
        scores
    );
}

#[test]
fn exact_mass_at_one_all() {
    let scoregrid = exact_scoregrid(&INTENSITIES);
    let expected = (1.4 * f64::exp(-1.4)) * (1.1 * f64::exp(-1.1));
    assert_float_absolute_eq!(expected, scoregrid[Score::new(1, 1)], 1e-9);
}

#[test]
fn exact_matches_poisson_product() {
    let scoregrid = exact_scoregrid(&INTENSITIES);
    for (score, prob) in scoregrid.iter() {
        let expected = poisson::univariate(score.home, 1.4, &Calculator)
            * poisson::univariate(score.away, 1.1, &Calculator);
        assert_float_absolute_eq!(expected, prob, 1e-12);
    }
}

#[test]
fn exact_sums_to_one() {
    for (home, away) in [(0.0, 0.0), (0.3, 2.9), (1.4, 1.1), (3.2, 0.6)] {
        let scoregrid = exact_scoregrid(&ScoringIntensities { home, away });
        assert_float_absolute_eq!(1.0, scoregrid.sum(), 1e-4);
        assert!(scoregrid.flatten().iter().all(|&prob| prob >= 0.0));
    }
}

#[test]
fn exact_zero_intensities_concentrate_at_nil_all() {
    let scoregrid = exact_scoregrid(&ScoringIntensities {
        home: 0.0,
        away: 0.0,
    });
    assert_eq!(1.0, scoregrid[Score::nil_all()]);
    assert_eq!(1.0, scoregrid.sum());
}

#[test]
fn simulation_sums_to_one() {
    let mut scoregrid = Scoregrid::allocate(MAX_GOALS);
    let mut simulation = Simulation::seeded(10_000, 42);
    simulation.populate(&INTENSITIES, &mut scoregrid);
    let expected_sum = 1.0 - simulation.overflow() as f64 / 10_000.0;
    assert_float_absolute_eq!(expected_sum, scoregrid.sum(), 1e-9);
    assert_float_absolute_eq!(1.0, scoregrid.sum(), 1e-3);
    assert!(scoregrid.flatten().iter().all(|&prob| prob >= 0.0));
}

#[test]
fn simulation_overwrites_prior_mass() {
    let mut scoregrid = exact_scoregrid(&INTENSITIES);
    let mut simulation = Simulation::seeded(10_000, 42);
    simulation.populate(&INTENSITIES, &mut scoregrid);
    let expected_sum = 1.0 - simulation.overflow() as f64 / 10_000.0;
    assert_float_absolute_eq!(expected_sum, scoregrid.sum(), 1e-9);

    let mut fresh = Scoregrid::allocate(MAX_GOALS);
    Simulation::seeded(10_000, 42).populate(&INTENSITIES, &mut fresh);
    assert_eq!(fresh, scoregrid);
}

#[test]
fn simulation_repopulated_sums_to_one() {
    let mut scoregrid = Scoregrid::allocate(MAX_GOALS);
    let mut simulation = Simulation::seeded(10_000, 42);
    simulation.populate(&INTENSITIES, &mut scoregrid);
    simulation.populate(&INTENSITIES, &mut scoregrid);
    assert!(scoregrid.sum() <= 1.0 + 1e-9);
    assert_float_absolute_eq!(1.0, scoregrid.sum(), 1e-3);
}

#[test]
fn simulation_reproducible_under_seed() {
    let run = |seed| {
        DistributionMode::Simulation {
            trials: 5_000,
            seed,
        }
        .build(&INTENSITIES, MAX_GOALS)
    };
    assert_eq!(run(11), run(11));
    assert_ne!(run(11), run(12));
}

#[test]
fn simulation_agrees_with_exact() {
    let exact = DistributionMode::Exact.build(&INTENSITIES, MAX_GOALS);
    let simulated = DistributionMode::Simulation {
        trials: 50_000,
        seed: 0,
    }
    .build(&INTENSITIES, MAX_GOALS);
    assert_slice_f64_absolute(exact.flatten(), simulated.flatten(), 0.02);
}

#[test]
fn simulation_large_intensities_terminate() {
    let intensities = ScoringIntensities {
        home: 800.0,
        away: 800.0,
    };
    let scoregrid = DistributionMode::Simulation {
        trials: 1_000,
        seed: 0,
    }
    .build(&intensities, MAX_GOALS);
    assert!(scoregrid.flatten().iter().all(|prob| !prob.is_nan()));
    assert_eq!(0.0, scoregrid.sum());
}

#[test]
fn exact_large_intensities_not_nan() {
    for rate in [800.0, 1e31] {
        let intensities = ScoringIntensities {
            home: rate,
            away: 1.1,
        };
        let scoregrid = DistributionMode::Exact.build(&intensities, MAX_GOALS);
        assert!(scoregrid.flatten().iter().all(|prob| prob.is_finite()));
        assert_float_absolute_eq!(0.0, scoregrid.sum(), 1e-12);
    }
}

#[test]
fn merged_batches_commute() {
    let batch = |seed| {
        let mut histogram = Scoregrid::allocate(MAX_GOALS);
        tally(1.4, 1.1, 1_000, &mut StdRand::seed(seed), &mut histogram);
        histogram
    };
    let (a, b, c) = (batch(1), batch(2), batch(3));

    let mut left = a.clone();
    left.merge(&b);
    left.merge(&c);

    let mut right = c.clone();
    right.merge(&a);
    right.merge(&b);

    assert_eq!(left, right);
    assert_eq!(3_000.0, left.sum());
}

#[test]
fn tally_counts_overflow() {
    let mut histogram = Scoregrid::allocate(0);
    let overflow = tally(3.0, 3.0, 1_000, &mut StdRand::seed(5), &mut histogram);
    assert_eq!(1_000.0, histogram.sum() + overflow as f64);
    assert!(overflow > 900);
}

#[test]
#[should_panic(expected = "cannot merge a 3-goal grid into a 2-goal grid")]
fn merge_mismatched() {
    Scoregrid::allocate(2).merge(&Scoregrid::allocate(3));
}

#[test]
fn most_likely() {
    let scoregrid = exact_scoregrid(&INTENSITIES);
    let top = scoregrid.most_likely(3);
    assert_eq!(3, top.len());
    assert_eq!(Score::new(1, 1), top[0].0);
    assert_eq!(Score::new(1, 0), top[1].0);
    assert_eq!(Score::new(0, 1), top[2].0);
    assert!(top[0].1 >= top[1].1 && top[1].1 >= top[2].1);
}

#[test]
fn most_likely_ties_ordered_by_score() {
    let mut scoregrid = Scoregrid::allocate(1);
    scoregrid[Score::new(1, 0)] = 0.25;
    scoregrid[Score::new(0, 1)] = 0.25;
    scoregrid[Score::new(1, 1)] = 0.5;
    let top = scoregrid.most_likely(10);
    assert_eq!(
        vec![
            (Score::new(1, 1), 0.5),
            (Score::new(0, 1), 0.25),
            (Score::new(1, 0), 0.25),
            (Score::new(0, 0), 0.0)
        ],
        top
    );
}

#[test]
fn distribution_mode_serde() {
    assert_eq!(
        DistributionMode::Exact,
        serde_json::from_str::<DistributionMode>("\"exact\"").unwrap()
    );
    assert_eq!(
        DistributionMode::Simulation {
            trials: DistributionMode::DEFAULT_TRIALS,
            seed: 0
        },
        serde_json::from_str::<DistributionMode>(r#"{"simulation": {}}"#).unwrap()
    );
    assert_eq!(
        DistributionMode::Simulation {
            trials: 500,
            seed: 9
        },
        serde_json::from_str::<DistributionMode>(r#"{"simulation": {"trials": 500, "seed": 9}}"#)
            .unwrap()
    );
}
