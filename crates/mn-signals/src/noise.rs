//! Seeded random sample generators.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{SignalError, SignalResult};

/// Number of white-noise rows summed by the pink generator.
pub const PINK_ROWS: usize = 5;

/// Scale applied to the row sum before the amplitude.
const PINK_SCALE: f64 = 0.1;

/// Draw `len` independent samples from `N(mean, std^2)`.
pub fn normal_samples<R: Rng + ?Sized>(
    mean: f64,
    std: f64,
    len: usize,
    rng: &mut R,
) -> SignalResult<Vec<f64>> {
    if !mean.is_finite() {
        return Err(SignalError::InvalidParam {
            what: "normal mean",
            value: mean,
        });
    }
    if !(std.is_finite() && std >= 0.0) {
        return Err(SignalError::InvalidParam {
            what: "normal std",
            value: std,
        });
    }
    let dist = Normal::new(mean, std).map_err(|e| SignalError::Distribution {
        what: e.to_string(),
    })?;
    Ok((0..len).map(|_| dist.sample(rng)).collect())
}

/// Voss-McCartney pink noise generator.
///
/// A 5-bit counter selects which rows are redrawn on each sample: row `j`
/// is refreshed whenever bit `j` flips, so low rows change often and high
/// rows rarely. Rows start at zero and are redrawn uniformly in `[-1, 1)`.
#[derive(Debug, Clone, Default)]
pub struct PinkNoise {
    key: u32,
    rows: [f64; PINK_ROWS],
}

impl PinkNoise {
    const MAX_KEY: u32 = (1 << PINK_ROWS) - 1;

    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the counter and return the sum of all rows.
    pub fn next_sum<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        let last = self.key;
        self.key = if self.key >= Self::MAX_KEY {
            0
        } else {
            self.key + 1
        };
        let flipped = last ^ self.key;
        for (j, row) in self.rows.iter_mut().enumerate() {
            if flipped & (1 << j) != 0 {
                *row = rng.random::<f64>() * 2.0 - 1.0;
            }
        }
        self.rows.iter().sum()
    }
}

/// Draw `len` pink-noise samples around `baseline`.
pub fn pink_samples<R: Rng + ?Sized>(
    baseline: f64,
    amplitude: f64,
    len: usize,
    rng: &mut R,
) -> Vec<f64> {
    let mut pink = PinkNoise::new();
    (0..len)
        .map(|_| baseline + amplitude * pink.next_sum(rng) * PINK_SCALE)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn normal_samples_are_reproducible_per_seed() {
        let a = normal_samples(250e-6, 50e-6, 64, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = normal_samples(250e-6, 50e-6, 64, &mut StdRng::seed_from_u64(7)).unwrap();
        let c = normal_samples(250e-6, 50e-6, 64, &mut StdRng::seed_from_u64(8)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn zero_std_gives_the_mean() {
        let s = normal_samples(3.0, 0.0, 5, &mut StdRng::seed_from_u64(1)).unwrap();
        assert!(s.iter().all(|&v| v == 3.0));
    }

    #[test]
    fn normal_rejects_negative_std() {
        let err = normal_samples(0.0, -1.0, 5, &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert_eq!(
            err,
            SignalError::InvalidParam {
                what: "normal std",
                value: -1.0
            }
        );
    }

    #[test]
    fn normal_rejects_non_finite_parameters() {
        let mut rng = StdRng::seed_from_u64(1);
        for std in [f64::NAN, f64::INFINITY] {
            let err = normal_samples(0.0, std, 5, &mut rng).unwrap_err();
            assert!(matches!(err, SignalError::InvalidParam { what: "normal std", .. }));
        }
        let err = normal_samples(f64::NAN, 1.0, 5, &mut rng).unwrap_err();
        assert!(matches!(err, SignalError::InvalidParam { what: "normal mean", .. }));
    }

    #[test]
    fn pink_counter_wraps_after_five_bits() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut pink = PinkNoise::new();
        for _ in 0..=PinkNoise::MAX_KEY {
            pink.next_sum(&mut rng);
        }
        assert_eq!(pink.key, 0);
    }

    #[test]
    fn first_pink_sample_only_refreshes_lowest_row() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut pink = PinkNoise::new();
        let sum = pink.next_sum(&mut rng);
        assert_eq!(&pink.rows[1..], &[0.0; PINK_ROWS - 1]);
        assert_eq!(sum, pink.rows[0]);
    }

    #[test]
    fn pink_samples_stay_within_row_bounds() {
        let s = pink_samples(10e-6, 5e-6, 500, &mut StdRng::seed_from_u64(3));
        let bound = 5e-6 * PINK_ROWS as f64 * PINK_SCALE;
        assert!(s.iter().all(|v| (v - 10e-6).abs() <= bound));
    }
}
