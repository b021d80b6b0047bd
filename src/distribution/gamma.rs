//! Gamma distribution parameterised by mean and standard deviation
//!
//! The usual (shape k, scale θ) parameters are recovered from the moments:
//!
//! - mean = kθ, variance = kθ²
//! - k = mean² / stdev²
//! - θ = stdev² / mean
//!
//! Sampling is delegated to `rand_distr::Gamma`.

use crate::error::ReplayError;
use rand::Rng;
use rand_distr::{Distribution, Gamma};

/// Convert (mean, stdev) into gamma (shape, scale)
///
/// Both inputs must be strictly positive; callers that cannot guarantee this
/// should go through [`GammaDistribution::new`], which validates.
#[inline]
pub fn gamma_params(mean: f64, stdev: f64) -> (f64, f64) {
    ((mean / stdev).powi(2), stdev.powi(2) / mean)
}

/// Draw one variate from the thread RNG
pub fn sample(mean: f64, stdev: f64) -> Result<f64, ReplayError> {
    let dist = GammaDistribution::new("gamma", mean, stdev)?;
    Ok(dist.sample(&mut rand::thread_rng()))
}

/// Validated gamma distribution
///
/// Cheap to copy; sessions keep their own copy and sample with their own RNG.
#[derive(Debug, Clone, Copy)]
pub struct GammaDistribution {
    mean: f64,
    stdev: f64,
    inner: Gamma<f64>,
}

impl GammaDistribution {
    /// Create a distribution from its mean and standard deviation
    ///
    /// `name` only labels the error message (e.g. "batch_size", "jitter").
    pub fn new(name: &'static str, mean: f64, stdev: f64) -> Result<Self, ReplayError> {
        let invalid = || ReplayError::InvalidDistribution { name, mean, stdev };

        if !(mean.is_finite() && stdev.is_finite() && mean > 0.0 && stdev > 0.0) {
            return Err(invalid());
        }

        let (shape, scale) = gamma_params(mean, stdev);
        let inner = Gamma::new(shape, scale).map_err(|_| invalid())?;

        Ok(Self { mean, stdev, inner })
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn stdev(&self) -> f64 {
        self.stdev
    }

    /// Draw a non-negative sample
    #[inline]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.inner.sample(rng).max(0.0)
    }

    /// Draw a sample rounded to the nearest whole count
    #[inline]
    pub fn sample_count<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.sample(rng).round() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_gamma_params() {
        let (shape, scale) = gamma_params(40.0, 25.0);
        assert!((shape - 2.56).abs() < 1e-12);
        assert!((scale - 15.625).abs() < 1e-12);

        let (shape, scale) = gamma_params(1.0, 0.25);
        assert!((shape - 16.0).abs() < 1e-12);
        assert!((scale - 0.0625).abs() < 1e-12);
    }

    #[test]
    fn test_gamma_params_preserve_moments() {
        let (k, theta) = gamma_params(3.0, 2.0);
        assert!((k * theta - 3.0).abs() < 1e-12);
        assert!((k * theta * theta - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_gamma_samples_non_negative() {
        let dist = GammaDistribution::new("batch_size", 40.0, 25.0).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);

        for _ in 0..1000 {
            assert!(dist.sample(&mut rng) >= 0.0);
        }
    }

    #[test]
    fn test_gamma_sample_mean() {
        let dist = GammaDistribution::new("jitter", 1.0, 0.25).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let n = 20_000;

        let total: f64 = (0..n).map(|_| dist.sample(&mut rng)).sum();
        let mean = total / n as f64;

        assert!((mean - 1.0).abs() < 0.02, "sample mean too far off: {}", mean);
    }

    #[test]
    fn test_gamma_seeded() {
        let dist = GammaDistribution::new("batch_size", 40.0, 25.0).unwrap();
        let mut rng1 = Xoshiro256PlusPlus::seed_from_u64(12345);
        let mut rng2 = Xoshiro256PlusPlus::seed_from_u64(12345);

        for _ in 0..10 {
            assert_eq!(dist.sample_count(&mut rng1), dist.sample_count(&mut rng2));
        }
    }

    #[test]
    fn test_gamma_rejects_zero_and_negative() {
        assert!(GammaDistribution::new("jitter", 0.0, 1.0).is_err());
        assert!(GammaDistribution::new("jitter", 1.0, 0.0).is_err());
        assert!(GammaDistribution::new("jitter", -1.0, 1.0).is_err());
        assert!(GammaDistribution::new("jitter", f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_gamma_error_names_distribution() {
        let err = GammaDistribution::new("batch_size", 0.0, 25.0).unwrap_err();
        assert!(err.to_string().contains("batch_size"));
    }

    #[test]
    fn test_free_sample() {
        let value = sample(1.0, 0.25).unwrap();
        assert!(value >= 0.0);
        assert!(sample(0.0, 0.25).is_err());
    }
}
