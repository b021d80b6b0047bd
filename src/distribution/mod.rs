//! Random distributions used for pacing
//!
//! Batch sizes and inter-batch delays are drawn from gamma distributions
//! parameterised by a (mean, standard deviation) pair. Gamma keeps every
//! sample non-negative and its right skew produces the occasional large
//! batch or long stall that real producers exhibit.
//!
//! # Example
//!
//! ```
//! use flowreplay::distribution::gamma::GammaDistribution;
//! use rand::SeedableRng;
//! use rand_xoshiro::Xoshiro256PlusPlus;
//!
//! let jitter = GammaDistribution::new("jitter", 1.0, 0.25).unwrap();
//! let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
//! let delay = jitter.sample(&mut rng);
//! assert!(delay >= 0.0);
//! ```

pub mod gamma;

pub use gamma::{gamma_params, sample, GammaDistribution};

/// Lines per batch (mean, stdev)
pub const DEFAULT_BATCH_SIZE: (f64, f64) = (40.0, 25.0);

/// Delay between batches in seconds (mean, stdev)
pub const DEFAULT_JITTER: (f64, f64) = (1.0, 0.25);
