use std::collections::BTreeMap;

use rand::Rng;

use crate::params::{ErrorDistribution, ParameterSet};
use crate::sampling::gaussian::GaussianTable;

/// Draws bounded noise values in `[-B, B]` from the distribution selected by
/// the parameter set.
///
/// The sampler holds no randomness itself; every call takes the caller's
/// generator so that draws stay reproducible under a seeded RNG.
#[derive(Clone, Debug)]
pub struct ErrorSampler {
    bound: u64,
    kind: SamplerKind,
}

#[derive(Clone, Debug)]
enum SamplerKind {
    Uniform,
    ShiftedBinomial { trials: u64 },
    DiscreteGaussian(GaussianTable),
}

impl ErrorSampler {
    pub fn new(params: &ParameterSet) -> Self {
        Self::with_distribution(params.distribution, params.error_bound)
    }

    pub fn with_distribution(distribution: ErrorDistribution, bound: u64) -> Self {
        let kind = match distribution {
            ErrorDistribution::Uniform => SamplerKind::Uniform,
            ErrorDistribution::ShiftedBinomial => SamplerKind::ShiftedBinomial { trials: 2 * bound },
            // Same variance as the binomial, B/2.
            ErrorDistribution::DiscreteGaussian => {
                let sigma = (bound as f64 / 2.0).sqrt();
                SamplerKind::DiscreteGaussian(GaussianTable::new(sigma, bound))
            }
        };
        Self { bound, kind }
    }

    pub fn bound(&self) -> u64 {
        self.bound
    }

    pub fn sample_one<R: Rng>(&self, rng: &mut R) -> i64 {
        let b = self.bound as i64;
        match &self.kind {
            SamplerKind::Uniform => rng.random_range(-b..=b),
            SamplerKind::ShiftedBinomial { trials } => sample_binomial_half(*trials, rng) as i64 - b,
            SamplerKind::DiscreteGaussian(table) => table.sample(rng),
        }
    }

    /// Draw `size` independent noise values.
    pub fn sample<R: Rng>(&self, size: usize, rng: &mut R) -> Vec<i64> {
        (0..size).map(|_| self.sample_one(rng)).collect()
    }

    /// Empirical counts of `n` draws, keyed by value.
    pub fn histogram<R: Rng>(&self, n: usize, rng: &mut R) -> BTreeMap<i64, usize> {
        let mut counts = BTreeMap::new();
        for _ in 0..n {
            *counts.entry(self.sample_one(rng)).or_insert(0) += 1;
        }
        counts
    }
}

/// Binomial(trials, 1/2) as a popcount over random words.
fn sample_binomial_half<R: Rng>(trials: u64, rng: &mut R) -> u64 {
    let mut remaining = trials;
    let mut heads = 0u64;
    while remaining >= 64 {
        heads += rng.random::<u64>().count_ones() as u64;
        remaining -= 64;
    }
    if remaining > 0 {
        let mask = (1u64 << remaining) - 1;
        heads += (rng.random::<u64>() & mask).count_ones() as u64;
    }
    heads
}
