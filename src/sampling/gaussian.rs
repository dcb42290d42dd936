use rand::Rng;

/// Cumulative distribution table for a discrete Gaussian over Z, centred at 0
/// and truncated to `[-tail, tail]`.
///
/// Unlike the usual 6σ tail cut, the tail here is the scheme's hard noise
/// bound, so every sample is guaranteed to lie inside `[-B, B]`.
#[derive(Clone, Debug)]
pub struct GaussianTable {
    tail: i64,
    cdf: Vec<f64>,
}

impl GaussianTable {
    pub fn new(sigma: f64, tail: u64) -> Self {
        let tail = tail as i64;
        let mut cdf = Vec::with_capacity((2 * tail + 1) as usize);
        let mut cumulative = 0.0f64;
        let two_sigma_sq = 2.0 * sigma * sigma;

        for x in -tail..=tail {
            let prob = (-((x * x) as f64) / two_sigma_sq).exp();
            cumulative += prob;
            cdf.push(cumulative);
        }

        Self { tail, cdf }
    }

    /// Draw one value: the lowest index whose cumulative weight exceeds u.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> i64 {
        let total = self.cdf.last().copied().unwrap_or(1.0);
        let u: f64 = rng.random::<f64>() * total;
        let idx = self.cdf.partition_point(|&c| c <= u);
        (-self.tail + idx as i64).min(self.tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_gaussian_distribution() {
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let sigma = 3.2;
        let table = GaussianTable::new(sigma, 20);
        let n = 10000;

        let samples: Vec<i64> = (0..n).map(|_| table.sample(&mut rng)).collect();

        // Check mean is close to 0
        let mean: f64 = samples.iter().map(|&x| x as f64).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.5, "mean = {mean}");

        // Check variance is close to σ²
        let var: f64 = samples.iter().map(|&x| (x as f64 - mean).powi(2)).sum::<f64>() / n as f64;
        let expected_var = sigma * sigma;
        assert!((var - expected_var).abs() < 2.0, "var = {var}, expected ≈ {expected_var}");
    }

    #[test]
    fn test_truncation() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        // Wide sigma, tight tail: the bound must still hold.
        let table = GaussianTable::new(50.0, 2);
        for _ in 0..5000 {
            let s = table.sample(&mut rng);
            assert!((-2..=2).contains(&s), "sample {s} outside [-2, 2]");
        }
    }
}
