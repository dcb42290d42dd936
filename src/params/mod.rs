pub mod presets;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::debug;

use crate::error::{LweError, Result};

/// Largest supported modulus. Residues stay below 2^62 so that sums of two
/// residues and centred lifts never overflow `u64`/`i64`.
pub const MAX_MODULUS: u64 = 1u64 << 62;

/// Noise distribution χ over `[-B, B]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorDistribution {
    /// Uniform over `[-B, B]`.
    Uniform,
    /// `Binomial(2B, 1/2) - B`.
    #[default]
    ShiftedBinomial,
    /// Discrete Gaussian with variance `B/2`, truncated to `[-B, B]`.
    DiscreteGaussian,
}

impl fmt::Display for ErrorDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uniform => "uniform",
            Self::ShiftedBinomial => "binomial",
            Self::DiscreteGaussian => "gaussian",
        };
        f.write_str(name)
    }
}

impl FromStr for ErrorDistribution {
    type Err = LweError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "uniform" => Ok(Self::Uniform),
            "binomial" | "shifted-binomial" => Ok(Self::ShiftedBinomial),
            "gaussian" | "discrete-gaussian" => Ok(Self::DiscreteGaussian),
            other => Err(LweError::InvalidParameters(format!(
                "unknown error distribution '{other}' (expected uniform, binomial or gaussian)"
            ))),
        }
    }
}

/// How a bit-vector is encrypted by [`crate::user::User::encrypt`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EncryptionStrategy {
    /// One independent single-bit encryption per message bit (always with x').
    PerBit,
    /// One vectorized encryption of the whole bit-vector.
    #[default]
    Batched,
}

impl fmt::Display for EncryptionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PerBit => f.write_str("per-bit"),
            Self::Batched => f.write_str("batched"),
        }
    }
}

impl FromStr for EncryptionStrategy {
    type Err = LweError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "per-bit" | "perbit" | "bit" => Ok(Self::PerBit),
            "batched" | "batch" => Ok(Self::Batched),
            other => Err(LweError::InvalidParameters(format!(
                "unknown encryption strategy '{other}' (expected per-bit or batched)"
            ))),
        }
    }
}

/// Validated LWE scheme parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterSet {
    /// Dimension N of keys and ciphertext vectors.
    pub dimension: usize,
    /// Modulus Q.
    pub modulus: u64,
    /// Noise bound B: every noise sample lies in `[-B, B]`.
    pub error_bound: u64,
    /// Noise distribution χ.
    pub distribution: ErrorDistribution,
    /// Whether batched encryption adds the per-row scalar noise term x'.
    pub include_scalar_noise: bool,
    /// Encryption path used for bit-vectors.
    pub strategy: EncryptionStrategy,
}

impl ParameterSet {
    /// Parameters with the derived error bound and default options.
    pub fn new(dimension: usize, modulus: u64) -> Result<Arc<Self>> {
        ParameterSetBuilder::new(dimension, modulus).build()
    }

    pub fn builder(dimension: usize, modulus: u64) -> ParameterSetBuilder {
        ParameterSetBuilder::new(dimension, modulus)
    }

    /// Plaintext scaling factor ⌊Q/2⌋.
    pub fn delta(&self) -> u64 {
        self.modulus / 2
    }
}

/// `floor(sqrt(Q / (4N)))`, exact in integers.
pub fn derived_error_bound(dimension: usize, modulus: u64) -> u64 {
    let denom = 4u128 * dimension as u128;
    if denom == 0 {
        return 0;
    }
    ((modulus as u128 / denom) as u64).isqrt()
}

/// Builder for [`ParameterSet`].
pub struct ParameterSetBuilder {
    dimension: usize,
    modulus: u64,
    error_bound: Option<u64>,
    distribution: ErrorDistribution,
    include_scalar_noise: bool,
    strategy: EncryptionStrategy,
}

impl ParameterSetBuilder {
    pub fn new(dimension: usize, modulus: u64) -> Self {
        Self {
            dimension,
            modulus,
            error_bound: None,
            distribution: ErrorDistribution::default(),
            include_scalar_noise: false,
            strategy: EncryptionStrategy::default(),
        }
    }

    /// Pin the noise bound instead of deriving it from N and Q.
    pub fn error_bound(mut self, bound: u64) -> Self {
        self.error_bound = Some(bound);
        self
    }

    pub fn distribution(mut self, distribution: ErrorDistribution) -> Self {
        self.distribution = distribution;
        self
    }

    pub fn include_scalar_noise(mut self, include: bool) -> Self {
        self.include_scalar_noise = include;
        self
    }

    pub fn strategy(mut self, strategy: EncryptionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn build(self) -> Result<Arc<ParameterSet>> {
        if self.dimension == 0 {
            return Err(LweError::InvalidParameters("dimension must be >= 1".into()));
        }
        if self.modulus < 2 {
            return Err(LweError::InvalidParameters("modulus must be >= 2".into()));
        }
        if self.modulus > MAX_MODULUS {
            return Err(LweError::InvalidParameters(format!(
                "modulus {} exceeds the supported maximum 2^62",
                self.modulus
            )));
        }

        let error_bound = match self.error_bound {
            Some(0) => {
                return Err(LweError::InvalidParameters("explicit error bound must be > 0".into()));
            }
            Some(bound) if bound >= self.modulus.div_ceil(2) => {
                return Err(LweError::InvalidParameters(format!(
                    "explicit error bound {bound} must be below Q/2 = {}",
                    self.modulus / 2
                )));
            }
            Some(bound) => bound,
            None => {
                let bound = derived_error_bound(self.dimension, self.modulus);
                if bound == 0 {
                    return Err(LweError::InvalidParameters(format!(
                        "error bound floor(sqrt(Q/(4N))) is 0 for N={}, Q={}; decrease N or increase Q",
                        self.dimension, self.modulus
                    )));
                }
                bound
            }
        };

        debug!(
            dimension = self.dimension,
            modulus = self.modulus,
            error_bound,
            distribution = %self.distribution,
            "built LWE parameter set"
        );

        Ok(Arc::new(ParameterSet {
            dimension: self.dimension,
            modulus: self.modulus,
            error_bound,
            distribution: self.distribution,
            include_scalar_noise: self.include_scalar_noise,
            strategy: self.strategy,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_bound() {
        let params = ParameterSet::new(200, 40_000).unwrap();
        // sqrt(40000 / 800) = sqrt(50) ≈ 7.07
        assert_eq!(params.error_bound, 7);
        assert_eq!(params.delta(), 20_000);

        let params = ParameterSet::new(1000, 1_000_000_000).unwrap();
        assert_eq!(params.error_bound, 500);
    }

    #[test]
    fn test_bound_is_floor_of_real_sqrt() {
        // Q/(4N) = 24.75, sqrt ≈ 4.97
        assert_eq!(derived_error_bound(4, 396), 4);
        // Q/(4N) = 25 exactly
        assert_eq!(derived_error_bound(4, 400), 5);
    }

    #[test]
    fn test_rejects_zero_bound() {
        let err = ParameterSet::new(1000, 19).unwrap_err();
        assert!(matches!(err, LweError::InvalidParameters(_)));
        assert!(ParameterSet::new(7, 19).is_err());
    }

    #[test]
    fn test_rejects_degenerate_inputs() {
        assert!(ParameterSet::new(0, 1000).is_err());
        assert!(ParameterSet::new(1, 1).is_err());
        assert!(ParameterSet::new(1, MAX_MODULUS + 1).is_err());
    }

    #[test]
    fn test_explicit_bound() {
        let params = ParameterSet::builder(7, 19).error_bound(1).build().unwrap();
        assert_eq!(params.error_bound, 1);

        assert!(ParameterSet::builder(7, 19).error_bound(0).build().is_err());
        assert!(ParameterSet::builder(7, 19).error_bound(10).build().is_err());
        assert!(ParameterSet::builder(7, 19).error_bound(9).build().is_ok());
    }

    #[test]
    fn test_parse_options() {
        assert_eq!("uniform".parse::<ErrorDistribution>().unwrap(), ErrorDistribution::Uniform);
        assert_eq!("Gaussian".parse::<ErrorDistribution>().unwrap(), ErrorDistribution::DiscreteGaussian);
        assert!("laplace".parse::<ErrorDistribution>().is_err());
        assert_eq!("per-bit".parse::<EncryptionStrategy>().unwrap(), EncryptionStrategy::PerBit);
        assert_eq!(ErrorDistribution::default().to_string(), "binomial");
    }
}
