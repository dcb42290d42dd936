use std::sync::Arc;

use crate::error::Result;
use crate::params::{ParameterSet, ParameterSetBuilder};

/// N=7, Q=19 with the noise bound pinned to 1.
///
/// The derived bound floor(sqrt(19/28)) is 0 here, so the bound has to be
/// explicit. Small enough for the least-squares attack to be interesting.
pub fn toy_insecure() -> Result<Arc<ParameterSet>> {
    ParameterSetBuilder::new(7, 19).error_bound(1).build()
}

/// N=200, Q=200², derived bound 7. Decrypts reliably.
pub fn demo_correctness() -> Result<Arc<ParameterSet>> {
    ParameterSet::new(200, 200 * 200)
}

/// N=1000, Q=1000³, derived bound 500.
pub fn demo_secure() -> Result<Arc<ParameterSet>> {
    ParameterSet::new(1000, 1_000_000_000)
}

/// N=300, Q=104729 with the fixed `[-10, 10]` uniform noise window of the
/// plain public-key variant.
pub fn fixed_window() -> Result<Arc<ParameterSet>> {
    ParameterSetBuilder::new(300, 104_729)
        .error_bound(10)
        .distribution(crate::params::ErrorDistribution::Uniform)
        .build()
}
