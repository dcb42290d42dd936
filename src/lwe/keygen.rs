use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::trace;
use zeroize::Zeroize;

use crate::error::{LweError, Result};
use crate::lwe::ciphertext::check_reduced;
use crate::math::{from_signed, mod_add, Matrix};
use crate::params::ParameterSet;
use crate::sampling::{sample_uniform_matrix, ErrorSampler};

/// LWE private key: s ← χ^N, coefficients in [-B, B].
pub struct PrivateKey {
    pub coeffs: Vec<i64>,
    pub params: Arc<ParameterSet>,
}

impl PrivateKey {
    /// Coefficients lifted into [0, Q).
    pub fn residues(&self) -> Vec<u64> {
        let q = self.params.modulus;
        self.coeffs.iter().map(|&c| from_signed(c, q)).collect()
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        // Zero out secret key material
        self.coeffs.zeroize();
    }
}

/// LWE public key: (A, y = s·A + e mod Q) with A uniform N×N.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    pub a: Matrix,
    pub y: Vec<u64>,
    pub params: Arc<ParameterSet>,
}

impl PublicKey {
    pub(crate) fn validate(&self) -> Result<()> {
        let n = self.params.dimension;
        if self.a.rows != n || self.a.cols != n {
            return Err(LweError::DimensionMismatch {
                expected: n,
                got: if self.a.rows != n { self.a.rows } else { self.a.cols },
            });
        }
        if self.y.len() != n {
            return Err(LweError::DimensionMismatch {
                expected: n,
                got: self.y.len(),
            });
        }
        check_reduced(self.a.data.iter().chain(&self.y), self.params.modulus)
    }
}

/// Generate a key pair.
pub fn keygen(params: &Arc<ParameterSet>) -> Result<(PrivateKey, PublicKey)> {
    let mut rng = ChaCha20Rng::from_os_rng();
    keygen_with_rng(params, &mut rng)
}

/// Generate a key pair with a provided RNG.
pub fn keygen_with_rng<R: rand::Rng>(
    params: &Arc<ParameterSet>,
    rng: &mut R,
) -> Result<(PrivateKey, PublicKey)> {
    let n = params.dimension;
    let q = params.modulus;
    let sampler = ErrorSampler::new(params);

    let sk = PrivateKey {
        coeffs: sampler.sample(n, rng),
        params: params.clone(),
    };

    let a = sample_uniform_matrix(n, n, q, rng);
    let e = sampler.sample(n, rng);

    // y = s·A + e mod q
    let s_a = a.vec_mul(&sk.residues(), q)?;
    let y: Vec<u64> = s_a
        .iter()
        .zip(e.iter())
        .map(|(&v, &ei)| mod_add(v, from_signed(ei, q), q))
        .collect();

    trace!(dimension = n, modulus = q, "generated key pair");

    let pk = PublicKey {
        a,
        y,
        params: params.clone(),
    };
    Ok((sk, pk))
}
