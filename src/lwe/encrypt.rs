use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use tracing::trace;

use crate::error::{LweError, Result};
use crate::lwe::ciphertext::{BatchCiphertext, BitCiphertext};
use crate::lwe::keygen::{PrivateKey, PublicKey};
use crate::math::{centered_abs, dot_mod, from_signed, mod_add, mod_sub, Matrix};
use crate::sampling::{sample_uniform_vec, ErrorSampler};

/// Encrypt a single bit under a public key.
///
/// c = (a, b) = (A·r + x, y·r + x' + m·⌊q/2⌋) mod q
/// where r, x ← χ^N and x' ← χ.
pub fn encrypt_bit(pk: &PublicKey, m: u8) -> Result<BitCiphertext> {
    let mut rng = ChaCha20Rng::from_os_rng();
    encrypt_bit_with_rng(pk, m, &mut rng)
}

/// Encrypt a single bit with provided RNG (for deterministic testing).
pub fn encrypt_bit_with_rng<R: rand::Rng>(pk: &PublicKey, m: u8, rng: &mut R) -> Result<BitCiphertext> {
    pk.validate()?;
    let params = &pk.params;
    let q = params.modulus;
    let n = params.dimension;
    let m = check_bit(m)?;
    let sampler = ErrorSampler::new(params);

    let r: Vec<u64> = sampler.sample(n, rng).into_iter().map(|v| from_signed(v, q)).collect();
    let x = sampler.sample(n, rng);
    let x_prime = sampler.sample_one(rng);

    let (a, b) = encrypt_row(pk, &r, &x, x_prime, m)?;
    Ok(BitCiphertext { a, b })
}

/// Encrypt a bit-vector in one vectorized pass.
///
/// A' = r·Aᵀ + x, b = r·y + m·⌊q/2⌋ (mod q), with r, x ← χ^{M×N}.
/// The per-row scalar noise x' is only added when the parameter set enables
/// `include_scalar_noise`; without it the batched path is strictly weaker
/// than [`encrypt_bit`].
pub fn encrypt_batch(pk: &PublicKey, bits: &[u8]) -> Result<BatchCiphertext> {
    let mut rng = ChaCha20Rng::from_os_rng();
    encrypt_batch_with_rng(pk, bits, &mut rng)
}

/// Batched encryption with provided RNG.
pub fn encrypt_batch_with_rng<R: rand::Rng>(
    pk: &PublicKey,
    bits: &[u8],
    rng: &mut R,
) -> Result<BatchCiphertext> {
    pk.validate()?;
    let params = &pk.params;
    let q = params.modulus;
    let n = params.dimension;
    let messages = bits.iter().map(|&m| check_bit(m)).collect::<Result<Vec<u64>>>()?;
    let num_bits = messages.len();
    let sampler = ErrorSampler::new(params);

    // All randomness is drawn up front, in a fixed order, so that the
    // parallel row arithmetic below stays reproducible.
    let r: Vec<u64> = sampler
        .sample(num_bits * n, rng)
        .into_iter()
        .map(|v| from_signed(v, q))
        .collect();
    let x = sampler.sample(num_bits * n, rng);
    let x_prime = if params.include_scalar_noise {
        sampler.sample(num_bits, rng)
    } else {
        vec![0i64; num_bits]
    };

    let rows = messages
        .par_iter()
        .enumerate()
        .map(|(i, &m)| {
            let span = i * n..(i + 1) * n;
            encrypt_row(pk, &r[span.clone()], &x[span], x_prime[i], m)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut data = Vec::with_capacity(num_bits * n);
    let mut b = Vec::with_capacity(num_bits);
    for (row, bi) in rows {
        data.extend(row);
        b.push(bi);
    }

    trace!(bits = num_bits, dimension = n, scalar_noise = params.include_scalar_noise, "batch encrypted");

    Ok(BatchCiphertext {
        a: Matrix { data, rows: num_bits, cols: n },
        b,
    })
}

/// Encrypt a single bit with the secret key (symmetric encryption).
///
/// c = (a, s·a + e + m·⌊q/2⌋) with a uniform in Z_q^N and e ← χ.
pub fn encrypt_bit_sk(sk: &PrivateKey, m: u8) -> Result<BitCiphertext> {
    let mut rng = ChaCha20Rng::from_os_rng();
    encrypt_bit_sk_with_rng(sk, m, &mut rng)
}

/// Secret-key encryption with provided RNG.
pub fn encrypt_bit_sk_with_rng<R: rand::Rng>(sk: &PrivateKey, m: u8, rng: &mut R) -> Result<BitCiphertext> {
    let params = &sk.params;
    let q = params.modulus;
    let m = check_bit(m)?;
    let sampler = ErrorSampler::new(params);

    let a = sample_uniform_vec(params.dimension, q, rng);
    let e = sampler.sample_one(rng);

    let s_a = dot_mod(&a, &sk.residues(), q);
    let b = mod_add(mod_add(s_a, from_signed(e, q), q), m * params.delta(), q);
    Ok(BitCiphertext { a, b })
}

/// Decrypt a single bit.
///
/// 0 if |b - s·a mod q| < q/4, else 1, where |·| is the distance to 0 on Z_q.
pub fn decrypt_bit(sk: &PrivateKey, ct: &BitCiphertext) -> Result<u8> {
    if ct.a.len() != sk.params.dimension {
        return Err(LweError::DimensionMismatch {
            expected: sk.params.dimension,
            got: ct.a.len(),
        });
    }
    ct.validate(&sk.params)?;
    let q = sk.params.modulus;
    Ok(decode_phase(mod_sub(ct.b, dot_mod(&ct.a, &sk.residues(), q), q), q))
}

/// Decrypt a batched ciphertext row by row.
pub fn decrypt_batch(sk: &PrivateKey, ct: &BatchCiphertext) -> Result<Vec<u8>> {
    ct.validate(&sk.params)?;
    Ok(decrypt_rows(&sk.residues(), ct, sk.params.modulus))
}

/// Row-wise decryption under arbitrary key residues. Shared with the
/// attacker, whose candidate key is not a [`PrivateKey`].
pub(crate) fn decrypt_rows(s: &[u64], ct: &BatchCiphertext, q: u64) -> Vec<u8> {
    (0..ct.len())
        .into_par_iter()
        .map(|i| {
            let (a, b) = ct.row(i);
            decode_phase(mod_sub(b, dot_mod(a, s, q), q), q)
        })
        .collect()
}

/// Map a phase b - s·a to a bit: 0 when it lies within q/4 of zero.
pub(crate) fn decode_phase(phase: u64, q: u64) -> u8 {
    let t = centered_abs(phase, q) as u128;
    if 4 * t < q as u128 { 0 } else { 1 }
}

/// (A·r + x, y·r + x' + m·⌊q/2⌋) for one message bit.
fn encrypt_row(pk: &PublicKey, r: &[u64], x: &[i64], x_prime: i64, m: u64) -> Result<(Vec<u64>, u64)> {
    let params = &pk.params;
    let q = params.modulus;

    let a: Vec<u64> = pk
        .a
        .mul_vec(r, q)?
        .into_iter()
        .zip(x.iter())
        .map(|(ar, &xi)| mod_add(ar, from_signed(xi, q), q))
        .collect();

    let y_r = dot_mod(&pk.y, r, q);
    let b = mod_add(mod_add(y_r, from_signed(x_prime, q), q), m * params.delta(), q);
    Ok((a, b))
}

fn check_bit(m: u8) -> Result<u64> {
    match m {
        0 | 1 => Ok(m as u64),
        other => Err(LweError::InvalidMessage(format!("bit value must be 0 or 1, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lwe::keygen::keygen_with_rng;
    use crate::params::{presets, ParameterSet};

    #[test]
    fn test_bit_roundtrip() {
        let params = ParameterSet::new(64, 1 << 20).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let (sk, pk) = keygen_with_rng(&params, &mut rng).unwrap();

        for m in [0u8, 1, 1, 0, 1] {
            let ct = encrypt_bit_with_rng(&pk, m, &mut rng).unwrap();
            assert!(ct.a.iter().all(|&v| v < params.modulus));
            assert!(ct.b < params.modulus);
            assert_eq!(decrypt_bit(&sk, &ct).unwrap(), m);
        }
    }

    #[test]
    fn test_batch_roundtrip() {
        let params = ParameterSet::new(64, 1 << 20).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let (sk, pk) = keygen_with_rng(&params, &mut rng).unwrap();

        let bits: Vec<u8> = (0..40).map(|i| (i % 3 == 0) as u8).collect();
        let ct = encrypt_batch_with_rng(&pk, &bits, &mut rng).unwrap();
        assert_eq!((ct.a.rows, ct.a.cols), (40, 64));
        assert_eq!(decrypt_batch(&sk, &ct).unwrap(), bits);
    }

    #[test]
    fn test_batch_with_scalar_noise_roundtrip() {
        let params = ParameterSet::builder(64, 1 << 20).include_scalar_noise(true).build().unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let (sk, pk) = keygen_with_rng(&params, &mut rng).unwrap();

        let bits = vec![1u8, 0, 1, 1, 0, 0, 1];
        let ct = encrypt_batch_with_rng(&pk, &bits, &mut rng).unwrap();
        assert_eq!(decrypt_batch(&sk, &ct).unwrap(), bits);
    }

    #[test]
    fn test_batch_rows_match_single_bit_algebra() {
        // Without x', the phase of every batched row is exactly e·r - s·x + m·⌊q/2⌋.
        let params = ParameterSet::builder(16, 1 << 16).error_bound(2).build().unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let (sk, pk) = keygen_with_rng(&params, &mut rng).unwrap();
        let q = params.modulus;
        let n = params.dimension as u64;
        let b = params.error_bound;

        let ct = encrypt_batch_with_rng(&pk, &[0, 0, 0, 0], &mut rng).unwrap();
        for i in 0..ct.len() {
            let (a, bi) = ct.row(i);
            let phase = mod_sub(bi, dot_mod(a, &sk.residues(), q), q);
            assert!(centered_abs(phase, q) <= 2 * n * b * b);
        }
    }

    #[test]
    fn test_empty_batch() {
        let params = ParameterSet::new(8, 4096).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let (sk, pk) = keygen_with_rng(&params, &mut rng).unwrap();
        let ct = encrypt_batch_with_rng(&pk, &[], &mut rng).unwrap();
        assert!(ct.is_empty());
        assert!(decrypt_batch(&sk, &ct).unwrap().is_empty());
    }

    #[test]
    fn test_secret_key_encryption() {
        let params = presets::toy_insecure().unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let (sk, _) = keygen_with_rng(&params, &mut rng).unwrap();

        // e ∈ [-1, 1] is far below q/4, so symmetric encryption never fails here.
        for i in 0..200 {
            let m = (i % 2) as u8;
            let ct = encrypt_bit_sk_with_rng(&sk, m, &mut rng).unwrap();
            assert_eq!(decrypt_bit(&sk, &ct).unwrap(), m);
        }
    }

    #[test]
    fn test_toy_parameters_decrypt_one() {
        let params = presets::toy_insecure().unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(6);
        let (sk, pk) = keygen_with_rng(&params, &mut rng).unwrap();

        let correct = (0..1000)
            .filter(|_| {
                let ct = encrypt_bit_with_rng(&pk, 1, &mut rng).unwrap();
                decrypt_bit(&sk, &ct).unwrap() == 1
            })
            .count();
        assert!(correct >= 950, "only {correct}/1000 decrypted to 1");
    }

    #[test]
    fn test_rejects_non_bits() {
        let params = ParameterSet::new(8, 4096).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let (sk, pk) = keygen_with_rng(&params, &mut rng).unwrap();
        assert!(matches!(encrypt_bit_with_rng(&pk, 2, &mut rng), Err(LweError::InvalidMessage(_))));
        assert!(encrypt_batch_with_rng(&pk, &[0, 1, 7], &mut rng).is_err());
        assert!(encrypt_bit_sk_with_rng(&sk, 3, &mut rng).is_err());
    }

    #[test]
    fn test_decrypt_shape_errors() {
        let params = ParameterSet::new(8, 4096).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(8);
        let (sk, _) = keygen_with_rng(&params, &mut rng).unwrap();

        let bad_bit = BitCiphertext { a: vec![0; 7], b: 0 };
        assert!(matches!(decrypt_bit(&sk, &bad_bit), Err(LweError::DimensionMismatch { .. })));

        let bad_batch = BatchCiphertext { a: Matrix::zero(2, 8), b: vec![0] };
        assert!(matches!(decrypt_batch(&sk, &bad_batch), Err(LweError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_decrypt_rejects_unreduced_entries() {
        let params = presets::toy_insecure().unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let (sk, _) = keygen_with_rng(&params, &mut rng).unwrap();

        let big_b = BitCiphertext { a: vec![0; 7], b: 24 };
        assert!(matches!(
            decrypt_bit(&sk, &big_b),
            Err(LweError::UnreducedEntry { value: 24, modulus: 19 })
        ));

        let big_a = BitCiphertext { a: vec![0, 0, 0, u64::MAX, 0, 0, 0], b: 1 };
        assert!(matches!(decrypt_bit(&sk, &big_a), Err(LweError::UnreducedEntry { .. })));

        let mut batch = BatchCiphertext { a: Matrix::zero(1, 7), b: vec![0] };
        batch.b[0] = 19;
        assert!(matches!(decrypt_batch(&sk, &batch), Err(LweError::UnreducedEntry { .. })));
    }

    #[test]
    fn test_decode_phase_threshold() {
        // q = 19: q/4 = 4.75, so distances 0..=4 decode to 0.
        assert_eq!(decode_phase(0, 19), 0);
        assert_eq!(decode_phase(4, 19), 0);
        assert_eq!(decode_phase(15, 19), 0);
        assert_eq!(decode_phase(5, 19), 1);
        assert_eq!(decode_phase(9, 19), 1);
        assert_eq!(decode_phase(14, 19), 1);
    }
}
