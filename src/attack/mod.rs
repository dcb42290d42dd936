//! Least-squares key recovery.
//!
//! Every ciphertext row (a_i, b_i) satisfies b_i = a_i·s + n_i + m_i·⌊q/2⌋
//! (mod q) for small noise n_i. The attack runs in two stages.
//!
//! 1. Real relaxation: stack all rows into one real system A·s ≈ b, solve it
//!    by least squares and round to a candidate key. This only means
//!    anything while the rows have not wrapped around q.
//! 2. Modular least squares: doubling a row cancels the message, since
//!    2·m·⌊q/2⌋ is 0 (q even) or -m (q odd) mod q. So 2(b_i - a_i·s) is small
//!    and centred for the true key, and roughly uniform for any other. When
//!    the key box [-B, B]^N is small enough to enumerate, the key minimising
//!    Σ centred(2(b_i - a_i·s))² over all rows replaces the relaxed candidate.
//!
//! Small parameters fall to stage 2. At realistic sizes the box is
//! astronomically large, only the relaxation is left, and its candidate
//! decrypts no better than chance.

pub mod lstsq;

use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::lwe::ciphertext::{BatchCiphertext, Ciphertext};
use crate::lwe::encrypt::{decode_phase, decrypt_rows};
use crate::math::{dot_mod, from_signed, mod_add, mod_sub, to_centered};
use crate::params::ParameterSet;

pub use lstsq::{lstsq, LstsqSolution};

/// Largest key box the modular stage will enumerate.
pub const MAX_SEARCH_CANDIDATES: u64 = 1 << 16;

/// Which stage produced the candidate key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecoveryMethod {
    /// Rounded real least-squares solution.
    Relaxation,
    /// Exhaustive modular least squares over the key box.
    ModularSearch { candidates: u64 },
}

/// Everything the attacker learned from one batch of ciphertexts.
#[derive(Clone, Debug)]
pub struct AttackReport {
    /// Recovered key, centred into (-q/2, q/2].
    pub candidate_key: Vec<i64>,
    pub method: RecoveryMethod,
    /// Total number of stacked equations K.
    pub equations: usize,
    /// Numerical rank of the stacked K×N real system.
    pub rank: usize,
    /// Residual norm of the real-valued least-squares fit.
    pub residual_norm: f64,
    /// Σ centred(2(b_i - a_i·s))² for the candidate key.
    pub modular_residual: u128,
    /// One decrypted bit-vector per input ciphertext, in input order.
    pub plaintexts: Vec<Vec<u8>>,
}

impl AttackReport {
    /// Whether the system had fewer equations than unknowns.
    pub fn underdetermined(&self) -> bool {
        self.equations < self.candidate_key.len()
    }
}

/// Attempt to decrypt ciphertexts that were all produced under one public key.
///
/// Best effort: the result always has one bit-vector per ciphertext, but there
/// is no guarantee any of them is correct. Fails only on malformed input.
pub fn attack(params: &ParameterSet, ciphertexts: &[Ciphertext]) -> Result<Vec<Vec<u8>>> {
    Ok(recover_and_decrypt(params, ciphertexts)?.plaintexts)
}

/// Recover a candidate key and decrypt every ciphertext with it.
pub fn recover_and_decrypt(params: &ParameterSet, ciphertexts: &[Ciphertext]) -> Result<AttackReport> {
    let n = params.dimension;
    let q = params.modulus;

    for ct in ciphertexts {
        ct.validate(params)?;
    }

    let rows: Vec<(&[u64], u64)> = ciphertexts.iter().flat_map(Ciphertext::rows).collect();
    let equations = rows.len();
    let mut a_total = Vec::with_capacity(equations * n);
    let mut b_total = Vec::with_capacity(equations);
    for (row, b) in &rows {
        a_total.extend(row.iter().map(|&v| v as f64));
        b_total.push(*b as f64);
    }
    debug!(equations, dimension = n, "stacked least-squares system");

    let solution = lstsq(&a_total, equations, n, &b_total)?;
    if solution.rank < n {
        debug!(rank = solution.rank, dimension = n, "system is rank deficient, using minimum-norm solution");
    }

    let relaxed: Vec<i64> = solution.x.iter().map(|&v| round_to_key(v, q)).collect();
    let relaxed_residual = modular_residual(&rows, &residues(&relaxed, q), q);

    let (candidate_key, method, modular_residual) = match search_key_box(params, &rows) {
        Some((key, score, candidates)) if score <= relaxed_residual => {
            (key, RecoveryMethod::ModularSearch { candidates }, score)
        }
        _ => (relaxed, RecoveryMethod::Relaxation, relaxed_residual),
    };

    let key_residues = residues(&candidate_key, q);
    let plaintexts: Vec<Vec<u8>> = ciphertexts
        .par_iter()
        .map(|ct| match ct {
            Ciphertext::Bit(bit) => {
                vec![decode_phase(mod_sub(bit.b, dot_mod(&bit.a, &key_residues, q), q), q)]
            }
            Ciphertext::Batch(batch) => decrypt_rows(&key_residues, batch, q),
        })
        .collect();

    debug!(
        ?method,
        rank = solution.rank,
        residual = solution.residual_norm,
        modular_residual,
        "key recovery finished"
    );

    Ok(AttackReport {
        candidate_key,
        method,
        equations,
        rank: solution.rank,
        residual_norm: solution.residual_norm,
        modular_residual,
        plaintexts,
    })
}

/// Convenience for the common case of a list of batched messages.
pub fn attack_batches(params: &ParameterSet, batches: &[BatchCiphertext]) -> Result<Vec<Vec<u8>>> {
    let cts: Vec<Ciphertext> = batches.iter().cloned().map(Ciphertext::from).collect();
    attack(params, &cts)
}

/// Enumerate [-B, B]^N and return the key with the smallest modular
/// residual, its residual and the number of candidates tried. `None` when the
/// box exceeds [`MAX_SEARCH_CANDIDATES`] or there is nothing to fit.
fn search_key_box(params: &ParameterSet, rows: &[(&[u64], u64)]) -> Option<(Vec<i64>, u128, u64)> {
    if rows.is_empty() {
        return None;
    }
    let q = params.modulus;
    let bound = params.error_bound as i64;
    let width = 2 * params.error_bound + 1;
    let candidates = u32::try_from(params.dimension)
        .ok()
        .and_then(|n| width.checked_pow(n))
        .filter(|&count| count <= MAX_SEARCH_CANDIDATES)?;

    let key_at = |mut index: u64| -> Vec<i64> {
        (0..params.dimension)
            .map(|_| {
                let digit = (index % width) as i64;
                index /= width;
                digit - bound
            })
            .collect()
    };

    let (score, index) = (0..candidates)
        .into_par_iter()
        .map(|index| (modular_residual(rows, &residues(&key_at(index), q), q), index))
        .min()?;
    debug!(candidates, score, "searched key box");
    Some((key_at(index), score, candidates))
}

/// Σ centred(2(b_i - a_i·s))² over all rows.
fn modular_residual(rows: &[(&[u64], u64)], key: &[u64], q: u64) -> u128 {
    rows.iter()
        .map(|&(a, b)| {
            let phase = mod_sub(b, dot_mod(a, key, q), q);
            let r = to_centered(mod_add(phase, phase, q), q).unsigned_abs() as u128;
            r * r
        })
        .fold(0u128, u128::saturating_add)
}

fn residues(key: &[i64], q: u64) -> Vec<u64> {
    key.iter().map(|&c| from_signed(c, q)).collect()
}

/// Round a real coordinate to the nearest integer and centre it mod q.
fn round_to_key(v: f64, q: u64) -> i64 {
    if !v.is_finite() {
        return 0;
    }
    let r = v.round().rem_euclid(q as f64) as u64;
    to_centered(r.min(q - 1), q)
}
