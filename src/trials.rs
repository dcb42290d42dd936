//! Statistical trial runners: correctness, cross-key mismatch and the
//! least-squares crack rate.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::{debug, info};

use crate::attack::recover_and_decrypt;
use crate::error::Result;
use crate::lwe::Ciphertext;
use crate::params::ParameterSet;
use crate::user::User;

/// Alice and Bob sharing one parameter set, plus a generator for messages.
pub struct Trials {
    pub alice: User,
    pub bob: User,
    rng: ChaCha20Rng,
}

impl Trials {
    pub fn new(params: &Arc<ParameterSet>, rng: &mut ChaCha20Rng) -> Result<Self> {
        let alice = User::with_rng("Alice", params, ChaCha20Rng::seed_from_u64(rng.random()))?;
        let bob = User::with_rng("Bob", params, ChaCha20Rng::seed_from_u64(rng.random()))?;
        Ok(Self {
            alice,
            bob,
            rng: ChaCha20Rng::seed_from_u64(rng.random()),
        })
    }

    /// Alice encrypts random messages to Bob; count messages Bob fails to recover.
    pub fn send_receive_failures(&mut self, rounds: usize, length: usize) -> Result<usize> {
        let mut failures = 0;
        for round in 0..rounds {
            let msg = random_bits(length, &mut self.rng);
            let ct = self.alice.encrypt(&msg, self.bob.public_key())?;
            let dec = self.bob.decrypt(&ct)?;
            if dec != msg {
                let wrong = msg.iter().zip(&dec).filter(|(a, b)| a != b).count();
                debug!(round, wrong, "decryption failure");
                failures += 1;
            }
        }
        Ok(failures)
    }

    /// Alice encrypts under her own key and Bob decrypts; count messages Bob
    /// nevertheless recovers exactly.
    pub fn cross_key_successes(&mut self, rounds: usize, length: usize) -> Result<usize> {
        let own_key = self.alice.public_key().clone();
        let mut successes = 0;
        for _ in 0..rounds {
            let msg = random_bits(length, &mut self.rng);
            let ct = self.alice.encrypt(&msg, &own_key)?;
            if self.bob.decrypt(&ct)? == msg {
                successes += 1;
            }
        }
        Ok(successes)
    }
}

/// One user encrypts `ciphers` random messages of `length` bits under their own
/// public key; the attacker sees only the ciphertexts. Returns how many
/// messages the attacker recovered exactly.
pub fn crack_count(
    params: &Arc<ParameterSet>,
    ciphers: usize,
    length: usize,
    rng: &mut ChaCha20Rng,
) -> Result<usize> {
    let mut victim = User::with_rng("Alice", params, ChaCha20Rng::seed_from_u64(rng.random()))?;
    let own_key = victim.public_key().clone();

    let plaintexts: Vec<Vec<u8>> = (0..ciphers).map(|_| random_bits(length, rng)).collect();
    let ciphertexts = plaintexts
        .iter()
        .map(|msg| victim.encrypt(msg, &own_key).map(Ciphertext::from))
        .collect::<Result<Vec<_>>>()?;

    let report = recover_and_decrypt(params, &ciphertexts)?;
    let cracked = plaintexts
        .iter()
        .zip(&report.plaintexts)
        .filter(|(plain, dec)| plain == dec)
        .count();

    info!(
        dimension = params.dimension,
        modulus = params.modulus,
        equations = report.equations,
        cracked,
        "least-squares attack finished"
    );
    Ok(cracked)
}

pub fn random_bits<R: Rng>(length: usize, rng: &mut R) -> Vec<u8> {
    (0..length).map(|_| rng.random_range(0..2u8)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::presets;

    #[test]
    fn test_small_harness_runs() {
        let params = ParameterSet::new(32, 1 << 18).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let mut trials = Trials::new(&params, &mut rng).unwrap();

        assert_eq!(trials.send_receive_failures(10, 20).unwrap(), 0);
        assert_eq!(trials.cross_key_successes(10, 20).unwrap(), 0);
    }

    #[test]
    fn test_random_bits() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let bits = random_bits(1000, &mut rng);
        assert!(bits.iter().all(|&b| b <= 1));
        let ones = bits.iter().filter(|&&b| b == 1).count();
        assert!(ones > 400 && ones < 600);
    }

    #[test]
    fn test_crack_count_on_toy_parameters() {
        let params = presets::toy_insecure().unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let cracked = crack_count(&params, 100, 20, &mut rng).unwrap();
        assert!(cracked > 5 && cracked <= 100, "cracked {cracked}/100");
    }
}
