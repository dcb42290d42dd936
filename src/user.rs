use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use crate::codec::{bits_to_string, string_to_bits};
use crate::error::Result;
use crate::lwe::{
    decrypt_batch, encrypt_batch_with_rng, encrypt_bit_with_rng, keygen_with_rng, BatchCiphertext,
    PrivateKey, PublicKey,
};
use crate::params::{EncryptionStrategy, ParameterSet};

/// A named party holding one key pair and its own randomness source.
pub struct User {
    name: String,
    params: Arc<ParameterSet>,
    private_key: PrivateKey,
    public_key: PublicKey,
    rng: ChaCha20Rng,
}

impl User {
    /// Create a user with a fresh OS-seeded generator.
    pub fn new(name: impl Into<String>, params: &Arc<ParameterSet>) -> Result<Self> {
        Self::with_rng(name, params, ChaCha20Rng::from_os_rng())
    }

    /// Create a user whose keys and encryptions are reproducible from `seed`.
    pub fn with_seed(name: impl Into<String>, params: &Arc<ParameterSet>, seed: u64) -> Result<Self> {
        Self::with_rng(name, params, ChaCha20Rng::seed_from_u64(seed))
    }

    pub fn with_rng(name: impl Into<String>, params: &Arc<ParameterSet>, mut rng: ChaCha20Rng) -> Result<Self> {
        let name = name.into();
        let (private_key, public_key) = keygen_with_rng(params, &mut rng)?;
        debug!(user = %name, dimension = params.dimension, "created user key pair");
        Ok(Self {
            name,
            params: params.clone(),
            private_key,
            public_key,
            rng,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &Arc<ParameterSet> {
        &self.params
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    /// Encrypt a bit-vector under someone's public key, using this user's
    /// configured [`EncryptionStrategy`].
    pub fn encrypt(&mut self, bits: &[u8], recipient: &PublicKey) -> Result<BatchCiphertext> {
        match self.params.strategy {
            EncryptionStrategy::Batched => encrypt_batch_with_rng(recipient, bits, &mut self.rng),
            EncryptionStrategy::PerBit => {
                let cts = bits
                    .iter()
                    .map(|&m| encrypt_bit_with_rng(recipient, m, &mut self.rng))
                    .collect::<Result<Vec<_>>>()?;
                BatchCiphertext::from_bits(cts, recipient.params.dimension)
            }
        }
    }

    /// Decrypt a bit-vector with this user's private key.
    pub fn decrypt(&self, ct: &BatchCiphertext) -> Result<Vec<u8>> {
        decrypt_batch(&self.private_key, ct)
    }

    /// Encode an ASCII string and encrypt it.
    pub fn encrypt_text(&mut self, text: &str, recipient: &PublicKey) -> Result<BatchCiphertext> {
        let bits = string_to_bits(text)?;
        self.encrypt(&bits, recipient)
    }

    /// Decrypt and decode an ASCII string.
    pub fn decrypt_text(&self, ct: &BatchCiphertext) -> Result<String> {
        bits_to_string(&self.decrypt(ct)?)
    }
}
