//! # toylwe: a toy LWE public-key scheme and a least-squares attack on it
//!
//! Bits are encrypted under a Learning-With-Errors public key (A, y = s·A + e)
//! over Z_q. The [`attack`] module shows why small parameters are unsafe: it
//! fits the key to the ciphertexts by least squares, over the reals and then
//! modulo q, and decrypts with the result.
//!
//! ## Quick Start
//!
//! ```no_run
//! use toylwe::prelude::*;
//!
//! // N = 200, Q = 40000, error bound derived as floor(sqrt(Q / 4N)) = 7
//! let params = toylwe::params::presets::demo_correctness().unwrap();
//!
//! let mut alice = User::new("Alice", &params).unwrap();
//! let bob = User::new("Bob", &params).unwrap();
//!
//! let ct = alice.encrypt_text("Hello Bob!", bob.public_key()).unwrap();
//! assert_eq!(bob.decrypt_text(&ct).unwrap(), "Hello Bob!");
//!
//! // An eavesdropper only sees the ciphertexts.
//! let guesses = attack_batches(&params, &[ct]).unwrap();
//! assert_eq!(guesses[0].len(), 70);
//! ```

pub mod attack;
pub mod codec;
pub mod error;
pub mod lwe;
pub mod math;
pub mod params;
pub mod sampling;
pub mod trials;
pub mod user;

/// Convenient re-exports for common types and functions.
pub mod prelude {
    pub use crate::attack::{attack, attack_batches, recover_and_decrypt, AttackReport, RecoveryMethod};
    pub use crate::codec::{bits_to_string, string_to_bits};
    pub use crate::error::{LweError, Result};
    pub use crate::lwe::{
        decrypt_batch, decrypt_bit, encrypt_batch, encrypt_bit, encrypt_bit_sk, keygen,
        BatchCiphertext, BitCiphertext, Ciphertext, PrivateKey, PublicKey,
    };
    pub use crate::params::{EncryptionStrategy, ErrorDistribution, ParameterSet, ParameterSetBuilder};
    pub use crate::sampling::ErrorSampler;
    pub use crate::user::User;
}
