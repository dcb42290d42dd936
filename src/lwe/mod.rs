//! The LWE public-key scheme.
//!
//! Keys: s ← χ^N, public (A, y = s·A + e). A bit m is encrypted as
//! (A·r + x, y·r + x' + m·⌊q/2⌋) and decrypted by testing whether
//! b - s·a lies within q/4 of zero.

pub mod ciphertext;
pub mod encrypt;
pub mod keygen;

pub use ciphertext::{BatchCiphertext, BitCiphertext, Ciphertext};
pub use encrypt::{
    decrypt_batch, decrypt_bit, encrypt_batch, encrypt_batch_with_rng, encrypt_bit, encrypt_bit_sk,
    encrypt_bit_sk_with_rng, encrypt_bit_with_rng,
};
pub use keygen::{keygen, keygen_with_rng, PrivateKey, PublicKey};
