use thiserror::Error;

#[derive(Debug, Error)]
pub enum LweError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("ciphertext shape mismatch: {rows}x{cols} matrix with {b_len} b-values (dimension {dimension})")]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        b_len: usize,
        dimension: usize,
    },

    #[error("entry {value} is not reduced modulo {modulus}")]
    UnreducedEntry { value: u64, modulus: u64 },

    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

pub type Result<T> = std::result::Result<T, LweError>;
