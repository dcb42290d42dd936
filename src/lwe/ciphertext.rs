use crate::error::{LweError, Result};
use crate::math::Matrix;
use crate::params::ParameterSet;

/// First entry outside [0, q), if any.
pub(crate) fn check_reduced<'a>(values: impl IntoIterator<Item = &'a u64>, q: u64) -> Result<()> {
    match values.into_iter().find(|&&v| v >= q) {
        Some(&value) => Err(LweError::UnreducedEntry { value, modulus: q }),
        None => Ok(()),
    }
}

/// Encryption of a single bit: (a, b) with a ∈ Z_q^N and b ∈ Z_q.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitCiphertext {
    pub a: Vec<u64>,
    pub b: u64,
}

impl BitCiphertext {
    pub(crate) fn validate(&self, params: &ParameterSet) -> Result<()> {
        if self.a.len() != params.dimension {
            return Err(LweError::ShapeMismatch {
                rows: 1,
                cols: self.a.len(),
                b_len: 1,
                dimension: params.dimension,
            });
        }
        check_reduced(self.a.iter().chain([&self.b]), params.modulus)
    }
}

/// M independently encrypted bits packed together: (A', b) with A' an M×N
/// matrix and b of length M. Row i is the ciphertext of bit i.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchCiphertext {
    pub a: Matrix,
    pub b: Vec<u64>,
}

impl BatchCiphertext {
    /// Stack single-bit ciphertexts into one batch, preserving order.
    pub fn from_bits(cts: Vec<BitCiphertext>, dimension: usize) -> Result<Self> {
        let mut b = Vec::with_capacity(cts.len());
        let mut rows = Vec::with_capacity(cts.len());
        for ct in cts {
            b.push(ct.b);
            rows.push(ct.a);
        }
        let a = Matrix::from_rows(rows, dimension)?;
        Ok(Self { a, b })
    }

    /// Number of encrypted bits.
    pub fn len(&self) -> usize {
        self.b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.b.is_empty()
    }

    pub fn row(&self, i: usize) -> (&[u64], u64) {
        (self.a.row(i), self.b[i])
    }

    /// Shape against the parameter dimension, then every entry in [0, q).
    pub(crate) fn validate(&self, params: &ParameterSet) -> Result<()> {
        let dimension = params.dimension;
        let consistent = self.a.rows == self.b.len()
            && self.a.cols == dimension
            && self.a.data.len() == self.a.rows * self.a.cols;
        if !consistent {
            return Err(LweError::ShapeMismatch {
                rows: self.a.rows,
                cols: self.a.cols,
                b_len: self.b.len(),
                dimension,
            });
        }
        check_reduced(self.a.data.iter().chain(&self.b), params.modulus)
    }
}

/// Either ciphertext shape; the attacker accepts a mix of both.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ciphertext {
    Bit(BitCiphertext),
    Batch(BatchCiphertext),
}

impl Ciphertext {
    /// Number of (a, b) equations this ciphertext contributes.
    pub fn num_rows(&self) -> usize {
        match self {
            Self::Bit(_) => 1,
            Self::Batch(ct) => ct.len(),
        }
    }

    pub fn rows(&self) -> Vec<(&[u64], u64)> {
        match self {
            Self::Bit(ct) => vec![(ct.a.as_slice(), ct.b)],
            Self::Batch(ct) => (0..ct.len()).map(|i| ct.row(i)).collect(),
        }
    }

    pub(crate) fn validate(&self, params: &ParameterSet) -> Result<()> {
        match self {
            Self::Bit(ct) => ct.validate(params),
            Self::Batch(ct) => ct.validate(params),
        }
    }
}

impl From<BitCiphertext> for Ciphertext {
    fn from(ct: BitCiphertext) -> Self {
        Self::Bit(ct)
    }
}

impl From<BatchCiphertext> for Ciphertext {
    fn from(ct: BatchCiphertext) -> Self {
        Self::Batch(ct)
    }
}
