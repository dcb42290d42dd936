use rayon::prelude::*;

use crate::error::{LweError, Result};
use crate::math::modular::{dot_mod, mod_add, mod_mul};

/// Dense row-major matrix of residues mod Q.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    pub data: Vec<u64>,
    pub rows: usize,
    pub cols: usize,
}

impl Matrix {
    pub fn zero(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0u64; rows * cols],
            rows,
            cols,
        }
    }

    pub fn from_rows(rows: Vec<Vec<u64>>, cols: usize) -> Result<Self> {
        let num_rows = rows.len();
        let mut data = Vec::with_capacity(num_rows * cols);
        for row in rows {
            if row.len() != cols {
                return Err(LweError::DimensionMismatch {
                    expected: cols,
                    got: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            data,
            rows: num_rows,
            cols,
        })
    }

    pub fn row(&self, i: usize) -> &[u64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// A·v mod m (length `rows`). Rows are computed in parallel.
    pub fn mul_vec(&self, v: &[u64], m: u64) -> Result<Vec<u64>> {
        if v.len() != self.cols {
            return Err(LweError::DimensionMismatch {
                expected: self.cols,
                got: v.len(),
            });
        }
        Ok((0..self.rows)
            .into_par_iter()
            .map(|i| dot_mod(self.row(i), v, m))
            .collect())
    }

    /// vᵀ·A mod m (length `cols`), accumulated row by row.
    pub fn vec_mul(&self, v: &[u64], m: u64) -> Result<Vec<u64>> {
        if v.len() != self.rows {
            return Err(LweError::DimensionMismatch {
                expected: self.rows,
                got: v.len(),
            });
        }
        let mut out = vec![0u64; self.cols];
        for (i, &vi) in v.iter().enumerate() {
            if vi == 0 {
                continue;
            }
            for (acc, &a) in out.iter_mut().zip(self.row(i)) {
                *acc = mod_add(*acc, mod_mul(vi, a, m), m);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_products() {
        // [[1, 2, 3], [4, 5, 6]]
        let a = Matrix::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]], 3).unwrap();
        assert_eq!(a.mul_vec(&[1, 1, 1], 19).unwrap(), vec![6, 15]);
        assert_eq!(a.vec_mul(&[1, 2], 19).unwrap(), vec![9, 12, 15 % 19]);
        assert_eq!(a.vec_mul(&[18, 0], 19).unwrap(), vec![18, 17, 16]);
    }

    #[test]
    fn test_shape_checks() {
        let a = Matrix::zero(2, 3);
        assert!(a.mul_vec(&[1, 2], 19).is_err());
        assert!(a.vec_mul(&[1, 2, 3], 19).is_err());
        assert!(Matrix::from_rows(vec![vec![1, 2], vec![3]], 2).is_err());
    }

    #[test]
    fn test_rows() {
        let a = Matrix::from_rows(vec![vec![1, 2], vec![3, 4], vec![5, 6]], 2).unwrap();
        assert_eq!(a.row(1), &[3, 4]);
        assert_eq!(a.row(2), &[5, 6]);
    }
}
