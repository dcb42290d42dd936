use rayon::prelude::*;

use crate::error::{LweError, Result};

const MAX_SWEEPS: usize = 64;

/// Minimum-norm least-squares solution of A·x ≈ b.
#[derive(Clone, Debug)]
pub struct LstsqSolution {
    pub x: Vec<f64>,
    /// Numerical rank of A.
    pub rank: usize,
    /// ‖A·x - b‖₂
    pub residual_norm: f64,
}

/// Solve min ‖A·x - b‖₂ for a row-major `rows × cols` matrix A.
///
/// Works through the smaller of the two Gram matrices. With at least as many
/// rows as columns it solves AᵀA·x = Aᵀb; otherwise it solves AAᵀ·y = b and
/// returns x = Aᵀ·y. Both Gram systems are solved through their
/// pseudo-inverse, so rank-deficient and underdetermined inputs get the
/// minimum-norm solution.
pub fn lstsq(a: &[f64], rows: usize, cols: usize, b: &[f64]) -> Result<LstsqSolution> {
    if a.len() != rows * cols {
        return Err(LweError::DimensionMismatch {
            expected: rows * cols,
            got: a.len(),
        });
    }
    if b.len() != rows {
        return Err(LweError::DimensionMismatch {
            expected: rows,
            got: b.len(),
        });
    }
    let scale = rows.max(cols) as f64;

    let (x, rank) = if rows >= cols {
        // Column-major copy so both Gram products run over contiguous slices.
        let mut columns = vec![0.0f64; rows * cols];
        for (i, row) in a.chunks_exact(cols.max(1)).enumerate().take(rows) {
            for (j, &v) in row.iter().enumerate() {
                columns[j * rows + i] = v;
            }
        }
        let column = |j: usize| &columns[j * rows..(j + 1) * rows];

        let gram = gram_matrix(cols, |i, j| dot(column(i), column(j)));
        let atb: Vec<f64> = (0..cols).map(|j| dot(column(j), b)).collect();
        solve_gram(gram, cols, &atb, scale)
    } else {
        let row = |i: usize| &a[i * cols..(i + 1) * cols];
        let gram = gram_matrix(rows, |i, j| dot(row(i), row(j)));
        let (y, rank) = solve_gram(gram, rows, b, scale);

        let mut x = vec![0.0f64; cols];
        for (i, &yi) in y.iter().enumerate() {
            for (xj, &aij) in x.iter_mut().zip(row(i)) {
                *xj += yi * aij;
            }
        }
        (x, rank)
    };

    let residual_norm = a
        .chunks_exact(cols.max(1))
        .take(rows)
        .zip(b.iter())
        .map(|(row, &bi)| (dot(row, &x) - bi).powi(2))
        .sum::<f64>()
        .sqrt();

    Ok(LstsqSolution { x, rank, residual_norm })
}

/// Symmetric `n × n` Gram matrix, upper triangle computed in parallel.
fn gram_matrix<F>(n: usize, entry: F) -> Vec<f64>
where
    F: Fn(usize, usize) -> f64 + Sync,
{
    let upper: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| (i..n).map(|j| entry(i, j)).collect())
        .collect();
    let mut gram = vec![0.0f64; n * n];
    for (i, row) in upper.into_iter().enumerate() {
        for (k, v) in row.into_iter().enumerate() {
            gram[i * n + i + k] = v;
            gram[(i + k) * n + i] = v;
        }
    }
    gram
}

/// Minimum-norm solution of the symmetric positive semi-definite system G·x = r.
///
/// A Cholesky factorization handles the positive-definite case in one pass.
/// When a pivot falls below ε·`scale`·trace(G) the matrix is treated as
/// singular and the system goes through the pseudo-inverse instead:
///   x = Σ_{λ_i > tol} (v_iᵀ·r / λ_i) · v_i,  tol = ε·`scale`·λ_max.
/// Returns the solution and the numerical rank.
fn solve_gram(gram: Vec<f64>, n: usize, rhs: &[f64], scale: f64) -> (Vec<f64>, usize) {
    let trace: f64 = (0..n).map(|i| gram[i * n + i]).sum();
    if let Some(l) = cholesky(&gram, n, f64::EPSILON * scale * trace) {
        return (cholesky_solve(&l, n, rhs), n);
    }

    let (eigenvalues, eigenvectors) = symmetric_eigen(gram, n);
    let lambda_max = eigenvalues.iter().cloned().fold(0.0f64, f64::max);
    let tol = f64::EPSILON * scale * lambda_max;

    let mut x = vec![0.0f64; n];
    let mut rank = 0usize;
    for (k, &lambda) in eigenvalues.iter().enumerate() {
        if lambda <= tol || lambda <= 0.0 {
            continue;
        }
        rank += 1;
        let coeff = (0..n).map(|i| eigenvectors[i * n + k] * rhs[i]).sum::<f64>() / lambda;
        for (i, xi) in x.iter_mut().enumerate() {
            *xi += coeff * eigenvectors[i * n + k];
        }
    }
    (x, rank)
}

/// Lower-triangular L with G = L·Lᵀ, or `None` once a pivot drops to `min_pivot`.
fn cholesky(g: &[f64], n: usize, min_pivot: f64) -> Option<Vec<f64>> {
    let mut l = vec![0.0f64; n * n];
    for j in 0..n {
        let d = g[j * n + j] - dot(&l[j * n..j * n + j], &l[j * n..j * n + j]);
        if d.is_nan() || d <= min_pivot {
            return None;
        }
        let ljj = d.sqrt();
        l[j * n + j] = ljj;
        for i in (j + 1)..n {
            let s = g[i * n + j] - dot(&l[i * n..i * n + j], &l[j * n..j * n + j]);
            l[i * n + j] = s / ljj;
        }
    }
    Some(l)
}

/// Forward then back substitution through L and Lᵀ.
fn cholesky_solve(l: &[f64], n: usize, rhs: &[f64]) -> Vec<f64> {
    let mut z = vec![0.0f64; n];
    for i in 0..n {
        z[i] = (rhs[i] - dot(&l[i * n..i * n + i], &z[..i])) / l[i * n + i];
    }
    let mut x = vec![0.0f64; n];
    for i in (0..n).rev() {
        let tail: f64 = ((i + 1)..n).map(|k| l[k * n + i] * x[k]).sum();
        x[i] = (z[i] - tail) / l[i * n + i];
    }
    x
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Cyclic Jacobi eigen-decomposition of a symmetric `n × n` matrix.
///
/// Returns the eigenvalues and the row-major eigenvector matrix V whose
/// column k belongs to eigenvalue k.
fn symmetric_eigen(mut m: Vec<f64>, n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut v = vec![0.0f64; n * n];
    for i in 0..n {
        v[i * n + i] = 1.0;
    }

    let frobenius_sq: f64 = m.iter().map(|x| x * x).sum();

    for _ in 0..MAX_SWEEPS {
        let mut off_sq = 0.0f64;
        for p in 0..n {
            for q in (p + 1)..n {
                off_sq += 2.0 * m[p * n + q] * m[p * n + q];
            }
        }
        if off_sq <= f64::EPSILON * f64::EPSILON * frobenius_sq {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = m[p * n + q];
                if apq == 0.0 {
                    continue;
                }
                let app = m[p * n + p];
                let aqq = m[q * n + q];

                // Rotation angle that zeroes m[p][q]
                let theta = (aqq - app) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                // M ← M·P
                for k in 0..n {
                    let mkp = m[k * n + p];
                    let mkq = m[k * n + q];
                    m[k * n + p] = c * mkp - s * mkq;
                    m[k * n + q] = s * mkp + c * mkq;
                }
                // M ← Pᵀ·M
                for k in 0..n {
                    let mpk = m[p * n + k];
                    let mqk = m[q * n + k];
                    m[p * n + k] = c * mpk - s * mqk;
                    m[q * n + k] = s * mpk + c * mqk;
                }
                // V ← V·P
                for k in 0..n {
                    let vkp = v[k * n + p];
                    let vkq = v[k * n + q];
                    v[k * n + p] = c * vkp - s * vkq;
                    v[k * n + q] = s * vkp + c * vkq;
                }
            }
        }
    }

    let eigenvalues = (0..n).map(|i| m[i * n + i]).collect();
    (eigenvalues, v)
}
