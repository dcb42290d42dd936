use rand::Rng;

use crate::math::Matrix;

/// Sample one value uniformly from [0, modulus).
pub fn sample_uniform<R: Rng>(modulus: u64, rng: &mut R) -> u64 {
    // Rejection sampling to avoid bias
    let mask = if modulus.is_power_of_two() {
        modulus - 1
    } else {
        (1u64 << (64 - modulus.leading_zeros())) - 1
    };

    loop {
        let val = rng.random::<u64>() & mask;
        if val < modulus {
            break val;
        }
    }
}

/// Sample a vector with uniformly random entries in [0, modulus).
pub fn sample_uniform_vec<R: Rng>(n: usize, modulus: u64, rng: &mut R) -> Vec<u64> {
    (0..n).map(|_| sample_uniform(modulus, rng)).collect()
}

/// Sample a `rows × cols` matrix with uniformly random entries in [0, modulus).
pub fn sample_uniform_matrix<R: Rng>(
    rows: usize,
    cols: usize,
    modulus: u64,
    rng: &mut R,
) -> Matrix {
    Matrix {
        data: sample_uniform_vec(rows * cols, modulus, rng),
        rows,
        cols,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_uniform() {
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let v = sample_uniform_vec(1024, 65537, &mut rng);
        assert_eq!(v.len(), 1024);
        for &c in &v {
            assert!(c < 65537);
        }
    }

    #[test]
    fn test_uniform_covers_small_modulus() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let mut seen = [false; 19];
        for c in sample_uniform_vec(2000, 19, &mut rng) {
            seen[c as usize] = true;
        }
        assert!(seen.iter().all(|&s| s), "every residue mod 19 should appear");
    }

    #[test]
    fn test_uniform_matrix_shape() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let a = sample_uniform_matrix(3, 5, 1 << 20, &mut rng);
        assert_eq!((a.rows, a.cols, a.data.len()), (3, 5, 15));
    }
}
