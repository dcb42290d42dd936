/// Modular addition: (a + b) mod m, assumes a, b < m
#[inline(always)]
pub fn mod_add(a: u64, b: u64, m: u64) -> u64 {
    let sum = a as u128 + b as u128;
    let r = sum as u64;
    if sum >= m as u128 { r.wrapping_sub(m) } else { r }
}

/// Modular subtraction: (a - b) mod m, assumes a, b < m
#[inline(always)]
pub fn mod_sub(a: u64, b: u64, m: u64) -> u64 {
    if a >= b {
        a - b
    } else {
        m - b + a
    }
}

/// Modular multiplication, assumes a, b < m. Products of residues below
/// 2^32 fit in 64 bits; larger moduli go through u128.
#[inline(always)]
pub fn mod_mul(a: u64, b: u64, m: u64) -> u64 {
    if m <= 1 << 32 {
        (a * b) % m
    } else {
        ((a as u128 * b as u128) % m as u128) as u64
    }
}

/// Lift a signed value into [0, m).
#[inline]
pub fn from_signed(x: i64, m: u64) -> u64 {
    let r = (x as i128).rem_euclid(m as i128);
    r as u64
}

/// Centred representative of a residue, in (-m/2, m/2].
#[inline]
pub fn to_centered(a: u64, m: u64) -> i64 {
    if a > m / 2 {
        -((m - a) as i64)
    } else {
        a as i64
    }
}

/// Distance of a residue from 0 on the cycle Z_m: min(a, m - a).
#[inline]
pub fn centered_abs(a: u64, m: u64) -> u64 {
    a.min(m - a)
}

/// Inner product Σ a_i·b_i mod m, reducing after every step.
pub fn dot_mod(a: &[u64], b: &[u64], m: u64) -> u64 {
    a.iter()
        .zip(b.iter())
        .fold(0u64, |acc, (&x, &y)| mod_add(acc, mod_mul(x, y, m), m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_sub() {
        let m = 19;
        assert_eq!(mod_add(18, 5, m), 4);
        assert_eq!(mod_sub(3, 5, m), 17);
    }

    #[test]
    fn test_mul_large() {
        let m = (1u64 << 62) - 57;
        let a = m - 1;
        // (-1)·(-1) = 1
        assert_eq!(mod_mul(a, a, m), 1);
        let m = 1u64 << 32;
        assert_eq!(mod_mul(m - 1, m - 1, m), 1);
        assert_eq!(mod_mul(999_999_999, 999_999_999, 1_000_000_000), 1);
    }

    #[test]
    fn test_signed_lift() {
        assert_eq!(from_signed(-1, 19), 18);
        assert_eq!(from_signed(-20, 19), 18);
        assert_eq!(from_signed(7, 19), 7);
        assert_eq!(to_centered(18, 19), -1);
        assert_eq!(to_centered(9, 19), 9);
        assert_eq!(to_centered(10, 19), -9);
        assert_eq!(centered_abs(18, 19), 1);
        assert_eq!(centered_abs(9, 19), 9);
    }

    #[test]
    fn test_dot_mod() {
        assert_eq!(dot_mod(&[1, 2, 3], &[4, 5, 6], 19), 32 % 19);
        assert_eq!(dot_mod(&[], &[], 19), 0);
    }
}
