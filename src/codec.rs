//! 7-bit ASCII packing: each character becomes 7 bits, most significant first.

use crate::error::{LweError, Result};

pub const BITS_PER_CHAR: usize = 7;

pub fn string_to_bits(text: &str) -> Result<Vec<u8>> {
    let mut bits = Vec::with_capacity(text.len() * BITS_PER_CHAR);
    for ch in text.chars() {
        if !ch.is_ascii() {
            return Err(LweError::InvalidMessage(format!(
                "character {ch:?} is outside 7-bit ASCII"
            )));
        }
        let code = ch as u8;
        bits.extend((0..BITS_PER_CHAR).rev().map(|i| (code >> i) & 1));
    }
    Ok(bits)
}

pub fn bits_to_string(bits: &[u8]) -> Result<String> {
    if bits.len() % BITS_PER_CHAR != 0 {
        return Err(LweError::InvalidMessage(format!(
            "bit length {} is not a multiple of {BITS_PER_CHAR}",
            bits.len()
        )));
    }
    bits.chunks_exact(BITS_PER_CHAR)
        .map(|chunk| {
            chunk.iter().try_fold(0u8, |acc, &bit| match bit {
                0 | 1 => Ok((acc << 1) | bit),
                other => Err(LweError::InvalidMessage(format!("bit value must be 0 or 1, got {other}"))),
            })
        })
        .map(|code| code.map(char::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_encoding() {
        // 'A' = 65 = 1000001
        assert_eq!(string_to_bits("A").unwrap(), vec![1, 0, 0, 0, 0, 0, 1]);
        assert_eq!(bits_to_string(&[1, 0, 0, 0, 0, 0, 1]).unwrap(), "A");
    }

    #[test]
    fn test_roundtrip() {
        let text = "HELLO WORLD!\n\t~\u{0}";
        assert_eq!(bits_to_string(&string_to_bits(text).unwrap()).unwrap(), text);
        assert_eq!(bits_to_string(&[]).unwrap(), "");
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(string_to_bits("naïve").is_err());
        assert!(bits_to_string(&[1, 0, 1]).is_err());
        assert!(bits_to_string(&[1, 0, 0, 0, 0, 0, 2]).is_err());
    }
}
