// Hexadecimal transliteration: each hex digit becomes exactly 4 bits

use super::reader::BitSeq;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    #[error("Invalid hex digit {ch:?} at index {index}")]
    InvalidDigit { ch: char, index: usize },
}

pub type Result<T> = std::result::Result<T, HexError>;

/// Transliterate a hex string into a bit sequence.
///
/// Each digit (case-insensitive) contributes exactly 4 bits, MSB first, in
/// input order, so the result is 4x the digit count — including when that is
/// not a byte multiple.
/// Example: "D2" -> 11010010, "F" -> 1111.
pub fn hex_to_bits(hex: &str) -> Result<BitSeq> {
    let mut bytes = vec![0u8; hex.len().div_ceil(2)];
    let mut digits = 0;

    for (index, ch) in hex.chars().enumerate() {
        let nibble = ch
            .to_digit(16)
            .ok_or(HexError::InvalidDigit { ch, index })? as u8;
        if digits % 2 == 0 {
            bytes[digits / 2] = nibble << 4;
        } else {
            bytes[digits / 2] |= nibble;
        }
        digits += 1;
    }

    Ok(BitSeq::new(bytes, digits * 4))
}
