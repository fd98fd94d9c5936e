// Immutable packed bit sequence with stateless fixed-width reads

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BitsError {
    #[error("Truncated input: need {needed} bits at offset {offset}, only {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Read width too large: {width} bits (max 64)")]
    WidthTooLarge { width: usize },
}

pub type Result<T> = std::result::Result<T, BitsError>;

/// A fixed-length sequence of bits, packed MSB-first into bytes.
///
/// The length is tracked in bits, so a sequence may end mid-byte; reads past
/// the logical end fail even when backing bytes exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitSeq {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitSeq {
    /// Build a sequence from packed bytes, keeping only the first `bit_len` bits.
    pub fn new(bytes: Vec<u8>, bit_len: usize) -> Self {
        debug_assert!(bit_len <= bytes.len() * 8);
        Self { bytes, bit_len }
    }

    /// Build a sequence bit by bit, most significant first.
    pub fn from_bits(bits: impl IntoIterator<Item = bool>) -> Self {
        let mut bytes = Vec::new();
        let mut bit_len = 0;
        for bit in bits {
            if bit_len % 8 == 0 {
                bytes.push(0);
            }
            if bit {
                let last = bytes.len() - 1;
                bytes[last] |= 0x80 >> (bit_len % 8);
            }
            bit_len += 1;
        }
        Self { bytes, bit_len }
    }

    /// Number of bits in the sequence.
    pub fn len(&self) -> usize {
        self.bit_len
    }

    pub fn is_empty(&self) -> bool {
        self.bit_len == 0
    }

    /// The bit at absolute offset `index`.
    ///
    /// Callers must check bounds; `read_uint` is the checked entry point.
    fn bit(&self, index: usize) -> u64 {
        ((self.bytes[index / 8] >> (7 - index % 8)) & 1) as u64
    }

    /// Interpret `width` consecutive bits starting at `offset` as an unsigned
    /// big-endian integer.
    ///
    /// Example: bits 10111 at offset 0 -> `read_uint(0, 5)` == 23.
    pub fn read_uint(&self, offset: usize, width: usize) -> Result<u64> {
        if width > 64 {
            return Err(BitsError::WidthTooLarge { width });
        }
        self.check(offset, width)?;

        let mut value = 0u64;
        for i in 0..width {
            value = (value << 1) | self.bit(offset + i);
        }
        Ok(value)
    }

    /// Check that `width` bits are available starting at `offset`.
    pub fn check(&self, offset: usize, width: usize) -> Result<()> {
        if offset + width > self.bit_len {
            return Err(BitsError::Truncated {
                offset,
                needed: width,
                available: self.bit_len.saturating_sub(offset),
            });
        }
        Ok(())
    }
}
