// BITPACKET: decoder and expression evaluator for a nested bit-level packet format

pub mod bits;
pub mod packet;

// Re-export commonly used types
pub use bits::{hex_to_bits, BitSeq, BitsError, HexError};
pub use packet::{
    decode, evaluate, parse, sum_versions, DecodeError, EvalError, Op, Packet, Payload,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
