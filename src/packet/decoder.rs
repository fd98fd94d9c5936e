// Recursive-descent decoder for the nested packet format

use super::model::{Op, Packet, Payload};
use crate::bits::{hex_to_bits, BitSeq, BitsError, HexError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Invalid hex input: {0}")]
    Hex(#[from] HexError),

    #[error("Bit read failed: {0}")]
    Bits(#[from] BitsError),

    #[error("Literal value overflows 128 bits after {groups} groups")]
    LiteralOverflow { groups: usize },

    #[error("Subpackets overran declared length: {declared} bits declared, {consumed} consumed")]
    LengthMismatch { declared: usize, consumed: usize },
}

pub type Result<T> = std::result::Result<T, DecodeError>;

const VERSION_BITS: usize = 3;
const TYPE_BITS: usize = 3;
const HEADER_BITS: usize = VERSION_BITS + TYPE_BITS;

/// Literal payload group: 1 continuation bit + 4 value bits
const GROUP_BITS: usize = 5;
const GROUP_VALUE_BITS: usize = 4;
const CONTINUE_FLAG: u64 = 0b10000;

/// Operator framing field widths, selected by the length-type indicator
const TOTAL_LENGTH_BITS: usize = 15;
const COUNT_BITS: usize = 11;

/// Decode the root packet from a hex string.
///
/// Trailing padding bits after the root packet belong to the transport and
/// are discarded here.
pub fn decode(hex: &str) -> Result<Packet> {
    let bits = hex_to_bits(hex)?;
    let (packet, consumed) = parse(&bits, 0)?;
    tracing::debug!(
        "Decoded root packet: {} of {} bits consumed, {} padding",
        consumed,
        bits.len(),
        bits.len() - consumed
    );
    Ok(packet)
}

/// Decode one packet starting at `offset`, returning it together with the
/// number of bits it occupied.
///
/// Offsets are threaded explicitly so sibling and parent decoding can resume
/// at the exact next unconsumed bit.
pub fn parse(bits: &BitSeq, offset: usize) -> Result<(Packet, usize)> {
    let version = bits.read_uint(offset, VERSION_BITS)? as u8;
    let type_id = bits.read_uint(offset + VERSION_BITS, TYPE_BITS)? as u8;

    match Op::from_type_id(type_id) {
        None => {
            let (value, payload_bits) = parse_literal(bits, offset + HEADER_BITS)?;
            let packet = Packet {
                version,
                payload: Payload::Literal(value),
            };
            Ok((packet, HEADER_BITS + payload_bits))
        }
        Some(op) => {
            let (subpackets, payload_bits) = parse_subpackets(bits, offset + HEADER_BITS)?;
            let packet = Packet {
                version,
                payload: Payload::Operator { op, subpackets },
            };
            Ok((packet, HEADER_BITS + payload_bits))
        }
    }
}

/// Read 5-bit continuation groups and assemble the literal value,
/// most-significant group first.
fn parse_literal(bits: &BitSeq, start: usize) -> Result<(u128, usize)> {
    let mut value: u128 = 0;
    let mut groups = 0usize;

    loop {
        let group = bits.read_uint(start + groups * GROUP_BITS, GROUP_BITS)?;
        groups += 1;

        if value >> (128 - GROUP_VALUE_BITS) != 0 {
            return Err(DecodeError::LiteralOverflow { groups });
        }
        value = (value << GROUP_VALUE_BITS) | (group & 0xF) as u128;

        if group & CONTINUE_FLAG == 0 {
            break;
        }
    }

    Ok((value, groups * GROUP_BITS))
}

/// Decode an operator payload starting at its length-type indicator bit.
///
/// Returns the ordered subpackets and the payload size in bits, indicator and
/// framing field included.
fn parse_subpackets(bits: &BitSeq, offset: usize) -> Result<(Vec<Packet>, usize)> {
    let indicator = bits.read_uint(offset, 1)?;

    if indicator == 0 {
        // Total-length mode: the next 15 bits give the exact bit count
        // occupied by all immediate subpackets combined.
        let declared = bits.read_uint(offset + 1, TOTAL_LENGTH_BITS)? as usize;
        let base = offset + 1 + TOTAL_LENGTH_BITS;
        bits.check(base, declared)?;

        let mut subpackets = Vec::new();
        let mut used = 0;
        while used < declared {
            let (sub, n) = parse(bits, base + used)?;
            used += n;
            if used > declared {
                return Err(DecodeError::LengthMismatch {
                    declared,
                    consumed: used,
                });
            }
            subpackets.push(sub);
        }
        Ok((subpackets, 1 + TOTAL_LENGTH_BITS + declared))
    } else {
        // Count mode: the next 11 bits give the number of immediate
        // subpackets, each starting right after the previous one.
        let count = bits.read_uint(offset + 1, COUNT_BITS)? as usize;
        let base = offset + 1 + COUNT_BITS;

        let mut subpackets = Vec::with_capacity(count);
        let mut used = 0;
        for _ in 0..count {
            let (sub, n) = parse(bits, base + used)?;
            used += n;
            subpackets.push(sub);
        }
        Ok((subpackets, 1 + COUNT_BITS + used))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::eval::{evaluate, sum_versions};

    fn seq(s: &str) -> BitSeq {
        BitSeq::from_bits(s.chars().map(|c| c == '1'))
    }

    #[test]
    fn test_decode_literal() {
        let packet = decode("D2FE28").unwrap();
        assert_eq!(packet.version, 6);
        assert_eq!(packet.type_id(), 4);
        assert_eq!(packet.payload, Payload::Literal(2021));
    }

    #[test]
    fn test_literal_bit_accounting() {
        let bits = hex_to_bits("D2FE28").unwrap();
        let (_, consumed) = parse(&bits, 0).unwrap();
        // 6 header bits + 3 groups of 5
        assert_eq!(consumed, 21);
    }

    #[test]
    fn test_total_length_mode() {
        let bits = hex_to_bits("38006F45291200").unwrap();
        let (packet, consumed) = parse(&bits, 0).unwrap();
        assert_eq!(consumed, 22 + 27);
        assert_eq!(packet.version, 1);
        assert_eq!(packet.type_id(), 6);
        let subs = packet.subpackets();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].payload, Payload::Literal(10));
        assert_eq!(subs[1].payload, Payload::Literal(20));
    }

    #[test]
    fn test_count_mode() {
        let bits = hex_to_bits("EE00D40C823060").unwrap();
        let (packet, consumed) = parse(&bits, 0).unwrap();
        assert_eq!(consumed, 18 + 33);
        assert_eq!(packet.version, 7);
        assert_eq!(packet.type_id(), 3);
        let subs = packet.subpackets();
        assert_eq!(subs.len(), 3);
        assert_eq!(subs[0].payload, Payload::Literal(1));
        assert_eq!(subs[1].payload, Payload::Literal(2));
        assert_eq!(subs[2].payload, Payload::Literal(3));
    }

    #[test]
    fn test_subpacket_bit_accounting() {
        // Parent consumed equals mode header plus the sum of child consumed
        let bits = hex_to_bits("EE00D40C823060").unwrap();
        let (packet, consumed) = parse(&bits, 0).unwrap();
        let mut child_bits = 0;
        let mut offset = 18;
        for _ in 0..packet.subpackets().len() {
            let (_, n) = parse(&bits, offset).unwrap();
            child_bits += n;
            offset += n;
        }
        assert_eq!(consumed, 18 + child_bits);
    }

    #[test]
    fn test_subpacket_order_is_bitstream_order() {
        let packet = decode("38006F45291200").unwrap();
        let values: Vec<u128> = packet
            .subpackets()
            .iter()
            .map(|p| match p.payload {
                Payload::Literal(v) => v,
                _ => panic!("expected literal"),
            })
            .collect();
        assert_eq!(values, vec![10, 20]);
    }

    #[test]
    fn test_empty_operator_is_structurally_valid() {
        // Count mode with zero subpackets decodes; arity is enforced at
        // evaluation time.
        let bits = seq("000000100000000000");
        let (packet, consumed) = parse(&bits, 0).unwrap();
        assert_eq!(consumed, 18);
        assert!(packet.subpackets().is_empty());
    }

    #[test]
    fn test_decode_at_nonzero_offset() {
        // Same literal shifted 7 bits into the sequence
        let mut s = String::from("0000000");
        s.push_str("110100101111111000101000");
        let bits = seq(&s);
        let (packet, consumed) = parse(&bits, 7).unwrap();
        assert_eq!(packet.payload, Payload::Literal(2021));
        assert_eq!(consumed, 21);
    }

    #[test]
    fn test_truncated_empty_input() {
        assert!(matches!(decode(""), Err(DecodeError::Bits(_))));
    }

    #[test]
    fn test_truncated_literal_group() {
        // Header says literal, but only 2 of the 5 group bits exist
        assert!(matches!(decode("D2"), Err(DecodeError::Bits(_))));
    }

    #[test]
    fn test_truncated_declared_length() {
        // Total-length mode declaring 100 subpacket bits with none present
        let bits = seq("0000010000000001100100");
        let err = parse(&bits, 0).unwrap_err();
        assert!(matches!(err, DecodeError::Bits(BitsError::Truncated { .. })));
    }

    #[test]
    fn test_truncated_subpacket_count() {
        // Count mode promising 2 subpackets, only 1 present
        let mut s = String::from("000001100000000010");
        s.push_str("00010000001"); // literal 1
        let bits = seq(&s);
        let err = parse(&bits, 0).unwrap_err();
        assert!(matches!(err, DecodeError::Bits(BitsError::Truncated { .. })));
    }

    #[test]
    fn test_length_mismatch() {
        // Declared window of 20 bits; first child takes 16, second takes 11
        // and straddles the window boundary.
        let mut s = String::from("0000000000000000010100");
        s.push_str("0001001000100010"); // literal 18, 16 bits
        s.push_str("00010000011"); // literal 3, 11 bits
        let bits = seq(&s);
        let err = parse(&bits, 0).unwrap_err();
        assert_eq!(
            err,
            DecodeError::LengthMismatch {
                declared: 20,
                consumed: 27,
            }
        );
    }

    #[test]
    fn test_literal_beyond_machine_word() {
        // 2^64: nibble 1 followed by sixteen zero nibbles, 17 groups
        let mut s = String::from("000100");
        s.push_str("10001");
        for _ in 0..15 {
            s.push_str("10000");
        }
        s.push_str("00000");
        let bits = seq(&s);
        let (packet, consumed) = parse(&bits, 0).unwrap();
        assert_eq!(consumed, 6 + 17 * 5);
        assert_eq!(packet.payload, Payload::Literal(1u128 << 64));
        assert_eq!(evaluate(&packet).unwrap(), 18_446_744_073_709_551_616);
    }

    #[test]
    fn test_literal_overflow() {
        // Nibble 1 followed by 32 zero nibbles would need 132 bits
        let mut s = String::from("000100");
        s.push_str("10001");
        for _ in 0..31 {
            s.push_str("10000");
        }
        s.push_str("00000");
        let bits = seq(&s);
        let err = parse(&bits, 0).unwrap_err();
        assert_eq!(err, DecodeError::LiteralOverflow { groups: 33 });
    }

    #[test]
    fn test_literal_at_128_bit_cap() {
        // Exactly 32 nibbles of 0xF decodes to u128::MAX
        let mut s = String::from("000100");
        for _ in 0..31 {
            s.push_str("11111");
        }
        s.push_str("01111");
        let bits = seq(&s);
        let (packet, _) = parse(&bits, 0).unwrap();
        assert_eq!(packet.payload, Payload::Literal(u128::MAX));
    }

    #[test]
    fn test_invalid_hex() {
        assert!(matches!(decode("D2FZ"), Err(DecodeError::Hex(_))));
    }

    #[test]
    fn test_deeply_nested_input() {
        // 10k levels of single-child product operators around one literal.
        // Run on a thread with a known stack size so the recursion bound is
        // tested deterministically.
        const DEPTH: usize = 10_000;
        let mut s = String::with_capacity(DEPTH * 18 + 11);
        for _ in 0..DEPTH {
            s.push_str("000001100000000001");
        }
        s.push_str("11010001111"); // literal 15, version 6

        let handle = std::thread::Builder::new()
            .stack_size(32 * 1024 * 1024)
            .spawn(move || {
                let bits = seq(&s);
                let (packet, consumed) = parse(&bits, 0).unwrap();
                assert_eq!(consumed, DEPTH * 18 + 11);
                assert_eq!(evaluate(&packet).unwrap(), 15);
                assert_eq!(sum_versions(&packet), 6);
            })
            .unwrap();
        handle.join().unwrap();
    }
}
