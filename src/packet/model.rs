// Packet tree data model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire type id reserved for literal packets.
pub const LITERAL_TYPE_ID: u8 = 4;

/// Operation selected by an operator packet's type id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    Sum,
    Product,
    Min,
    Max,
    GreaterThan,
    LessThan,
    EqualTo,
}

impl Op {
    /// Map a 3-bit wire type id to an operation.
    ///
    /// Returns `None` for type id 4, which denotes a literal rather than an
    /// operation.
    pub fn from_type_id(type_id: u8) -> Option<Op> {
        match type_id {
            0 => Some(Op::Sum),
            1 => Some(Op::Product),
            2 => Some(Op::Min),
            3 => Some(Op::Max),
            5 => Some(Op::GreaterThan),
            6 => Some(Op::LessThan),
            7 => Some(Op::EqualTo),
            _ => None,
        }
    }

    /// The wire type id this operation is encoded as.
    pub fn type_id(&self) -> u8 {
        match self {
            Op::Sum => 0,
            Op::Product => 1,
            Op::Min => 2,
            Op::Max => 3,
            Op::GreaterThan => 5,
            Op::LessThan => 6,
            Op::EqualTo => 7,
        }
    }

    /// Human-readable name used when rendering a formula.
    pub fn name(&self) -> &'static str {
        match self {
            Op::Sum => "sum",
            Op::Product => "product",
            Op::Min => "min",
            Op::Max => "max",
            Op::GreaterThan => "greater_than",
            Op::LessThan => "less_than",
            Op::EqualTo => "equal_to",
        }
    }
}

/// Packet payload: a literal value or an operation over subpackets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    Literal(u128),
    Operator { op: Op, subpackets: Vec<Packet> },
}

/// One decoded node of the packet format.
///
/// A packet exclusively owns its subpackets; the tree is immutable after
/// construction and is consumed by read-only traversals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    /// Packet version, 0-7
    pub version: u8,

    /// Literal value or operator with ordered subpackets
    pub payload: Payload,
}

impl Packet {
    /// The 3-bit wire type id this packet was decoded from.
    pub fn type_id(&self) -> u8 {
        match &self.payload {
            Payload::Literal(_) => LITERAL_TYPE_ID,
            Payload::Operator { op, .. } => op.type_id(),
        }
    }

    /// Immediate subpackets, empty for literals.
    pub fn subpackets(&self) -> &[Packet] {
        match &self.payload {
            Payload::Literal(_) => &[],
            Payload::Operator { subpackets, .. } => subpackets,
        }
    }

    /// Pre-order iterator over this packet and every transitive subpacket.
    ///
    /// Iterative, so it works at any nesting depth.
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }
}

/// Iterator returned by [`Packet::iter`].
pub struct Iter<'a> {
    stack: Vec<&'a Packet>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Packet;

    fn next(&mut self) -> Option<&'a Packet> {
        let packet = self.stack.pop()?;
        self.stack.extend(packet.subpackets().iter().rev());
        Some(packet)
    }
}

/// Render the decoded expression as a readable formula.
/// Example: `equal_to(sum(1, 3), product(2, 2))`.
impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Payload::Literal(value) => write!(f, "{value}"),
            Payload::Operator { op, subpackets } => {
                write!(f, "{}(", op.name())?;
                for (i, sub) in subpackets.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{sub}")?;
                }
                write!(f, ")")
            }
        }
    }
}
