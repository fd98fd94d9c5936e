// Bottom-up evaluation of a packet tree and the version-sum traversal

use super::model::{Op, Packet, Payload};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("Operator {op:?} expects {expected} subpackets, got {actual}")]
    MalformedArity {
        op: Op,
        expected: &'static str,
        actual: usize,
    },

    #[error("Arithmetic overflow while evaluating {op:?}")]
    Overflow { op: Op },
}

pub type Result<T> = std::result::Result<T, EvalError>;

/// Reduce a packet tree to a single value.
///
/// Every subpacket is fully evaluated before its parent combines the results.
/// Arity violations and arithmetic overflow are loud errors, never guessed
/// around.
pub fn evaluate(packet: &Packet) -> Result<u128> {
    match &packet.payload {
        Payload::Literal(value) => Ok(*value),
        Payload::Operator { op, subpackets } => apply(*op, subpackets),
    }
}

/// Sum of the version field over the packet and all transitive subpackets.
pub fn sum_versions(packet: &Packet) -> u64 {
    packet.iter().map(|p| p.version as u64).sum()
}

fn apply(op: Op, subpackets: &[Packet]) -> Result<u128> {
    match op {
        Op::Sum => reduce(op, subpackets, |acc, v| acc.checked_add(v)),
        Op::Product => reduce(op, subpackets, |acc, v| acc.checked_mul(v)),
        Op::Min => reduce(op, subpackets, |acc, v| Some(acc.min(v))),
        Op::Max => reduce(op, subpackets, |acc, v| Some(acc.max(v))),
        Op::GreaterThan => compare(op, subpackets, |a, b| a > b),
        Op::LessThan => compare(op, subpackets, |a, b| a < b),
        Op::EqualTo => compare(op, subpackets, |a, b| a == b),
    }
}

/// Fold at least one operand with a checked combining function.
fn reduce(
    op: Op,
    subpackets: &[Packet],
    combine: impl Fn(u128, u128) -> Option<u128>,
) -> Result<u128> {
    let (first, rest) = subpackets
        .split_first()
        .ok_or(EvalError::MalformedArity {
            op,
            expected: "at least 1",
            actual: 0,
        })?;

    let mut acc = evaluate(first)?;
    for sub in rest {
        let value = evaluate(sub)?;
        acc = combine(acc, value).ok_or(EvalError::Overflow { op })?;
    }
    Ok(acc)
}

/// Evaluate exactly two operands, in bitstream order, into 1 or 0.
fn compare(op: Op, subpackets: &[Packet], cmp: impl Fn(u128, u128) -> bool) -> Result<u128> {
    match subpackets {
        [first, second] => Ok(cmp(evaluate(first)?, evaluate(second)?) as u128),
        _ => Err(EvalError::MalformedArity {
            op,
            expected: "exactly 2",
            actual: subpackets.len(),
        }),
    }
}
