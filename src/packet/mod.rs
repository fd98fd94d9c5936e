// Packet format: data model, recursive decoder, expression evaluator

pub mod decoder;
pub mod eval;
pub mod model;

pub use decoder::{decode, parse, DecodeError};
pub use eval::{evaluate, sum_versions, EvalError};
pub use model::{Op, Packet, Payload, LITERAL_TYPE_ID};
