// Bit-level input handling: packed bit sequences and hex transliteration

pub mod hex;
pub mod reader;

pub use hex::{hex_to_bits, HexError};
pub use reader::{BitSeq, BitsError};
