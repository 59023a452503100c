use serde::{Deserialize, Serialize};

use crate::instructions::Instruction;
use crate::isa::sm83::Sm83Decoder;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoded {
    pub insn: Instruction,
    /// Encoded length in bytes, operand bytes included.
    pub size: usize,
}

pub trait Decoder {
    /// Decode the instruction starting at `bytes[offset]`.
    ///
    /// `None` means the bytes there are not a recognized encoding, or the
    /// encoding would run past the end of `bytes`.
    fn decode(&self, bytes: &[u8], offset: usize) -> Option<Decoded>;
}

/// Decode one SM83 instruction.
pub fn decode(bytes: &[u8], offset: usize) -> Option<Decoded> {
    Sm83Decoder::new().decode(bytes, offset)
}
