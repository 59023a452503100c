pub mod addr;
pub mod ann;
pub mod decoder;
pub mod disasm;
pub mod emit;
pub mod error;
pub mod instructions;
pub mod rom;

pub mod isa {
    pub mod sm83;
}

pub use addr::BankAddr;
pub use ann::{Ann, AnnMapping, AnnType};
pub use decoder::{decode, Decoded, Decoder};
pub use disasm::render;
pub use emit::{bank_header, BankEmitter};
pub use error::{AnnError, EmitError, RenderError, RomError};
pub use instructions::{Instruction, Mnemonic, Operand};
pub use rom::Rom;
