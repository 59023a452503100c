use serde::{Deserialize, Serialize};

/// All SM83 instruction names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mnemonic {
    Adc,
    Add,
    And,
    Bit,
    Call,
    Ccf,
    Cp,
    Cpl,
    Daa,
    Dec,
    Di,
    Ei,
    Halt,
    Inc,
    Jp,
    Jr,
    Ld,
    Ldh,
    Or,
    Nop,
    Pop,
    Push,
    Res,
    Ret,
    Reti,
    Rl,
    Rla,
    Rlc,
    Rlca,
    Rr,
    Rra,
    Rrc,
    Rrca,
    Rst,
    Sbc,
    Scf,
    Set,
    Sub,
    Sla,
    Sra,
    Srl,
    Stop,
    Swap,
    Xor,
}

impl Mnemonic {
    /// Lowercase assembler spelling.
    pub fn as_str(self) -> &'static str {
        use Mnemonic::*;
        match self {
            Adc => "adc",
            Add => "add",
            And => "and",
            Bit => "bit",
            Call => "call",
            Ccf => "ccf",
            Cp => "cp",
            Cpl => "cpl",
            Daa => "daa",
            Dec => "dec",
            Di => "di",
            Ei => "ei",
            Halt => "halt",
            Inc => "inc",
            Jp => "jp",
            Jr => "jr",
            Ld => "ld",
            Ldh => "ldh",
            Or => "or",
            Nop => "nop",
            Pop => "pop",
            Push => "push",
            Res => "res",
            Ret => "ret",
            Reti => "reti",
            Rl => "rl",
            Rla => "rla",
            Rlc => "rlc",
            Rlca => "rlca",
            Rr => "rr",
            Rra => "rra",
            Rrc => "rrc",
            Rrca => "rrca",
            Rst => "rst",
            Sbc => "sbc",
            Scf => "scf",
            Set => "set",
            Sub => "sub",
            Sla => "sla",
            Sra => "sra",
            Srl => "srl",
            Stop => "stop",
            Swap => "swap",
            Xor => "xor",
        }
    }
}

/// 8-bit register, plus `[hl]` as the memory pseudo-register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reg8 {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
    Mhl,
}

impl Reg8 {
    pub fn name(self) -> &'static str {
        match self {
            Reg8::A => "a",
            Reg8::B => "b",
            Reg8::C => "c",
            Reg8::D => "d",
            Reg8::E => "e",
            Reg8::H => "h",
            Reg8::L => "l",
            Reg8::Mhl => "[hl]",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reg16 {
    Af,
    Bc,
    De,
    Hl,
    Sp,
}

impl Reg16 {
    pub fn name(self) -> &'static str {
        match self {
            Reg16::Af => "af",
            Reg16::Bc => "bc",
            Reg16::De => "de",
            Reg16::Hl => "hl",
            Reg16::Sp => "sp",
        }
    }
}

/// Flag condition taken by conditional jumps, calls and returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    Nz,
    Z,
    Nc,
    C,
}

impl Condition {
    pub fn name(self) -> &'static str {
        match self {
            Condition::Nz => "nz",
            Condition::Z => "z",
            Condition::Nc => "nc",
            Condition::C => "c",
        }
    }
}

/// A single instruction operand. Each variant renders without outside context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    /// Symbolic reference to an annotated address.
    Label(String),
    R8(Reg8),
    R16(Reg16),
    Cond(Condition),
    /// Bit index for BIT/RES/SET (0-7).
    U3(u8),
    U8(u8),
    U16(u16),
    /// Signed immediate, as taken by `add sp, e8`.
    I8(i8),
    /// JR displacement, relative to the end of the two-byte instruction.
    Rel(i8),
    /// `sp+e8` as taken by `ld hl, sp+e8`.
    SpRel(i8),
    /// `[n16]`: memory at an absolute address.
    Direct(Box<Operand>),
    /// `[n8]`: memory in the high page at `$FF00+n8`.
    DirectHram(Box<Operand>),
    IndirectR8(Reg8),
    IndirectR16(Reg16),
    HlInc,
    HlDec,
    /// `[c]`: memory in the high page at `$FF00+c`.
    HramC,
}

impl Operand {
    pub fn direct_u16(addr: u16) -> Self {
        Operand::Direct(Box::new(Operand::U16(addr)))
    }

    pub fn direct_u8(addr: u8) -> Self {
        Operand::DirectHram(Box::new(Operand::U8(addr)))
    }

    pub fn label(name: impl Into<String>) -> Self {
        Operand::Label(name.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instruction {
    pub mnemonic: Mnemonic,
    pub operands: Vec<Operand>,
}

impl Instruction {
    pub fn new(mnemonic: Mnemonic, operands: Vec<Operand>) -> Self {
        debug_assert!(operands.len() <= 3);
        Self { mnemonic, operands }
    }

    pub fn bare(mnemonic: Mnemonic) -> Self {
        Self { mnemonic, operands: Vec::new() }
    }
}
