use crate::decoder::{Decoded, Decoder};
use crate::instructions::{Condition, Instruction, Mnemonic, Operand, Reg16, Reg8};

/// SM83 decoder.
///
/// The dense blocks of the opcode map (register moves, ALU with register,
/// the `$CB` bit operations and the column patterns of the `$00-$3F` and
/// `$C0-$FF` quadrants) are decoded from their bit fields. Opcodes with a
/// single fixed meaning live in [`TABLE`].
pub struct Sm83Decoder;

impl Sm83Decoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Sm83Decoder {
    fn default() -> Self {
        Self::new()
    }
}

const PREFIX: u8 = 0xCB;

/// Register selected by a 3-bit field, in encoding order.
const R8: [Reg8; 8] = [
    Reg8::B,
    Reg8::C,
    Reg8::D,
    Reg8::E,
    Reg8::H,
    Reg8::L,
    Reg8::Mhl,
    Reg8::A,
];

const ALU: [Mnemonic; 8] = [
    Mnemonic::Add,
    Mnemonic::Adc,
    Mnemonic::Sub,
    Mnemonic::Sbc,
    Mnemonic::And,
    Mnemonic::Xor,
    Mnemonic::Or,
    Mnemonic::Cp,
];

const ROTATE: [Mnemonic; 8] = [
    Mnemonic::Rlc,
    Mnemonic::Rrc,
    Mnemonic::Rl,
    Mnemonic::Rr,
    Mnemonic::Sla,
    Mnemonic::Sra,
    Mnemonic::Swap,
    Mnemonic::Srl,
];

const R16: [Reg16; 4] = [Reg16::Bc, Reg16::De, Reg16::Hl, Reg16::Sp];
const R16_STACK: [Reg16; 4] = [Reg16::Bc, Reg16::De, Reg16::Hl, Reg16::Af];
const COND: [Condition; 4] = [Condition::Nz, Condition::Z, Condition::Nc, Condition::C];

/// One operand position of an encoding, and how many trailing bytes it reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    R8(Reg8),
    R16(Reg16),
    Cond(Condition),
    IndirectR16(Reg16),
    HlInc,
    HlDec,
    HramC,
    Vector(u8),
    Bit(u8),
    Imm8,
    Imm16,
    Signed8,
    Rel8,
    SpRel8,
    Direct16,
    DirectHram8,
    /// A trailing byte that must be zero and renders as nothing.
    Zero,
}

impl Slot {
    fn width(self) -> usize {
        match self {
            Slot::Imm8 | Slot::Signed8 | Slot::Rel8 | Slot::SpRel8 | Slot::DirectHram8 | Slot::Zero => 1,
            Slot::Imm16 | Slot::Direct16 => 2,
            _ => 0,
        }
    }

    fn accepts(self, raw: &[u8]) -> bool {
        match self {
            Slot::Zero => raw == [0x00],
            _ => true,
        }
    }

    fn operand(self, raw: &[u8]) -> Option<Operand> {
        let op = match self {
            Slot::R8(r) => Operand::R8(r),
            Slot::R16(rr) => Operand::R16(rr),
            Slot::Cond(cc) => Operand::Cond(cc),
            Slot::IndirectR16(rr) => Operand::IndirectR16(rr),
            Slot::HlInc => Operand::HlInc,
            Slot::HlDec => Operand::HlDec,
            Slot::HramC => Operand::HramC,
            Slot::Vector(v) => Operand::U8(v),
            Slot::Bit(b) => Operand::U3(b),
            Slot::Imm8 => Operand::U8(raw[0]),
            Slot::Imm16 => Operand::U16(load_le_u16(raw)),
            Slot::Signed8 => Operand::I8(raw[0] as i8),
            Slot::Rel8 => Operand::Rel(raw[0] as i8),
            Slot::SpRel8 => Operand::SpRel(raw[0] as i8),
            Slot::Direct16 => Operand::direct_u16(load_le_u16(raw)),
            Slot::DirectHram8 => Operand::direct_u8(raw[0]),
            Slot::Zero => return None,
        };
        Some(op)
    }
}

fn load_le_u16(raw: &[u8]) -> u16 {
    u16::from_le_bytes([raw[0], raw[1]])
}

struct OpcodeDesc {
    opcode: u8,
    mnemonic: Mnemonic,
    slots: &'static [Slot],
}

const fn op(opcode: u8, mnemonic: Mnemonic, slots: &'static [Slot]) -> OpcodeDesc {
    OpcodeDesc { opcode, mnemonic, slots }
}

const A: Slot = Slot::R8(Reg8::A);

/// Opcodes outside the regular bit-field blocks.
const TABLE: &[OpcodeDesc] = &[
    op(0x00, Mnemonic::Nop, &[]),
    op(0x07, Mnemonic::Rlca, &[]),
    op(0x0F, Mnemonic::Rrca, &[]),
    op(0x17, Mnemonic::Rla, &[]),
    op(0x1F, Mnemonic::Rra, &[]),
    op(0x27, Mnemonic::Daa, &[]),
    op(0x2F, Mnemonic::Cpl, &[]),
    op(0x37, Mnemonic::Scf, &[]),
    op(0x3F, Mnemonic::Ccf, &[]),
    op(0x08, Mnemonic::Ld, &[Slot::Direct16, Slot::R16(Reg16::Sp)]),
    op(0x10, Mnemonic::Stop, &[Slot::Zero]),
    op(0x18, Mnemonic::Jr, &[Slot::Rel8]),
    op(0x02, Mnemonic::Ld, &[Slot::IndirectR16(Reg16::Bc), A]),
    op(0x12, Mnemonic::Ld, &[Slot::IndirectR16(Reg16::De), A]),
    op(0x22, Mnemonic::Ld, &[Slot::HlInc, A]),
    op(0x32, Mnemonic::Ld, &[Slot::HlDec, A]),
    op(0x0A, Mnemonic::Ld, &[A, Slot::IndirectR16(Reg16::Bc)]),
    op(0x1A, Mnemonic::Ld, &[A, Slot::IndirectR16(Reg16::De)]),
    op(0x2A, Mnemonic::Ld, &[A, Slot::HlInc]),
    op(0x3A, Mnemonic::Ld, &[A, Slot::HlDec]),
    op(0xC3, Mnemonic::Jp, &[Slot::Imm16]),
    op(0xC9, Mnemonic::Ret, &[]),
    op(0xD9, Mnemonic::Reti, &[]),
    op(0xCD, Mnemonic::Call, &[Slot::Imm16]),
    op(0xE9, Mnemonic::Jp, &[Slot::R16(Reg16::Hl)]),
    op(0xF9, Mnemonic::Ld, &[Slot::R16(Reg16::Sp), Slot::R16(Reg16::Hl)]),
    op(0xE0, Mnemonic::Ldh, &[Slot::DirectHram8, A]),
    op(0xF0, Mnemonic::Ldh, &[A, Slot::DirectHram8]),
    op(0xE2, Mnemonic::Ldh, &[Slot::HramC, A]),
    op(0xF2, Mnemonic::Ldh, &[A, Slot::HramC]),
    op(0xEA, Mnemonic::Ld, &[Slot::Direct16, A]),
    op(0xFA, Mnemonic::Ld, &[A, Slot::Direct16]),
    op(0xE8, Mnemonic::Add, &[Slot::R16(Reg16::Sp), Slot::Signed8]),
    op(0xF8, Mnemonic::Ld, &[Slot::R16(Reg16::Hl), Slot::SpRel8]),
    op(0xF3, Mnemonic::Di, &[]),
    op(0xFB, Mnemonic::Ei, &[]),
];

type Shape = (Mnemonic, Vec<Slot>);

fn unprefixed(opcode: u8) -> Option<Shape> {
    if let Some(desc) = TABLE.iter().find(|d| d.opcode == opcode) {
        return Some((desc.mnemonic, desc.slots.to_vec()));
    }

    // x:2 y:3 z:3, with p:2 = y >> 1
    let y = usize::from((opcode >> 3) & 0x7);
    let z = usize::from(opcode & 0x7);
    let p = usize::from((opcode >> 4) & 0x3);

    let shape = match opcode {
        // [hl] <- [hl] is not a load; the slot belongs to HALT
        0x76 => (Mnemonic::Halt, vec![]),
        0x40..=0x7F => (Mnemonic::Ld, vec![Slot::R8(R8[y]), Slot::R8(R8[z])]),
        0x80..=0xBF => (ALU[y], vec![A, Slot::R8(R8[z])]),
        _ if opcode & 0xE7 == 0x20 => (Mnemonic::Jr, vec![Slot::Cond(COND[y & 0x3]), Slot::Rel8]),
        _ if opcode & 0xCF == 0x01 => (Mnemonic::Ld, vec![Slot::R16(R16[p]), Slot::Imm16]),
        _ if opcode & 0xCF == 0x03 => (Mnemonic::Inc, vec![Slot::R16(R16[p])]),
        _ if opcode & 0xCF == 0x09 => (Mnemonic::Add, vec![Slot::R16(Reg16::Hl), Slot::R16(R16[p])]),
        _ if opcode & 0xCF == 0x0B => (Mnemonic::Dec, vec![Slot::R16(R16[p])]),
        _ if opcode & 0xC7 == 0x04 => (Mnemonic::Inc, vec![Slot::R8(R8[y])]),
        _ if opcode & 0xC7 == 0x05 => (Mnemonic::Dec, vec![Slot::R8(R8[y])]),
        _ if opcode & 0xC7 == 0x06 => (Mnemonic::Ld, vec![Slot::R8(R8[y]), Slot::Imm8]),
        _ if opcode & 0xE7 == 0xC0 => (Mnemonic::Ret, vec![Slot::Cond(COND[y])]),
        _ if opcode & 0xE7 == 0xC2 => (Mnemonic::Jp, vec![Slot::Cond(COND[y]), Slot::Imm16]),
        _ if opcode & 0xE7 == 0xC4 => (Mnemonic::Call, vec![Slot::Cond(COND[y]), Slot::Imm16]),
        _ if opcode & 0xCF == 0xC1 => (Mnemonic::Pop, vec![Slot::R16(R16_STACK[p])]),
        _ if opcode & 0xCF == 0xC5 => (Mnemonic::Push, vec![Slot::R16(R16_STACK[p])]),
        _ if opcode & 0xC7 == 0xC6 => (ALU[y], vec![A, Slot::Imm8]),
        _ if opcode & 0xC7 == 0xC7 => (Mnemonic::Rst, vec![Slot::Vector((y as u8) * 8)]),
        // D3 DB DD E3 E4 EB EC ED F4 FC FD
        _ => return None,
    };
    Some(shape)
}

fn prefixed(opcode: u8) -> Shape {
    let y = (opcode >> 3) & 0x7;
    let reg = Slot::R8(R8[usize::from(opcode & 0x7)]);
    match opcode >> 6 {
        0 => (ROTATE[usize::from(y)], vec![reg]),
        1 => (Mnemonic::Bit, vec![Slot::Bit(y), reg]),
        2 => (Mnemonic::Res, vec![Slot::Bit(y), reg]),
        _ => (Mnemonic::Set, vec![Slot::Bit(y), reg]),
    }
}

impl Decoder for Sm83Decoder {
    fn decode(&self, bytes: &[u8], offset: usize) -> Option<Decoded> {
        let opcode = *bytes.get(offset)?;
        let (mnemonic, slots, mut cursor) = if opcode == PREFIX {
            let (mnemonic, slots) = prefixed(*bytes.get(offset + 1)?);
            (mnemonic, slots, offset + 2)
        } else {
            let (mnemonic, slots) = unprefixed(opcode)?;
            (mnemonic, slots, offset + 1)
        };

        let mut operands = Vec::with_capacity(slots.len());
        for slot in slots {
            let raw = bytes.get(cursor..cursor + slot.width())?;
            if !slot.accepts(raw) {
                return None;
            }
            cursor += slot.width();
            operands.extend(slot.operand(raw));
        }

        Some(Decoded {
            insn: Instruction::new(mnemonic, operands),
            size: cursor - offset,
        })
    }
}
