//! Rendering of decoded instructions as RGBDS source text.

use crate::error::RenderError;
use crate::instructions::{Instruction, Operand, Reg16, Reg8};

/// Render an instruction as one line of assembler text, without newline.
pub fn render(insn: &Instruction) -> Result<String, RenderError> {
    let mut line = insn.mnemonic.as_str().to_string();
    for (i, operand) in insn.operands.iter().enumerate() {
        line.push_str(if i == 0 { " " } else { ", " });
        line.push_str(&render_operand(operand)?);
    }
    Ok(line)
}

pub fn render_operand(operand: &Operand) -> Result<String, RenderError> {
    let unsupported = || RenderError::UnsupportedOperand { operand: operand.clone() };
    let text = match operand {
        Operand::Label(name) if name.is_empty() => return Err(unsupported()),
        Operand::Label(name) => name.clone(),
        Operand::R8(r) => r.name().to_string(),
        Operand::R16(rr) => rr.name().to_string(),
        Operand::Cond(cc) => cc.name().to_string(),
        Operand::U3(bit) => bit.to_string(),
        Operand::U8(v) => hex(u32::from(*v)),
        Operand::U16(v) => hex(u32::from(*v)),
        Operand::I8(v) => signed_hex("", i32::from(*v)),
        // jr targets are written relative to the instruction start, two bytes
        // before the point the displacement counts from
        Operand::Rel(e) => match i32::from(*e) + 2 {
            0 => "@".to_string(),
            d => signed_hex("@", d),
        },
        Operand::SpRel(e) => signed_hex("sp", i32::from(*e)),
        Operand::Direct(inner) => match inner.as_ref() {
            Operand::U16(_) | Operand::Label(_) => format!("[{}]", render_operand(inner)?),
            _ => return Err(unsupported()),
        },
        Operand::DirectHram(inner) => match inner.as_ref() {
            Operand::U8(_) | Operand::Label(_) => format!("[{}]", render_operand(inner)?),
            _ => return Err(unsupported()),
        },
        Operand::IndirectR8(Reg8::Mhl) => return Err(unsupported()),
        Operand::IndirectR8(r) => format!("[{}]", r.name()),
        Operand::IndirectR16(Reg16::Af | Reg16::Sp) => return Err(unsupported()),
        Operand::IndirectR16(rr) => format!("[{}]", rr.name()),
        Operand::HlInc => "[hl+]".to_string(),
        Operand::HlDec => "[hl-]".to_string(),
        Operand::HramC => "[c]".to_string(),
    };
    Ok(text)
}

fn hex(v: u32) -> String {
    format!("${v:x}")
}

/// `prefix+$x` / `prefix-$x`; with an empty prefix a positive value has no sign.
fn signed_hex(prefix: &str, v: i32) -> String {
    let sign = if v < 0 { "-" } else if prefix.is_empty() { "" } else { "+" };
    format!("{prefix}{sign}${:x}", v.unsigned_abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_forms() {
        assert_eq!(render_operand(&Operand::I8(-2)).unwrap(), "-$2");
        assert_eq!(render_operand(&Operand::I8(0x10)).unwrap(), "$10");
        assert_eq!(render_operand(&Operand::SpRel(-128)).unwrap(), "sp-$80");
        assert_eq!(render_operand(&Operand::SpRel(0)).unwrap(), "sp+$0");
    }

    #[test]
    fn relative_jumps_count_from_instruction_start() {
        assert_eq!(render_operand(&Operand::Rel(-2)).unwrap(), "@");
        assert_eq!(render_operand(&Operand::Rel(0)).unwrap(), "@+$2");
        assert_eq!(render_operand(&Operand::Rel(-5)).unwrap(), "@-$3");
        assert_eq!(render_operand(&Operand::Rel(127)).unwrap(), "@+$81");
    }
}
