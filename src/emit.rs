//! Per-bank emission of RGBDS source.

use std::fmt::Write;
use std::num::NonZeroUsize;
use std::thread;

use tracing::{debug, trace, warn};

use crate::addr::{BankAddr, ROM0_END, ROM0_START, ROMX_END, ROMX_START, ROM_BANK_SIZE};
use crate::ann::{AnnMapping, AnnType};
use crate::decoder::Decoder;
use crate::disasm::render;
use crate::error::EmitError;
use crate::instructions::{Instruction, Operand};
use crate::isa::sm83::Sm83Decoder;
use crate::rom::Rom;

const DB_PER_LINE: usize = 8;
const DW_PER_LINE: usize = 4;
const TILE_BYTES: usize = 16;

/// `SECTION` line opening the source of `bank`.
pub fn bank_header(bank: u16) -> String {
    if bank == 0 {
        format!("SECTION \"ROM Bank ${bank:03x}\", ROM0[${ROM0_START:x}]")
    } else {
        format!("SECTION \"ROM Bank ${bank:03x}\", ROMX[${ROMX_START:x}], BANK[${bank:x}]")
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BankStats {
    pub insns: usize,
    pub raw_bytes: usize,
    pub data_bytes: usize,
    pub labels: usize,
}

pub struct BankEmitter<'a, D = Sm83Decoder> {
    rom: &'a Rom,
    anns: Option<&'a AnnMapping>,
    decoder: D,
}

impl<'a> BankEmitter<'a, Sm83Decoder> {
    pub fn new(rom: &'a Rom) -> Self {
        Self::with_decoder(rom, Sm83Decoder::new())
    }
}

impl<'a, D: Decoder> BankEmitter<'a, D> {
    pub fn with_decoder(rom: &'a Rom, decoder: D) -> Self {
        Self { rom, anns: None, decoder }
    }

    /// Place labels and data regions from `anns` into the output.
    pub fn with_annotations(mut self, anns: &'a AnnMapping) -> Self {
        self.anns = Some(anns);
        self
    }

    pub fn emit_bank(&self, bank: u16) -> Result<String, EmitError> {
        let mut out = String::new();
        self.write_bank(&mut out, bank)?;
        Ok(out)
    }

    /// Emit every bank, spreading banks over worker threads.
    pub fn emit_all(&self) -> Result<Vec<String>, EmitError>
    where
        D: Sync,
    {
        let banks = self.rom.bank_count();
        let workers = thread::available_parallelism()
            .map_or(1, NonZeroUsize::get)
            .min(banks);

        let mut done = thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|first| {
                    scope.spawn(move || {
                        (first..banks)
                            .step_by(workers)
                            .map(|bank| self.emit_bank(bank as u16).map(|text| (bank, text)))
                            .collect::<Result<Vec<_>, EmitError>>()
                    })
                })
                .collect();

            let mut done = Vec::with_capacity(banks);
            for handle in handles {
                let part = handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic))?;
                done.extend(part);
            }
            Ok::<_, EmitError>(done)
        })?;

        done.sort_by_key(|(bank, _)| *bank);
        Ok(done.into_iter().map(|(_, text)| text).collect())
    }

    pub fn write_bank<W: Write>(&self, out: &mut W, bank: u16) -> Result<BankStats, EmitError> {
        let banks = self.rom.bank_count();
        if usize::from(bank) >= banks {
            return Err(EmitError::NoSuchBank { bank, banks });
        }
        writeln!(out, "{}\n", bank_header(bank))?;

        // Nothing past the bank is visible, so an instruction cannot straddle it.
        let bytes = &self.rom.data()[..Rom::bank_limit(usize::from(bank))];
        let mut stats = BankStats::default();
        let mut cursor = Some(BankAddr::start(bank));
        while let Some(at) = cursor {
            stats.labels += self.write_labels(out, at)?;
            let data = self
                .anns
                .and_then(|anns| anns.data_type_at(at))
                .filter(|ty| ty.byte_size() > 0);
            let size = match data {
                Some(ty) => self.write_data(out, bytes, at, ty, &mut stats)?,
                None => self.write_code(out, bytes, at, &mut stats)?,
            };
            cursor = at.checked_add(size);
        }

        debug!(
            bank,
            insns = stats.insns,
            raw = stats.raw_bytes,
            data = stats.data_bytes,
            labels = stats.labels,
            "emitted bank"
        );
        Ok(stats)
    }

    fn write_labels<W: Write>(&self, out: &mut W, at: BankAddr) -> Result<usize, EmitError> {
        let Some(anns) = self.anns else {
            return Ok(0);
        };
        let labels = anns.labels_at(at);
        for label in &labels {
            writeln!(out, "{label}::")?;
        }
        Ok(labels.len())
    }

    fn write_code<W: Write>(
        &self,
        out: &mut W,
        bytes: &[u8],
        at: BankAddr,
        stats: &mut BankStats,
    ) -> Result<usize, EmitError> {
        let index = at.rom_index();
        let decoded = self
            .decoder
            .decode(bytes, index)
            .filter(|d| !self.covers_anchor(at, d.size));

        match decoded {
            Some(d) => {
                debug_assert!(
                    at.offset() + d.size <= ROM_BANK_SIZE || d.size == 1,
                    "instruction at {at} crosses the bank boundary"
                );
                let insn = self.resolve_labels(at, d.insn);
                let line = render(&insn).map_err(|source| EmitError::Render { at, source })?;
                writeln!(out, "{line}")?;
                stats.insns += 1;
                Ok(d.size)
            }
            None => {
                trace!(%at, byte = bytes[index], "raw byte");
                writeln!(out, "DB ${:02x}", bytes[index])?;
                stats.raw_bytes += 1;
                Ok(1)
            }
        }
    }

    fn write_data<W: Write>(
        &self,
        out: &mut W,
        bytes: &[u8],
        at: BankAddr,
        ty: &AnnType,
        stats: &mut BankStats,
    ) -> Result<usize, EmitError> {
        let wanted = ty.byte_size();
        let len = wanted.min(ROM_BANK_SIZE - at.offset());
        if len < wanted {
            warn!(%at, wanted, kept = len, "data annotation clipped at bank end");
        }

        let start = at.rom_index();
        let region = &bytes[start..start + len];
        let word = ty.element_width() == 2;
        let per_line = match ty {
            AnnType::Image { width: Some(w), .. } => (*w as usize / 4).clamp(1, TILE_BYTES),
            AnnType::Image { width: None, .. } => TILE_BYTES,
            _ if word => DW_PER_LINE,
            _ => DB_PER_LINE,
        };

        let mut line = DataLine::new(word, per_line);
        let mut i = 0;
        while i < len {
            let here = BankAddr::new(at.bank, at.addr + i as u16);
            if i > 0 && self.has_labels(here) {
                line.flush(out)?;
                stats.labels += self.write_labels(out, here)?;
            }
            // a label inside a word, or a word cut short by the bank end, splits it into bytes
            let whole = word && i + 1 < len && !self.has_labels(BankAddr::new(at.bank, here.addr + 1));
            if whole {
                line.push(out, u32::from(u16::from_le_bytes([region[i], region[i + 1]])))?;
                i += 2;
            } else if word {
                line.flush(out)?;
                writeln!(out, "DB ${:02x}", region[i])?;
                i += 1;
            } else {
                line.push(out, u32::from(region[i]))?;
                i += 1;
            }
        }
        line.flush(out)?;

        stats.data_bytes += len;
        Ok(len)
    }

    fn has_labels(&self, at: BankAddr) -> bool {
        self.anns.is_some_and(|anns| anns.label_at(at).is_some())
    }

    /// Whether an instruction of `size` bytes at `at` would hide an annotated address.
    fn covers_anchor(&self, at: BankAddr, size: usize) -> bool {
        let Some(anns) = self.anns else {
            return false;
        };
        let end = BankAddr { bank: at.bank, addr: at.addr.saturating_add(size as u16) };
        anns.has_anchor_between(at, end)
    }

    fn resolve_labels(&self, at: BankAddr, insn: Instruction) -> Instruction {
        let Some(anns) = self.anns else {
            return insn;
        };
        let operands = insn
            .operands
            .into_iter()
            .map(|operand| resolve_operand(anns, at, operand))
            .collect();
        Instruction::new(insn.mnemonic, operands)
    }
}

/// Replace an address operand with the label annotated there, if any.
fn resolve_operand(anns: &AnnMapping, at: BankAddr, operand: Operand) -> Operand {
    match operand {
        Operand::U16(target) => rom_label(anns, at.bank, target).unwrap_or(operand),
        Operand::Direct(inner) => Operand::Direct(Box::new(resolve_operand(anns, at, *inner))),
        Operand::Rel(e) => {
            let target = i32::from(at.addr) + 2 + i32::from(e);
            let in_window = (i32::from(at.window_start())..=i32::from(at.window_end())).contains(&target);
            if in_window {
                rom_label(anns, at.bank, target as u16).unwrap_or(operand)
            } else {
                operand
            }
        }
        other => other,
    }
}

/// Label for an address seen from code in `bank`. Only ROM labels are
/// emitted, so only those can be referenced.
fn rom_label(anns: &AnnMapping, bank: u16, target: u16) -> Option<Operand> {
    let bank = match target {
        ROM0_START..=ROM0_END => 0,
        ROMX_START..=ROMX_END if bank != 0 => bank,
        _ => return None,
    };
    anns.label_at(BankAddr::new(bank, target)).map(Operand::label)
}

/// Accumulates `DB`/`DW` values for one output line.
struct DataLine {
    word: bool,
    per_line: usize,
    values: Vec<u32>,
}

impl DataLine {
    fn new(word: bool, per_line: usize) -> Self {
        Self { word, per_line, values: Vec::with_capacity(per_line) }
    }

    fn push<W: Write>(&mut self, out: &mut W, value: u32) -> Result<(), EmitError> {
        self.values.push(value);
        if self.values.len() == self.per_line {
            self.flush(out)?;
        }
        Ok(())
    }

    fn flush<W: Write>(&mut self, out: &mut W) -> Result<(), EmitError> {
        if self.values.is_empty() {
            return Ok(());
        }
        let (directive, digits) = if self.word { ("DW", 4) } else { ("DB", 2) };
        let values: Vec<String> = self.values.iter().map(|v| format!("${v:0digits$x}")).collect();
        writeln!(out, "{directive} {}", values.join(", "))?;
        self.values.clear();
        Ok(())
    }
}
