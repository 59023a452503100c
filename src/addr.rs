use std::fmt;

use serde::{Deserialize, Serialize};

pub const ROM_BANK_SIZE: usize = 0x4000; // 16 KiB

pub const ROM0_START: u16 = 0x0000;
pub const ROM0_END: u16 = 0x3FFF;
pub const ROMX_START: u16 = 0x4000;
pub const ROMX_END: u16 = 0x7FFF;

pub const MAX_BANK: u16 = 0x1FF;

/// A location as the CPU sees it: a bank number plus a 16-bit address.
///
/// Bank 0 is fixed in the `ROM0` window (`$0000-$3FFF`); every other bank is
/// switched into the `ROMX` window (`$4000-$7FFF`). Annotations may also name
/// RAM addresses, so construction only checks the bank range; the ROM window
/// invariant is reported by [`BankAddr::is_rom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BankAddr {
    pub bank: u16,
    pub addr: u16,
}

impl BankAddr {
    pub fn new(bank: u16, addr: u16) -> Self {
        assert!(bank <= MAX_BANK, "bank {bank:#x} out of range");
        Self { bank, addr }
    }

    /// Lowest addressable location of `bank`.
    pub fn start(bank: u16) -> Self {
        Self::new(bank, window_start(bank))
    }

    pub fn window_start(&self) -> u16 {
        window_start(self.bank)
    }

    pub fn window_end(&self) -> u16 {
        if self.bank == 0 {
            ROM0_END
        } else {
            ROMX_END
        }
    }

    /// Whether this address falls inside the ROM window of its bank.
    pub fn is_rom(&self) -> bool {
        (self.window_start()..=self.window_end()).contains(&self.addr)
    }

    /// Successor within the same bank, or `None` at the top of the window.
    ///
    /// A ROM address stops at the end of its own window (`$3FFF` for bank 0,
    /// `$7FFF` for a switched bank) instead of running on into `$8000`, so a
    /// bank walk ends exactly where the bank's bytes end. RAM addresses walk
    /// up to `$FFFF`.
    pub fn next(&self) -> Option<Self> {
        self.checked_add(1)
    }

    /// Advance by `n` bytes without leaving the bank window.
    pub fn checked_add(&self, n: usize) -> Option<Self> {
        let end = if self.is_rom() { self.window_end() } else { u16::MAX };
        let target = usize::from(self.addr).checked_add(n)?;
        if target > usize::from(end) {
            return None;
        }
        Some(Self { bank: self.bank, addr: target as u16 })
    }

    /// Byte offset from the start of the bank window.
    ///
    /// # Panics
    ///
    /// If the address is outside its bank's ROM window; see [`BankAddr::is_rom`].
    pub fn offset(&self) -> usize {
        assert!(self.is_rom(), "{self} is not a ROM address");
        usize::from(self.addr - self.window_start())
    }

    /// Linear byte offset into the ROM image. Panics like [`BankAddr::offset`].
    pub fn rom_index(&self) -> usize {
        usize::from(self.bank) * ROM_BANK_SIZE + self.offset()
    }

    /// Inverse of [`BankAddr::rom_index`].
    pub fn from_rom_index(index: usize) -> Self {
        let bank = (index / ROM_BANK_SIZE) as u16;
        let offset = (index % ROM_BANK_SIZE) as u16;
        Self::new(bank, window_start(bank) + offset)
    }
}

fn window_start(bank: u16) -> u16 {
    if bank == 0 {
        ROM0_START
    } else {
        ROMX_START
    }
}

impl fmt::Display for BankAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}:{:04X}", self.bank, self.addr)
    }
}
