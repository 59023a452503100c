use tracing::{info, warn};

use crate::addr::{MAX_BANK, ROM_BANK_SIZE};
use crate::error::RomError;

const TITLE: std::ops::Range<usize> = 0x0134..0x0143;
const CGB_FLAG: usize = 0x0143;
const ROM_SIZE: usize = 0x0148;

/// A ROM image split into 16 KiB banks.
#[derive(Debug, Clone)]
pub struct Rom {
    data: Vec<u8>,
    banks: usize,
}

impl Rom {
    /// Load an image. Every complete bank in the data is kept; the cartridge
    /// header's ROM size is only checked against it.
    pub fn new(data: Vec<u8>) -> Result<Self, RomError> {
        let mut banks = data.len() / ROM_BANK_SIZE;
        if banks == 0 {
            return Err(RomError::TooSmall { len: data.len() });
        }
        if data.len() % ROM_BANK_SIZE != 0 {
            warn!(len = data.len(), "ignoring trailing partial bank");
        }
        let addressable = usize::from(MAX_BANK) + 1;
        if banks > addressable {
            warn!(present = banks, kept = addressable, "ignoring banks past the mapper limit");
            banks = addressable;
        }
        match header_banks(&data) {
            Some(n) if n == banks => info!(banks, "bank count matches cartridge header"),
            Some(n) => warn!(header = n, present = banks, "cartridge header disagrees with file length"),
            None => warn!(banks, "unknown ROM size code in cartridge header"),
        }
        Ok(Self { data, banks })
    }

    /// Bank count declared by the cartridge header, if the size code is known.
    pub fn header_bank_count(&self) -> Option<usize> {
        header_banks(&self.data)
    }

    /// Load an image with a bank count decided by the caller.
    pub fn with_banks(data: Vec<u8>, banks: usize) -> Result<Self, RomError> {
        if data.len() < banks * ROM_BANK_SIZE || banks == 0 || banks > usize::from(MAX_BANK) + 1 {
            return Err(RomError::TooSmall { len: data.len() });
        }
        Ok(Self { data, banks })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn bank_count(&self) -> usize {
        self.banks
    }

    /// Bytes of `bank`, or `None` past the last bank.
    pub fn bank(&self, bank: usize) -> Option<&[u8]> {
        if bank >= self.banks {
            return None;
        }
        let start = bank * ROM_BANK_SIZE;
        Some(&self.data[start..start + ROM_BANK_SIZE])
    }

    /// Linear index one past the last byte of `bank`.
    pub fn bank_limit(bank: usize) -> usize {
        (bank + 1) * ROM_BANK_SIZE
    }

    pub fn title(&self) -> String {
        let raw = &self.data[TITLE];
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        String::from_utf8_lossy(&raw[..end]).trim().to_string()
    }

    pub fn is_cgb(&self) -> bool {
        self.data[CGB_FLAG] & 0x80 != 0
    }

    /// File extension matching the hardware the ROM targets.
    pub fn extension(&self) -> &'static str {
        if self.is_cgb() {
            ".gbc"
        } else {
            ".gb"
        }
    }
}

fn header_banks(data: &[u8]) -> Option<usize> {
    match *data.get(ROM_SIZE)? {
        code @ 0..=8 => Some(2usize << code),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(banks: usize, size_code: u8) -> Vec<u8> {
        let mut data = vec![0u8; banks * ROM_BANK_SIZE];
        data[ROM_SIZE] = size_code;
        data
    }

    #[test]
    fn every_complete_bank_is_kept() {
        let rom = Rom::new(image(8, 1)).unwrap();
        assert_eq!(rom.bank_count(), 8);
        assert_eq!(rom.header_bank_count(), Some(4));
        assert!(rom.bank(7).is_some());
    }

    #[test]
    fn bank_count_follows_length() {
        let rom = Rom::new(image(2, 3)).unwrap();
        assert_eq!(rom.bank_count(), 2);
        assert_eq!(rom.header_bank_count(), Some(16));
        let rom = Rom::new(image(3, 0xFF)).unwrap();
        assert_eq!(rom.bank_count(), 3);
        assert_eq!(rom.header_bank_count(), None);

        let mut data = image(2, 0);
        data.extend_from_slice(&[0xAB; 0x100]);
        assert_eq!(Rom::new(data).unwrap().bank_count(), 2);
    }

    #[test]
    fn rejects_images_without_a_bank() {
        assert_eq!(Rom::new(vec![0; 0x100]).unwrap_err(), RomError::TooSmall { len: 0x100 });
        assert!(Rom::with_banks(vec![0; ROM_BANK_SIZE], 2).is_err());
    }

    #[test]
    fn header_fields() {
        let mut data = image(2, 0);
        data[0x0134..0x0139].copy_from_slice(b"TETRA");
        data[CGB_FLAG] = 0xC0;
        let rom = Rom::new(data).unwrap();
        assert_eq!(rom.title(), "TETRA");
        assert!(rom.is_cgb());
        assert_eq!(rom.extension(), ".gbc");
        assert_eq!(rom.bank(1).map(<[u8]>::len), Some(ROM_BANK_SIZE));
        assert!(rom.bank(2).is_none());
    }
}
