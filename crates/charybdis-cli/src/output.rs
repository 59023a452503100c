use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use charybdis::{AnnMapping, BankEmitter, Rom};

use crate::model::{label_table, RomImage};

const MAKEFILE_TEMPLATE: &str = include_str!("../templates/Makefile.in");

/// Prepare `path` for a fresh project. Returns false, leaving the directory
/// alone, when it exists and `overwrite` is off.
pub fn create_output_directory(path: &Path, overwrite: bool) -> Result<bool> {
    if path.exists() {
        if !overwrite {
            warn!(path = %path.display(), "output directory exists but overwrite not enabled");
            return Ok(false);
        }
        std::fs::remove_dir_all(path).with_context(|| format!("removing {}", path.display()))?;
    }
    std::fs::create_dir_all(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(true)
}

pub fn bank_file_name(bank: usize) -> String {
    format!("bank_{bank:03x}.asm")
}

/// Write one source file per bank.
pub fn write_assembly(dir: &Path, rom: &Rom, anns: Option<&AnnMapping>) -> Result<()> {
    let mut emitter = BankEmitter::new(rom);
    if let Some(anns) = anns {
        emitter = emitter.with_annotations(anns);
    }
    let banks = emitter.emit_all()?;
    for (bank, text) in banks.iter().enumerate() {
        let path = dir.join(bank_file_name(bank));
        std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
    }
    info!(banks = banks.len(), dir = %dir.display(), "wrote assembly");
    Ok(())
}

pub fn render_makefile(rom_md5: &str, rom_ext: &str) -> String {
    MAKEFILE_TEMPLATE
        .replace("{{rom_md5}}", rom_md5)
        .replace("{{rom_ext}}", rom_ext)
}

pub fn write_makefile(dir: &Path, image: &RomImage) -> Result<()> {
    let path = dir.join("Makefile");
    let text = render_makefile(&image.md5, image.rom.extension());
    std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn write_labels(path: &Path, anns: &AnnMapping) -> Result<()> {
    let json = serde_json::to_string_pretty(&label_table(anns))?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    info!(count = anns.len(), path = %path.display(), "exported labels");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use pretty_assertions::assert_eq;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("charybdis-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn output_directory_policy() {
        let dir = scratch("policy");
        assert!(create_output_directory(&dir, false).unwrap());
        std::fs::write(dir.join("stale.asm"), "nop\n").unwrap();

        assert!(!create_output_directory(&dir, false).unwrap());
        assert!(dir.join("stale.asm").exists());

        assert!(create_output_directory(&dir, true).unwrap());
        assert!(dir.is_dir());
        assert!(!dir.join("stale.asm").exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn nested_output_directory() {
        let root = scratch("nested");
        let dir = root.join("a").join("b");
        assert!(create_output_directory(&dir, false).unwrap());
        assert!(dir.is_dir());
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn makefile_carries_checksum_and_extension() {
        let text = render_makefile("d41d8cd98f00b204e9800998ecf8427e", ".gbc");
        assert!(text.contains("ROM := game.gbc"));
        assert!(text.contains("ROM_MD5 := d41d8cd98f00b204e9800998ecf8427e"));
        assert!(!text.contains("{{"));
    }

    #[test]
    fn makefile_keeps_encodings_byte_exact() {
        let text = render_makefile("0", ".gb");
        assert!(text.contains("RGBDS 0.6.0"));
        assert!(text.contains("$(RGBASM) $(RGBASMFLAGS) -o $@ $<"));
        assert!(text.contains("RGBASMFLAGS=\"-h -L\""));
    }

    #[test]
    fn writes_one_file_per_bank() {
        let dir = scratch("banks");
        create_output_directory(&dir, false).unwrap();
        let rom = Rom::new(vec![0; 2 * 0x4000]).unwrap();
        write_assembly(&dir, &rom, None).unwrap();

        let bank1 = std::fs::read_to_string(dir.join("bank_001.asm")).unwrap();
        let mut lines = bank1.lines();
        assert_eq!(lines.next(), Some("SECTION \"ROM Bank $001\", ROMX[$4000], BANK[$1]"));
        assert_eq!(lines.next(), Some(""));
        assert_eq!(lines.filter(|l| *l == "nop").count(), 0x4000);
        assert!(dir.join("bank_000.asm").is_file());
        assert!(!dir.join("bank_002.asm").exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn bank_file_names() {
        assert_eq!(bank_file_name(0), "bank_000.asm");
        assert_eq!(bank_file_name(0x1f), "bank_01f.asm");
    }
}
