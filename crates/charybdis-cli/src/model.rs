use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use charybdis::ann::{parse_ann_file, parse_sym_file};
use charybdis::{Ann, AnnMapping, Rom};

/// A loaded ROM plus what the output project needs to know about the file.
#[derive(Debug)]
pub struct RomImage {
    pub rom: Rom,
    pub md5: String,
}

pub fn load_rom(path: &Path) -> Result<RomImage> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let md5 = format!("{:x}", md5::compute(&bytes));
    let rom = Rom::new(bytes).with_context(|| format!("loading {}", path.display()))?;
    info!(
        title = %rom.title(),
        banks = rom.bank_count(),
        cgb = rom.is_cgb(),
        %md5,
        "loaded ROM"
    );
    Ok(RomImage { rom, md5 })
}

/// Merge every annotation and symbol file into one index.
pub fn load_annotations(ann_files: &[PathBuf], sym_files: &[PathBuf]) -> Result<AnnMapping> {
    let mut mapping = AnnMapping::new();
    for path in ann_files {
        let anns = parse_ann_file(open(path)?).with_context(|| format!("in {}", path.display()))?;
        add_all(&mut mapping, path, anns)?;
    }
    for path in sym_files {
        let anns = parse_sym_file(open(path)?).with_context(|| format!("in {}", path.display()))?;
        add_all(&mut mapping, path, anns)?;
    }
    Ok(mapping)
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn add_all(mapping: &mut AnnMapping, path: &Path, anns: Vec<Ann>) -> Result<()> {
    let count = anns.len();
    for ann in anns {
        mapping.add(ann).with_context(|| format!("in {}", path.display()))?;
    }
    info!(file = %path.display(), count, "loaded annotations");
    Ok(())
}

/// Warn about data annotations the emitter will never reach. Returns how many.
pub fn check_annotations(mapping: &AnnMapping, rom: &Rom) -> usize {
    let unreachable: Vec<&Ann> = mapping
        .iter()
        .filter(|ann| ann.ty.as_ref().is_some_and(|ty| ty.is_data()))
        .filter(|ann| !ann.addr.is_rom() || usize::from(ann.addr.bank) >= rom.bank_count())
        .collect();
    for ann in &unreachable {
        warn!(ann = %ann, "data annotation outside the ROM is ignored");
    }
    unreachable.len()
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelKV {
    pub bank: u16,
    pub addr: u16,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
}

/// Flat view of the index for JSON export, in address order.
pub fn label_table(mapping: &AnnMapping) -> Vec<LabelKV> {
    mapping
        .iter()
        .map(|ann| LabelKV {
            bank: ann.addr.bank,
            addr: ann.addr.addr,
            name: ann.label.clone(),
            ty: ann.ty.as_ref().map(ToString::to_string),
        })
        .collect()
}
