use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod model;
mod output;

use model::{check_annotations, load_annotations, load_rom};
use output::{create_output_directory, write_assembly, write_labels, write_makefile};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Disassemble a Game Boy ROM into an RGBDS project",
    long_about = None
)]
struct Cli {
    /// ROM image (.gb / .gbc)
    #[arg(value_name = "ROM")]
    rom: PathBuf,
    /// Directory receiving the bank sources and the Makefile
    #[arg(value_name = "OUTPUT_DIR", default_value = "output")]
    output: PathBuf,
    /// Replace the output directory if it exists
    #[arg(long, overrides_with = "no_overwrite")]
    overwrite: bool,
    /// Leave an existing output directory alone (default)
    #[arg(long = "no-overwrite", overrides_with = "overwrite")]
    no_overwrite: bool,
    /// Typed annotation file. Repeat to merge several.
    #[arg(long = "ann", value_name = "FILE")]
    ann_files: Vec<PathBuf>,
    /// Symbol file. Repeat to merge several.
    #[arg(long = "sym", value_name = "FILE")]
    sym_files: Vec<PathBuf>,
    /// Export the merged annotations as JSON
    #[arg(long, value_name = "FILE")]
    labels_out: Option<PathBuf>,
}

impl Cli {
    fn overwrite(&self) -> bool {
        self.overwrite && !self.no_overwrite
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let image = load_rom(&cli.rom)?;
    let anns = load_annotations(&cli.ann_files, &cli.sym_files)?;
    check_annotations(&anns, &image.rom);

    if let Some(path) = &cli.labels_out {
        write_labels(path, &anns)?;
    }
    if !create_output_directory(&cli.output, cli.overwrite())? {
        warn!("nothing written; pass --overwrite to replace {}", cli.output.display());
        return Ok(());
    }

    let anns = (!anns.is_empty()).then_some(&anns);
    write_assembly(&cli.output, &image.rom, anns)?;
    write_makefile(&cli.output, &image)?;
    info!(dir = %cli.output.display(), "done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ROM: &str = "rom.gbc";

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("charybdis").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn rom_path() {
        assert_eq!(parse(&[ROM]).rom, PathBuf::from(ROM));
        assert!(Cli::try_parse_from(["charybdis"]).is_err());
    }

    #[test]
    fn output_directory_defaults() {
        assert_eq!(parse(&[ROM]).output, PathBuf::from("output"));
        assert_eq!(parse(&[ROM, "foo"]).output, PathBuf::from("foo"));
    }

    #[test]
    fn overwrite_last_flag_wins() {
        assert!(parse(&["--overwrite", ROM]).overwrite());
        assert!(!parse(&[ROM]).overwrite());
        assert!(!parse(&["--no-overwrite", ROM]).overwrite());
        assert!(!parse(&["--overwrite", "--no-overwrite", ROM]).overwrite());
        assert!(parse(&["--no-overwrite", "--overwrite", ROM]).overwrite());
    }

    #[test]
    fn repeatable_annotation_files() {
        let cli = parse(&["--ann", "a.ann", "--sym", "game.sym", "--ann", "b.ann", ROM]);
        assert_eq!(cli.ann_files, [PathBuf::from("a.ann"), PathBuf::from("b.ann")]);
        assert_eq!(cli.sym_files, [PathBuf::from("game.sym")]);
        assert_eq!(cli.labels_out, None);
    }
}
