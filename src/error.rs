use crate::addr::BankAddr;
use crate::instructions::Operand;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("operand {operand:?} has no assembler syntax")]
    UnsupportedOperand { operand: Operand },
}

#[derive(thiserror::Error, Debug)]
pub enum AnnError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("label '{label}' defined twice ({existing} and {new})")]
    DuplicateLabel {
        label: String,
        existing: BankAddr,
        new: BankAddr,
    },
    #[error("reading annotations: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RomError {
    #[error("ROM image is {len:#x} bytes, smaller than one bank")]
    TooSmall { len: usize },
}

#[derive(thiserror::Error, Debug)]
pub enum EmitError {
    #[error("at {at}: {source}")]
    Render {
        at: BankAddr,
        #[source]
        source: RenderError,
    },
    #[error("bank {bank:#x} is not in the ROM ({banks} banks)")]
    NoSuchBank { bank: u16, banks: usize },
    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
}
