use std::fmt;

use serde::{Deserialize, Serialize};

use crate::addr::BankAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    U8,
    U16,
}

/// What lives at an annotated address.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnnType {
    Primitive(PrimitiveType),
    Array { ty: Box<AnnType>, size: usize },
    Pointer(Box<AnnType>),
    /// Symbol files only: a run of code.
    Code { size: usize },
    /// Symbol files only: graphics data, optionally with its width in pixels.
    Image { size: usize, width: Option<u32> },
}

impl AnnType {
    pub const U8: AnnType = AnnType::Primitive(PrimitiveType::U8);
    pub const U16: AnnType = AnnType::Primitive(PrimitiveType::U16);

    pub fn array(ty: AnnType, size: usize) -> Self {
        AnnType::Array { ty: Box::new(ty), size }
    }

    pub fn pointer(ty: AnnType) -> Self {
        AnnType::Pointer(Box::new(ty))
    }

    /// Bytes covered by a value of this type.
    pub fn byte_size(&self) -> usize {
        match self {
            AnnType::Primitive(PrimitiveType::U8) => 1,
            AnnType::Primitive(PrimitiveType::U16) | AnnType::Pointer(_) => 2,
            AnnType::Array { ty, size } => ty.byte_size().saturating_mul(*size),
            AnnType::Code { size } | AnnType::Image { size, .. } => *size,
        }
    }

    /// Whether the bytes must be emitted as data instead of decoded.
    pub fn is_data(&self) -> bool {
        !matches!(self, AnnType::Code { .. })
    }

    /// Width in bytes of the scalar elements making up this type.
    pub fn element_width(&self) -> usize {
        match self {
            AnnType::Array { ty, .. } => ty.element_width(),
            AnnType::Primitive(PrimitiveType::U16) | AnnType::Pointer(_) => 2,
            _ => 1,
        }
    }

    fn symbol_only(&self) -> bool {
        matches!(self, AnnType::Code { .. } | AnnType::Image { .. })
    }
}

impl fmt::Display for AnnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnType::Primitive(PrimitiveType::U8) => f.write_str("u8"),
            AnnType::Primitive(PrimitiveType::U16) => f.write_str("u16"),
            AnnType::Array { ty, size } => write!(f, "[{size}]{ty}"),
            AnnType::Pointer(ty) => write!(f, "*{ty}"),
            AnnType::Code { size } => write!(f, ".code:{size:04X}"),
            AnnType::Image { size, width } => {
                write!(f, ".image:{size:04X}")?;
                match width {
                    Some(w) => write!(f, ":w{w}"),
                    None => Ok(()),
                }
            }
        }
    }
}

/// Optionally typed label at a specific address.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Ann {
    pub addr: BankAddr,
    pub label: String,
    pub ty: Option<AnnType>,
}

impl Ann {
    pub fn new(bank: u16, addr: u16, label: impl Into<String>, ty: Option<AnnType>) -> Self {
        Self {
            addr: BankAddr::new(bank, addr),
            label: label.into(),
            ty,
        }
    }
}

impl fmt::Display for Ann {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.addr)?;
        if !self.label.is_empty() {
            write!(f, " {}", self.label)?;
        }
        match &self.ty {
            Some(ty) if ty.symbol_only() => write!(f, " {ty}"),
            Some(ty) => write!(f, ", {ty}"),
            None => Ok(()),
        }
    }
}
