//! User annotations: typed labels and symbol-file regions, and the index
//! that collects them by address and by label.

mod grammar;
pub mod mapping;
pub mod parser;
pub mod sym_parser;
pub mod types;

pub use mapping::AnnMapping;
pub use parser::{parse_ann, parse_ann_file, parse_ann_line, parse_ann_lines};
pub use sym_parser::{parse_sym_file, parse_sym_line, parse_sym_lines};
pub use types::{Ann, AnnType, PrimitiveType};
