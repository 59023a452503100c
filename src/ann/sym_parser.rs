//! Symbol files: `BB:AAAA .code:SIZE`, `.data:SIZE`, `.image:SIZE[:wN]` or a plain label.
//!
//! Sizes are four hex digits. `.data:0001` is a bare `u8`; longer data runs
//! become arrays of `u8`.

use std::io::BufRead;

use pest::iterators::Pair;
use pest::Parser;

use super::grammar::{self, AnnGrammar, Failure, Rule};
use super::types::{Ann, AnnType};
use crate::error::AnnError;

pub fn parse_sym_line(text: &str, line: usize) -> Result<Option<Ann>, AnnError> {
    parse(text).map_err(|message| AnnError::Parse { line, message })
}

pub fn parse_sym_lines<I, S>(lines: I) -> Result<Vec<Ann>, AnnError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut anns = Vec::new();
    for (i, text) in lines.into_iter().enumerate() {
        anns.extend(parse_sym_line(text.as_ref().trim(), i + 1)?);
    }
    Ok(anns)
}

pub fn parse_sym_file<R: BufRead>(reader: R) -> Result<Vec<Ann>, AnnError> {
    let lines = reader.lines().collect::<Result<Vec<_>, _>>()?;
    parse_sym_lines(lines)
}

fn parse(text: &str) -> Result<Option<Ann>, Failure> {
    let pairs = AnnGrammar::parse(Rule::sym_line, text).map_err(grammar::describe)?;
    let Some(sym) = grammar::find(pairs, Rule::sym) else {
        return Ok(None);
    };

    let mut inner = sym.into_inner();
    let addr = grammar::bank_addr(grammar::next(&mut inner, "address")?)?;
    let entry = grammar::next(&mut inner, "symbol")?;
    let ann = match entry.as_rule() {
        Rule::label => Ann { addr, label: entry.as_str().to_string(), ty: None },
        _ => Ann { addr, label: String::new(), ty: Some(symbol_type(entry)?) },
    };
    Ok(Some(ann))
}

fn symbol_type(pair: Pair<Rule>) -> Result<AnnType, Failure> {
    let rule = pair.as_rule();
    let mut inner = pair.into_inner();
    let size = usize::from(grammar::hex_u16(grammar::next(&mut inner, "size")?.as_str())?);
    let ty = match rule {
        Rule::code_sym => AnnType::Code { size },
        Rule::data_sym if size > 1 => AnnType::array(AnnType::U8, size),
        Rule::data_sym => AnnType::U8,
        Rule::image_sym => {
            let width = match inner.next() {
                Some(w) => Some(w.as_str().parse::<u32>().map_err(|e| format!("image width: {e}"))?),
                None => None,
            };
            AnnType::Image { size, width }
        }
        other => return Err(format!("expected symbol, found {other:?}")),
    };
    Ok(ty)
}
