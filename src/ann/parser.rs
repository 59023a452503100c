//! Typed annotation lines: `BB:AAAA Label[, type] [; comment]`.

use std::io::BufRead;

use pest::iterators::Pair;
use pest::Parser;

use super::grammar::{self, AnnGrammar, Failure, Rule};
use super::types::{Ann, AnnType};
use crate::error::AnnError;

/// Parse a single annotation. Blank and comment-only lines are rejected.
pub fn parse_ann(line: &str) -> Result<Ann, AnnError> {
    parse_ann_line(line, 1)?.ok_or_else(|| AnnError::Parse {
        line: 1,
        message: "expected an annotation".to_string(),
    })
}

/// Parse one line of an annotation file; blank and comment-only lines yield `None`.
pub fn parse_ann_line(text: &str, line: usize) -> Result<Option<Ann>, AnnError> {
    parse(text).map_err(|message| AnnError::Parse { line, message })
}

/// Parse every line; any malformed line fails the whole input.
pub fn parse_ann_lines<I, S>(lines: I) -> Result<Vec<Ann>, AnnError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut anns = Vec::new();
    for (i, text) in lines.into_iter().enumerate() {
        anns.extend(parse_ann_line(text.as_ref().trim(), i + 1)?);
    }
    Ok(anns)
}

pub fn parse_ann_file<R: BufRead>(reader: R) -> Result<Vec<Ann>, AnnError> {
    let lines = reader.lines().collect::<Result<Vec<_>, _>>()?;
    parse_ann_lines(lines)
}

fn parse(text: &str) -> Result<Option<Ann>, Failure> {
    let pairs = AnnGrammar::parse(Rule::ann_line, text).map_err(grammar::describe)?;
    let Some(ann) = grammar::find(pairs, Rule::ann) else {
        return Ok(None);
    };

    let mut inner = ann.into_inner();
    let addr = grammar::bank_addr(grammar::next(&mut inner, "address")?)?;
    let mut label = String::new();
    let mut ty = None;
    for pair in inner {
        match pair.as_rule() {
            Rule::label => label = pair.as_str().to_string(),
            Rule::ann_type => ty = Some(ann_type(pair)?),
            other => return Err(format!("unexpected {other:?}")),
        }
    }
    Ok(Some(Ann { addr, label, ty }))
}

fn ann_type(pair: Pair<Rule>) -> Result<AnnType, Failure> {
    let mut inner = pair.into_inner();
    let ty = grammar::next(&mut inner, "type")?;
    match ty.as_rule() {
        Rule::prim_u8 => Ok(AnnType::U8),
        Rule::prim_u16 => Ok(AnnType::U16),
        Rule::pointer => {
            let mut inner = ty.into_inner();
            Ok(AnnType::pointer(ann_type(grammar::next(&mut inner, "pointee")?)?))
        }
        Rule::array => {
            let mut inner = ty.into_inner();
            let size = grammar::integer(grammar::next(&mut inner, "array size")?)?;
            let elem = ann_type(grammar::next(&mut inner, "element type")?)?;
            Ok(AnnType::array(elem, size))
        }
        other => Err(format!("expected type, found {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_comment_lines_yield_nothing() {
        assert_eq!(parse_ann_line("", 1).unwrap(), None);
        assert_eq!(parse_ann_line("; just a note", 1).unwrap(), None);
    }

    #[test]
    fn address_without_label() {
        let ann = parse_ann("00:0150 ; entry").unwrap();
        assert_eq!(ann, Ann::new(0, 0x0150, "", None));
    }

    #[test]
    fn failure_reports_line() {
        let err = parse_ann_lines(["01:1234 Ok", "01:12 Bad"]).unwrap_err();
        assert!(matches!(err, AnnError::Parse { line: 2, .. }), "{err}");
    }
}
