use pest::error::Error;
use pest::iterators::{Pair, Pairs};
use pest_derive::Parser;

use crate::addr::{BankAddr, MAX_BANK};

#[derive(Parser)]
#[grammar = "ann/ann.pest"]
pub(crate) struct AnnGrammar;

/// Parse failure carried up to the line-numbering caller.
pub(crate) type Failure = String;

pub(crate) fn describe(err: Error<Rule>) -> Failure {
    err.renamed_rules(rename_rules).variant.message().into_owned()
}

fn rename_rules(rule: &Rule) -> String {
    match rule {
        Rule::EOI => "end of line",
        Rule::bank_addr | Rule::bank | Rule::addr => "address (BB:AAAA)",
        Rule::label => "label",
        Rule::comment => "comment",
        Rule::ann_type | Rule::array | Rule::pointer | Rule::prim_u8 | Rule::prim_u16 => "type",
        Rule::bin_int | Rule::hex_int | Rule::dec_int => "integer",
        Rule::code_sym | Rule::data_sym | Rule::image_sym | Rule::sym_size => "symbol",
        Rule::image_width => "image width",
        _ => return format!("{rule:?}"),
    }
    .to_owned()
}

pub(crate) fn next<'i>(pairs: &mut Pairs<'i, Rule>, what: &str) -> Result<Pair<'i, Rule>, Failure> {
    pairs.next().ok_or_else(|| format!("missing {what}"))
}

/// The first inner pair of `rule`, if the matched line produced one.
pub(crate) fn find<'i>(pairs: Pairs<'i, Rule>, rule: Rule) -> Option<Pair<'i, Rule>> {
    pairs.flat_map(|p| p.into_inner()).find(|p| p.as_rule() == rule)
}

pub(crate) fn bank_addr(pair: Pair<Rule>) -> Result<BankAddr, Failure> {
    let mut inner = pair.into_inner();
    let bank = hex_u16(next(&mut inner, "bank")?.as_str())?;
    let addr = hex_u16(next(&mut inner, "address")?.as_str())?;
    if bank > MAX_BANK {
        return Err(format!("bank {bank:#x} out of range"));
    }
    Ok(BankAddr::new(bank, addr))
}

pub(crate) fn hex_u16(digits: &str) -> Result<u16, Failure> {
    u16::from_str_radix(digits, 16).map_err(|e| format!("'{digits}': {e}"))
}

pub(crate) fn integer(pair: Pair<Rule>) -> Result<usize, Failure> {
    let text = pair.as_str();
    let parsed = match pair.as_rule() {
        Rule::bin_int => usize::from_str_radix(&text[2..], 2),
        Rule::hex_int => usize::from_str_radix(&text[2..], 16),
        Rule::dec_int => text.parse::<usize>(),
        other => return Err(format!("expected integer, found {other:?}")),
    };
    parsed.map_err(|e| format!("'{text}': {e}"))
}

#[cfg(test)]
mod tests {
    use pest::Parser;

    use super::*;

    fn int(text: &str) -> Result<usize, Failure> {
        let source = format!("[{text}]u8");
        let mut pairs = AnnGrammar::parse(Rule::array, &source).map_err(describe)?;
        let mut inner = next(&mut pairs, "array")?.into_inner();
        integer(next(&mut inner, "integer")?)
    }

    #[test]
    fn integer_bases() {
        assert_eq!(int("0b101"), Ok(5));
        assert_eq!(int("0x1F"), Ok(31));
        assert_eq!(int("42"), Ok(42));
        assert!(int("0x").is_err());
        assert!(int("99999999999999999999999999").is_err());
    }
}
