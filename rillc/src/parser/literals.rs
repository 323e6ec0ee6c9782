//!
//! Number Literal Classification
//!
//! The tokenizer only finds where a number ends; this module decides what
//! it is. Accepted forms:
//!
//! - decimal ints: `42`, `1_000`
//! - prefixed ints: `0x1F`, `0o17`, `0b1010` (prefix case-insensitive)
//! - floats: `3.14`, `2e10`, `6.02e-23`, `1_000.5`
//!
//! `_` may separate digits anywhere after the first one. Ints must fit in
//! an i64; anything else is rejected and reported by the caller.
//!

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while1},
    character::complete::{char, one_of},
    combinator::{all_consuming, map, opt, recognize},
    sequence::{pair, preceded, tuple},
    IResult,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

fn digits(radix: u32) -> impl FnMut(&str) -> IResult<&str, &str> {
    move |input| take_while1(move |c: char| c.is_digit(radix) || c == '_')(input)
}

fn radix_int(input: &str) -> IResult<&str, (u32, &str)> {
    alt((
        map(preceded(tag_no_case("0x"), digits(16)), |d| (16, d)),
        map(preceded(tag_no_case("0o"), digits(8)), |d| (8, d)),
        map(preceded(tag_no_case("0b"), digits(2)), |d| (2, d)),
    ))(input)
}

fn exponent(input: &str) -> IResult<&str, &str> {
    recognize(tuple((one_of("eE"), opt(one_of("+-")), digits(10))))(input)
}

fn decimal_float(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(tuple((digits(10), char('.'), digits(10), opt(exponent)))),
        recognize(pair(digits(10), exponent)),
    ))(input)
}

fn int_from(body: &str, radix: u32) -> Option<i64> {
    let cleaned: String = body.chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() {
        return None;
    }
    i64::from_str_radix(&cleaned, radix).ok()
}

pub fn parse_number(text: &str) -> Option<Number> {
    if let Ok((_, (radix, body))) = all_consuming(radix_int)(text) {
        return int_from(body, radix).map(Number::Int);
    }
    if let Ok((_, body)) = all_consuming(decimal_float)(text) {
        let cleaned: String = body.chars().filter(|c| *c != '_').collect();
        return cleaned.parse::<f64>().ok().map(Number::Float);
    }
    if let Ok((_, body)) = all_consuming(digits(10))(text) {
        return int_from(body, 10).map(Number::Int);
    }
    None
}
