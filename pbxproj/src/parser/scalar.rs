use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_until, take_while1, take_while_m_n},
    character::complete::{char, multispace1, not_line_ending, one_of},
    combinator::{map, map_opt, map_res, recognize, value},
    multi::{fold_many0, many0},
    sequence::{delimited, preceded},
    IResult,
};

use super::char::*;

fn block_comment(input: &str) -> IResult<&str, &str> {
    delimited(tag("/*"), take_until("*/"), tag("*/"))(input)
}

fn line_comment(input: &str) -> IResult<&str, &str> {
    preceded(tag("//"), not_line_ending)(input)
}

/// Skips any run of whitespace and comments.
pub(super) fn ws(input: &str) -> IResult<&str, ()> {
    value((), many0(alt((multispace1, block_comment, line_comment))))(input)
}

#[derive(Debug, Clone)]
enum Fragment<'a> {
    Literal(&'a str),
    Escaped(char),
}

fn unicode_escape(input: &str) -> IResult<&str, char> {
    map_opt(
        preceded(one_of("Uu"), take_while_m_n(4, 4, is_hex_digit)),
        |hex: &str| u32::from_str_radix(hex, 16).ok().and_then(std::char::from_u32),
    )(input)
}

fn octal_escape(input: &str) -> IResult<&str, char> {
    map_opt(take_while_m_n(1, 3, is_octal_digit), |oct: &str| {
        u32::from_str_radix(oct, 8).ok().and_then(std::char::from_u32)
    })(input)
}

fn escape(input: &str) -> IResult<&str, char> {
    preceded(
        char('\\'),
        alt((
            unicode_escape,
            octal_escape,
            value('\n', char('n')),
            value('\t', char('t')),
            value('\r', char('r')),
            value('\u{07}', char('a')),
            value('\u{08}', char('b')),
            value('\u{0c}', char('f')),
            value('\u{0b}', char('v')),
            one_of("\"'\\\n"),
        )),
    )(input)
}

pub(super) fn quoted_string(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        fold_many0(
            alt((
                map(is_not("\"\\"), Fragment::Literal),
                map(escape, Fragment::Escaped),
            )),
            String::new,
            |mut s, fragment| {
                match fragment {
                    Fragment::Literal(literal) => s.push_str(literal),
                    Fragment::Escaped(c) => s.push(c),
                }
                s
            },
        ),
        char('"'),
    )(input)
}

pub(super) fn unquoted_string(input: &str) -> IResult<&str, String> {
    map(take_while1(is_unquoted_char), String::from)(input)
}

pub(super) fn string(input: &str) -> IResult<&str, String> {
    alt((quoted_string, unquoted_string))(input)
}

pub(super) fn data(input: &str) -> IResult<&str, Vec<u8>> {
    map_res(
        delimited(
            char('<'),
            recognize(many0(alt((take_while1(is_hex_digit), multispace1)))),
            char('>'),
        ),
        |raw: &str| {
            let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
            hex::decode(digits)
        },
    )(input)
}
