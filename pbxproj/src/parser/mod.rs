use nom::{
    branch::alt,
    character::complete::char,
    combinator::{all_consuming, map, opt},
    multi::{fold_many0, separated_list0},
    sequence::{delimited, terminated, tuple},
    IResult,
};

use crate::types::{Dictionary, Value};

pub(crate) mod char;

mod scalar;
use self::scalar::*;

pub(crate) fn document(input: &str) -> IResult<&str, Value> {
    all_consuming(delimited(ws, element, ws))(input)
}

fn element(input: &str) -> IResult<&str, Value> {
    alt((
        map(dictionary, Value::Dictionary),
        map(array, Value::Array),
        map(data, Value::Data),
        map(string, Value::String),
    ))(input)
}

fn dictionary(input: &str) -> IResult<&str, Dictionary> {
    delimited(
        terminated(char('{'), ws),
        fold_many0(
            tuple((
                terminated(string, ws),
                terminated(char('='), ws),
                terminated(element, ws),
                terminated(char(';'), ws),
            )),
            Dictionary::new,
            |mut dict, (key, _, value, _)| {
                dict.insert(key, value);
                dict
            },
        ),
        char('}'),
    )(input)
}

fn array(input: &str) -> IResult<&str, Vec<Value>> {
    delimited(
        terminated(char('('), ws),
        terminated(
            separated_list0(terminated(char(','), ws), terminated(element, ws)),
            opt(terminated(char(','), ws)),
        ),
        char(')'),
    )(input)
}
