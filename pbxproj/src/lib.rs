//! Reader and writer for the OpenStep ASCII property list dialect used by
//! Xcode's `project.pbxproj` files.

use nom::Finish;

mod error;
mod parser;
mod types;
mod writer;

pub use error::Error;
pub use types::*;
pub use writer::{to_string, write};

/// Parses a full property list document.
pub fn parse(input: &str) -> Result<Value, Error> {
    Ok(Finish::finish(parser::document(input))
        .map_err(|e| Error::ParseError {
            line: line_of(input, e.input),
            kind: e.code,
        })?
        .1)
}

fn line_of(input: &str, rest: &str) -> usize {
    let offset = input.len().saturating_sub(rest.len());
    input[..offset].matches('\n').count() + 1
}
