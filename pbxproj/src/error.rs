use nom::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("parse error of kind {kind:?} on line {line}")]
    ParseError { line: usize, kind: ErrorKind },
}
