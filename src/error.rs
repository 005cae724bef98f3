//! Top-level error type unifying the core's error taxonomy (spec.md §7) for
//! callers that cross the CLI boundary, grounded on the reference
//! implementation's `core::spec::{GenError, ParseError}` aggregating-enum
//! pattern: one variant per source error type, `Display` delegating to the
//! wrapped error, and `From` impls so `?` composes across module
//! boundaries.

use std::{error, fmt};

use crate::core::{input, lex, parse, variable};

#[derive(Debug)]
pub enum Error {
    Lex(lex::Error),
    Parse(parse::Error),
    Input(input::Error),
    Declaration(variable::DeclError),
    Domain(variable::DomainError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Lex(err) => write!(f, "lex error: {}", err),
            Error::Parse(err) => write!(f, "parse error: {}", err),
            Error::Input(err) => write!(f, "input error: {}", err),
            Error::Declaration(err) => write!(f, "declaration error: {}", err),
            Error::Domain(err) => write!(f, "domain error: {}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Lex(err) => Some(err),
            Error::Parse(err) => Some(err),
            Error::Input(err) => Some(err),
            Error::Declaration(err) => Some(err),
            Error::Domain(err) => Some(err),
        }
    }
}

impl From<lex::Error> for Error {
    fn from(err: lex::Error) -> Self {
        Error::Lex(err)
    }
}

impl From<parse::Error> for Error {
    fn from(err: parse::Error) -> Self {
        Error::Parse(err)
    }
}

impl From<input::Error> for Error {
    fn from(err: input::Error) -> Self {
        Error::Input(err)
    }
}

impl From<variable::DeclError> for Error {
    fn from(err: variable::DeclError) -> Self {
        Error::Declaration(err)
    }
}

impl From<variable::DomainError> for Error {
    fn from(err: variable::DomainError) -> Self {
        Error::Domain(err)
    }
}
