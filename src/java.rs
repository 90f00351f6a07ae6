//! Java source front end: tokens → syntax → a resolved [`SourceIndex`].
pub mod ast;
pub mod index;
pub mod javadoc;
pub mod jdk;
pub mod lexer;
pub mod parser;

use thiserror::Error;

pub use index::{ClassEntry, MethodEntry, ParamEntry, SourceIndex};
pub use javadoc::Javadoc;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: u32,
    pub message: String,
}

impl ParseError {
    pub fn new(line: u32, message: impl Into<String>) -> Self {
        Self { line, message: message.into() }
    }
}

/// A [`ParseError`] tagged with the file it came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {error}")]
pub struct SourceError {
    pub path: String,
    #[source]
    pub error: ParseError,
}
