/*!
# Language Module

This module provides lexical analysis and parsing of PixelWalle source text.

*/

#[macro_use]
mod error;
mod lex;
mod parse;
mod token;

pub use error::Error;
pub use error::ErrorKind;
pub use lex::lex;
pub use parse::parse;
pub use token::{Operator, Token, TokenKind, Word};

pub mod ast;

/// Source position, 1-based line and column.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Pos {
    pub line: u32,
    pub column: u32,
}

impl Pos {
    pub fn new(line: u32, column: u32) -> Pos {
        Pos { line, column }
    }
}

impl From<(u32, u32)> for Pos {
    fn from((line, column): (u32, u32)) -> Pos {
        Pos { line, column }
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
