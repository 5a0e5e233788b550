//! Lexer, AST and parser of a specification-driven language.

pub mod ast;
pub mod dump;
pub mod error;
pub mod lexer;
pub mod parser;

pub use error::{LexError, ParseError};

use ast::Program;
use langmaker_spec::Specification;
use lexer::Lexeme;
use parser::Parser;

/// Parses a whole token stream into a [`Program`].
pub fn parse(tokens: &[Lexeme], spec: &Specification) -> Result<Program, ParseError> {
    Parser::new(tokens, spec).parse_program()
}
