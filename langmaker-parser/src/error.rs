//! Lexing and parsing errors.

use langmaker_spec::TypeTag;

/// Errors raised while splitting a source into tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum LexError {
    #[error("syntax error on line {line}: comments must be in all caps")]
    #[diagnostic(code(langmaker::lex::lowercase_comment))]
    LowercaseComment { line: usize },

    #[error("syntax error on line {line}: unterminated string literal")]
    #[diagnostic(
        code(langmaker::lex::unterminated_string),
        help("string literals must be closed on the line they start")
    )]
    UnterminatedString { line: usize },
}

/// Structural grammar violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum ParseError {
    #[error("syntax error on line {line}: expected {expected}, found `{found}`")]
    #[diagnostic(code(langmaker::parse::unexpected_token))]
    UnexpectedToken {
        expected: String,
        found: String,
        line: usize,
    },

    #[error("syntax error: unexpected end of input, expected {expected}")]
    #[diagnostic(code(langmaker::parse::unexpected_eof))]
    UnexpectedEof { expected: String },

    #[error("syntax error on line {line}: `{text}` is not a valid {tag} literal")]
    #[diagnostic(code(langmaker::parse::invalid_literal))]
    InvalidLiteral {
        tag: TypeTag,
        text: String,
        line: usize,
    },

    #[error("syntax error on line {line}: nesting deeper than {limit} levels")]
    #[diagnostic(
        code(langmaker::parse::too_deep),
        help("split the expression using intermediate variables")
    )]
    TooDeep { limit: usize, line: usize },
}

