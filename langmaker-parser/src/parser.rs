use crate::ast::{BinOp, Expr, Program, Stmt};
use crate::error::ParseError;
use crate::lexer::{Lexeme, Token};
use langmaker_spec::{Specification, TypeTag};

mod expr;
mod stmt;

pub type Result<T> = std::result::Result<T, ParseError>;

/// Deepest nesting of parentheses, operators, calls and blocks the parser accepts.
/// Bounds the recursion of every pass that walks the tree.
pub const MAX_DEPTH: usize = 256;

/// Keyword spellings derived from the command prefix.
struct Keywords {
    if_: String,
    else_: String,
    while_: String,
}

/// Recursive descent parser over an already tokenized program.
///
/// Every production commits after looking at the current token (assignment detection peeks one
/// further). Tokens are never revisited once the cursor has moved past them.
pub struct Parser<'a> {
    tokens: &'a [Lexeme],
    /// Index of the current token.
    cursor: usize,
    spec: &'a Specification,
    keywords: Keywords,
    /// Current nesting, see [`MAX_DEPTH`].
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Lexeme], spec: &'a Specification) -> Self {
        Self {
            tokens,
            cursor: 0,
            spec,
            keywords: Keywords {
                if_: spec.keyword("IF"),
                else_: spec.keyword("ELSE"),
                while_: spec.keyword("WHILE"),
            },
            depth: 0,
        }
    }

    /// Returns `true` once every token has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.cursor >= self.tokens.len()
    }
}

/// Parse utilities
impl<'a> Parser<'a> {
    fn current(&self) -> Option<&'a Lexeme> {
        self.tokens.get(self.cursor)
    }

    fn peek(&self) -> Option<&'a Token> {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> Option<&'a Token> {
        self.tokens.get(self.cursor + n).map(|lexeme| &lexeme.token)
    }

    fn next(&mut self) -> Option<&'a Lexeme> {
        let lexeme = self.current();
        if lexeme.is_some() {
            self.cursor += 1;
        }
        lexeme
    }

    /// Predicate that tests whether the current token equals `tok` and eats it if yes as a side effect.
    fn eat(&mut self, tok: &Token) -> bool {
        if self.peek() == Some(tok) {
            self.next(); // eat token
            true
        } else {
            false
        }
    }

    /// Like [`Self::eat`] but for a bareword spelling.
    fn eat_word(&mut self, word: &str) -> bool {
        if self.peek().map_or(false, |tok| tok.is_word(word)) {
            self.next();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: &Token, expected: impl Into<String>) -> Result<()> {
        if self.eat(tok) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_word(&mut self, word: &str, expected: impl Into<String>) -> Result<()> {
        if self.eat_word(word) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Goes one nesting level deeper. Callers release their levels with [`Self::leave`].
    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            let line = self
                .tokens
                .get(self.cursor.saturating_sub(1))
                .map_or(0, |lexeme| lexeme.line);
            return Err(ParseError::TooDeep {
                limit: MAX_DEPTH,
                line,
            });
        }
        Ok(())
    }

    fn leave(&mut self, levels: usize) {
        self.depth -= levels;
    }

    /// Builds an error describing the current token (or the end of input).
    fn unexpected(&self, expected: impl Into<String>) -> ParseError {
        let expected = expected.into();
        match self.current() {
            Some(lexeme) => ParseError::UnexpectedToken {
                expected,
                found: lexeme.token.to_string(),
                line: lexeme.line,
            },
            None => ParseError::UnexpectedEof { expected },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use langmaker_spec::Source;

    pub(super) fn tokens(source: &str, spec: &Specification) -> Vec<Lexeme> {
        let source = Source::new(source, spec);
        tokenize(&source, spec).unwrap()
    }

    #[test]
    fn test_cursor() {
        let spec = Specification::default();
        let tokens = tokens("A = B", &spec);
        let mut parser = Parser::new(&tokens, &spec);
        assert_eq!(parser.peek_nth(1), Some(&Token::Equals));
        assert!(parser.eat_word("A"));
        assert!(!parser.eat(&Token::Colon));
        assert!(parser.eat(&Token::Equals));
        assert_eq!(parser.next().map(|l| l.line), Some(1));
        assert!(parser.is_at_end());
        assert_eq!(parser.next(), None);
        assert_eq!(
            parser.unexpected("`:`"),
            ParseError::UnexpectedEof {
                expected: "`:`".to_string()
            }
        );
    }
}
