use crate::error::LexError;
use langmaker_spec::{Source, Specification};
use logos::Logos;
use std::fmt;

#[derive(Debug, Logos, Clone, PartialEq)]
#[logos(skip r"\s+")]
pub enum Token {
    // literals
    /// A double-quoted string. The quotes are kept until the parser strips them.
    #[regex(r#""[^"]*""#, |lex| lex.slice().to_string())]
    StringLit(String),
    /// Identifier, numeral, keyword or command name. Classified by the parser.
    #[regex(r#"[^\s+\-*/()=:,"]+"#, |lex| lex.slice().to_string())]
    Word(String),

    // binary operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Asterisk,
    #[token("/")]
    Slash,
    // - assignment
    #[token("=")]
    Equals,

    // punctuation
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,

    /// A quote that is still open at the end of the line.
    /// Never returned from [`tokenize`], which reports it as a [`LexError`].
    #[regex(r#""[^"]*"#)]
    UnterminatedStringLit,
}

impl Token {
    /// Returns the binary binding power or `None` if invalid binop token.
    /// Binding power `0` is reserved for accepting any expression.
    pub fn binop_bp(&self) -> Option<(u8, u8)> {
        match self {
            /* Additive */
            Token::Plus | Token::Minus => Some((1, 2)),
            /* Multiplicative */
            Token::Asterisk | Token::Slash => Some((3, 4)),
            _ => None,
        }
    }

    /// Returns the bareword text if this token is a bareword.
    pub fn as_word(&self) -> Option<&str> {
        match self {
            Token::Word(word) => Some(word),
            _ => None,
        }
    }

    /// Returns `true` if this token is the bareword `word`.
    pub fn is_word(&self, word: &str) -> bool {
        self.as_word() == Some(word)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::StringLit(text) | Token::Word(text) => write!(f, "{}", text),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Asterisk => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Equals => write!(f, "="),
            Token::OpenParen => write!(f, "("),
            Token::CloseParen => write!(f, ")"),
            Token::Colon => write!(f, ":"),
            Token::Comma => write!(f, ","),
            Token::UnterminatedStringLit => write!(f, "\""),
        }
    }
}

/// A [`Token`] along with the line it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    /// 1-based source line.
    pub line: usize,
}

/// Converts source code into one flat sequence of tokens.
///
/// Lines are processed one at a time: everything from the first occurrence of the comment prefix
/// is dropped (after checking its case if the specification asks for it), then the remainder is
/// scanned. There is no token marking the end of a line.
pub fn tokenize(source: &Source, spec: &Specification) -> Result<Vec<Lexeme>, LexError> {
    let mut lexemes = Vec::new();

    for (line_number, line) in source.lines() {
        let line = match line.find(spec.comment_prefix.as_str()) {
            Some(comment_start) => {
                let comment = &line[comment_start..];
                if spec.enforce_uppercase_comments && comment.chars().any(char::is_lowercase) {
                    return Err(LexError::LowercaseComment { line: line_number });
                }
                &line[..comment_start]
            }
            None => line,
        };
        if line.trim().is_empty() {
            continue;
        }

        let mut lexer = Token::lexer(line);
        while let Some(token) = lexer.next() {
            // `Word` matches whatever the other patterns leave, so logos never fails here
            let token = token.unwrap_or_else(|()| Token::Word(lexer.slice().to_string()));
            if token == Token::UnterminatedStringLit {
                return Err(LexError::UnterminatedString { line: line_number });
            }
            lexemes.push(Lexeme {
                token,
                line: line_number,
            });
        }
    }

    tracing::trace!(count = lexemes.len(), "tokenized source");
    Ok(lexemes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_with(source: &str, spec: &Specification) -> Result<Vec<Token>, LexError> {
        let source = Source::new(source, spec);
        tokenize(&source, spec).map(|lexemes| lexemes.into_iter().map(|l| l.token).collect())
    }

    fn lex(source: &str) -> Vec<Token> {
        lex_with(source, &Specification::default()).unwrap()
    }

    fn word(text: &str) -> Token {
        Token::Word(text.to_string())
    }

    #[test]
    fn test_symbols_split_words() {
        assert_eq!(
            lex("A=B+C*(D-E)/F:G,H"),
            vec![
                word("A"),
                Token::Equals,
                word("B"),
                Token::Plus,
                word("C"),
                Token::Asterisk,
                Token::OpenParen,
                word("D"),
                Token::Minus,
                word("E"),
                Token::CloseParen,
                Token::Slash,
                word("F"),
                Token::Colon,
                word("G"),
                Token::Comma,
                word("H"),
            ]
        );
    }

    #[test]
    fn test_string_keeps_quotes_and_contents() {
        assert_eq!(
            lex(r#"SOARESPRINT("A + B, (C)")"#),
            vec![
                word("SOARESPRINT"),
                Token::OpenParen,
                Token::StringLit(r#""A + B, (C)""#.to_string()),
                Token::CloseParen,
            ]
        );
    }

    #[test]
    fn test_quote_flushes_pending_word() {
        assert_eq!(
            lex(r#"AB"CD"EF"#),
            vec![
                word("AB"),
                Token::StringLit(r#""CD""#.to_string()),
                word("EF"),
            ]
        );
    }

    #[test]
    fn test_lines_concatenate() {
        let source = "A = SOARESNUM 1\n\n   \nB = A";
        let spec = Specification::default();
        let source = Source::new(source, &spec);
        let lexemes = tokenize(&source, &spec).unwrap();
        let lines: Vec<_> = lexemes.iter().map(|l| l.line).collect();
        assert_eq!(lines, vec![1, 1, 1, 1, 4, 4, 4]);
    }

    #[test]
    fn test_comment_is_stripped() {
        assert_eq!(
            lex("A = SOARESNUM 1 SOARESAY SET A\nSOARESAY WHOLE LINE"),
            vec![word("A"), Token::Equals, word("SOARESNUM"), word("1")]
        );
    }

    #[test]
    fn test_lowercase_comment() {
        let spec = Specification {
            enforce_uppercase_code: false,
            ..Default::default()
        };
        assert_eq!(
            lex_with("A = 1\nB = 2 SOARESAY set b", &spec),
            Err(LexError::LowercaseComment { line: 2 })
        );

        let relaxed = Specification {
            enforce_uppercase_comments: false,
            ..spec
        };
        assert_eq!(
            lex_with("B = 2 SOARESAY set b", &relaxed).unwrap(),
            vec![word("B"), Token::Equals, word("2")]
        );
    }

    #[test]
    fn test_uppercase_code_hides_lowercase_comment() {
        // the whole source is upper-cased before the comment check runs
        assert_eq!(lex("b = 2 soaresay set b"), vec![word("B"), Token::Equals, word("2")]);
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(
            lex_with("A = 1\nSOARESPRINT(\"OOPS)", &Specification::default()),
            Err(LexError::UnterminatedString { line: 2 })
        );
    }

    #[test]
    fn test_binop_bp() {
        assert!(Token::Asterisk.binop_bp() > Token::Plus.binop_bp());
        assert_eq!(Token::Equals.binop_bp(), None);
    }
}
