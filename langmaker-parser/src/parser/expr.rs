use super::*;

/// Returns `true` if `word` has identifier syntax (`[A-Za-z_][A-Za-z0-9_]*`).
fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl<'a> Parser<'a> {
    /* Expressions */
    /// Parses any expression.
    /// This is equivalent to calling [`Self::parse_expr_bp`] with `min_bp = 0`.
    pub fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_expr_bp(0) // 0 to accept any expression
    }

    /// Parses a primary (atom) expression.
    fn parse_primary_expr(&mut self) -> Result<Expr> {
        let lexeme = match self.current() {
            Some(lexeme) => lexeme,
            None => return Err(self.unexpected("an expression")),
        };

        match &lexeme.token {
            Token::OpenParen => {
                self.next();
                let expr = self.parse_expr()?;
                self.expect(&Token::CloseParen, "closing parenthesis")?;
                Ok(expr)
            }
            Token::Word(word) if self.spec.is_command(word) => self.parse_command_expr(word),
            Token::Word(word) if *word == self.spec.true_value => {
                self.next();
                Ok(Expr::BoolLit(true))
            }
            Token::Word(word) if *word == self.spec.false_value => {
                self.next();
                Ok(Expr::BoolLit(false))
            }
            Token::StringLit(_) => self.parse_literal_expr(),
            Token::Word(word) if is_identifier(word) => self.parse_identifier_or_call_expr(word),
            _ => self.parse_literal_expr(),
        }
    }

    /// Parses an expression with the specified `min_bp`.
    /// To parse any expression use, [`Self::parse_expr`].
    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr> {
        self.enter()?;
        let mut lhs = self.parse_primary_expr()?;
        let mut levels = 1;

        loop {
            let (op, (l_bp, r_bp)) = match self
                .peek()
                .and_then(|tok| Some((BinOp::from_token(tok)?, tok.binop_bp()?)))
            {
                Some(binop) => binop,
                None => break, // not a valid binop, stop parsing
            };
            if l_bp < min_bp {
                break; // less than the min_bp, stop parsing
            }

            self.next();
            // each operator deepens the left spine of the tree
            self.enter()?;
            levels += 1;

            let rhs = self.parse_expr_bp(r_bp)?;

            lhs = Expr::Binary {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
            }
        }

        self.leave(levels);
        Ok(lhs)
    }

    /* Expressions.Literals */
    /// Parses an untagged literal: a quoted string or a bare numeral.
    fn parse_literal_expr(&mut self) -> Result<Expr> {
        let val = match self.peek() {
            Some(Token::StringLit(text)) => Expr::StringLit(strip_quotes(text).to_string()),
            Some(Token::Word(word)) => match word.parse::<f64>() {
                Ok(val) => Expr::NumberLit(val),
                Err(_) => return Err(self.unexpected("an expression")),
            },
            _ => return Err(self.unexpected("an expression")),
        };
        self.next(); // eat parsed token
        Ok(val)
    }

    /// Parses the literal following a type prefix.
    fn parse_typed_literal(&mut self, prefix: &str, tag: TypeTag) -> Result<Expr> {
        let lexeme = match self.next() {
            Some(lexeme) => lexeme,
            None => {
                return Err(ParseError::UnexpectedEof {
                    expected: format!("a value after `{}`", prefix),
                })
            }
        };
        let text = lexeme.token.to_string();
        let invalid = || ParseError::InvalidLiteral {
            tag,
            text: text.clone(),
            line: lexeme.line,
        };

        match tag {
            // integers have no width limit, they are stored as the nearest f64
            TypeTag::Integer if is_digits(&text) => text
                .parse::<f64>()
                .map(Expr::NumberLit)
                .map_err(|_| invalid()),
            TypeTag::Integer => Err(invalid()),
            TypeTag::Float => text
                .parse::<f64>()
                .map(Expr::NumberLit)
                .map_err(|_| invalid()),
            TypeTag::String => Ok(Expr::StringLit(strip_quotes(&text).to_string())),
        }
    }

    /* Expressions.Command */
    /// Parses a command: either a type-tagged literal or a builtin call.
    pub(super) fn parse_command_expr(&mut self, word: &str) -> Result<Expr> {
        self.next(); // eat command token
        match self.spec.type_tag(word) {
            Some(tag) => self.parse_typed_literal(word, tag),
            None => Ok(Expr::Call {
                ident: word.to_string(),
                args: self.parse_call_args(word)?,
            }),
        }
    }

    /* Expressions.Identifier */
    /// Parses an identifier or a call expression.
    fn parse_identifier_or_call_expr(&mut self, ident: &str) -> Result<Expr> {
        self.next(); // eat identifier
        if self.peek() == Some(&Token::OpenParen) {
            Ok(Expr::Call {
                ident: ident.to_string(),
                args: self.parse_call_args(ident)?,
            })
        } else {
            Ok(Expr::Identifier(ident.to_string()))
        }
    }

    /// Parses an optional parenthesized, comma separated argument list.
    fn parse_call_args(&mut self, ident: &str) -> Result<Vec<Expr>> {
        let mut args = Vec::new();

        if self.eat(&Token::OpenParen) && !self.eat(&Token::CloseParen) {
            loop {
                args.push(self.parse_expr()?);

                if self.eat(&Token::CloseParen) {
                    break;
                } else if !self.eat(&Token::Comma) {
                    return Err(
                        self.unexpected(format!("`,` or closing parenthesis in call to {}", ident))
                    );
                }
            }
        }

        Ok(args)
    }
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Strips every leading and trailing double quote.
fn strip_quotes(text: &str) -> &str {
    text.trim_matches('"')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tests::tokens;
    use insta::assert_debug_snapshot;

    fn try_expr(source: &str, spec: &Specification) -> Result<Expr> {
        let tokens = tokens(source, spec);
        let mut parser = Parser::new(&tokens, spec);
        let ast = parser.parse_expr()?;
        assert!(parser.is_at_end());
        Ok(ast)
    }

    fn expr(source: &str) -> Expr {
        try_expr(source, &Specification::default()).unwrap()
    }

    #[test]
    fn test_literal() {
        assert_eq!(expr("YEEE"), Expr::BoolLit(true));
        assert_eq!(expr("NAWWW"), Expr::BoolLit(false));
        assert_eq!(expr("1"), Expr::NumberLit(1.0));
        assert_eq!(expr("2.5"), Expr::NumberLit(2.5));
        assert_eq!(expr(r#""HELLO, WORLD""#), Expr::StringLit("HELLO, WORLD".to_string()));
    }

    #[test]
    fn test_typed_literal() {
        assert_eq!(expr("SOARESNUM 5"), Expr::NumberLit(5.0));
        assert_eq!(expr("SOARESFLOAT 0.25"), Expr::NumberLit(0.25));
        assert_eq!(expr(r#"SOARESSTRING "hi there""#), Expr::StringLit("HI THERE".to_string()));
        // a string prefix also accepts a bare word
        assert_eq!(expr("SOARESSTRING HI"), Expr::StringLit("HI".to_string()));
    }

    #[test]
    fn test_wide_integer_literal() {
        assert_eq!(expr("SOARESNUM 99999999999999999999"), Expr::NumberLit(1e20));
        assert_eq!(expr("SOARESNUM 007"), Expr::NumberLit(7.0));
    }

    #[test]
    fn test_invalid_typed_literal() {
        let spec = Specification::default();
        assert_eq!(
            try_expr("SOARESNUM 2.5", &spec),
            Err(ParseError::InvalidLiteral {
                tag: TypeTag::Integer,
                text: "2.5".to_string(),
                line: 1
            })
        );
        assert!(matches!(
            try_expr("SOARESFLOAT", &spec),
            Err(ParseError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_binary_expr() {
        assert_debug_snapshot!(expr("1 + 2 * 3"), @r###"
        Binary {
            lhs: NumberLit(
                1.0,
            ),
            op: Add,
            rhs: Binary {
                lhs: NumberLit(
                    2.0,
                ),
                op: Mul,
                rhs: NumberLit(
                    3.0,
                ),
            },
        }
        "###);
        // should be (8 - 4) - 2
        assert_debug_snapshot!(expr("8 - 4 - 2"), @r###"
        Binary {
            lhs: Binary {
                lhs: NumberLit(
                    8.0,
                ),
                op: Sub,
                rhs: NumberLit(
                    4.0,
                ),
            },
            op: Sub,
            rhs: NumberLit(
                2.0,
            ),
        }
        "###);
    }

    #[test]
    fn test_parenthesized_expr() {
        assert_debug_snapshot!(expr("(2 + 3) * 4"), @r###"
        Binary {
            lhs: Binary {
                lhs: NumberLit(
                    2.0,
                ),
                op: Add,
                rhs: NumberLit(
                    3.0,
                ),
            },
            op: Mul,
            rhs: NumberLit(
                4.0,
            ),
        }
        "###);
    }

    #[test]
    fn test_missing_close_paren() {
        let spec = Specification::default();
        assert_eq!(
            try_expr("(1 + 2", &spec),
            Err(ParseError::UnexpectedEof {
                expected: "closing parenthesis".to_string()
            })
        );
    }

    #[test]
    fn test_nesting_limit() {
        let spec = Specification::default();
        let parens = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
        assert_eq!(
            try_expr(&parens, &spec),
            Err(ParseError::TooDeep {
                limit: MAX_DEPTH,
                line: 1
            })
        );
        // a flat chain still builds a tree as deep as it is long
        let sum = format!("1{}", " + 1".repeat(200_000));
        assert!(matches!(
            try_expr(&sum, &spec),
            Err(ParseError::TooDeep { .. })
        ));

        let parens = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(expr(&parens), Expr::NumberLit(1.0));
        let sum = format!("1{}", " * 1".repeat(100));
        assert!(try_expr(&sum, &spec).is_ok());
    }

    #[test]
    fn test_identifier() {
        assert_eq!(expr("FOO_2"), Expr::Identifier("FOO_2".to_string()));
    }

    #[test]
    fn test_fn_call() {
        assert_debug_snapshot!(expr("FOO()"), @r###"
        Call {
            ident: "FOO",
            args: [],
        }
        "###);
        assert_debug_snapshot!(expr("SOARESSHOUT(SOARESSTRING \"a\", BAR)"), @r###"
        Call {
            ident: "SOARESSHOUT",
            args: [
                StringLit(
                    "A",
                ),
                Identifier(
                    "BAR",
                ),
            ],
        }
        "###);
    }

    #[test]
    fn test_command_without_args() {
        assert_eq!(
            expr("SOARESPING"),
            Expr::Call {
                ident: "SOARESPING".to_string(),
                args: vec![]
            }
        );
    }

    #[test]
    fn test_call_args_need_commas() {
        let spec = Specification::default();
        assert!(matches!(
            try_expr("SOARESPRINT(1 2)", &spec),
            Err(ParseError::UnexpectedToken { line: 1, .. })
        ));
    }

    #[test]
    fn test_garbage_numeral() {
        let spec = Specification::default();
        assert_eq!(
            try_expr("12AB", &spec),
            Err(ParseError::UnexpectedToken {
                expected: "an expression".to_string(),
                found: "12AB".to_string(),
                line: 1
            })
        );
        assert!(try_expr(")", &spec).is_err());
    }
}
