use super::*;

impl<'a> Parser<'a> {
    /// Parses statements until every token has been consumed.
    pub fn parse_program(&mut self) -> Result<Program> {
        let mut stmts = Vec::new();
        while !self.is_at_end() {
            stmts.push(self.parse_stmt()?);
        }
        Ok(Program { stmts })
    }

    /// Parses a statement.
    ///
    /// Detection order matters: an assignment is recognized before any keyword, so
    /// `<prefix>IF = 1` assigns to a variable.
    pub fn parse_stmt(&mut self) -> Result<Stmt> {
        let word = match self.peek() {
            Some(tok) => tok.as_word(),
            None => return Err(self.unexpected("a statement")),
        };

        if let Some(word) = word {
            if self.peek_nth(1) == Some(&Token::Equals) {
                return self.parse_assignment(word);
            }
            if word == self.keywords.if_ {
                return self.parse_if_stmt();
            }
            if word == self.keywords.while_ {
                return self.parse_while_stmt();
            }
            if word == self.keywords.else_ || word == self.spec.block_end {
                return Err(self.unexpected("a statement"));
            }
            if self.spec.is_command(word) {
                return Ok(Stmt::ExprStmt(self.parse_command_expr(word)?));
            }
        }

        Ok(Stmt::ExprStmt(self.parse_expr()?))
    }

    fn parse_assignment(&mut self, ident: &str) -> Result<Stmt> {
        self.next(); // identifier
        self.next(); // `=`
        let value = self.parse_expr()?;
        Ok(Stmt::ExprStmt(Expr::Assign {
            ident: ident.to_string(),
            value: Box::new(value),
        }))
    }

    /// Parses statements up to (not including) one of the `terminators` or the end of input.
    fn parse_block_body(&mut self, terminators: &[&str]) -> Result<Vec<Stmt>> {
        let mut body = Vec::new();
        while let Some(tok) = self.peek() {
            if terminators.iter().any(|terminator| tok.is_word(terminator)) {
                break;
            }
            body.push(self.parse_stmt()?);
        }
        Ok(body)
    }

    fn parse_if_stmt(&mut self) -> Result<Stmt> {
        // Keywords are cloned out so the body parser can borrow `self` mutably.
        let else_ = self.keywords.else_.clone();
        let spec = self.spec;
        let block_end = spec.block_end.as_str();

        self.next(); // IF
        self.enter()?;
        let condition = self.parse_expr()?;
        self.expect(&Token::Colon, "`:` after if condition")?;

        let then_body = self.parse_block_body(&[else_.as_str(), block_end])?;

        let else_body = if self.eat_word(&else_) {
            self.expect(&Token::Colon, format!("`:` after `{}`", else_))?;
            Some(self.parse_block_body(&[block_end])?)
        } else {
            None
        };

        self.expect_word(
            block_end,
            format!("`{}` at the end of if statement", block_end),
        )?;

        self.leave(1);
        Ok(Stmt::If {
            condition,
            then_body,
            else_body,
        })
    }

    fn parse_while_stmt(&mut self) -> Result<Stmt> {
        let spec = self.spec;
        let block_end = spec.block_end.as_str();

        self.next(); // WHILE
        self.enter()?;
        let condition = self.parse_expr()?;
        self.expect(&Token::Colon, "`:` after while condition")?;

        let body = self.parse_block_body(&[block_end])?;

        self.expect_word(
            block_end,
            format!("`{}` at the end of while loop", block_end),
        )?;

        self.leave(1);
        Ok(Stmt::While { condition, body })
    }
}
