//! Human readable token and AST listings, used by `--dump-tokens` and `--dump-ast`.

use crate::ast::{Expr, Program, Stmt};
use crate::lexer::{Lexeme, Token};
use console::style;
use std::fmt;

/// Listing of a token stream, one token per row.
pub struct TokenDump<'a>(pub &'a [Lexeme]);

impl fmt::Display for TokenDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", style("== tokens ==").bold())?;
        for (index, lexeme) in self.0.iter().enumerate() {
            let kind = match lexeme.token {
                Token::StringLit(_) => "string",
                Token::Word(_) => "word",
                _ => "symbol",
            };
            writeln!(
                f,
                "{:04} {:>4} {:<6} {}",
                index,
                style(lexeme.line).dim(),
                kind,
                style(&lexeme.token).yellow()
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", style("== program ==").bold())?;
        for (index, stmt) in self.stmts.iter().enumerate() {
            write!(f, "{:04} ", index)?;
            write_stmt(f, stmt, 0)?;
        }
        Ok(())
    }
}

fn indent(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    write!(f, "{:width$}", "", width = depth * 2)
}

fn write_body(f: &mut fmt::Formatter<'_>, label: &str, body: &[Stmt], depth: usize) -> fmt::Result {
    indent(f, depth)?;
    writeln!(f, "{}", style(label).dim())?;
    for stmt in body {
        indent(f, depth + 1)?;
        write_stmt(f, stmt, depth + 1)?;
    }
    Ok(())
}

fn write_stmt(f: &mut fmt::Formatter<'_>, stmt: &Stmt, depth: usize) -> fmt::Result {
    match stmt {
        Stmt::ExprStmt(expr) => write_expr(f, expr, depth),
        Stmt::If {
            condition,
            then_body,
            else_body,
        } => {
            writeln!(f, "{}", style("if").cyan())?;
            indent(f, depth + 1)?;
            write_expr(f, condition, depth + 1)?;
            write_body(f, "then", then_body, depth + 1)?;
            if let Some(else_body) = else_body {
                write_body(f, "else", else_body, depth + 1)?;
            }
            Ok(())
        }
        Stmt::While { condition, body } => {
            writeln!(f, "{}", style("while").cyan())?;
            indent(f, depth + 1)?;
            write_expr(f, condition, depth + 1)?;
            write_body(f, "do", body, depth + 1)
        }
    }
}

fn write_expr(f: &mut fmt::Formatter<'_>, expr: &Expr, depth: usize) -> fmt::Result {
    match expr {
        Expr::NumberLit(val) => writeln!(f, "number {}", style(val).yellow()),
        Expr::StringLit(val) => writeln!(f, "string {}", style(format!("{:?}", val)).yellow()),
        Expr::BoolLit(val) => writeln!(f, "bool {}", style(val).yellow()),
        Expr::Identifier(ident) => writeln!(f, "var {}", style(ident).bold()),
        Expr::Binary { lhs, op, rhs } => {
            writeln!(f, "{} {}", style("binary").cyan(), op)?;
            for operand in [lhs, rhs] {
                indent(f, depth + 1)?;
                write_expr(f, operand, depth + 1)?;
            }
            Ok(())
        }
        Expr::Assign { ident, value } => {
            writeln!(f, "{} {}", style("assign").cyan(), style(ident).bold())?;
            indent(f, depth + 1)?;
            write_expr(f, value, depth + 1)
        }
        Expr::Call { ident, args } => {
            writeln!(
                f,
                "{} {} ({} args)",
                style("call").cyan(),
                style(ident).bold(),
                args.len()
            )?;
            for arg in args {
                indent(f, depth + 1)?;
                write_expr(f, arg, depth + 1)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::Parser;
    use langmaker_spec::{Source, Specification};

    #[test]
    fn test_program_listing() {
        console::set_colors_enabled(false);
        let spec = Specification::default();
        let source = Source::new(
            "A = SOARESNUM 2 * 3\nSOARESWHILE A: SOARESPRINT(A) SOARESDONE",
            &spec,
        );
        let tokens = tokenize(&source, &spec).unwrap();
        let program = Parser::new(&tokens, &spec).parse_program().unwrap();

        assert_eq!(
            program.to_string(),
            "== program ==
0000 assign A
  binary *
    number 2
    number 3
0001 while
  var A
  do
    call SOARESPRINT (1 args)
      var A
"
        );
    }

    #[test]
    fn test_token_listing() {
        console::set_colors_enabled(false);
        let spec = Specification::default();
        let source = Source::new("A = \"B\"", &spec);
        let tokens = tokenize(&source, &spec).unwrap();

        assert_eq!(
            TokenDump(&tokens).to_string(),
            "== tokens ==
0000    1 word   A
0001    1 symbol =
0002    1 string \"B\"
"
        );
    }
}
