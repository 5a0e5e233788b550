use crate::socket::SocketTable;
use crate::{Result, RuntimeError};
use langmaker_parser::ast::{BinOp, Expr, Program, Stmt};
use langmaker_spec::Specification;
use langmaker_value::Value;
use std::collections::HashMap;
use std::io::{self, Write};

/// Tree-walking interpreter.
///
/// Holds the variables and sockets of one run. Several programs may be run one after the other;
/// state carries over between them.
pub struct Interpreter<'a, W: Write> {
    spec: &'a Specification,
    /// Variables, by name. Never shrinks.
    env: HashMap<String, Value>,
    sockets: SocketTable,
    /// Where `PRINT` writes to.
    out: W,
}

impl<'a> Interpreter<'a, io::Stdout> {
    /// Creates an interpreter printing to standard output.
    pub fn with_stdout(spec: &'a Specification) -> Self {
        Self::new(spec, io::stdout())
    }
}

impl<'a, W: Write> Interpreter<'a, W> {
    pub fn new(spec: &'a Specification, out: W) -> Self {
        Self {
            spec,
            env: HashMap::new(),
            sockets: SocketTable::new(),
            out,
        }
    }

    pub fn spec(&self) -> &'a Specification {
        self.spec
    }

    /// Returns the last value assigned to `name`.
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.env.get(name)
    }

    pub fn sockets(&self) -> &SocketTable {
        &self.sockets
    }

    pub(crate) fn sockets_mut(&mut self) -> &mut SocketTable {
        &mut self.sockets
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Text form of a value. Booleans use the language's own spellings.
    pub fn render(&self, value: &Value) -> String {
        match value {
            Value::Bool(val) => self.spec.bool_spelling(*val).to_string(),
            _ => value.to_string(),
        }
    }

    pub(crate) fn print_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.out, "{}", line)
            .and_then(|_| self.out.flush())
            .map_err(RuntimeError::Output)
    }

    /// Runs every top level statement of `program` in order.
    pub fn run(&mut self, program: &Program) -> Result<()> {
        tracing::debug!(statements = program.stmts.len(), "running program");
        for stmt in &program.stmts {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    pub fn exec_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::ExprStmt(expr) => {
                self.eval_expr(expr)?; // throw away result
            }
            Stmt::If {
                condition,
                then_body,
                else_body,
            } => {
                if self.eval_expr(condition)?.is_truthy() {
                    self.exec_block(then_body)?;
                } else if let Some(else_body) = else_body {
                    self.exec_block(else_body)?;
                }
            }
            Stmt::While { condition, body } => {
                while self.eval_expr(condition)?.is_truthy() {
                    self.exec_block(body)?;
                }
            }
        }
        Ok(())
    }

    fn exec_block(&mut self, body: &[Stmt]) -> Result<()> {
        for stmt in body {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    pub fn eval_expr(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::NumberLit(val) => Ok(Value::Number(*val)),
            Expr::StringLit(val) => Ok(Value::Str(val.clone())),
            Expr::BoolLit(val) => Ok(Value::Bool(*val)),
            Expr::Identifier(ident) => self
                .env
                .get(ident)
                .cloned()
                .ok_or_else(|| RuntimeError::UndefinedVariable(ident.clone())),
            Expr::Binary { lhs, op, rhs } => {
                let lhs = self.eval_expr(lhs)?;
                let rhs = self.eval_expr(rhs)?;
                binary(*op, lhs, rhs)
            }
            Expr::Assign { ident, value } => {
                let value = self.eval_expr(value)?;
                tracing::trace!(variable = %ident, ?value, "assign");
                self.env.insert(ident.clone(), value.clone());
                Ok(value)
            }
            Expr::Call { ident, args } => self.call(ident, args),
        }
    }
}

fn binary(op: BinOp, lhs: Value, rhs: Value) -> Result<Value> {
    match (&lhs, &rhs) {
        (Value::Number(a), Value::Number(b)) => {
            let (a, b) = (*a, *b);
            Ok(Value::Number(match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                BinOp::Div if b == 0.0 => return Err(RuntimeError::DivisionByZero),
                BinOp::Div => a / b,
            }))
        }
        // handle string concatenation
        (Value::Str(a), Value::Str(b)) if op == BinOp::Add => Ok(Value::Str(format!("{}{}", a, b))),
        _ => Err(RuntimeError::InvalidOperands {
            op,
            lhs: lhs.type_name(),
            rhs: rhs.type_name(),
        }),
    }
}
