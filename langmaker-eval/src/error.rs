use crate::socket::SocketError;
use langmaker_parser::ast::BinOp;
use std::io;

/// Errors raised while evaluating a program. All of them abort the run.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum RuntimeError {
    #[error("variable '{0}' is not defined")]
    #[diagnostic(code(langmaker::runtime::undefined_variable))]
    UndefinedVariable(String),

    #[error("unknown function: {0}")]
    #[diagnostic(code(langmaker::runtime::unknown_function))]
    UnknownFunction(String),

    #[error("{name} expects {expected} argument(s), received {received}")]
    #[diagnostic(code(langmaker::runtime::arity))]
    ArityMismatch {
        name: String,
        expected: usize,
        received: usize,
    },

    #[error("{name}: expected {expected}, found {found}")]
    #[diagnostic(code(langmaker::runtime::invalid_argument))]
    InvalidArgument {
        name: String,
        expected: &'static str,
        found: String,
    },

    #[error("division by zero")]
    #[diagnostic(code(langmaker::runtime::division_by_zero))]
    DivisionByZero,

    #[error("unsupported operand types for {op}: {lhs} and {rhs}")]
    #[diagnostic(code(langmaker::runtime::operand_types))]
    InvalidOperands {
        op: BinOp,
        lhs: &'static str,
        rhs: &'static str,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Socket(#[from] SocketError),

    #[error("failed to write program output: {0}")]
    #[diagnostic(code(langmaker::runtime::output))]
    Output(#[source] io::Error),
}
