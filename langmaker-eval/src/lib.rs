//! Tree-walking evaluator for parsed programs.

pub mod builtins;
pub mod error;
pub mod interpreter;
pub mod socket;

pub use error::RuntimeError;
pub use interpreter::Interpreter;

pub type Result<T> = std::result::Result<T, RuntimeError>;
