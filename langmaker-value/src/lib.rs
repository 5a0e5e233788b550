pub mod object;

use std::fmt;
use std::rc::Rc;

pub use object::Connection;

#[derive(Clone)]
pub enum Value {
    Number(f64),
    Str(String),
    Bool(bool),
    /// A live network connection returned by the accept builtin.
    Connection(Rc<Connection>),
}

impl Value {
    pub fn cast_to_number(&self) -> Option<f64> {
        match self {
            Self::Number(val) => Some(*val),
            _ => None,
        }
    }

    pub fn cast_to_connection(&self) -> Option<&Rc<Connection>> {
        match self {
            Self::Connection(conn) => Some(conn),
            _ => None,
        }
    }

    /// Non-zero numbers, non-empty strings, `true` and connections are truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Number(val) => *val != 0.0,
            Self::Str(string) => !string.is_empty(),
            Self::Bool(val) => *val,
            Self::Connection(_) => true,
        }
    }

    /// Name of the value's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::Bool(_) => "boolean",
            Self::Connection(_) => "connection",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(l), Self::Number(r)) => l == r,
            (Self::Str(l), Self::Str(r)) => l == r,
            (Self::Bool(l), Self::Bool(r)) => l == r,
            // connections are only equal to themselves
            (Self::Connection(l), Self::Connection(r)) => Rc::ptr_eq(l, r),
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(val: f64) -> Self {
        Self::Number(val)
    }
}

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Self::Bool(val)
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Self::Str(val.to_string())
    }
}

impl From<String> for Value {
    fn from(val: String) -> Self {
        Self::Str(val)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(val) => write!(f, "{}", val),
            Value::Str(val) => write!(f, "{}", val),
            Value::Bool(val) => write!(f, "{}", val),
            Value::Connection(conn) => write!(f, "{}", conn),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(val) => write!(f, "{:?}", val),
            _ => fmt::Display::fmt(self, f),
        }
    }
}
