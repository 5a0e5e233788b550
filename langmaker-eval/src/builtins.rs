use crate::interpreter::Interpreter;
use crate::socket::SocketError;
use crate::{Result, RuntimeError};
use langmaker_parser::ast::Expr;
use langmaker_spec::Specification;
use langmaker_value::Value;
use std::io::Write;
use std::rc::Rc;

/// Functions every generated language provides. Their spellings are the command prefix followed
/// by [`Builtin::name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Print,
    Shout,
    Socket,
    Bind,
    Listen,
    Accept,
    Send,
}

impl Builtin {
    pub const ALL: [Builtin; 7] = [
        Builtin::Print,
        Builtin::Shout,
        Builtin::Socket,
        Builtin::Bind,
        Builtin::Listen,
        Builtin::Accept,
        Builtin::Send,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Print => "PRINT",
            Builtin::Shout => "SHOUT",
            Builtin::Socket => "SOCKET",
            Builtin::Bind => "BIND",
            Builtin::Listen => "LISTEN",
            Builtin::Accept => "ACCEPT",
            Builtin::Send => "SEND",
        }
    }

    /// Number of arguments the builtin accepts, or `None` if variadic.
    pub fn arity(self) -> Option<usize> {
        match self {
            Builtin::Print => None,
            Builtin::Shout | Builtin::Socket | Builtin::Accept => Some(1),
            Builtin::Bind | Builtin::Listen | Builtin::Send => Some(2),
        }
    }

    /// Finds the builtin spelled `ident` under `spec`. Matching is exact.
    pub fn resolve(ident: &str, spec: &Specification) -> Option<Self> {
        let name = ident.strip_prefix(spec.command_prefix.as_str())?;
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }
}

impl<'a, W: Write> Interpreter<'a, W> {
    /// Evaluates the arguments left to right and runs the builtin named `ident`.
    pub(crate) fn call(&mut self, ident: &str, args: &[Expr]) -> Result<Value> {
        let builtin = Builtin::resolve(ident, self.spec())
            .ok_or_else(|| RuntimeError::UnknownFunction(ident.to_string()))?;

        if let Some(expected) = builtin.arity() {
            if args.len() != expected {
                return Err(RuntimeError::ArityMismatch {
                    name: ident.to_string(),
                    expected,
                    received: args.len(),
                });
            }
        }

        let args = args
            .iter()
            .map(|arg| self.eval_expr(arg))
            .collect::<Result<Vec<_>>>()?;
        tracing::trace!(?builtin, args = args.len(), "calling builtin");

        match (builtin, args.as_slice()) {
            (Builtin::Print, args) => {
                let line = args
                    .iter()
                    .map(|arg| self.render(arg))
                    .collect::<Vec<_>>()
                    .join(" ");
                self.print_line(&line)?;
                Ok(Value::Bool(true))
            }
            (Builtin::Shout, [arg]) => Ok(Value::Str(self.render(arg).to_uppercase())),
            (Builtin::Socket, [name]) => {
                let name = self.render(name);
                self.sockets_mut().create(&name)?;
                Ok(Value::Str(name))
            }
            (Builtin::Bind, [name, port]) => {
                let name = self.render(name);
                let port = self.integer_arg(ident, port, "a port number", u16::MAX.into())?;
                self.sockets_mut().bind(&name, port as u16)?;
                Ok(Value::Str(name))
            }
            (Builtin::Listen, [name, backlog]) => {
                let name = self.render(name);
                let backlog = self.integer_arg(ident, backlog, "a backlog size", i32::MAX as u64)?;
                self.sockets_mut().listen(&name, backlog as i32)?;
                Ok(Value::Str(name))
            }
            (Builtin::Accept, [name]) => {
                let name = self.render(name);
                let conn = self.sockets().accept(&name)?;
                Ok(Value::Connection(Rc::new(conn)))
            }
            (Builtin::Send, [conn, data]) => {
                let conn = conn
                    .cast_to_connection()
                    .ok_or_else(|| RuntimeError::InvalidArgument {
                        name: ident.to_string(),
                        expected: "a connection",
                        found: conn.type_name().to_string(),
                    })?;
                let data = self.render(data);
                let sent = conn
                    .send(data.as_bytes())
                    .map_err(|source| SocketError::Io {
                        name: conn.peer().to_string(),
                        operation: "send on",
                        source,
                    })?;
                tracing::debug!(peer = %conn.peer(), bytes = sent, "sent data");
                Ok(Value::Number(sent as f64))
            }
            (_, args) => Err(RuntimeError::ArityMismatch {
                name: ident.to_string(),
                expected: builtin.arity().unwrap_or_default(),
                received: args.len(),
            }),
        }
    }

    /// Converts a numeric argument to a whole number in `0..=max`.
    fn integer_arg(&self, ident: &str, arg: &Value, expected: &'static str, max: u64) -> Result<u64> {
        match arg.cast_to_number() {
            Some(val) if val.fract() == 0.0 && val >= 0.0 && val <= max as f64 => Ok(val as u64),
            _ => Err(RuntimeError::InvalidArgument {
                name: ident.to_string(),
                expected,
                found: self.render(arg),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve() {
        let spec = Specification::default();
        assert_eq!(Builtin::resolve("SOARESPRINT", &spec), Some(Builtin::Print));
        assert_eq!(Builtin::resolve("SOARESSEND", &spec), Some(Builtin::Send));
        assert_eq!(Builtin::resolve("PRINT", &spec), None);
        assert_eq!(Builtin::resolve("SOARESPRINTLN", &spec), None);
        assert_eq!(Builtin::resolve("SOARESprint", &spec), None);
    }

    #[test]
    fn every_builtin_has_a_distinct_name() {
        for builtin in Builtin::ALL {
            let spelled = format!("X{}", builtin.name());
            let spec = Specification {
                command_prefix: "X".to_string(),
                ..Default::default()
            };
            assert_eq!(Builtin::resolve(&spelled, &spec), Some(builtin));
        }
    }
}
