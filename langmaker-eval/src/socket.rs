//! Named server sockets used by the `SOCKET`, `BIND`, `LISTEN` and `ACCEPT` builtins.
//!
//! Sockets move through `created -> bound -> listening`. Entries are never removed; they live as
//! long as the interpreter that owns the table.

use langmaker_value::Connection;
use socket2::{Domain, SockAddr, Socket, Type};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::net::{Ipv4Addr, SocketAddr, TcpListener};

/// Errors for socket operations.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum SocketError {
    #[error("unknown socket: {name}")]
    #[diagnostic(code(langmaker::runtime::socket::unknown))]
    Unknown { name: String },

    #[error("socket {name} is {state}, cannot {operation}")]
    #[diagnostic(code(langmaker::runtime::socket::state))]
    InvalidState {
        name: String,
        state: &'static str,
        operation: &'static str,
    },

    #[error("cannot {operation} socket {name}: {source}")]
    #[diagnostic(code(langmaker::runtime::socket::io))]
    Io {
        name: String,
        operation: &'static str,
        #[source]
        source: io::Error,
    },
}

enum SocketState {
    Created(Socket),
    Bound(Socket),
    Listening(TcpListener),
}

impl SocketState {
    fn name(&self) -> &'static str {
        match self {
            SocketState::Created(_) => "not bound",
            SocketState::Bound(_) => "bound",
            SocketState::Listening(_) => "listening",
        }
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        match self {
            SocketState::Created(_) => None,
            SocketState::Bound(socket) => socket.local_addr().ok()?.as_socket(),
            SocketState::Listening(listener) => listener.local_addr().ok(),
        }
    }
}

/// Maps caller-chosen names to server sockets.
#[derive(Default)]
pub struct SocketTable {
    sockets: HashMap<String, SocketState>,
}

impl SocketTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a fresh IPv4 stream socket under `name`, replacing (and closing) any previous socket
    /// with that name.
    pub fn create(&mut self, name: &str) -> Result<(), SocketError> {
        let socket = Socket::new(Domain::IPV4, Type::STREAM, None)
            .and_then(|socket| {
                socket.set_reuse_address(true)?;
                Ok(socket)
            })
            .map_err(|source| SocketError::Io {
                name: name.to_string(),
                operation: "create",
                source,
            })?;
        tracing::debug!(socket = name, "socket created");
        self.sockets
            .insert(name.to_string(), SocketState::Created(socket));
        Ok(())
    }

    /// Takes the socket out of the table to move it to its next state. The caller puts it back.
    fn take(&mut self, name: &str) -> Result<SocketState, SocketError> {
        self.sockets.remove(name).ok_or_else(|| SocketError::Unknown {
            name: name.to_string(),
        })
    }

    /// Binds the socket to `port` on all interfaces. Port `0` picks a free port.
    ///
    /// The socket does not accept connections until [`Self::listen`].
    pub fn bind(&mut self, name: &str, port: u16) -> Result<SocketAddr, SocketError> {
        let socket = match self.take(name)? {
            SocketState::Created(socket) => socket,
            state => return Err(self.restore_invalid(name, state, "bind")),
        };

        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        let bound = socket
            .bind(&SockAddr::from(addr))
            .and_then(|()| socket.local_addr());
        let addr = match bound {
            Ok(local) => local.as_socket().unwrap_or(addr),
            Err(source) => {
                self.sockets
                    .insert(name.to_string(), SocketState::Created(socket));
                return Err(SocketError::Io {
                    name: name.to_string(),
                    operation: "bind",
                    source,
                });
            }
        };
        self.sockets
            .insert(name.to_string(), SocketState::Bound(socket));

        tracing::debug!(socket = name, %addr, "socket bound");
        Ok(addr)
    }

    /// Starts accepting connections on a bound socket, queueing at most `backlog` of them until
    /// they are accepted.
    pub fn listen(&mut self, name: &str, backlog: i32) -> Result<(), SocketError> {
        let socket = match self.take(name)? {
            SocketState::Bound(socket) => socket,
            state => return Err(self.restore_invalid(name, state, "listen")),
        };

        if let Err(source) = socket.listen(backlog) {
            self.sockets
                .insert(name.to_string(), SocketState::Bound(socket));
            return Err(SocketError::Io {
                name: name.to_string(),
                operation: "listen",
                source,
            });
        }
        self.sockets
            .insert(name.to_string(), SocketState::Listening(socket.into()));

        tracing::debug!(socket = name, backlog, "socket listening");
        Ok(())
    }

    fn restore_invalid(
        &mut self,
        name: &str,
        state: SocketState,
        operation: &'static str,
    ) -> SocketError {
        let err = SocketError::InvalidState {
            name: name.to_string(),
            state: state.name(),
            operation,
        };
        self.sockets.insert(name.to_string(), state);
        err
    }

    /// Blocks until a peer connects to the listening socket `name`.
    pub fn accept(&self, name: &str) -> Result<Connection, SocketError> {
        let state = self.sockets.get(name).ok_or_else(|| SocketError::Unknown {
            name: name.to_string(),
        })?;
        let listener = match state {
            SocketState::Listening(listener) => listener,
            _ => {
                return Err(SocketError::InvalidState {
                    name: name.to_string(),
                    state: state.name(),
                    operation: "accept",
                })
            }
        };

        tracing::debug!(socket = name, "waiting for connection");
        let (stream, peer) = listener.accept().map_err(|source| SocketError::Io {
            name: name.to_string(),
            operation: "accept",
            source,
        })?;
        tracing::debug!(socket = name, %peer, "connection accepted");
        Ok(Connection::new(stream, peer))
    }

    /// Local address of a bound socket.
    pub fn local_addr(&self, name: &str) -> Option<SocketAddr> {
        self.sockets.get(name)?.local_addr()
    }
}

impl fmt::Debug for SocketTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.sockets.iter().map(|(name, state)| (name, state.name())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpStream;
    use std::thread;

    #[test]
    fn lifecycle() {
        let mut table = SocketTable::new();
        table.create("SERVER").unwrap();
        assert!(table.local_addr("SERVER").is_none());

        let addr = table.bind("SERVER", 0).unwrap();
        assert_ne!(addr.port(), 0);
        assert_eq!(table.local_addr("SERVER"), Some(addr));

        table.listen("SERVER", 5).unwrap();
        let port = addr.port();
        let client = thread::spawn(move || {
            let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
            let mut reply = String::new();
            stream.read_to_string(&mut reply).unwrap();
            reply
        });

        let conn = table.accept("SERVER").unwrap();
        assert_eq!(conn.send(b"PONG").unwrap(), 4);
        drop(conn);
        assert_eq!(client.join().unwrap(), "PONG");
    }

    #[test]
    fn unknown_socket() {
        let mut table = SocketTable::new();
        assert!(matches!(
            table.bind("NOPE", 0),
            Err(SocketError::Unknown { .. })
        ));
        assert!(matches!(
            table.accept("NOPE"),
            Err(SocketError::Unknown { .. })
        ));
    }

    #[test]
    fn out_of_order_operations() {
        let mut table = SocketTable::new();
        table.create("S").unwrap();
        assert!(matches!(
            table.listen("S", 1),
            Err(SocketError::InvalidState {
                operation: "listen",
                ..
            })
        ));

        table.bind("S", 0).unwrap();
        assert!(matches!(
            table.accept("S"),
            Err(SocketError::InvalidState {
                state: "bound",
                operation: "accept",
                ..
            })
        ));
        assert!(matches!(
            table.bind("S", 0),
            Err(SocketError::InvalidState {
                operation: "bind",
                ..
            })
        ));
    }

    #[test]
    fn relisten_is_rejected() {
        let mut table = SocketTable::new();
        table.create("S").unwrap();
        table.bind("S", 0).unwrap();
        table.listen("S", 1).unwrap();
        assert!(matches!(
            table.listen("S", 1),
            Err(SocketError::InvalidState {
                state: "listening",
                operation: "listen",
                ..
            })
        ));
        // the failed call leaves the socket in place
        assert!(table.local_addr("S").is_some());
    }

    #[test]
    fn connections_wait_for_listen() {
        let mut table = SocketTable::new();
        table.create("S").unwrap();
        let port = table.bind("S", 0).unwrap().port();
        assert!(TcpStream::connect(("127.0.0.1", port)).is_err());

        table.listen("S", 1).unwrap();
        let client = TcpStream::connect(("127.0.0.1", port)).unwrap();
        let conn = table.accept("S").unwrap();
        assert_eq!(conn.peer(), client.local_addr().unwrap());
    }

    #[test]
    fn port_in_use() {
        let mut table = SocketTable::new();
        table.create("A").unwrap();
        table.create("B").unwrap();
        let addr = table.bind("A", 0).unwrap();
        table.listen("A", 1).unwrap();
        assert!(matches!(
            table.bind("B", addr.port()),
            Err(SocketError::Io {
                operation: "bind",
                ..
            })
        ));
        // B is still usable after the failed bind
        table.bind("B", 0).unwrap();
    }
}
