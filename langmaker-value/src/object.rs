use std::fmt;
use std::io::{self, Write};
use std::net::{SocketAddr, TcpStream};

/// An accepted TCP connection.
/// Shared between values through `Rc`; the stream closes when the last value holding it is dropped.
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
}

impl Connection {
    pub fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        Self { stream, peer }
    }

    /// Address of the remote end.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Writes all of `data` to the peer and returns the number of bytes sent.
    pub fn send(&self, data: &[u8]) -> io::Result<usize> {
        let mut stream = &self.stream;
        stream.write_all(data)?;
        stream.flush()?;
        Ok(data.len())
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<CONNECTION {}>", self.peer)
    }
}

/// `Drop` is implemented for `Connection` merely to ease debugging of connection lifetimes.
impl Drop for Connection {
    fn drop(&mut self) {
        tracing::debug!(peer = %self.peer, "closing connection");
    }
}
