//! Plain and TLS socket streams behind one type.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use rustls::{ClientConnection, StreamOwned};
use tracing::debug;

use crate::error::ClientError;

/// A connected socket, either raw TCP or TLS over TCP.
///
/// Reads and writes go through the TLS session when present; socket
/// options (timeouts, blocking mode, shutdown) always apply to the
/// underlying TCP stream.
pub enum SocketStream {
    Plain(TcpStream),
    Tls(Box<StreamOwned<ClientConnection, TcpStream>>),
}

impl SocketStream {
    fn tcp(&self) -> &TcpStream {
        match self {
            Self::Plain(stream) => stream,
            Self::Tls(stream) => &stream.sock,
        }
    }

    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.tcp().set_read_timeout(timeout)
    }

    pub fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()> {
        self.tcp().set_nonblocking(nonblocking)
    }

    pub fn is_tls(&self) -> bool {
        matches!(self, Self::Tls(_))
    }

    /// Close the stream. TLS sessions send close_notify first.
    ///
    /// A peer that already went away is not an error.
    pub fn shutdown(&mut self) -> io::Result<()> {
        if let Self::Tls(stream) = self {
            stream.conn.send_close_notify();
            // The TCP shutdown below still runs if the alert cannot be sent.
            if let Err(err) = stream.conn.complete_io(&mut stream.sock) {
                debug!("Failed to flush TLS close_notify: {}", err);
            }
        }
        match self.tcp().shutdown(Shutdown::Both) {
            Err(err) if err.kind() != io::ErrorKind::NotConnected => Err(err),
            _ => Ok(()),
        }
    }
}

impl Read for SocketStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Plain(stream) => stream.read(buf),
            Self::Tls(stream) => stream.read(buf),
        }
    }
}

impl Write for SocketStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(stream) => stream.write(buf),
            Self::Tls(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(stream) => stream.flush(),
            Self::Tls(stream) => stream.flush(),
        }
    }
}

/// Dial `host:port` with a bounded connect time.
///
/// # Errors
///
/// Returns [`ClientError::Connect`] when the name does not resolve or the
/// connection is refused or times out.
pub fn connect_tcp(host: &str, port: u16, timeout: Duration) -> Result<TcpStream, ClientError> {
    let endpoint = format!("{}:{}", host, port);
    let address = resolve_tcp_address(host, port).map_err(|source| ClientError::Connect {
        endpoint: endpoint.clone(),
        source,
    })?;

    let stream = TcpStream::connect_timeout(&address, timeout)
        .map_err(|source| ClientError::Connect { endpoint, source })?;
    // Requests are tiny and latency bound.
    stream.set_nodelay(true)?;
    Ok(stream)
}

fn resolve_tcp_address(host: &str, port: u16) -> io::Result<SocketAddr> {
    let addrs: Vec<SocketAddr> = (host, port).to_socket_addrs()?.collect();
    preferred_address(&addrs)
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses"))
}

/// The API server listens on IPv4; an IPv6 result is used only when the
/// name has no IPv4 address.
fn preferred_address(addrs: &[SocketAddr]) -> Option<SocketAddr> {
    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_connect_refused_is_connect_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let err = connect_tcp("127.0.0.1", port, Duration::from_secs(1)).unwrap_err();
        match err {
            ClientError::Connect { endpoint, .. } => {
                assert_eq!(endpoint, format!("127.0.0.1:{}", port));
            }
            other => panic!("expected Connect error, got {:?}", other),
        }
    }

    #[test]
    fn test_ipv4_address_preferred() {
        let v6: SocketAddr = "[::1]:8000".parse().unwrap();
        let v4: SocketAddr = "127.0.0.1:8000".parse().unwrap();
        assert_eq!(preferred_address(&[v6, v4]), Some(v4));
        assert_eq!(preferred_address(&[v6]), Some(v6));
        assert_eq!(preferred_address(&[]), None);

        let resolved = resolve_tcp_address("127.0.0.1", 8000).unwrap();
        assert_eq!(resolved, v4);
    }

    #[test]
    fn test_plain_stream_round_trip_and_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = std::thread::spawn(move || {
            let (mut peer, _) = listener.accept().unwrap();
            let mut buf = [0u8; 5];
            peer.read_exact(&mut buf).unwrap();
            peer.write_all(&buf).unwrap();
        });

        let tcp = connect_tcp("127.0.0.1", port, Duration::from_secs(1)).unwrap();
        let mut stream = SocketStream::Plain(tcp);
        assert!(!stream.is_tls());
        stream.write_all(b"hello").unwrap();
        let mut echo = [0u8; 5];
        stream.read_exact(&mut echo).unwrap();
        assert_eq!(&echo, b"hello");

        server.join().unwrap();
        stream.shutdown().unwrap();
        // Second shutdown on a closed socket is tolerated.
        stream.shutdown().unwrap();
    }
}
