//! Transport channel to the API server.
//!
//! Owns the single live connection of a client: a plain TCP socket, a TLS
//! session over TCP, or an in-process [`DirectAccess`] handler. Exactly one
//! of these is active at a time.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   request line    ┌──────────────────────┐
//! │ RequestDispatcher│ ────────────────▶ │ TransportChannel     │
//! │                  │ ◀──────────────── │  Plain | Tls | Direct│
//! └──────────────────┘   response line   └──────────────────────┘
//! ```
//!
//! Any I/O failure during an exchange closes the channel, so a client
//! never keeps talking to a stream whose framing position is unknown.

pub mod direct;
pub mod framing;
pub mod stream;
pub mod tls;

use std::fmt;
use std::io::BufReader;
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::config::{ReadTimeouts, TlsSettings};
use crate::error::ClientError;

pub use direct::DirectAccess;
pub use framing::{discard_stale_input, read_line, write_line, LineStream, MAX_LINE_LENGTH};
pub use stream::SocketStream;

/// How the current channel reaches the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportKind {
    /// No channel is open.
    #[default]
    None,
    /// Plain TCP.
    Plain,
    /// TLS 1.2 over TCP.
    Tls,
    /// In-process request function.
    Direct,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportKind::None => "none",
            TransportKind::Plain => "tcp",
            TransportKind::Tls => "tls",
            TransportKind::Direct => "direct",
        };
        f.write_str(name)
    }
}

/// Observable state of the channel.
///
/// `is_open` implies `kind != None`; host and port are meaningful only for
/// socket kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Connection {
    pub kind: TransportKind,
    pub is_open: bool,
    pub host: String,
    pub port: u16,
}

/// Knobs for opening and using the channel.
#[derive(Debug, Clone, Default)]
pub struct TransportSettings {
    pub timeouts: ReadTimeouts,
    pub connect_timeout: Duration,
    pub tls: TlsSettings,
}

enum Link {
    Closed,
    Socket(BufReader<SocketStream>),
    Direct,
}

/// The live link to the API server plus its connection record.
pub struct TransportChannel {
    connection: Connection,
    link: Link,
    direct: Option<Box<dyn DirectAccess>>,
    settings: TransportSettings,
}

impl TransportChannel {
    pub fn new(settings: TransportSettings) -> Self {
        Self {
            connection: Connection::default(),
            link: Link::Closed,
            direct: None,
            settings,
        }
    }

    /// Register the in-process request function used by [`open_direct`].
    ///
    /// [`open_direct`]: TransportChannel::open_direct
    pub fn set_direct_access(&mut self, handler: Box<dyn DirectAccess>) {
        self.direct = Some(handler);
    }

    pub fn has_direct_access(&self) -> bool {
        self.direct.is_some()
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn is_open(&self) -> bool {
        self.connection.is_open
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    /// Open a TCP (optionally TLS) channel to `host:port`.
    ///
    /// Opening while already open is a no-op success. On failure the
    /// channel is left fully reset.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Connect`] if the TCP connection fails and
    /// [`ClientError::Tls`] if the TLS handshake fails.
    pub fn open(&mut self, host: &str, port: u16, use_tls: bool) -> Result<(), ClientError> {
        if self.is_open() {
            return Ok(());
        }

        match self.open_socket(host, port, use_tls) {
            Ok(stream) => {
                let kind = if use_tls {
                    TransportKind::Tls
                } else {
                    TransportKind::Plain
                };
                self.link = Link::Socket(BufReader::new(stream));
                self.connection = Connection {
                    kind,
                    is_open: true,
                    host: host.to_string(),
                    port,
                };
                debug!(host, port, %kind, "Channel opened");
                Ok(())
            }
            Err(err) => {
                self.reset();
                Err(err)
            }
        }
    }

    fn open_socket(&self, host: &str, port: u16, use_tls: bool) -> Result<SocketStream, ClientError> {
        let tcp = stream::connect_tcp(host, port, self.settings.connect_timeout)?;
        if !use_tls {
            return Ok(SocketStream::Plain(tcp));
        }

        // Bound every handshake read by the connect timeout.
        tcp.set_read_timeout(Some(self.settings.connect_timeout))?;
        let config = tls::client_config(&self.settings.tls)?;
        let session = tls::handshake(config, host, tcp, self.settings.tls.verify_server)?;
        Ok(SocketStream::Tls(Box::new(session)))
    }

    /// Switch to the in-process channel.
    ///
    /// Already open (any kind) is a no-op success.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::DirectUnavailable`] if no handler is
    /// registered.
    pub fn open_direct(&mut self) -> Result<(), ClientError> {
        if self.is_open() {
            return Ok(());
        }
        if self.direct.is_none() {
            self.reset();
            return Err(ClientError::DirectUnavailable);
        }
        self.link = Link::Direct;
        self.connection = Connection {
            kind: TransportKind::Direct,
            is_open: true,
            host: String::new(),
            port: 0,
        };
        debug!("Direct channel opened");
        Ok(())
    }

    /// Close the channel. Idempotent.
    ///
    /// The channel always ends up Disconnected, even when the socket
    /// reports an error while shutting down.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] if shutting the socket down failed.
    pub fn close(&mut self) -> Result<(), ClientError> {
        let link = std::mem::replace(&mut self.link, Link::Closed);
        let was = self.connection.kind;
        self.reset();

        match link {
            Link::Socket(mut reader) => {
                debug!(kind = %was, "Channel closed");
                reader.get_mut().shutdown().map_err(ClientError::Io)
            }
            Link::Direct => {
                debug!("Direct channel closed");
                Ok(())
            }
            Link::Closed => Ok(()),
        }
    }

    /// Force Disconnected after a failed exchange.
    pub fn mark_faulted(&mut self, cause: &ClientError) {
        if self.is_open() {
            warn!(
                kind = %self.connection.kind,
                host = %self.connection.host,
                port = self.connection.port,
                "Channel faulted: {}",
                cause
            );
        }
        // Shutdown errors on a faulted socket carry no information.
        let _ = self.close();
    }

    /// Send one request line and read the matching response line.
    ///
    /// For sockets, unsolicited bytes left over from earlier exchanges are
    /// drained before sending. Any transport error closes the channel
    /// before it is returned.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotConnected`] if the channel is closed; otherwise the
    /// transport error that ended the exchange.
    pub fn round_trip(&mut self, request: &str) -> Result<String, ClientError> {
        let outcome = self.exchange(request);
        if let Err(err) = &outcome {
            if err.is_transport_fault() {
                self.mark_faulted(err);
            }
        }
        outcome
    }

    fn exchange(&mut self, request: &str) -> Result<String, ClientError> {
        let timeouts = self.settings.timeouts;
        match &mut self.link {
            Link::Closed => Err(ClientError::NotConnected),
            Link::Socket(reader) => {
                discard_stale_input(reader);
                trace!(request, "Sending");
                write_line(reader.get_mut(), request)?;
                let response = read_line(reader, &timeouts)?;
                trace!(response = %response, "Received");
                Ok(response)
            }
            Link::Direct => {
                let handler = self.direct.as_mut().ok_or(ClientError::DirectUnavailable)?;
                let framed = framing::frame(request);
                trace!(request, "Sending (direct)");
                let mut response = handler
                    .api_server_request(&framed)
                    .map_err(|e| ClientError::DirectAccess(format!("{:#}", e)))?;
                if response.ends_with('\n') {
                    response.pop();
                }
                Ok(response)
            }
        }
    }

    fn reset(&mut self) {
        self.link = Link::Closed;
        self.connection = Connection::default();
    }
}

impl Drop for TransportChannel {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
