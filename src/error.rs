//! Failure taxonomy for the client engine.
//!
//! Every failure inside the engine is a [`ClientError`]. None of them escape
//! the public API: the dispatcher converts them into `false`, an empty line,
//! or an empty snapshot, and keeps the most recent one for logging.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Engine-internal error type.
///
/// The variants map onto the observable failure classes of the API server
/// protocol: no channel, channel could not be established, channel broke
/// while in use, and the server said something we could not understand.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request was issued while no channel was open.
    #[error("Not connected to the API server")]
    NotConnected,

    /// TCP connection could not be established.
    #[error("Connection to {endpoint} failed: {source}")]
    Connect {
        /// `host:port` that was dialled.
        endpoint: String,
        #[source]
        source: io::Error,
    },

    /// TLS configuration or handshake failure.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The peer did not deliver data within the read deadline.
    #[error("Timed out after {0:?} waiting for the API server")]
    Timeout(Duration),

    /// The peer closed the stream before a full line arrived.
    #[error("Connection closed by API server")]
    Closed,

    /// Any other socket error.
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),

    /// Response line was not a well-formed reply for the request.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Arguments were rejected before anything was sent.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// The in-process direct channel reported a failure.
    #[error("Direct access request failed: {0}")]
    DirectAccess(String),

    /// No in-process direct channel is registered with the client.
    #[error("Direct access is not available")]
    DirectUnavailable,
}

impl ClientError {
    /// Whether the failure leaves the channel unusable.
    ///
    /// A transport fault forces the connection back to Disconnected so the
    /// next request fails fast instead of talking to a half-read stream.
    pub fn is_transport_fault(&self) -> bool {
        matches!(
            self,
            ClientError::Io(_)
                | ClientError::Timeout(_)
                | ClientError::Closed
                | ClientError::DirectAccess(_)
        )
    }

    /// Shorthand for [`ClientError::Validation`].
    pub fn invalid(reason: impl Into<String>) -> Self {
        ClientError::Validation(reason.into())
    }
}

impl From<io::Error> for ClientError {
    fn from(err: io::Error) -> Self {
        // Read timeouts carry no deadline here; `read_line` builds
        // `Timeout` itself, so WouldBlock and TimedOut stay plain I/O.
        match err.kind() {
            io::ErrorKind::UnexpectedEof => ClientError::Closed,
            _ => ClientError::Io(err),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::MalformedResponse(err.to_string())
    }
}

impl From<rustls::Error> for ClientError {
    fn from(err: rustls::Error) -> Self {
        ClientError::Tls(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_timeout_kinds_stay_io() {
        let err: ClientError = io::Error::new(io::ErrorKind::WouldBlock, "again").into();
        assert!(matches!(err, ClientError::Io(ref e) if e.kind() == io::ErrorKind::WouldBlock));
        assert!(err.is_transport_fault());

        let err: ClientError = io::Error::new(io::ErrorKind::TimedOut, "late").into();
        assert!(matches!(err, ClientError::Io(ref e) if e.kind() == io::ErrorKind::TimedOut));
    }

    #[test]
    fn test_unexpected_eof_maps_to_closed() {
        let err: ClientError = io::Error::new(io::ErrorKind::UnexpectedEof, "eof").into();
        assert!(matches!(err, ClientError::Closed));
    }

    #[test]
    fn test_transport_fault_classification() {
        assert!(ClientError::Closed.is_transport_fault());
        assert!(ClientError::Timeout(Duration::from_secs(5)).is_transport_fault());
        assert!(ClientError::Io(io::Error::other("reset")).is_transport_fault());
        assert!(ClientError::DirectAccess("boom".into()).is_transport_fault());

        assert!(!ClientError::NotConnected.is_transport_fault());
        assert!(!ClientError::invalid("bad mask").is_transport_fault());
        assert!(!ClientError::MalformedResponse("no res".into()).is_transport_fault());
    }

    #[test]
    fn test_error_display_is_actionable() {
        let err = ClientError::Connect {
            endpoint: "127.0.0.1:8000".into(),
            source: io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        };
        assert!(err.to_string().contains("127.0.0.1:8000"));
        assert!(ClientError::invalid("jog command 13 out of range")
            .to_string()
            .contains("out of range"));
    }
}
