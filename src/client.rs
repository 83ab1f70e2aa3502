//! Public client for one API server.
//!
//! [`CncApiClient`] owns one channel and exposes the API server functions
//! as plain methods. Commands and mutations return `bool`, queries return a
//! [`Snapshot`](crate::decode::Snapshot). No method returns an error or
//! panics: a failure shows up as `false` or an empty snapshot, and the
//! cause is available from [`CncApiClient::last_error`].
//!
//! The method families live in submodules:
//!
//! - `commands` - `{"cmd": ...}` requests
//! - `queries` - `{"get": ...}` requests
//! - `mutations` - `{"set": ...}` requests
//!
//! # Example
//!
//! ```ignore
//! use cnc_api_client::{ClientConfig, CncApiClient};
//!
//! let mut client = CncApiClient::new(ClientConfig::default());
//! if client.connect("127.0.0.1", 8000, false) {
//!     if let Some(axes) = client.get_axes_info().data() {
//!         println!("X = {}", axes.machine_position[0]);
//!     }
//!     client.cnc_homing(0x07);
//!     client.close();
//! }
//! ```

mod commands;
mod mutations;
mod queries;

use tracing::{debug, info};

use crate::config::{ClientConfig, Endpoint};
use crate::decode::Snapshot;
use crate::dispatch::RequestDispatcher;
use crate::error::ClientError;
use crate::protocol::Request;
use crate::transport::{Connection, DirectAccess, TransportChannel, TransportKind};

pub use commands::ConnectionOpenOptions;
pub use mutations::PositionAxis;

/// Client for a single API server.
///
/// Not thread-safe by itself: the protocol has no request ids, so one
/// client must only run one exchange at a time. Wrap it in a `Mutex` or
/// create one client per thread.
pub struct CncApiClient {
    dispatcher: RequestDispatcher,
    config: ClientConfig,
}

impl CncApiClient {
    pub fn new(config: ClientConfig) -> Self {
        let channel = TransportChannel::new(config.transport_settings());
        Self {
            dispatcher: RequestDispatcher::new(channel),
            config,
        }
    }

    /// Register the in-process request function used by
    /// [`connect_direct`](Self::connect_direct).
    pub fn with_direct_access(mut self, handler: impl DirectAccess + 'static) -> Self {
        self.set_direct_access(handler);
        self
    }

    pub fn set_direct_access(&mut self, handler: impl DirectAccess + 'static) {
        self.dispatcher.channel_mut().set_direct_access(Box::new(handler));
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Open a socket channel to `host:port`, optionally over TLS 1.2.
    ///
    /// Returns `true` if the channel is open afterwards, including when it
    /// already was.
    pub fn connect(&mut self, host: &str, port: u16, use_tls: bool) -> bool {
        let outcome = self.dispatcher.channel_mut().open(host, port, use_tls);
        if outcome.is_ok() {
            info!(host, port, tls = use_tls, "Connected to API server");
        }
        self.dispatcher.settle(outcome).is_some()
    }

    pub fn connect_endpoint(&mut self, endpoint: &Endpoint) -> bool {
        self.connect(&endpoint.host, endpoint.port, endpoint.tls)
    }

    /// Connect to the endpoint named in the configuration.
    pub fn connect_configured(&mut self) -> bool {
        match self.config.endpoint.clone() {
            Some(endpoint) => self.connect_endpoint(&endpoint),
            None => {
                let outcome: Result<(), ClientError> =
                    Err(ClientError::invalid("no endpoint configured"));
                self.dispatcher.settle(outcome).is_some()
            }
        }
    }

    /// Switch to the in-process channel registered with
    /// [`set_direct_access`](Self::set_direct_access).
    pub fn connect_direct(&mut self) -> bool {
        let outcome = self.dispatcher.channel_mut().open_direct();
        self.dispatcher.settle(outcome).is_some()
    }

    /// Close the channel.
    ///
    /// Always leaves the client disconnected; returns whether the socket
    /// shut down cleanly. Closing a closed client returns `true`.
    pub fn close(&mut self) -> bool {
        let outcome = self.dispatcher.channel_mut().close();
        debug!("Client closed");
        self.dispatcher.settle(outcome).is_some()
    }

    pub fn is_connected(&self) -> bool {
        self.dispatcher.is_open()
    }

    pub fn connection(&self) -> &Connection {
        self.dispatcher.channel().connection()
    }

    pub fn transport_kind(&self) -> TransportKind {
        self.connection().kind
    }

    /// Cause of the most recent `false` or empty result, if any.
    pub fn last_error(&self) -> Option<&ClientError> {
        self.dispatcher.last_error()
    }

    fn command(&mut self, request: Result<Request, ClientError>) -> bool {
        self.dispatcher.execute_command(request)
    }

    fn simple_command(&mut self, name: &str) -> bool {
        self.command(Ok(Request::command(name)))
    }

    fn get<T: serde::de::DeserializeOwned>(&mut self, name: &str) -> Snapshot<T> {
        self.dispatcher.query(Ok(Request::query(name)))
    }
}

impl Default for CncApiClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}
