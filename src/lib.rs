//! CNC API Client Library
//!
//! Blocking client engine for the API server embedded in the CNC control
//! software. Every request is one JSON object on one line; every response
//! is one line back with the result under `res`.
//!
//! - `transport` - TCP, TLS 1.2 and in-process channels with line framing
//! - `dispatch` - encode, exchange and decode one request at a time
//! - `client` - the typed API: commands, queries and mutations
//! - `models` - response records and wire enumerations
//! - `info_context` - batched refresh of the four status snapshots
//! - `state` - caller-side connection state tracking
//! - `config` - endpoints, timeouts and TLS settings
//!
//! # Example
//!
//! ```ignore
//! use cnc_api_client::{CncApiClient, InfoContext};
//!
//! let mut client = CncApiClient::default();
//! if client.connect("127.0.0.1", 8000, false) {
//!     let mut context = InfoContext::new();
//!     context.refresh(&mut client);
//!     if let Some(info) = context.cnc_info().data() {
//!         println!("state: {}", info.machine_state().as_str());
//!     }
//!     client.close();
//! }
//! ```

pub mod axis;
pub mod client;
pub mod config;
pub mod decode;
pub mod dispatch;
pub mod error;
pub mod filetime;
pub mod function_state;
pub mod info_context;
pub mod models;
pub mod protocol;
pub mod state;
pub mod transport;

pub use axis::{AxisMask, JogCommand};
pub use client::{CncApiClient, ConnectionOpenOptions, PositionAxis};
pub use config::{default_config_path, ClientConfig, Endpoint, ReadTimeouts, TlsSettings};
pub use decode::Snapshot;
pub use error::ClientError;
pub use filetime::FileTime;
pub use function_state::{FunctionStateMode, FunctionStateName};
pub use info_context::{InfoContext, InfoSource};
pub use state::{ConnectionMonitor, ConnectionState};
pub use transport::{DirectAccess, TransportKind};
