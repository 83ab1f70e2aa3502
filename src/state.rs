//! Caller-side connection state.
//!
//! The engine only knows whether its channel is open. Hosts that want to
//! tell a clean close from a dropped connection feed that flag into a
//! [`ConnectionMonitor`] after each call:
//!
//! ```text
//!                 open ok
//!  Disconnected ───────────▶ Connected
//!       ▲                       │
//!       │ close()               │ channel dropped
//!       │                       ▼
//!       └────────────────────  Error
//! ```
//!
//! There is no transition out of `Error` except through an explicit
//! close and a new open.

use std::fmt;

/// Three-state view of a client connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected,
    /// The channel closed without the caller asking for it.
    Error,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connected => "Connected",
            ConnectionState::Error => "Error",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derives [`ConnectionState`] from successive observations of the
/// client's open flag.
#[derive(Debug, Clone, Default)]
pub struct ConnectionMonitor {
    state: ConnectionState,
}

impl ConnectionMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Record the outcome of an open attempt.
    pub fn opened(&mut self, success: bool) -> ConnectionState {
        if success {
            self.state = ConnectionState::Connected;
        }
        self.state
    }

    /// Record an explicit close by the caller.
    pub fn closed(&mut self) -> ConnectionState {
        self.state = ConnectionState::Disconnected;
        self.state
    }

    /// Record the open flag seen after a request.
    ///
    /// A channel that was Connected and is now closed moves to `Error`.
    pub fn observe(&mut self, is_open: bool) -> ConnectionState {
        self.state = match (self.state, is_open) {
            (ConnectionState::Connected, false) => ConnectionState::Error,
            (ConnectionState::Disconnected, true) => ConnectionState::Connected,
            (state, _) => state,
        };
        self.state
    }
}
