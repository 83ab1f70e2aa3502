//! In-process request channel.
//!
//! When the client is embedded inside the control software process, requests
//! can be handed to the API server's request function directly instead of
//! going through a socket. The host registers an implementation of
//! [`DirectAccess`] with the client; without one, opening the direct channel
//! fails.

use anyhow::Result;

// =============================================================================
// Service Trait for Dependency Injection
// =============================================================================

/// Synchronous request function of an in-process API server.
///
/// `request` receives one newline-terminated request line and must return
/// the matching response line (a trailing newline is optional). Any error
/// is treated as a broken channel.
pub trait DirectAccess: Send {
    fn api_server_request(&mut self, request: &str) -> Result<String>;
}

impl<F> DirectAccess for F
where
    F: FnMut(&str) -> Result<String> + Send,
{
    fn api_server_request(&mut self, request: &str) -> Result<String> {
        self(request)
    }
}
