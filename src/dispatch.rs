//! One request, one response.
//!
//! [`RequestDispatcher`] drives a single exchange over the
//! [`TransportChannel`] and is the one place where failures are flattened
//! into the public outcome: `false` for commands and mutations, an empty
//! line or [`Snapshot::Empty`] for queries. The error behind a flattened
//! outcome is logged and kept in [`RequestDispatcher::last_error`].
//!
//! # Protocol
//!
//! ```text
//! -> {"cmd":"cnc.start"}\n
//! <- {"res":true}\n
//!
//! -> {"get":"axes.info"}\n
//! <- {"res":{"joint.position":[...],...}}\n
//! ```

use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::decode::{self, Snapshot};
use crate::error::ClientError;
use crate::protocol::Request;
use crate::transport::TransportChannel;

/// Runs request/response exchanges and enforces the flat failure model.
pub struct RequestDispatcher {
    channel: TransportChannel,
    last_error: Option<ClientError>,
}

impl RequestDispatcher {
    pub fn new(channel: TransportChannel) -> Self {
        Self {
            channel,
            last_error: None,
        }
    }

    pub fn channel(&self) -> &TransportChannel {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut TransportChannel {
        &mut self.channel
    }

    pub fn is_open(&self) -> bool {
        self.channel.is_open()
    }

    /// Why the most recent call came back `false` or empty.
    ///
    /// Cleared by every successful call.
    pub fn last_error(&self) -> Option<&ClientError> {
        self.last_error.as_ref()
    }

    /// Run a command or mutation.
    ///
    /// `true` only when the server answered `{"res":true}`. Validation
    /// failures (an `Err` request) never reach the wire.
    pub fn execute_command(&mut self, request: Result<Request, ClientError>) -> bool {
        let outcome = request.and_then(|request| {
            let line = self.exchange(&request)?;
            decode::accepted(&line)
        });
        self.settle(outcome).unwrap_or(false)
    }

    /// Run a query and return the raw response line.
    ///
    /// Empty when the channel is closed (no I/O is attempted), the request
    /// is invalid, or the exchange failed.
    pub fn execute_query(&mut self, request: Result<Request, ClientError>) -> String {
        let outcome = request.and_then(|request| self.exchange(&request));
        self.settle(outcome).unwrap_or_default()
    }

    /// Run a query and decode its result.
    pub fn query<T: DeserializeOwned>(&mut self, request: Result<Request, ClientError>) -> Snapshot<T> {
        let outcome = request.and_then(|request| {
            let line = self.exchange(&request)?;
            decode::decode_response::<T>(&line)
        });
        self.settle(outcome).into()
    }

    /// Like [`query`](Self::query) for array results that are only
    /// meaningful with exactly `expected` elements.
    pub fn query_list<T: DeserializeOwned>(
        &mut self,
        request: Result<Request, ClientError>,
        expected: usize,
    ) -> Snapshot<Vec<T>> {
        let outcome = request.and_then(|request| {
            let line = self.exchange(&request)?;
            let items = decode::decode_response::<Vec<T>>(&line)?;
            if items.len() != expected {
                return Err(ClientError::MalformedResponse(format!(
                    "expected {} elements, got {}",
                    expected,
                    items.len()
                )));
            }
            Ok(items)
        });
        self.settle(outcome).into()
    }

    fn exchange(&mut self, request: &Request) -> Result<String, ClientError> {
        // Checked before encoding so a closed channel costs nothing.
        if !self.channel.is_open() {
            return Err(ClientError::NotConnected);
        }
        let line = request.encode()?;
        debug!(kind = request.kind().key(), name = request.name(), "Request");
        let response = self.channel.round_trip(&line)?;
        trace!(len = response.len(), "Response line");
        Ok(response)
    }

    /// Collapse an outcome to `Option`, remembering the error.
    pub(crate) fn settle<T>(&mut self, outcome: Result<T, ClientError>) -> Option<T> {
        match outcome {
            Ok(value) => {
                self.last_error = None;
                Some(value)
            }
            Err(err) => {
                match &err {
                    ClientError::NotConnected => trace!("Request skipped: not connected"),
                    err if err.is_transport_fault() => debug!("Request failed: {}", err),
                    err => debug!("Request rejected: {}", err),
                }
                self.last_error = Some(err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{DirectAccess, TransportSettings};
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Direct handler replaying canned responses and recording requests.
    struct Scripted {
        replies: VecDeque<anyhow::Result<String>>,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl DirectAccess for Scripted {
        fn api_server_request(&mut self, request: &str) -> anyhow::Result<String> {
            self.seen.lock().unwrap().push(request.to_string());
            self.replies
                .pop_front()
                .unwrap_or_else(|| Err(anyhow::anyhow!("no scripted reply")))
        }
    }

    fn dispatcher(replies: Vec<anyhow::Result<String>>) -> (RequestDispatcher, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut channel = TransportChannel::new(TransportSettings::default());
        channel.set_direct_access(Box::new(Scripted {
            replies: replies.into(),
            seen: Arc::clone(&seen),
        }));
        channel.open_direct().unwrap();
        (RequestDispatcher::new(channel), seen)
    }

    fn ok(line: &str) -> anyhow::Result<String> {
        Ok(format!("{}\n", line))
    }

    #[test]
    fn test_command_true_only_for_boolean_true() {
        let (mut d, _) = dispatcher(vec![
            ok(r#"{"res":true}"#),
            ok(r#"{"res":false}"#),
            ok(r#"{"res":"true"}"#),
            ok(""),
            ok(r#"{"nope":true}"#),
        ]);
        assert!(d.execute_command(Ok(Request::command("cnc.start"))));
        assert!(d.last_error().is_none());
        assert!(!d.execute_command(Ok(Request::command("cnc.start"))));
        assert!(!d.execute_command(Ok(Request::command("cnc.start"))));
        assert!(matches!(d.last_error(), Some(ClientError::MalformedResponse(_))));
        assert!(!d.execute_command(Ok(Request::command("cnc.start"))));
        assert!(!d.execute_command(Ok(Request::command("cnc.start"))));
        // Garbage answers do not close the channel.
        assert!(d.is_open());
    }

    #[test]
    fn test_invalid_request_sends_nothing() {
        let (mut d, seen) = dispatcher(vec![ok(r#"{"res":true}"#)]);
        assert!(!d.execute_command(Err(ClientError::invalid("bad jog"))));
        assert!(matches!(d.last_error(), Some(ClientError::Validation(_))));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_query_decodes_or_empties() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct Values {
            value: Vec<i32>,
        }

        let (mut d, seen) = dispatcher(vec![
            ok(r#"{"res":{"value":[1,2,3]}}"#),
            ok(r#"{"res":{"value":[4,5,6]}}"#),
            ok(r#"{"res":{"other":1}}"#),
        ]);
        let first: Snapshot<Values> = d.query(Ok(Request::query("analog.inputs")));
        let second: Snapshot<Values> = d.query(Ok(Request::query("analog.inputs")));
        let third: Snapshot<Values> = d.query(Ok(Request::query("analog.inputs")));
        assert_eq!(first, Snapshot::Populated(Values { value: vec![1, 2, 3] }));
        assert_eq!(second, Snapshot::Populated(Values { value: vec![4, 5, 6] }));
        assert_eq!(third, Snapshot::Empty);
        assert_eq!(seen.lock().unwrap()[0], "{\"get\":\"analog.inputs\"}\n");
    }

    #[test]
    fn test_direct_failure_closes_channel() {
        let (mut d, seen) = dispatcher(vec![Err(anyhow::anyhow!("module unloaded"))]);
        assert_eq!(d.execute_query(Ok(Request::query("cnc.info"))), "");
        assert!(!d.is_open());
        assert!(matches!(d.last_error(), Some(ClientError::DirectAccess(_))));

        // Closed now: nothing else reaches the handler.
        assert!(!d.execute_command(Ok(Request::command("cnc.stop"))));
        assert!(matches!(d.last_error(), Some(ClientError::NotConnected)));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_query_list_requires_expected_length() {
        let (mut d, _) = dispatcher(vec![ok(r#"{"res":[1,2]}"#), ok(r#"{"res":[1,2,3]}"#)]);
        let short: Snapshot<Vec<i32>> = d.query_list(Ok(Request::query("x")), 3);
        assert_eq!(short, Snapshot::Empty);
        let exact: Snapshot<Vec<i32>> = d.query_list(Ok(Request::query("x")), 3);
        assert_eq!(exact.into_data(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_closed_channel_query_is_empty() {
        let mut d = RequestDispatcher::new(TransportChannel::new(TransportSettings::default()));
        assert_eq!(d.execute_query(Ok(Request::query("cnc.info"))), "");
        assert!(matches!(d.last_error(), Some(ClientError::NotConnected)));
    }
}
