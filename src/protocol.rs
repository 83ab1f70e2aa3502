//! Request encoding for the API server line protocol.
//!
//! Every request is one compact JSON object on a single line. The first key
//! names the request class and the API function, the remaining keys carry
//! the arguments:
//!
//! ```text
//! {"cmd":"cnc.homing","axes.mask":7}
//! {"get":"axes.info"}
//! {"set":"override","name":"feed","value":80}
//! ```
//!
//! Responses are objects with a `res` field; see [`crate::decode`].

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::error::ClientError;

/// Request class, encoded as the discriminant key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// `cmd`: imperative action, answered with a boolean.
    Command,
    /// `get`: read-only query, answered with a structured value.
    Query,
    /// `set`: state mutation, answered with a boolean.
    Mutation,
}

impl RequestKind {
    pub fn key(self) -> &'static str {
        match self {
            RequestKind::Command => "cmd",
            RequestKind::Query => "get",
            RequestKind::Mutation => "set",
        }
    }
}

/// One outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    kind: RequestKind,
    name: String,
    params: Map<String, Value>,
}

impl Request {
    pub fn new(kind: RequestKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            params: Map::new(),
        }
    }

    pub fn command(name: impl Into<String>) -> Self {
        Self::new(RequestKind::Command, name)
    }

    pub fn query(name: impl Into<String>) -> Self {
        Self::new(RequestKind::Query, name)
    }

    pub fn mutation(name: impl Into<String>) -> Self {
        Self::new(RequestKind::Mutation, name)
    }

    /// Add an argument.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// Add an argument only when present.
    pub fn with_opt<V: Into<Value>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    /// Add a floating point argument.
    ///
    /// # Errors
    ///
    /// NaN and infinities have no JSON representation and are rejected.
    pub fn with_float(self, key: &str, value: f64) -> Result<Self, ClientError> {
        Ok(self.with(key, finite(key, value)?))
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Serialize to a compact single-line JSON object (no trailing newline).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] if serialization fails, which
    /// only happens for values that cannot be represented in JSON.
    pub fn encode(&self) -> Result<String, ClientError> {
        serde_json::to_string(self).map_err(|e| ClientError::invalid(e.to_string()))
    }
}

impl Serialize for Request {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.params.len() + 1))?;
        // Discriminant first; the server dispatches on it.
        map.serialize_entry(self.kind.key(), &self.name)?;
        for (key, value) in &self.params {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Convert a float to a JSON number, rejecting NaN and infinities.
pub fn finite(field: &str, value: f64) -> Result<Number, ClientError> {
    Number::from_f64(value)
        .ok_or_else(|| ClientError::invalid(format!("{} must be a finite number, got {}", field, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_bare_query_encoding() {
        let line = Request::query("axes.info").encode().unwrap();
        assert_eq!(line, r#"{"get":"axes.info"}"#);
    }

    #[test]
    fn test_discriminant_comes_first() {
        let line = Request::command("cnc.homing")
            .with("axes.mask", 7)
            .encode()
            .unwrap();
        assert_eq!(line, r#"{"cmd":"cnc.homing","axes.mask":7}"#);
    }

    #[test]
    fn test_mutation_with_nested_data() {
        let line = Request::mutation("program.position")
            .with("data", json!({"x": 1.5}))
            .encode()
            .unwrap();
        assert_eq!(line, r#"{"set":"program.position","data":{"x":1.5}}"#);
    }

    #[test]
    fn test_strings_are_escaped_and_single_line() {
        let line = Request::command("program.gcode.set.text")
            .with("text", "G0 X0\nG1 X10 \"quoted\"")
            .encode()
            .unwrap();
        assert!(!line.contains('\n'), "encoded request must be one line: {}", line);
        let back: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(back["text"], "G0 X0\nG1 X10 \"quoted\"");
    }

    #[test]
    fn test_with_opt_skips_none() {
        let request = Request::query("work.order.file.list")
            .with_opt("path", Some("orders"))
            .with_opt::<&str>("file.filter", None);
        assert_eq!(request.params().len(), 1);
        assert_eq!(request.kind(), RequestKind::Query);
        assert_eq!(request.name(), "work.order.file.list");
    }

    #[test]
    fn test_non_finite_float_rejected() {
        assert!(Request::mutation("x").with_float("value", f64::NAN).is_err());
        assert!(Request::mutation("x").with_float("value", f64::INFINITY).is_err());
        assert!(Request::mutation("x").with_float("value", -0.5).is_ok());
    }
}
