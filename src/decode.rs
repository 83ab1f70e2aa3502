//! Response decoding.
//!
//! Every response line is a JSON object whose `res` field carries the
//! result: a boolean for commands and mutations, a structured value for
//! queries.
//!
//! Query results decode all-or-nothing. If the line is not JSON, has no
//! `res`, or any required field is missing or of the wrong type, the caller
//! gets [`Snapshot::Empty`] and never a partially filled record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::error::ClientError;

/// Result of a query: either a complete record or nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot<T> {
    /// No data: not connected, transport failure, or undecodable response.
    Empty,
    /// Fully decoded record.
    Populated(T),
}

impl<T> Snapshot<T> {
    pub fn has_data(&self) -> bool {
        matches!(self, Snapshot::Populated(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Snapshot::Populated(value) => Some(value),
            Snapshot::Empty => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Snapshot::Populated(value) => Some(value),
            Snapshot::Empty => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Snapshot<U> {
        match self {
            Snapshot::Populated(value) => Snapshot::Populated(f(value)),
            Snapshot::Empty => Snapshot::Empty,
        }
    }
}

impl<T: Default> Snapshot<T> {
    /// The record, or its zero value when empty.
    pub fn unwrap_or_default(self) -> T {
        self.into_data().unwrap_or_default()
    }
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Snapshot::Empty
    }
}

impl<T> From<Option<T>> for Snapshot<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Snapshot::Populated(v),
            None => Snapshot::Empty,
        }
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    res: T,
}

/// Decode the `res` field of a response line into `T`.
///
/// # Errors
///
/// Returns [`ClientError::MalformedResponse`] for an empty line, invalid
/// JSON, a missing `res`, or a `res` that does not match `T`.
pub fn decode_response<T: DeserializeOwned>(line: &str) -> Result<T, ClientError> {
    if line.trim().is_empty() {
        return Err(ClientError::MalformedResponse("empty response".into()));
    }
    let envelope: Envelope<T> = serde_json::from_str(line)?;
    Ok(envelope.res)
}

/// Decode a query response, mapping any failure to [`Snapshot::Empty`].
pub fn snapshot<T: DeserializeOwned>(line: &str) -> Snapshot<T> {
    decode_response(line).ok().into()
}

/// Decode a command or mutation response.
///
/// `Ok(false)` means the server answered and refused. Anything that is not
/// a JSON boolean `res` is an error.
///
/// # Errors
///
/// Returns [`ClientError::MalformedResponse`] when `res` is missing or is
/// not a boolean.
pub fn accepted(line: &str) -> Result<bool, ClientError> {
    decode_response::<bool>(line)
}

// =============================================================================
// Lenient field decoders
// =============================================================================

/// Integer sent either as a JSON number or as a decimal string.
pub(crate) fn int_or_string<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    let value = match Raw::deserialize(deserializer)? {
        Raw::Int(v) => v,
        Raw::Float(v) if v.fract() == 0.0 && v.is_finite() => v as i64,
        Raw::Float(v) => return Err(serde::de::Error::custom(format!("not an integer: {}", v))),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("not an integer: {:?}", s)))?,
    };
    T::try_from(value).map_err(|_| serde::de::Error::custom(format!("integer out of range: {}", value)))
}

/// Flag sent either as a JSON boolean or as a number (nonzero is true).
pub(crate) fn bool_or_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Bool(b) => b,
        Raw::Int(i) => i != 0,
    })
}

/// Any JSON scalar rendered as text.
pub(crate) fn stringified<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, Default, PartialEq, Deserialize)]
    struct Pair {
        a: i32,
        #[serde(rename = "b.name")]
        b: String,
    }

    #[test]
    fn test_accepted_requires_boolean() {
        assert!(accepted(r#"{"res":true}"#).unwrap());
        assert!(!accepted(r#"{"res":false}"#).unwrap());
        assert!(accepted(r#"{"res":"true"}"#).is_err());
        assert!(accepted(r#"{"res":1}"#).is_err());
        assert!(accepted(r#"{"result":true}"#).is_err());
        assert!(accepted("").is_err());
        assert!(accepted("not json").is_err());
    }

    #[test]
    fn test_snapshot_is_all_or_nothing() {
        let full: Snapshot<Pair> = snapshot(r#"{"res":{"a":1,"b.name":"x"}}"#);
        assert_eq!(
            full,
            Snapshot::Populated(Pair {
                a: 1,
                b: "x".into()
            })
        );

        let missing: Snapshot<Pair> = snapshot(r#"{"res":{"a":1}}"#);
        assert_eq!(missing, Snapshot::Empty);

        let mistyped: Snapshot<Pair> = snapshot(r#"{"res":{"a":"one","b.name":"x"}}"#);
        assert!(!mistyped.has_data());
    }

    #[test]
    fn test_snapshot_ignores_unknown_fields() {
        let snap: Snapshot<Pair> = snapshot(r#"{"res":{"a":2,"b.name":"y","extra":[1,2]}}"#);
        assert_eq!(snap.data().map(|p| p.a), Some(2));
    }

    #[test]
    fn test_snapshot_accessors() {
        let empty: Snapshot<Pair> = Snapshot::default();
        assert!(!empty.has_data());
        assert_eq!(empty.data(), None);
        assert_eq!(empty.clone().unwrap_or_default(), Pair::default());

        let some = Snapshot::Populated(7).map(|v| v * 2);
        assert_eq!(some.into_data(), Some(14));
    }

    #[derive(Debug, Deserialize)]
    struct Lenient {
        #[serde(deserialize_with = "int_or_string")]
        n: i32,
        #[serde(deserialize_with = "bool_or_int")]
        flag: bool,
        #[serde(deserialize_with = "stringified")]
        text: String,
    }

    #[test]
    fn test_lenient_decoders() {
        let v: Lenient = serde_json::from_str(r#"{"n":"42","flag":1,"text":7}"#).unwrap();
        assert_eq!((v.n, v.flag, v.text.as_str()), (42, true, "7"));

        let v: Lenient = serde_json::from_str(r#"{"n":3,"flag":false,"text":"abc"}"#).unwrap();
        assert_eq!((v.n, v.flag, v.text.as_str()), (3, false, "abc"));

        assert!(serde_json::from_str::<Lenient>(r#"{"n":"x","flag":true,"text":""}"#).is_err());
        assert!(serde_json::from_str::<Lenient>(r#"{"n":1.5,"flag":true,"text":""}"#).is_err());
    }
}
