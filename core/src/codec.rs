//! Wire encoding: JSON bodies, JSON-LD list envelopes, query strings and
//! multipart upload framing.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Encode a write view. Read-only fields and the JSON-LD envelope are
/// excluded by the resource types themselves.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(value)
}

/// Decode a single resource from a JSON or JSON-LD body.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, serde_json::Error> {
    serde_json::from_slice(body)
}

/// One page of a list response.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub members: Vec<T>,
    /// The `next` link of the Hydra view, when the server has more pages.
    pub next: Option<String>,
}

/// Decode a list body: a Hydra envelope (`member`, or the older
/// `hydra:member`) or a bare array.
pub fn decode_list<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>, serde_json::Error> {
    decode_page(body).map(|page| page.members)
}

/// Decode a list body along with its pagination link. A bare array is a
/// single, complete page.
pub fn decode_page<T: DeserializeOwned>(body: &[u8]) -> Result<Page<T>, serde_json::Error> {
    let value: Value = serde_json::from_slice(body)?;
    let (members, next) = match value {
        Value::Array(_) => (value, None),
        Value::Object(mut envelope) => {
            let next = next_link(&envelope);
            match envelope.remove("member").or_else(|| envelope.remove("hydra:member")) {
                Some(members) => (members, next),
                None => {
                    return Err(serde::de::Error::custom("collection envelope has no member array"));
                }
            }
        }
        other => {
            return Err(serde::de::Error::custom(format!("expected a collection, found {}", kind_of(&other))));
        }
    };
    Ok(Page {
        members: serde_json::from_value(members)?,
        next,
    })
}

fn next_link(envelope: &serde_json::Map<String, Value>) -> Option<String> {
    let view = envelope.get("view").or_else(|| envelope.get("hydra:view"))?;
    view.get("next")
        .or_else(|| view.get("hydra:next"))
        .and_then(Value::as_str)
        .filter(|link| !link.is_empty())
        .map(str::to_string)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Build a query string from `key=value` fragments.
///
/// Fragments are appended verbatim. A repeated key keeps its first position
/// and its last value. Returns an empty string when there is nothing to add.
pub fn query_string<S: AsRef<str>>(params: &[S]) -> String {
    let mut pairs: Vec<(&str, Option<&str>)> = Vec::new();
    for fragment in params {
        let fragment = fragment.as_ref();
        if fragment.is_empty() {
            continue;
        }
        let (key, value) = match fragment.split_once('=') {
            Some((key, value)) => (key, Some(value)),
            None => (fragment, None),
        };
        match pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => pairs.push((key, value)),
        }
    }
    if pairs.is_empty() {
        return String::new();
    }
    let joined: Vec<String> = pairs
        .iter()
        .map(|(k, v)| match v {
            Some(v) => format!("{k}={v}"),
            None => k.to_string(),
        })
        .collect();
    format!("?{}", joined.join("&"))
}

/// A framed `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Multipart {
    pub boundary: String,
    pub body: Vec<u8>,
}

impl Multipart {
    /// Frame `bytes` as the single part `field` with the placeholder file
    /// name `file`.
    pub fn single(field: &str, bytes: &[u8]) -> Self {
        let boundary = format!("koillection-{}", uuid::Uuid::new_v4().simple());
        Self::with_boundary(boundary, field, bytes)
    }

    pub fn with_boundary(boundary: String, field: &str, bytes: &[u8]) -> Self {
        let mut body = Vec::with_capacity(bytes.len() + 256);
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"file\"\r\n").as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        Self { boundary, body }
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }
}
