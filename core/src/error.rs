//! Error types for the Koillection API client.
//!
//! # Design
//! Every failure is an `ApiError`: the name of the operation that failed, the
//! identifier it targeted (when one is known) and an `ErrorKind`. The kinds
//! follow the statuses callers branch on: 400, 401, 404 and 422 each get a
//! dedicated variant, anything else non-2xx lands in `UnexpectedStatus` with
//! the raw body for debugging.

use std::fmt;

use serde::Deserialize;

/// Boxed error produced by a `Transport` implementation.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// One property violation reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Violation {
    pub property_path: String,
    pub message: String,
}

/// Problem document returned by the server on 4xx responses. Missing fields
/// default to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "WireProblem")]
pub struct Problem {
    pub status: u16,
    pub title: String,
    pub detail: String,
    pub description: String,
    pub context: String,
    pub id: String,
    pub kind: String,
    pub instance: String,
    pub violations: Vec<Violation>,
}

/// The server sends plain and JSON-LD names side by side (`type` and
/// `@type`, `title` and `hydra:title`), so each spelling is its own field.
#[derive(Default, Deserialize)]
#[serde(default)]
struct WireProblem {
    status: u16,
    title: String,
    #[serde(rename = "hydra:title")]
    hydra_title: String,
    detail: String,
    description: String,
    #[serde(rename = "hydra:description")]
    hydra_description: String,
    #[serde(rename = "@context")]
    context: String,
    id: String,
    #[serde(rename = "@id")]
    ld_id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "@type")]
    ld_kind: String,
    instance: String,
    violations: Vec<Violation>,
}

fn either(plain: String, other: String) -> String {
    if plain.is_empty() {
        other
    } else {
        plain
    }
}

impl From<WireProblem> for Problem {
    fn from(wire: WireProblem) -> Self {
        Self {
            status: wire.status,
            title: either(wire.title, wire.hydra_title),
            detail: wire.detail,
            description: either(wire.description, wire.hydra_description),
            context: wire.context,
            id: either(wire.id, wire.ld_id),
            kind: either(wire.kind, wire.ld_kind),
            instance: wire.instance,
            violations: wire.violations,
        }
    }
}

impl Problem {
    /// Decode a problem document, or `None` if `body` is not one.
    ///
    /// A JSON object that carries none of title, detail, description or
    /// violations is not treated as a problem document.
    pub fn decode(body: &[u8]) -> Option<Problem> {
        let problem: Problem = serde_json::from_slice(body).ok()?;
        let empty = problem.title.is_empty()
            && problem.detail.is_empty()
            && problem.description.is_empty()
            && problem.violations.is_empty();
        (!empty).then_some(problem)
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let detail = if self.detail.is_empty() { &self.description } else { &self.detail };
        match (self.title.is_empty(), detail.is_empty()) {
            (false, false) => write!(f, "{}: {}", self.title, detail)?,
            (false, true) => write!(f, "{}", self.title)?,
            (true, _) => write!(f, "{detail}")?,
        }
        for violation in &self.violations {
            write!(f, "; {}: {}", violation.property_path, violation.message)?;
        }
        Ok(())
    }
}

/// What accompanies a client-visible failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detail {
    /// Constraints rejected locally, in declaration order.
    Validation(Vec<String>),
    /// Problem document decoded from the response.
    Problem(Problem),
    /// Response body that was not a problem document, kept verbatim.
    Raw(String),
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Detail::Validation(messages) => write!(f, "{}", messages.join("; ")),
            Detail::Problem(problem) => write!(f, "{problem}"),
            Detail::Raw(body) if body.is_empty() => write!(f, "(empty body)"),
            Detail::Raw(body) => write!(f, "{body}"),
        }
    }
}

/// The failure taxonomy exposed to callers.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// The server returned 400, or local validation rejected the request.
    #[error("invalid input: {0}")]
    InvalidInput(Detail),

    /// The server returned 401; the token is missing or was rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(Detail),

    /// The server returned 404.
    #[error("not found: {0}")]
    NotFound(Detail),

    /// The server returned 422.
    #[error("unprocessable entity: {0}")]
    Unprocessable(Detail),

    /// DNS, connect, TLS, timeout or any other non-HTTP failure.
    #[error("transport failure: {0}")]
    Transport(#[source] TransportError),

    /// Any other non-2xx status.
    #[error("unexpected HTTP status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// A 2xx response whose body did not have the expected shape.
    #[error("cannot decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The request payload could not be serialized to JSON.
    #[error("cannot encode request: {0}")]
    Encode(#[source] serde_json::Error),
}

/// A failed operation, annotated with what was being attempted.
#[derive(Debug)]
pub struct ApiError {
    operation: String,
    target: Option<String>,
    kind: ErrorKind,
}

impl ApiError {
    pub fn new(operation: impl Into<String>, target: Option<&str>, kind: ErrorKind) -> Self {
        Self {
            operation: operation.into(),
            target: target.filter(|t| !t.is_empty()).map(str::to_string),
            kind,
        }
    }

    /// Local validation failure with the collected messages.
    pub fn invalid(operation: impl Into<String>, target: Option<&str>, messages: Vec<String>) -> Self {
        Self::new(operation, target, ErrorKind::InvalidInput(Detail::Validation(messages)))
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::NotFound(_))
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.kind, ErrorKind::Unauthorized(_))
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidInput(_))
    }

    /// The decoded problem document, if the server sent one.
    pub fn problem(&self) -> Option<&Problem> {
        match &self.kind {
            ErrorKind::InvalidInput(Detail::Problem(p))
            | ErrorKind::Unauthorized(Detail::Problem(p))
            | ErrorKind::NotFound(Detail::Problem(p))
            | ErrorKind::Unprocessable(Detail::Problem(p)) => Some(p),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Some(target) => write!(f, "{} {}: {}", self.operation, target, self.kind),
            None => write!(f, "{}: {}", self.operation, self.kind),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.kind)
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
