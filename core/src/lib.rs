//! Synchronous client for the Koillection collection-manager REST API.
//!
//! # Overview
//! `Api` builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network. `Client` pairs it with a `Transport` (ureq by
//! default), keeps the bearer token and records the last round-trip for
//! troubleshooting. On top of the client sit the cascade deleter
//! (`cascade::delete_everything`) and the datum index (`DatumIndex`).
//!
//! # Design
//! - The (kind, operation) to (method, path) mapping is one table, `routes::route`.
//! - Capabilities are marker traits: `Resource`, `Writable`, `Deletable`.
//!   Relations are typed constants such as `Item::LOANS`.
//! - Writes are validated locally first, so invalid input never reaches the
//!   network.
//! - Resource types are defined independently from the mock-server crate;
//!   integration tests catch schema drift.

pub mod api;
pub mod cascade;
pub mod client;
pub mod codec;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod http;
pub mod index;
pub mod routes;
pub mod types;
pub mod validate;

pub use api::Api;
pub use cascade::{delete_everything, CascadeError, CascadeFailure};
pub use client::Client;
pub use config::ClientConfig;
pub use diagnostics::Diagnostics;
pub use error::{ApiError, Detail, ErrorKind, Problem, Result, Violation};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use index::DatumIndex;
pub use routes::{Media, Operation, ResourceKind};
pub use types::*;
pub use validate::Validate;
