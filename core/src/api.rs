//! Stateless HTTP request builder and response parser for the Koillection API.
//!
//! # Design
//! `Api` holds only a `base_url`. Each call is split into a `build_*` method
//! producing an `HttpRequest` and a `parse_*` method consuming the
//! `HttpResponse`, so the I/O boundary stays explicit and every step can be
//! tested without a server. Writes are validated while building: an invalid
//! value never becomes a request.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::codec::{self, Multipart, Page};
use crate::error::{ApiError, Detail, ErrorKind, Problem};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::routes::{self, Media, Operation, ResourceKind, Route, RouteError, AUTHENTICATION_PATH, SEARCH_PATH};
use crate::types::Writable;

const JSON: &str = "application/json";
const MERGE_PATCH: &str = "application/merge-patch+json";

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

/// Synchronous, stateless builder and parser for the Koillection API.
#[derive(Debug, Clone)]
pub struct Api {
    base_url: String,
}

impl Api {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: HttpMethod, path: &str, query: &str, body: Option<(&str, Vec<u8>)>) -> HttpRequest {
        let mut headers = vec![("accept".to_string(), JSON.to_string())];
        let body = body.map(|(content_type, bytes)| {
            headers.push(("content-type".to_string(), content_type.to_string()));
            bytes
        });
        HttpRequest {
            method,
            url: format!("{}{path}{query}", self.base_url),
            headers,
            body,
        }
    }

    fn resolve(&self, kind: ResourceKind, operation: Operation, id: Option<&str>) -> Result<Route, ApiError> {
        routes::route(kind, operation, id).map_err(|err| {
            let message = match err {
                RouteError::Unsupported => format!("{} is not supported", operation.describe(kind)),
                RouteError::MissingId => "identifier is required".to_string(),
            };
            ApiError::invalid(operation.describe(kind), id, vec![message])
        })
    }

    /// Attach the bearer token, except on the authentication endpoint.
    pub fn authorize(&self, mut request: HttpRequest, token: Option<&str>) -> HttpRequest {
        let auth_url = format!("{}{AUTHENTICATION_PATH}", self.base_url);
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            if request.url != auth_url {
                request.headers.push(("authorization".to_string(), format!("Bearer {token}")));
            }
        }
        request
    }

    pub fn build_authenticate(&self, username: &str, password: &str) -> Result<HttpRequest, ApiError> {
        let body = codec::encode(&Credentials { username, password })
            .map_err(|e| ApiError::new("authenticate", None, ErrorKind::Encode(e)))?;
        Ok(self.request(HttpMethod::Post, AUTHENTICATION_PATH, "", Some((JSON, body))))
    }

    pub fn build_create<T: Writable>(&self, value: &T) -> Result<HttpRequest, ApiError> {
        let operation = Operation::Create;
        let route = self.resolve(T::KIND, operation, None)?;
        let body = validated_body(T::KIND, operation, None, value)?;
        Ok(self.request(route.method, &route.path, "", Some((JSON, body))))
    }

    pub fn build_get(&self, kind: ResourceKind, id: &str) -> Result<HttpRequest, ApiError> {
        let route = self.resolve(kind, Operation::Get, Some(id))?;
        Ok(self.request(route.method, &route.path, "", None))
    }

    pub fn build_list<S: AsRef<str>>(&self, kind: ResourceKind, params: &[S]) -> Result<HttpRequest, ApiError> {
        let route = self.resolve(kind, Operation::List, None)?;
        Ok(self.request(route.method, &route.path, &codec::query_string(params), None))
    }

    /// Full replace of the resource `id` with `value`.
    pub fn build_update<T: Writable>(&self, id: &str, value: &T) -> Result<HttpRequest, ApiError> {
        let operation = Operation::Update;
        let route = self.resolve(T::KIND, operation, Some(id))?;
        let body = validated_body(T::KIND, operation, Some(id), value)?;
        Ok(self.request(route.method, &route.path, "", Some((JSON, body))))
    }

    /// Partial merge of `patch` into the resource `id`. Not validated: a patch
    /// is allowed to omit required fields.
    pub fn build_patch<P: Serialize + ?Sized>(
        &self,
        kind: ResourceKind,
        id: &str,
        patch: &P,
    ) -> Result<HttpRequest, ApiError> {
        let operation = Operation::Patch;
        let route = self.resolve(kind, operation, Some(id))?;
        let body = codec::encode(patch)
            .map_err(|e| ApiError::new(operation.describe(kind), Some(id), ErrorKind::Encode(e)))?;
        Ok(self.request(route.method, &route.path, "", Some((MERGE_PATCH, body))))
    }

    pub fn build_delete(&self, kind: ResourceKind, id: &str) -> Result<HttpRequest, ApiError> {
        let route = self.resolve(kind, Operation::Delete, Some(id))?;
        Ok(self.request(route.method, &route.path, "", None))
    }

    pub fn build_list_related<S: AsRef<str>>(
        &self,
        kind: ResourceKind,
        id: &str,
        relation: &'static str,
        params: &[S],
    ) -> Result<HttpRequest, ApiError> {
        let route = self.resolve(kind, Operation::ListRelation(relation), Some(id))?;
        Ok(self.request(route.method, &route.path, &codec::query_string(params), None))
    }

    pub fn build_get_related(
        &self,
        kind: ResourceKind,
        id: &str,
        relation: &'static str,
    ) -> Result<HttpRequest, ApiError> {
        let route = self.resolve(kind, Operation::GetRelation(relation), Some(id))?;
        Ok(self.request(route.method, &route.path, "", None))
    }

    pub fn build_upload(
        &self,
        kind: ResourceKind,
        id: &str,
        media: Media,
        bytes: &[u8],
    ) -> Result<HttpRequest, ApiError> {
        let route = self.resolve(kind, Operation::Upload(media), Some(id))?;
        let framed = Multipart::single(media.field_name(kind), bytes);
        let content_type = framed.content_type();
        Ok(self.request(route.method, &route.path, "", Some((content_type.as_str(), framed.body))))
    }

    pub fn build_search<S: AsRef<str>>(&self, params: &[S]) -> HttpRequest {
        self.request(HttpMethod::Get, SEARCH_PATH, &codec::query_string(params), None)
    }

    pub fn build_metrics(&self) -> Result<HttpRequest, ApiError> {
        let route = self.resolve(ResourceKind::Metrics, Operation::List, None)?;
        Ok(self.request(route.method, &route.path, "", None))
    }

    pub fn parse_token(&self, response: &HttpResponse) -> Result<String, ApiError> {
        let parsed: TokenResponse = self.parse_one("authenticate", None, response)?;
        Ok(parsed.token)
    }

    /// Parse a single-resource body.
    pub fn parse_one<T: DeserializeOwned>(
        &self,
        operation: &str,
        target: Option<&str>,
        response: &HttpResponse,
    ) -> Result<T, ApiError> {
        check_status(operation, target, response)?;
        codec::decode(&response.body).map_err(|e| ApiError::new(operation, target, ErrorKind::Decode(e)))
    }

    /// Parse a list body, unwrapping the collection envelope.
    pub fn parse_list<T: DeserializeOwned>(
        &self,
        operation: &str,
        target: Option<&str>,
        response: &HttpResponse,
    ) -> Result<Vec<T>, ApiError> {
        check_status(operation, target, response)?;
        codec::decode_list(&response.body).map_err(|e| ApiError::new(operation, target, ErrorKind::Decode(e)))
    }

    /// Parse one page of a list body, keeping the link to the next page.
    pub fn parse_page<T: DeserializeOwned>(
        &self,
        operation: &str,
        target: Option<&str>,
        response: &HttpResponse,
    ) -> Result<Page<T>, ApiError> {
        check_status(operation, target, response)?;
        codec::decode_page(&response.body).map_err(|e| ApiError::new(operation, target, ErrorKind::Decode(e)))
    }

    /// Parse a response whose body is ignored, such as a delete.
    pub fn parse_empty(&self, operation: &str, target: Option<&str>, response: &HttpResponse) -> Result<(), ApiError> {
        check_status(operation, target, response)
    }
}

fn validated_body<T: Writable>(
    kind: ResourceKind,
    operation: Operation,
    id: Option<&str>,
    value: &T,
) -> Result<Vec<u8>, ApiError> {
    let value = value.normalized();
    value
        .validate()
        .map_err(|messages| ApiError::invalid(operation.describe(kind), id, messages))?;
    codec::encode(&*value).map_err(|e| ApiError::new(operation.describe(kind), id, ErrorKind::Encode(e)))
}

/// Map non-success status codes to the matching `ErrorKind`.
fn check_status(operation: &str, target: Option<&str>, response: &HttpResponse) -> Result<(), ApiError> {
    let kind = match response.status {
        200 | 201 | 204 => return Ok(()),
        400 => ErrorKind::InvalidInput(detail(response)),
        401 => ErrorKind::Unauthorized(detail(response)),
        404 => ErrorKind::NotFound(detail(response)),
        422 => ErrorKind::Unprocessable(detail(response)),
        status => ErrorKind::UnexpectedStatus { status, body: response.text() },
    };
    Err(ApiError::new(operation, target, kind))
}

fn detail(response: &HttpResponse) -> Detail {
    match Problem::decode(&response.body) {
        Some(problem) => Detail::Problem(problem),
        None => Detail::Raw(response.text()),
    }
}
