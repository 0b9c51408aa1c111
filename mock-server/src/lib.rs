//! In-process stand-in for a Koillection server, used by integration tests
//! and for local experiments.
//!
//! Speaks JSON-LD with Hydra list envelopes, issues bearer tokens, enforces
//! required fields (422) and referential integrity on delete (409), and answers
//! every 4xx with a problem document.

mod schema;
mod store;

use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub use schema::Media;
pub use store::{Page, Problem, Related, Store, Violation, PAGE_SIZE};

pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "koillection";

const JSON_LD: &str = "application/ld+json; charset=utf-8";

/// Shared handle on the store; clone it to inspect state from tests.
#[derive(Clone)]
pub struct MockState {
    store: Arc<RwLock<Store>>,
}

impl MockState {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            store: Arc::new(RwLock::new(Store::new(username, password))),
        }
    }

    /// Seed an inventory. Call before the state is shared with a server.
    pub fn with_inventory(self, name: &str, content: Value) -> Self {
        if let Ok(mut store) = self.store.try_write() {
            store.insert_inventory(name, content);
        }
        self
    }

    pub async fn count(&self, base: &str) -> usize {
        self.store.read().await.count(base)
    }
}

impl Default for MockState {
    fn default() -> Self {
        Self::new(DEFAULT_USERNAME, DEFAULT_PASSWORD)
    }
}

pub fn app() -> Router {
    app_with_state(MockState::default())
}

pub fn app_with_state(state: MockState) -> Router {
    let protected = Router::new()
        .route("/api/metrics", get(metrics))
        .route("/search", get(search))
        .route("/api/{base}", get(list).post(create))
        .route("/api/{base}/{id}", get(fetch).put(replace).patch(merge).delete(remove))
        .route("/api/{base}/{id}/{relation}", get(related).post(upload))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));
    Router::new()
        .route("/api/authentication_token", post(authenticate))
        .merge(protected)
        .fallback(|| async { Problem::not_found("no such route") })
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_state(listener, MockState::default()).await
}

pub async fn run_with_state(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

async fn require_token(State(state): State<MockState>, request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);
    let Some(token) = token else {
        return Problem::new(StatusCode::UNAUTHORIZED, "JWT Token not found").into_response();
    };
    if !state.store.read().await.is_authorized(&token) {
        return Problem::new(StatusCode::UNAUTHORIZED, "Invalid JWT Token").into_response();
    }
    next.run(request).await
}

fn ld(status: StatusCode, body: Value) -> Response {
    (status, [(header::CONTENT_TYPE, JSON_LD)], body.to_string()).into_response()
}

/// A Hydra collection. A `view` with page links is added when the listing
/// spans more than one page.
fn envelope(path: &str, params: &HashMap<String, String>, page: Page) -> Response {
    let mut body = json!({
        "@context": "/api/contexts/hydra",
        "@id": path,
        "@type": "hydra:Collection",
        "totalItems": page.total,
        "member": page.members,
    });
    if page.next.is_some() || page.number > 1 {
        let link = |number: usize| page_link(path, params, number);
        let mut view = json!({
            "@id": link(page.number),
            "@type": "hydra:PartialCollectionView",
        });
        if let Some(next) = page.next {
            view["next"] = Value::String(link(next));
        }
        if page.number > 1 {
            view["previous"] = Value::String(link(page.number - 1));
        }
        body["view"] = view;
    }
    ld(StatusCode::OK, body)
}

/// `path` with the request's query and `page` set to `number`, keys sorted.
fn page_link(path: &str, params: &HashMap<String, String>, number: usize) -> String {
    let mut pairs: Vec<(&str, String)> = params
        .iter()
        .filter(|(key, _)| key.as_str() != "page")
        .map(|(key, value)| (key.as_str(), value.clone()))
        .collect();
    pairs.push(("page", number.to_string()));
    pairs.sort();
    let query: Vec<String> = pairs.iter().map(|(key, value)| format!("{key}={value}")).collect();
    format!("{path}?{}", query.join("&"))
}

fn parse(body: &Bytes) -> Result<Value, Problem> {
    serde_json::from_slice(body).map_err(|e| Problem::new(StatusCode::BAD_REQUEST, format!("Syntax error: {e}")))
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

async fn authenticate(State(state): State<MockState>, body: Bytes) -> Result<Response, Problem> {
    let credentials: Credentials = serde_json::from_slice(&body)
        .map_err(|e| Problem::new(StatusCode::BAD_REQUEST, format!("Invalid credentials payload: {e}")))?;
    let token = state
        .store
        .write()
        .await
        .authenticate(&credentials.username, &credentials.password)
        .ok_or_else(|| Problem::new(StatusCode::UNAUTHORIZED, "Invalid credentials."))?;
    Ok(ld(StatusCode::OK, json!({ "token": token })))
}

async fn list(
    State(state): State<MockState>,
    Path(base): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, Problem> {
    let page = state.store.read().await.list(&base, &params)?;
    Ok(envelope(&format!("/api/{base}"), &params, page))
}

async fn create(State(state): State<MockState>, Path(base): Path<String>, body: Bytes) -> Result<Response, Problem> {
    let created = state.store.write().await.create(&base, parse(&body)?)?;
    Ok(ld(StatusCode::CREATED, created))
}

async fn fetch(State(state): State<MockState>, Path((base, id)): Path<(String, String)>) -> Result<Response, Problem> {
    Ok(ld(StatusCode::OK, state.store.read().await.get(&base, &id)?))
}

async fn replace(
    State(state): State<MockState>,
    Path((base, id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Response, Problem> {
    let updated = state.store.write().await.replace(&base, &id, parse(&body)?)?;
    Ok(ld(StatusCode::OK, updated))
}

async fn merge(
    State(state): State<MockState>,
    Path((base, id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Response, Problem> {
    let updated = state.store.write().await.merge(&base, &id, parse(&body)?)?;
    Ok(ld(StatusCode::OK, updated))
}

async fn remove(State(state): State<MockState>, Path((base, id)): Path<(String, String)>) -> Result<StatusCode, Problem> {
    state.store.write().await.delete(&base, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn related(
    State(state): State<MockState>,
    Path((base, id, relation)): Path<(String, String, String)>,
) -> Result<Response, Problem> {
    match state.store.read().await.related(&base, &id, &relation)? {
        Related::One(value) => Ok(ld(StatusCode::OK, value)),
        Related::Many(members) => {
            let path = format!("/api/{base}/{id}/{relation}");
            Ok(envelope(&path, &HashMap::new(), Page::whole(members)))
        }
    }
}

async fn upload(
    State(state): State<MockState>,
    Path((base, id, segment)): Path<(String, String, String)>,
    mut multipart: Multipart,
) -> Result<Response, Problem> {
    let media = Media::from_segment(&segment).ok_or_else(|| Problem::not_found(format!("no upload named {segment}")))?;
    let expected = media.field_name(&base);
    let mut size = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Problem::new(StatusCode::BAD_REQUEST, e.to_string()))?
    {
        let wanted = field.name() == Some(expected);
        if wanted {
            let bytes = field.bytes().await.map_err(|e| Problem::new(StatusCode::BAD_REQUEST, e.to_string()))?;
            size = Some(bytes.len());
        }
    }
    let Some(size) = size else {
        return Err(Problem::invalid(vec![Violation {
            property_path: expected.to_string(),
            message: "No file was uploaded.".into(),
        }]));
    };
    let updated = state.store.write().await.upload(&base, &id, media, size)?;
    Ok(ld(StatusCode::CREATED, updated))
}

async fn search(State(state): State<MockState>, Query(params): Query<HashMap<String, String>>) -> Response {
    let page = state.store.read().await.search(&params);
    envelope("/search", &params, page)
}

async fn metrics(State(state): State<MockState>) -> Response {
    ld(StatusCode::OK, state.store.read().await.metrics())
}
