//! Blocking client: `Api` plus a `Transport`, a bearer token and the
//! diagnostics of the last call.
//!
//! # Design
//! One call is one round-trip: authorize the built request, execute it once,
//! parse the response. There is no retry. `list_all` and `children` make
//! one such call per page. The diagnostics slot is overwritten
//! by every call through a `RefCell`, so a `Client` is not `Sync`; share it
//! across threads only with external synchronization, or give each thread its
//! own client.

use std::cell::RefCell;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::api::Api;
use crate::codec::Page;
use crate::config::ClientConfig;
use crate::diagnostics::Diagnostics;
use crate::error::{ApiError, ErrorKind, Result};
use crate::http::{HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::routes::{Media, Operation, ResourceKind, SEARCH_PATH};
use crate::types::{Deletable, Item, Metrics, Resource, ToMany, ToOne, Writable};

pub struct Client<T: Transport = UreqTransport> {
    api: Api,
    transport: T,
    token: Option<String>,
    diagnostics: RefCell<Diagnostics>,
}

impl Client<UreqTransport> {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self::with_transport(base_url, UreqTransport::new(timeout))
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_url, config.timeout())
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            api: Api::new(base_url),
            transport,
            token: None,
            diagnostics: RefCell::new(Diagnostics::default()),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn api(&self) -> &Api {
        &self.api
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Use an already issued token instead of calling `authenticate`.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Snapshot of the last round-trip.
    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics.borrow().clone()
    }

    pub fn dump(&self, verbose: bool) -> String {
        self.diagnostics.borrow().dump(verbose)
    }

    fn execute(&self, operation: &str, target: Option<&str>, request: HttpRequest) -> Result<HttpResponse> {
        let request = self.api.authorize(request, self.token.as_deref());
        let mut capture = Diagnostics {
            request: Some(request.clone()),
            ..Diagnostics::default()
        };
        let started = Instant::now();
        let result = self.transport.execute(&request);
        let elapsed = started.elapsed();
        let outcome = match result {
            Ok(response) => {
                debug!(
                    method = request.method.as_str(),
                    url = %request.url,
                    status = response.status,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "{operation}"
                );
                capture.response = Some(response.clone());
                Ok(response)
            }
            Err(err) => {
                debug!(method = request.method.as_str(), url = %request.url, error = %err, "{operation} failed");
                capture.error = Some(err.to_string());
                Err(ApiError::new(operation, target, ErrorKind::Transport(err)))
            }
        };
        *self.diagnostics.borrow_mut() = capture;
        outcome
    }

    /// Request page 1, 2, ... until a page has no `next` link or comes back
    /// empty.
    fn every_page<R: DeserializeOwned>(
        &self,
        operation: &str,
        target: Option<&str>,
        build: impl Fn(&[String]) -> Result<HttpRequest>,
    ) -> Result<Vec<R>> {
        let mut members = Vec::new();
        let mut number = 1;
        loop {
            let query: Vec<String> = if number == 1 { Vec::new() } else { vec![format!("page={number}")] };
            let page: Page<R> = self.run(operation, target, build(&query), Api::parse_page)?;
            let more = page.next.is_some() && !page.members.is_empty();
            members.extend(page.members);
            if !more {
                return Ok(members);
            }
            number += 1;
        }
    }

    /// Build, execute and parse one call.
    fn run<O>(
        &self,
        operation: &str,
        target: Option<&str>,
        request: Result<HttpRequest>,
        parse: impl FnOnce(&Api, &str, Option<&str>, &HttpResponse) -> Result<O>,
    ) -> Result<O> {
        let request = request?;
        let response = self.execute(operation, target, request)?;
        let parsed = parse(&self.api, operation, target, &response);
        if let Err(err) = &parsed {
            self.diagnostics.borrow_mut().problem = err.problem().cloned();
        }
        parsed
    }

    /// Exchange credentials for a token, store it for subsequent calls and
    /// return it.
    pub fn authenticate(&mut self, username: &str, password: &str) -> Result<String> {
        let request = self.api.build_authenticate(username, password);
        let token = self.run("authenticate", Some(username), request, |api, _, _, response| {
            api.parse_token(response)
        })?;
        debug!(username, "authenticated");
        self.token = Some(token.clone());
        Ok(token)
    }

    /// Create `value`, returning the server's copy with its identifier.
    pub fn create<R: Writable>(&self, value: &R) -> Result<R> {
        let operation = Operation::Create.describe(R::KIND);
        self.run(&operation, None, self.api.build_create(value), Api::parse_one)
    }

    pub fn get<R: Resource>(&self, id: &str) -> Result<R> {
        let operation = Operation::Get.describe(R::KIND);
        self.run(&operation, Some(id), self.api.build_get(R::KIND, id), Api::parse_one)
    }

    /// One page of resources. `params` are `key=value` fragments such as
    /// `page=2`; pages are not followed automatically.
    pub fn list<R: Resource, S: AsRef<str>>(&self, params: &[S]) -> Result<Vec<R>> {
        let operation = Operation::List.describe(R::KIND);
        self.run(&operation, None, self.api.build_list(R::KIND, params), Api::parse_list)
    }

    /// Every resource of a kind, following the server's pagination.
    pub fn list_all<R: Resource>(&self) -> Result<Vec<R>> {
        let operation = Operation::List.describe(R::KIND);
        self.every_page(&operation, None, |query| self.api.build_list(R::KIND, query))
    }

    /// Replace the resource `id` with `value`.
    pub fn update<R: Writable>(&self, id: &str, value: &R) -> Result<R> {
        let operation = Operation::Update.describe(R::KIND);
        self.run(&operation, Some(id), self.api.build_update(id, value), Api::parse_one)
    }

    /// Merge `patch` into the resource `id`.
    pub fn patch<R: Writable, P: Serialize + ?Sized>(&self, id: &str, patch: &P) -> Result<R> {
        let operation = Operation::Patch.describe(R::KIND);
        self.run(&operation, Some(id), self.api.build_patch(R::KIND, id, patch), Api::parse_one)
    }

    pub fn delete<R: Deletable>(&self, id: &str) -> Result<()> {
        self.delete_kind(R::KIND, id)
    }

    pub(crate) fn delete_kind(&self, kind: ResourceKind, id: &str) -> Result<()> {
        let operation = Operation::Delete.describe(kind);
        self.run(&operation, Some(id), self.api.build_delete(kind, id), Api::parse_empty)
    }

    /// List the `relation` sub-collection of the parent `id`.
    pub fn list_related<P: Resource, C: Resource, S: AsRef<str>>(
        &self,
        relation: ToMany<P, C>,
        id: &str,
        params: &[S],
    ) -> Result<Vec<C>> {
        let operation = Operation::ListRelation(relation.relation).describe(P::KIND);
        let request = self.api.build_list_related(P::KIND, id, relation.relation, params);
        self.run(&operation, Some(id), request, Api::parse_list)
    }

    /// Every member of the `relation` sub-collection of `id`, across pages.
    pub fn children<P: Resource, C: Resource>(&self, relation: ToMany<P, C>, id: &str) -> Result<Vec<C>> {
        let operation = Operation::ListRelation(relation.relation).describe(P::KIND);
        self.every_page(&operation, Some(id), |query| {
            self.api.build_list_related(P::KIND, id, relation.relation, query)
        })
    }

    /// Fetch the singleton `relation` of `id`.
    pub fn get_related<P: Resource, R: Resource>(&self, relation: ToOne<P, R>, id: &str) -> Result<R> {
        let operation = Operation::GetRelation(relation.relation).describe(P::KIND);
        let request = self.api.build_get_related(P::KIND, id, relation.relation);
        self.run(&operation, Some(id), request, Api::parse_one)
    }

    /// Attach `bytes` as `media` to the resource `id`, returning the updated
    /// resource.
    pub fn upload<R: Resource>(&self, id: &str, media: Media, bytes: &[u8]) -> Result<R> {
        let operation = Operation::Upload(media).describe(R::KIND);
        let request = self.api.build_upload(R::KIND, id, media, bytes);
        self.run(&operation, Some(id), request, Api::parse_one)
    }

    pub fn upload_image<R: Resource>(&self, id: &str, bytes: &[u8]) -> Result<R> {
        self.upload(id, Media::Image, bytes)
    }

    /// Search items with `key=value` query fragments.
    pub fn search_items<S: AsRef<str>>(&self, params: &[S]) -> Result<Vec<Item>> {
        let operation = format!("search {SEARCH_PATH}");
        self.run(&operation, None, Ok(self.api.build_search(params)), Api::parse_list)
    }

    pub fn metrics(&self) -> Result<Metrics> {
        self.run("get metrics", None, self.api.build_metrics(), Api::parse_one)
    }
}
