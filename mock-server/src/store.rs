//! In-memory resource store with the server's validation and
//! referential-integrity rules.

use std::collections::{HashMap, HashSet};

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::schema::{self, Kind, Media};

/// Keys the server owns; never taken from a request body.
const SERVER_FIELDS: &[&str] = &[
    "id",
    "owner",
    "createdAt",
    "updatedAt",
    "image",
    "imageSmallThumbnail",
    "imageLargeThumbnail",
    "file",
    "video",
    "originalFilename",
    "seenCounter",
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub property_path: String,
    pub message: String,
}

/// Problem document returned for every 4xx.
#[derive(Debug, Serialize)]
pub struct Problem {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub status: u16,
    pub title: &'static str,
    pub detail: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

impl Problem {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        let title = match status {
            StatusCode::UNPROCESSABLE_ENTITY => "An error occurred",
            other => other.canonical_reason().unwrap_or("Error"),
        };
        Self {
            kind: "hydra:Error",
            status: status.as_u16(),
            title,
            detail: detail.into(),
            violations: Vec::new(),
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }

    pub fn invalid(violations: Vec<Violation>) -> Self {
        let detail = violations
            .iter()
            .map(|v| format!("{}: {}", v.property_path, v.message))
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            violations,
            ..Self::new(StatusCode::UNPROCESSABLE_ENTITY, detail)
        }
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, "application/problem+json")], Json(self)).into_response()
    }
}

pub enum Related {
    One(Value),
    Many(Vec<Value>),
}

pub struct Store {
    username: String,
    password: String,
    user_iri: String,
    tokens: HashSet<String>,
    rows: HashMap<&'static str, Vec<Value>>,
}

pub fn iri(base: &str, id: &str) -> String {
    format!("/api/{base}/{id}")
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(_) => false,
    }
}

fn points_at(value: Option<&Value>, target: &str) -> bool {
    match value {
        Some(Value::String(s)) => s == target,
        Some(Value::Array(a)) => a.iter().any(|v| v.as_str() == Some(target)),
        _ => false,
    }
}

fn id_of(row: &Value) -> &str {
    row.get("id").and_then(Value::as_str).unwrap_or_default()
}

fn lookup(kind: &str) -> Result<&'static Kind, Problem> {
    schema::kind(kind).ok_or_else(|| Problem::not_found(format!("no route for /api/{kind}")))
}

/// Client-supplied fields of a write body.
fn write_fields(body: Value) -> Result<Map<String, Value>, Problem> {
    let Value::Object(mut map) = body else {
        return Err(Problem::new(StatusCode::BAD_REQUEST, "request body must be a JSON object"));
    };
    map.retain(|key, _| !key.starts_with('@') && !SERVER_FIELDS.contains(&key.as_str()));
    Ok(map)
}

fn apply_delete_image(map: &mut Map<String, Value>) {
    if map.remove("deleteImage").and_then(|v| v.as_bool()) == Some(true) {
        for key in ["image", "imageSmallThumbnail", "imageLargeThumbnail"] {
            map.remove(key);
        }
    }
}

impl Store {
    pub fn new(username: &str, password: &str) -> Self {
        let user_id = Uuid::new_v4().to_string();
        let user_iri = iri("users", &user_id);
        let user = json!({
            "@context": "/api/contexts/User",
            "@id": user_iri,
            "@type": "User",
            "id": user_id,
            "username": username,
            "email": format!("{username}@koillection.test"),
            "currency": "EUR",
            "locale": "en",
            "timezone": "UTC",
            "dateFormat": "Y-m-d",
            "diskSpaceAllowed": 536870912,
            "roles": ["ROLE_USER", "ROLE_ADMIN"],
            "visibility": "private",
            "enabled": true,
            "createdAt": now(),
        });
        let mut rows = HashMap::new();
        rows.insert("users", vec![user]);
        Self {
            username: username.to_string(),
            password: password.to_string(),
            user_iri,
            tokens: HashSet::new(),
            rows,
        }
    }

    pub fn authenticate(&mut self, username: &str, password: &str) -> Option<String> {
        if username != self.username || password != self.password {
            return None;
        }
        let token = Uuid::new_v4().simple().to_string();
        self.tokens.insert(token.clone());
        Some(token)
    }

    pub fn is_authorized(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    fn table(&self, base: &str) -> &[Value] {
        self.rows.get(base).map(Vec::as_slice).unwrap_or_default()
    }

    fn find(&self, base: &str, id: &str) -> Option<&Value> {
        self.table(base).iter().find(|row| id_of(row) == id)
    }

    fn find_mut(&mut self, base: &str, id: &str) -> Option<&mut Value> {
        self.rows.get_mut(base)?.iter_mut().find(|row| id_of(row) == id)
    }

    /// Resolve a reference (`/api/<base>/<id>` or a bare id) into `base`.
    fn resolve(&self, base: &str, reference: &str) -> Option<&Value> {
        let prefix = format!("/api/{base}/");
        let id = reference.strip_prefix(&prefix).unwrap_or(reference);
        self.find(base, id)
    }

    pub fn list(&self, base: &str, filters: &HashMap<String, String>) -> Result<Page, Problem> {
        lookup(base)?;
        let rows = self
            .table(base)
            .iter()
            .filter(|row| {
                filters.iter().all(|(key, expected)| {
                    if key == "page" || key == "itemsPerPage" || key.starts_with("order") {
                        return true;
                    }
                    match row.get(key) {
                        Some(Value::String(s)) => s == expected,
                        Some(v @ (Value::Number(_) | Value::Bool(_))) => v.to_string() == *expected,
                        _ => false,
                    }
                })
            })
            .cloned()
            .collect();
        Ok(paginate(rows, filters))
    }

    pub fn get(&self, base: &str, id: &str) -> Result<Value, Problem> {
        let kind = lookup(base)?;
        self.find(base, id)
            .cloned()
            .ok_or_else(|| Problem::not_found(format!("{} \"{id}\" not found", kind.type_name)))
    }

    fn check(&self, kind: &Kind, map: &Map<String, Value>) -> Result<(), Problem> {
        let mut violations = Vec::new();
        for field in kind.required {
            if is_blank(map.get(*field)) {
                violations.push(Violation {
                    property_path: field.to_string(),
                    message: "This value should not be blank.".into(),
                });
            }
        }
        let scalar = kind.refs.iter().filter_map(|(field, target)| {
            map.get(*field).and_then(Value::as_str).filter(|s| !s.is_empty()).map(|r| (*field, *target, r))
        });
        let listed = kind.list_refs.iter().flat_map(|(field, target)| {
            map.get(*field)
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(Value::as_str)
                .map(move |r| (*field, *target, r))
        });
        for (field, target, reference) in scalar.chain(listed) {
            if self.resolve(target, reference).is_none() {
                violations.push(Violation {
                    property_path: field.to_string(),
                    message: format!("Item \"{reference}\" not found."),
                });
            }
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Problem::invalid(violations))
        }
    }

    pub fn create(&mut self, base: &str, body: Value) -> Result<Value, Problem> {
        let kind = writable(base)?;
        let mut fields = write_fields(body)?;
        apply_delete_image(&mut fields);
        if kind.base == "items" && is_blank(fields.get("quantity")) {
            fields.insert("quantity".into(), json!(1));
        }
        self.check(kind, &fields)?;

        let id = Uuid::new_v4().to_string();
        let mut row = Map::new();
        row.insert("@context".into(), json!(format!("/api/contexts/{}", kind.type_name)));
        row.insert("@id".into(), json!(iri(base, &id)));
        row.insert("@type".into(), json!(kind.type_name));
        row.insert("id".into(), json!(id));
        row.extend(fields);
        row.insert("owner".into(), json!(self.user_iri));
        row.insert("createdAt".into(), json!(now()));
        let row = Value::Object(row);

        self.log_creation(kind, &row);
        self.rows.entry(kind.base).or_default().push(row.clone());
        Ok(row)
    }

    fn log_creation(&mut self, kind: &Kind, row: &Value) {
        let id = Uuid::new_v4().to_string();
        let label = row.get(kind.label_field).and_then(Value::as_str).unwrap_or_default();
        let entry = json!({
            "@context": "/api/contexts/Log",
            "@id": iri("logs", &id),
            "@type": "Log",
            "id": id,
            "type": "create",
            "loggedAt": now(),
            "objectId": id_of(row),
            "objectLabel": label,
            "objectClass": format!("App\\Entity\\{}", kind.type_name),
            "objectDeleted": false,
            "owner": self.user_iri,
        });
        self.rows.entry("logs").or_default().push(entry);
    }

    /// Full replace: every client field comes from `body`.
    pub fn replace(&mut self, base: &str, id: &str, body: Value) -> Result<Value, Problem> {
        let kind = writable(base)?;
        let current = self.get(base, id)?;
        let fields = write_fields(body)?;
        self.check(kind, &fields)?;

        let mut row: Map<String, Value> = match current {
            Value::Object(map) => map
                .into_iter()
                .filter(|(key, _)| key.starts_with('@') || SERVER_FIELDS.contains(&key.as_str()))
                .collect(),
            _ => Map::new(),
        };
        row.extend(fields);
        apply_delete_image(&mut row);
        self.store(base, id, row)
    }

    /// JSON merge patch: `null` removes a field.
    pub fn merge(&mut self, base: &str, id: &str, patch: Value) -> Result<Value, Problem> {
        let kind = writable(base)?;
        let current = self.get(base, id)?;
        let patch = write_fields(patch)?;
        let mut row = match current {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in patch {
            if value.is_null() {
                row.remove(&key);
            } else {
                row.insert(key, value);
            }
        }
        apply_delete_image(&mut row);
        self.check(kind, &row)?;
        self.store(base, id, row)
    }

    fn store(&mut self, base: &str, id: &str, mut row: Map<String, Value>) -> Result<Value, Problem> {
        row.insert("updatedAt".into(), json!(now()));
        let row = Value::Object(row);
        let slot = self
            .find_mut(base, id)
            .ok_or_else(|| Problem::not_found(format!("\"{id}\" not found")))?;
        *slot = row.clone();
        Ok(row)
    }

    /// Refuse while a scalar reference still points at the resource, then
    /// unlink it from list references and remove it.
    pub fn delete(&mut self, base: &str, id: &str) -> Result<(), Problem> {
        let kind = lookup(base)?;
        if !kind.deletable {
            return Err(Problem::new(StatusCode::METHOD_NOT_ALLOWED, format!("{} cannot be deleted", kind.type_name)));
        }
        self.get(base, id)?;
        let target = iri(base, id);

        for other in schema::KINDS {
            for (field, points_into) in other.refs {
                if *points_into != base {
                    continue;
                }
                if let Some(holder) = self.table(other.base).iter().find(|row| points_at(row.get(*field), &target)) {
                    return Err(Problem::new(
                        StatusCode::CONFLICT,
                        format!(
                            "{} \"{id}\" is still referenced by {} \"{}\" ({field})",
                            kind.type_name,
                            other.type_name,
                            id_of(holder)
                        ),
                    ));
                }
            }
        }

        for other in schema::KINDS {
            for (field, points_into) in other.list_refs {
                if *points_into != base {
                    continue;
                }
                for row in self.rows.get_mut(other.base).into_iter().flatten() {
                    if let Some(Value::Array(list)) = row.get_mut(*field) {
                        list.retain(|v| v.as_str() != Some(target.as_str()));
                    }
                }
            }
        }

        for log in self.rows.get_mut("logs").into_iter().flatten() {
            if log.get("objectId").and_then(Value::as_str) == Some(id) {
                log["objectDeleted"] = json!(true);
            }
        }
        if let Some(rows) = self.rows.get_mut(base) {
            rows.retain(|row| id_of(row) != id);
        }
        Ok(())
    }

    pub fn related(&self, base: &str, id: &str, relation: &str) -> Result<Related, Problem> {
        let kind = lookup(base)?;
        let row = self.get(base, id)?;
        let field = schema::camel_case(relation);

        if let Some((_, target)) = kind.refs.iter().find(|(f, _)| *f == field) {
            let reference = row
                .get(&field)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| Problem::not_found(format!("{} \"{id}\" has no {relation}", kind.type_name)))?;
            return self
                .resolve(target, reference)
                .cloned()
                .map(Related::One)
                .ok_or_else(|| Problem::not_found(format!("\"{reference}\" not found")));
        }
        if let Some((_, target)) = kind.list_refs.iter().find(|(f, _)| *f == field) {
            let members = row
                .get(&field)
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(Value::as_str)
                .filter_map(|reference| self.resolve(target, reference).cloned())
                .collect();
            return Ok(Related::Many(members));
        }
        if let Some((child, child_field)) = schema::reverse_relation(base, relation) {
            let parent = iri(base, id);
            let members = self
                .table(child)
                .iter()
                .filter(|r| points_at(r.get(child_field), &parent))
                .cloned()
                .collect();
            return Ok(Related::Many(members));
        }
        Err(Problem::not_found(format!("{} has no relation {relation}", kind.type_name)))
    }

    /// Attach an uploaded file, publishing its URL on the resource.
    pub fn upload(&mut self, base: &str, id: &str, media: Media, size: usize) -> Result<Value, Problem> {
        let kind = lookup(base)?;
        if !kind.media.contains(&media) {
            return Err(Problem::not_found(format!("{} has no {} upload", kind.type_name, media.segment())));
        }
        if size == 0 {
            return Err(Problem::invalid(vec![Violation {
                property_path: media.field_name(base).into(),
                message: "The file is empty.".into(),
            }]));
        }
        let Value::Object(mut row) = self.get(base, id)? else {
            return Err(Problem::not_found(format!("\"{id}\" not found")));
        };
        let url = format!("/uploads/{base}/{id}/{}", media.segment());
        match media {
            Media::Image => {
                row.insert("image".into(), json!(url));
                row.insert("imageSmallThumbnail".into(), json!(format!("{url}-small")));
                row.insert("imageLargeThumbnail".into(), json!(format!("{url}-large")));
            }
            Media::File => {
                row.insert("file".into(), json!(url));
                row.insert("originalFilename".into(), json!("file"));
            }
            Media::Video => {
                row.insert("video".into(), json!(url));
            }
        }
        self.store(base, id, row)
    }

    /// Items whose name contains `name` (or `term`), case-insensitively.
    pub fn search(&self, params: &HashMap<String, String>) -> Page {
        let needle = params.get("name").or_else(|| params.get("term")).map(|s| s.to_lowercase());
        let rows = self
            .table("items")
            .iter()
            .filter(|row| match &needle {
                None => true,
                Some(needle) => row
                    .get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|name| name.to_lowercase().contains(needle)),
            })
            .cloned()
            .collect();
        paginate(rows, params)
    }

    pub fn metrics(&self) -> Value {
        let counts: Map<String, Value> = schema::KINDS
            .iter()
            .filter(|k| k.base != "logs")
            .map(|k| (k.base.to_string(), json!(self.table(k.base).len().to_string())))
            .collect();
        Value::Object(counts)
    }

    pub fn insert_inventory(&mut self, name: &str, content: Value) -> String {
        let id = Uuid::new_v4().to_string();
        let row = json!({
            "@context": "/api/contexts/Inventory",
            "@id": iri("inventories", &id),
            "@type": "Inventory",
            "id": id,
            "name": name,
            "content": content,
            "owner": self.user_iri,
            "createdAt": now(),
        });
        self.rows.entry("inventories").or_default().push(row);
        id
    }

    pub fn count(&self, base: &str) -> usize {
        self.table(base).len()
    }
}

fn writable(base: &str) -> Result<&'static Kind, Problem> {
    let kind = lookup(base)?;
    if kind.writable {
        Ok(kind)
    } else {
        Err(Problem::new(StatusCode::METHOD_NOT_ALLOWED, format!("{} is read-only", kind.type_name)))
    }
}

/// Page size when the request does not set `itemsPerPage`.
pub const PAGE_SIZE: usize = 30;

/// One page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub members: Vec<Value>,
    pub total: usize,
    pub number: usize,
    /// Number of the following page, when rows remain after this one.
    pub next: Option<usize>,
}

impl Page {
    /// Everything on one page.
    pub fn whole(members: Vec<Value>) -> Self {
        Self {
            total: members.len(),
            members,
            number: 1,
            next: None,
        }
    }
}

fn paginate(rows: Vec<Value>, params: &HashMap<String, String>) -> Page {
    let per_page = params
        .get("itemsPerPage")
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(PAGE_SIZE);
    let number = params.get("page").and_then(|v| v.parse::<usize>().ok()).unwrap_or(1).max(1);
    let total = rows.len();
    let start = (number - 1).saturating_mul(per_page);
    let members = rows.into_iter().skip(start).take(per_page).collect();
    Page {
        members,
        total,
        number,
        next: (start.saturating_add(per_page) < total).then_some(number + 1),
    }
}
