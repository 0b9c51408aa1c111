//! Server-generated resources: read-only through the API, except inventories
//! which can also be deleted.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{empty_as_none, null_as_default, null_as_empty, Deletable, JsonLd, Resource, Visibility};
use crate::routes::ResourceKind;

/// A stored inventory snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Inventory {
    #[serde(flatten)]
    pub ld: JsonLd,
    #[serde(skip_serializing)]
    pub id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    pub content: serde_json::Value,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub owner: Option<String>,
    #[serde(skip_serializing)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Resource for Inventory {
    const KIND: ResourceKind = ResourceKind::Inventory;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

impl Deletable for Inventory {}

/// An activity log entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Log {
    #[serde(flatten)]
    pub ld: JsonLd,
    #[serde(skip_serializing)]
    pub id: String,
    #[serde(rename = "type", deserialize_with = "null_as_empty")]
    pub kind: String,
    pub logged_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "null_as_empty")]
    pub object_id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub object_label: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub object_class: String,
    pub object_deleted: bool,
    #[serde(deserialize_with = "empty_as_none")]
    pub owner: Option<String>,
}

impl Resource for Log {
    const KIND: ResourceKind = ResourceKind::Log;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.object_label
    }
}

fn private() -> Visibility {
    Visibility::Private
}

/// An account on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    #[serde(flatten)]
    pub ld: JsonLd,
    #[serde(skip_serializing)]
    pub id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub username: String,
    #[serde(deserialize_with = "empty_as_none")]
    pub email: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub avatar: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub currency: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub locale: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub timezone: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub date_format: Option<String>,
    pub disk_space_allowed: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub roles: Vec<String>,
    #[serde(default = "private")]
    pub visibility: Visibility,
    pub enabled: bool,
    pub last_date_of_activity: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Resource for User {
    const KIND: ResourceKind = ResourceKind::User;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.username
    }
}

/// Server-computed counters, keyed by metric name.
pub type Metrics = BTreeMap<String, String>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_visibility_defaults_to_private() {
        let user: User = serde_json::from_value(json!({"id": "u1", "username": "admin"})).unwrap();
        assert_eq!(user.visibility, Visibility::Private);
        assert_eq!(user.summary(), "admin u1");
    }

    #[test]
    fn log_decodes_type_field() {
        let log: Log = serde_json::from_value(json!({
            "id": "l1",
            "type": "create",
            "objectLabel": "Dune",
            "objectClass": "App\\Entity\\Item",
            "objectDeleted": false
        }))
        .unwrap();
        assert_eq!(log.kind, "create");
        assert_eq!(log.label(), "Dune");
    }
}
