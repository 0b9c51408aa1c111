use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{empty_as_none, null_as_default, null_as_empty, Deletable, FieldKind, JsonLd, Resource, ToMany, ToOne, Visibility, Writable};
use crate::routes::ResourceKind;

/// A reusable set of fields applied to new items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Template {
    #[serde(flatten)]
    pub ld: JsonLd,
    #[serde(skip_serializing)]
    pub id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub owner: Option<String>,
    #[serde(skip_serializing)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Template {
    pub const FIELDS: ToMany<Template, Field> = ToMany::new("fields");

    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }
}

impl Resource for Template {
    const KIND: ResourceKind = ResourceKind::Template;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

impl Writable for Template {}
impl Deletable for Template {}

/// One field of a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Field {
    #[serde(flatten)]
    pub ld: JsonLd,
    #[serde(skip_serializing)]
    pub id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    /// Always sent, the server requires it even when zero.
    pub position: i64,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(deserialize_with = "null_as_empty")]
    pub template: String,
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub choice_list: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub owner: Option<String>,
}

impl Field {
    pub const TEMPLATE: ToOne<Field, Template> = ToOne::new("template");

    pub fn new(name: impl Into<String>, position: i64, kind: FieldKind, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position,
            kind,
            template: template.into(),
            ..Self::default()
        }
    }
}

impl Resource for Field {
    const KIND: ResourceKind = ResourceKind::Field;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

impl Writable for Field {}
impl Deletable for Field {}

/// A named set of choices for `choice-list` fields and data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChoiceList {
    #[serde(flatten)]
    pub ld: JsonLd,
    #[serde(skip_serializing)]
    pub id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub choices: Vec<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub owner: Option<String>,
    #[serde(skip_serializing)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ChoiceList {
    pub fn new<I, S>(name: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            choices: choices.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

impl Resource for ChoiceList {
    const KIND: ResourceKind = ResourceKind::ChoiceList;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

impl Writable for ChoiceList {}
impl Deletable for ChoiceList {}
