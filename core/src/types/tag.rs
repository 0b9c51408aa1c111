use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{empty_as_none, is_false, null_as_empty, Deletable, JsonLd, Resource, ToMany, ToOne, Visibility, Writable};
use crate::routes::ResourceKind;
use crate::types::Item;

/// A label shared across items, optionally filed under a category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tag {
    #[serde(flatten)]
    pub ld: JsonLd,
    #[serde(skip_serializing)]
    pub id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub label: String,
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub owner: Option<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub image: Option<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub image_small_thumbnail: Option<String>,
    #[serde(skip_serializing)]
    pub seen_counter: i64,
    #[serde(skip_serializing)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_deserializing, skip_serializing_if = "is_false")]
    pub delete_image: bool,
}

impl Tag {
    pub const ITEMS: ToMany<Tag, Item> = ToMany::new("items");
    pub const CATEGORY: ToOne<Tag, TagCategory> = ToOne::new("category");

    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(), ..Self::default() }
    }
}

impl Resource for Tag {
    const KIND: ResourceKind = ResourceKind::Tag;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }
}

impl Writable for Tag {}
impl Deletable for Tag {}

/// A colored grouping of tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TagCategory {
    #[serde(flatten)]
    pub ld: JsonLd,
    #[serde(skip_serializing)]
    pub id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub label: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub color: String,
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub owner: Option<String>,
    #[serde(skip_serializing)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TagCategory {
    pub const TAGS: ToMany<TagCategory, Tag> = ToMany::new("tags");

    pub fn new(label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: color.into(),
            ..Self::default()
        }
    }
}

impl Resource for TagCategory {
    const KIND: ResourceKind = ResourceKind::TagCategory;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }
}

impl Writable for TagCategory {}
impl Deletable for TagCategory {}
