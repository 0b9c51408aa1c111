use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{empty_as_none, is_false, null_as_empty, Deletable, JsonLd, Resource, ToMany, ToOne, Visibility, Writable};
use crate::routes::ResourceKind;

/// A list of wishes, optionally nested under a parent wishlist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Wishlist {
    #[serde(flatten)]
    pub ld: JsonLd,
    #[serde(skip_serializing)]
    pub id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub owner: Option<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub color: Option<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub image: Option<String>,
    #[serde(skip_serializing)]
    pub seen_counter: i64,
    #[serde(skip_serializing)]
    pub parent_visibility: Option<Visibility>,
    #[serde(skip_serializing)]
    pub final_visibility: Option<Visibility>,
    #[serde(skip_serializing)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_deserializing, skip_serializing_if = "is_false")]
    pub delete_image: bool,
}

impl Wishlist {
    pub const CHILDREN: ToMany<Wishlist, Wishlist> = ToMany::new("children");
    pub const WISHES: ToMany<Wishlist, Wish> = ToMany::new("wishes");
    pub const PARENT: ToOne<Wishlist, Wishlist> = ToOne::new("parent");

    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }
}

impl Resource for Wishlist {
    const KIND: ResourceKind = ResourceKind::Wishlist;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

impl Writable for Wishlist {}
impl Deletable for Wishlist {}

/// Something wanted, filed in a wishlist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Wish {
    #[serde(flatten)]
    pub ld: JsonLd,
    #[serde(skip_serializing)]
    pub id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub wishlist: String,
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    /// ISO 4217 code for `price`.
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub owner: Option<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub color: Option<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub image: Option<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub image_small_thumbnail: Option<String>,
    #[serde(skip_serializing)]
    pub parent_visibility: Option<Visibility>,
    #[serde(skip_serializing)]
    pub final_visibility: Option<Visibility>,
    #[serde(skip_serializing)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_deserializing, skip_serializing_if = "is_false")]
    pub delete_image: bool,
}

impl Wish {
    pub const WISHLIST: ToOne<Wish, Wishlist> = ToOne::new("wishlist");

    pub fn new(name: impl Into<String>, wishlist: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wishlist: wishlist.into(),
            ..Self::default()
        }
    }
}

impl Resource for Wish {
    const KIND: ResourceKind = ResourceKind::Wish;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

impl Writable for Wish {}
impl Deletable for Wish {}
