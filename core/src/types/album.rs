use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{empty_as_none, is_false, null_as_empty, Deletable, JsonLd, Resource, ToMany, ToOne, Visibility, Writable};
use crate::routes::ResourceKind;

/// A photo album, optionally nested under a parent album.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Album {
    #[serde(flatten)]
    pub ld: JsonLd,
    #[serde(skip_serializing)]
    pub id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
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

impl Album {
    pub const CHILDREN: ToMany<Album, Album> = ToMany::new("children");
    pub const PHOTOS: ToMany<Album, Photo> = ToMany::new("photos");
    pub const PARENT: ToOne<Album, Album> = ToOne::new("parent");

    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }
}

impl Resource for Album {
    const KIND: ResourceKind = ResourceKind::Album;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.title
    }
}

impl Writable for Album {}
impl Deletable for Album {}

/// A photo inside an album.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Photo {
    #[serde(flatten)]
    pub ld: JsonLd,
    #[serde(skip_serializing)]
    pub id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub album: String,
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    /// RFC 3339 date-time the photo was taken.
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub taken_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub owner: Option<String>,
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

impl Photo {
    pub const ALBUM: ToOne<Photo, Album> = ToOne::new("album");

    pub fn new(title: impl Into<String>, album: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            album: album.into(),
            ..Self::default()
        }
    }
}

impl Resource for Photo {
    const KIND: ResourceKind = ResourceKind::Photo;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.title
    }
}

impl Writable for Photo {}
impl Deletable for Photo {}
