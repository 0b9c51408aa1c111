use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    empty_as_none, is_false, null_as_default, null_as_empty, Deletable, FieldKind, JsonLd, Resource, ToMany,
    ToOne, Visibility, Writable,
};
use crate::routes::ResourceKind;
use crate::types::{Loan, Tag, Template};

/// A collection of items, optionally nested under a parent collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Collection {
    #[serde(flatten)]
    pub ld: JsonLd,
    #[serde(skip_serializing)]
    pub id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub items_default_template: Option<String>,
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
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub image_large_thumbnail: Option<String>,
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
    /// When set, the server drops the stored image.
    #[serde(skip_deserializing, skip_serializing_if = "is_false")]
    pub delete_image: bool,
}

impl Collection {
    pub const CHILDREN: ToMany<Collection, Collection> = ToMany::new("children");
    pub const ITEMS: ToMany<Collection, Item> = ToMany::new("items");
    pub const DATA: ToMany<Collection, Datum> = ToMany::new("data");
    pub const PARENT: ToOne<Collection, Collection> = ToOne::new("parent");
    pub const ITEMS_DEFAULT_TEMPLATE: ToOne<Collection, Template> = ToOne::new("items_default_template");

    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }
}

impl Resource for Collection {
    const KIND: ResourceKind = ResourceKind::Collection;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.title
    }
}

impl Writable for Collection {}
impl Deletable for Collection {}

/// One item in a collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Item {
    #[serde(flatten)]
    pub ld: JsonLd,
    #[serde(skip_serializing)]
    pub id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    /// Always sent, the server requires it even when zero.
    pub quantity: i64,
    /// Reference to the owning collection.
    #[serde(deserialize_with = "null_as_empty")]
    pub collection: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    /// Tag references. Write-only, read them through `Item::TAGS`.
    #[serde(skip_deserializing, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub related_items: Vec<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub owner: Option<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub image: Option<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub image_small_thumbnail: Option<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub image_large_thumbnail: Option<String>,
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

impl Item {
    pub const RELATED_ITEMS: ToMany<Item, Item> = ToMany::new("related_items");
    pub const LOANS: ToMany<Item, Loan> = ToMany::new("loans");
    pub const TAGS: ToMany<Item, Tag> = ToMany::new("tags");
    pub const DATA: ToMany<Item, Datum> = ToMany::new("data");
    pub const COLLECTION: ToOne<Item, Collection> = ToOne::new("collection");

    pub fn new(name: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: 1,
            collection: collection.into(),
            ..Self::default()
        }
    }
}

impl Resource for Item {
    const KIND: ResourceKind = ResourceKind::Item;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}

impl Writable for Item {}
impl Deletable for Item {}

/// A custom data field attached to exactly one item or one collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Datum {
    #[serde(flatten)]
    pub ld: JsonLd,
    #[serde(skip_serializing)]
    pub id: String,
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(deserialize_with = "null_as_empty")]
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub choice_list: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub owner: Option<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub image: Option<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub image_small_thumbnail: Option<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub image_large_thumbnail: Option<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub file: Option<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub video: Option<String>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub original_filename: Option<String>,
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

impl Datum {
    pub const ITEM: ToOne<Datum, Item> = ToOne::new("item");
    pub const COLLECTION: ToOne<Datum, Collection> = ToOne::new("collection");

    /// A datum of `kind` attached to the item referenced by `item`.
    pub fn for_item(item: impl Into<String>, kind: FieldKind, label: impl Into<String>) -> Self {
        Self {
            item: Some(item.into()),
            kind,
            label: label.into(),
            ..Self::default()
        }
    }

    /// A datum of `kind` attached to the collection referenced by `collection`.
    pub fn for_collection(collection: impl Into<String>, kind: FieldKind, label: impl Into<String>) -> Self {
        Self {
            collection: Some(collection.into()),
            kind,
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl Resource for Datum {
    const KIND: ResourceKind = ResourceKind::Datum;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }
}

impl Writable for Datum {}
impl Deletable for Datum {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_body_omits_read_only_and_absent_fields() {
        let mut collection = Collection::new("Books");
        collection.id = "c1".into();
        collection.seen_counter = 4;
        collection.visibility = Some(Visibility::Public);
        let body = serde_json::to_value(&collection).unwrap();
        assert_eq!(body, json!({"title": "Books", "visibility": "public"}));
    }

    #[test]
    fn item_quantity_is_sent_even_when_zero() {
        let mut item = Item::new("Dune", "/api/collections/c1");
        item.quantity = 0;
        let body = serde_json::to_value(&item).unwrap();
        assert_eq!(body["quantity"], 0);
        assert!(body.get("image").is_none());
        assert!(body.get("tags").is_none());
    }

    #[test]
    fn item_decodes_json_ld_response() {
        let item: Item = serde_json::from_value(json!({
            "@context": "/api/contexts/Item",
            "@id": "/api/items/i1",
            "@type": "Item",
            "id": "i1",
            "name": "Dune",
            "quantity": 2,
            "collection": "/api/collections/c1",
            "owner": "/api/users/u1",
            "image": null,
            "visibility": "public",
            "finalVisibility": "public",
            "createdAt": "2024-03-01T10:00:00+00:00",
            "updatedAt": null
        }))
        .unwrap();
        assert_eq!(item.id, "i1");
        assert_eq!(item.ld.kind.as_deref(), Some("Item"));
        assert_eq!(item.collection, "/api/collections/c1");
        assert!(item.image.is_none());
        assert!(item.created_at.is_some());
        assert_eq!(item.summary(), "Dune i1");
    }

    #[test]
    fn empty_string_reference_decodes_as_absent() {
        let collection: Collection =
            serde_json::from_value(json!({"id": "c", "title": "T", "parent": ""})).unwrap();
        assert!(collection.parent.is_none());
    }

    #[test]
    fn datum_type_is_written_as_type() {
        let datum = Datum::for_item("/api/items/i1", FieldKind::Price, "Price")
            .with_value("99.99");
        let body = serde_json::to_value(&datum).unwrap();
        assert_eq!(body["type"], "price");
        assert_eq!(body["item"], "/api/items/i1");
        assert!(body.get("collection").is_none());
    }

    #[test]
    fn delete_image_flag_is_write_only() {
        let mut item = Item::new("x", "/api/collections/c");
        item.delete_image = true;
        assert_eq!(serde_json::to_value(&item).unwrap()["deleteImage"], true);
        let decoded: Item = serde_json::from_value(json!({"deleteImage": true})).unwrap();
        assert!(!decoded.delete_image);
    }
}
