//! Resource model shared by every Koillection resource.
//!
//! # Design
//! Each resource is one struct carrying both views of the wire format:
//! - read-only fields (`id`, timestamps, owner, stored image URLs) are
//!   `skip_serializing`, so they are decoded from responses but never sent;
//! - write-only fields (`delete_image`) are `skip_deserializing`;
//! - the JSON-LD envelope is a flattened `JsonLd` whose members are all
//!   read-only.
//!
//! Optional fields are omitted on the wire when absent. Optional references
//! are decoded leniently: absent, `null` and `""` all mean "no reference".

mod album;
mod collection;
mod loan;
mod system;
mod tag;
mod template;
mod wish;

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

pub use album::{Album, Photo};
pub use collection::{Collection, Datum, Item};
pub use loan::Loan;
pub use system::{Inventory, Log, Metrics, User};
pub use tag::{Tag, TagCategory};
pub use template::{ChoiceList, Field, Template};
pub use wish::{Wish, Wishlist};

use crate::routes::ResourceKind;

/// Who can see a resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Internal,
    Private,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Internal => "internal",
            Visibility::Private => "private",
        }
    }
}

/// Type of a template field or item datum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    #[default]
    Text,
    Textarea,
    Country,
    Date,
    Rating,
    Number,
    Price,
    Link,
    List,
    ChoiceList,
    Checkbox,
    Image,
    File,
    Sign,
    Video,
    BlankLine,
    Section,
}

impl FieldKind {
    pub const ALL: [FieldKind; 17] = [
        FieldKind::Text,
        FieldKind::Textarea,
        FieldKind::Country,
        FieldKind::Date,
        FieldKind::Rating,
        FieldKind::Number,
        FieldKind::Price,
        FieldKind::Link,
        FieldKind::List,
        FieldKind::ChoiceList,
        FieldKind::Checkbox,
        FieldKind::Image,
        FieldKind::File,
        FieldKind::Sign,
        FieldKind::Video,
        FieldKind::BlankLine,
        FieldKind::Section,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Country => "country",
            FieldKind::Date => "date",
            FieldKind::Rating => "rating",
            FieldKind::Number => "number",
            FieldKind::Price => "price",
            FieldKind::Link => "link",
            FieldKind::List => "list",
            FieldKind::ChoiceList => "choice-list",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Image => "image",
            FieldKind::File => "file",
            FieldKind::Sign => "sign",
            FieldKind::Video => "video",
            FieldKind::BlankLine => "blank-line",
            FieldKind::Section => "section",
        }
    }

    /// Kinds whose content arrives through an upload instead of `value`.
    pub fn is_media(self) -> bool {
        matches!(self, FieldKind::Image | FieldKind::File | FieldKind::Video | FieldKind::Sign)
    }
}

/// JSON-LD companions present on read responses, never sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonLd {
    #[serde(rename = "@context", default, skip_serializing)]
    pub context: Option<serde_json::Value>,
    #[serde(rename = "@id", default, skip_serializing)]
    pub id: Option<String>,
    #[serde(rename = "@type", default, skip_serializing)]
    pub kind: Option<String>,
}

/// Server-relative reference to a resource, e.g. `/api/items/<id>`.
pub fn iri(kind: ResourceKind, id: &str) -> String {
    format!("{}/{}", kind.base_path(), id)
}

/// Identifier part of a reference: the last path segment.
pub fn id_from_iri(iri: &str) -> &str {
    iri.rsplit('/').next().unwrap_or(iri)
}

/// A resource the server identifies by an opaque identifier.
pub trait Resource: Clone + Serialize + DeserializeOwned {
    const KIND: ResourceKind;

    /// Server-assigned identifier, empty until the resource is created.
    fn id(&self) -> &str;

    /// Human-facing name: title, name or label depending on the kind.
    fn label(&self) -> &str;

    /// Short human line `<label> <identifier>`.
    fn summary(&self) -> String {
        format!("{} {}", self.label(), self.id())
    }

    fn iri(&self) -> String {
        iri(Self::KIND, self.id())
    }
}

/// Resources that can be created, replaced and patched.
pub trait Writable: Resource + crate::validate::Validate {}

/// Resources that can be deleted.
pub trait Deletable: Resource {}

/// List sub-collection `/<base>/<id>/<relation>`.
#[derive(Debug)]
pub struct ToMany<P, C> {
    pub relation: &'static str,
    _marker: PhantomData<fn() -> (P, C)>,
}

impl<P, C> ToMany<P, C> {
    pub const fn new(relation: &'static str) -> Self {
        Self { relation, _marker: PhantomData }
    }
}

impl<P, C> Clone for ToMany<P, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, C> Copy for ToMany<P, C> {}

/// Related singleton `/<base>/<id>/<relation>`.
#[derive(Debug)]
pub struct ToOne<P, T> {
    pub relation: &'static str,
    _marker: PhantomData<fn() -> (P, T)>,
}

impl<P, T> ToOne<P, T> {
    pub const fn new(relation: &'static str) -> Self {
        Self { relation, _marker: PhantomData }
    }
}

impl<P, T> Clone for ToOne<P, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, T> Copy for ToOne<P, T> {}

/// Deserialize an optional string, mapping `null` and `""` to `None`.
pub(crate) fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Deserialize a string that may be `null`.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

/// Deserialize a list that may be `null`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let value: Option<T> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_kind_uses_kebab_case_on_the_wire() {
        assert_eq!(serde_json::to_value(FieldKind::ChoiceList).unwrap(), "choice-list");
        assert_eq!(serde_json::to_value(FieldKind::BlankLine).unwrap(), "blank-line");
        for kind in FieldKind::ALL {
            let wire = serde_json::to_value(kind).unwrap();
            assert_eq!(wire, kind.as_str());
        }
    }

    #[test]
    fn unknown_visibility_is_a_decode_error() {
        assert!(serde_json::from_str::<Visibility>(r#""secret""#).is_err());
        assert_eq!(serde_json::from_str::<Visibility>(r#""internal""#).unwrap(), Visibility::Internal);
    }

    #[test]
    fn iri_round_trips_identifier() {
        let reference = iri(ResourceKind::Collection, "0f3c");
        assert_eq!(reference, "/api/collections/0f3c");
        assert_eq!(id_from_iri(&reference), "0f3c");
        assert_eq!(id_from_iri("plain"), "plain");
    }

    #[test]
    fn json_ld_envelope_is_never_serialized() {
        let ld: JsonLd = serde_json::from_str(
            r#"{"@context":"/api/contexts/Item","@id":"/api/items/1","@type":"Item"}"#,
        )
        .unwrap();
        assert_eq!(ld.id.as_deref(), Some("/api/items/1"));
        assert_eq!(serde_json::to_value(&ld).unwrap(), serde_json::json!({}));
    }
}
