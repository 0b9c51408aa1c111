use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{empty_as_none, null_as_empty, Deletable, JsonLd, Resource, ToOne, Writable};
use crate::routes::ResourceKind;
use crate::types::Item;

/// An item lent to someone. A loan without `returned_at` is still open.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Loan {
    #[serde(flatten)]
    pub ld: JsonLd,
    #[serde(skip_serializing)]
    pub id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub item: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub lent_to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lent_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returned_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "empty_as_none", skip_serializing)]
    pub owner: Option<String>,
}

impl Loan {
    pub const ITEM: ToOne<Loan, Item> = ToOne::new("item");

    pub fn new(item: impl Into<String>, lent_to: impl Into<String>, lent_at: DateTime<Utc>) -> Self {
        Self {
            item: item.into(),
            lent_to: lent_to.into(),
            lent_at: Some(lent_at),
            ..Self::default()
        }
    }

    pub fn is_open(&self) -> bool {
        self.returned_at.is_none()
    }
}

impl Resource for Loan {
    const KIND: ResourceKind = ResourceKind::Loan;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.lent_to
    }
}

impl Writable for Loan {}
impl Deletable for Loan {}
