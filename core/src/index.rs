//! In-memory `label -> value -> items` index over the data of one collection.

use std::collections::BTreeMap;

use tracing::info;

use crate::client::Client;
use crate::error::{ApiError, Detail, ErrorKind, Result};
use crate::http::Transport;
use crate::types::{Collection, Item};

#[derive(Debug, Clone, Default)]
pub struct DatumIndex {
    collection: Option<Collection>,
    entries: BTreeMap<String, BTreeMap<String, Vec<Item>>>,
}

impl DatumIndex {
    /// Walk the first collection titled `title`: all pages of its items, then
    /// the data of each item. Stops at the first failed call.
    pub fn build<T: Transport>(client: &Client<T>, title: &str) -> Result<Self> {
        let collection = client
            .list_all::<Collection>()?
            .into_iter()
            .find(|c| c.title == title)
            .ok_or_else(|| {
                ApiError::new(
                    "index collection",
                    Some(title),
                    ErrorKind::NotFound(Detail::Raw(format!("no collection titled {title:?}"))),
                )
            })?;

        let mut index = DatumIndex::default();
        for item in client.children(Collection::ITEMS, &collection.id)? {
            for datum in client.children(Item::DATA, &item.id)? {
                index.insert(datum.label, datum.value.unwrap_or_default(), item.clone());
            }
        }
        info!(collection = %collection.id, labels = index.entries.len(), entries = index.len(), "datum index built");
        index.collection = Some(collection);
        Ok(index)
    }

    /// Append `item` under `label` and `value`.
    pub fn insert(&mut self, label: String, value: String, item: Item) {
        self.entries.entry(label).or_default().entry(value).or_default().push(item);
    }

    /// The collection the index was built from.
    pub fn collection(&self) -> Option<&Collection> {
        self.collection.as_ref()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Values seen for `label`, each with its items in insertion order.
    pub fn values(&self, label: &str) -> impl Iterator<Item = (&str, &[Item])> {
        self.entries
            .get(label)
            .into_iter()
            .flat_map(|values| values.iter().map(|(value, items)| (value.as_str(), items.as_slice())))
    }

    pub fn items(&self, label: &str, value: &str) -> &[Item] {
        self.entries
            .get(label)
            .and_then(|values| values.get(value))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of (label, value, item) entries.
    pub fn len(&self) -> usize {
        self.entries.values().flat_map(|values| values.values()).map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::FakeTransport;

    fn item(id: &str) -> Item {
        Item {
            id: id.into(),
            name: id.into(),
            ..Item::default()
        }
    }

    #[test]
    fn lookup_by_label_and_value() {
        let mut index = DatumIndex::default();
        index.insert("author".into(), "X".into(), item("i1"));
        index.insert("author".into(), "Y".into(), item("i2"));
        index.insert("author".into(), "X".into(), item("i3"));

        let ids: Vec<&str> = index.items("author", "X").iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["i1", "i3"]);
        assert_eq!(index.items("author", "Z"), &[] as &[Item]);
        assert_eq!(index.items("year", "X").len(), 0);
        assert_eq!(index.labels().collect::<Vec<_>>(), ["author"]);
        assert_eq!(index.values("author").count(), 2);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn build_walks_collection_items_and_data() {
        let transport = FakeTransport::default()
            .respond(200, r#"{"member":[{"id":"c0","title":"Films"},{"id":"c1","title":"Books"}]}"#)
            .respond(200, r#"{"member":[{"id":"i1","name":"Dune"},{"id":"i2","name":"Emma"}]}"#)
            .respond(200, r#"{"member":[{"id":"d1","type":"text","label":"author","value":"X"}]}"#)
            .respond(
                200,
                r#"{"member":[{"id":"d2","type":"text","label":"author","value":"Y"},{"id":"d3","type":"section","label":"notes"}]}"#,
            );
        let client = Client::with_transport("http://koi.test", transport);

        let index = DatumIndex::build(&client, "Books").unwrap();
        assert_eq!(index.collection().unwrap().id, "c1");
        assert_eq!(index.items("author", "X")[0].id, "i1");
        assert_eq!(index.items("author", "Y")[0].id, "i2");
        assert_eq!(index.items("author", "X").len(), 1);
        assert_eq!(index.items("notes", "").len(), 1);

        let urls: Vec<String> = client.transport().requests.borrow().iter().map(|r| r.url.clone()).collect();
        assert_eq!(urls[1], "http://koi.test/api/collections/c1/items");
        assert_eq!(urls[3], "http://koi.test/api/items/i2/data");
    }

    #[test]
    fn items_on_later_pages_are_indexed() {
        let transport = FakeTransport::default()
            .respond(200, r#"{"member":[{"id":"c1","title":"Books"}]}"#)
            .respond(
                200,
                r#"{"member":[{"id":"i1","name":"Dune"}],"view":{"next":"/api/collections/c1/items?page=2"}}"#,
            )
            .respond(200, r#"{"member":[{"id":"i2","name":"Emma"}]}"#)
            .respond(200, r#"{"member":[{"id":"d1","type":"text","label":"author","value":"X"}]}"#)
            .respond(200, r#"{"member":[{"id":"d2","type":"text","label":"author","value":"X"}]}"#);
        let client = Client::with_transport("http://koi.test", transport);

        let index = DatumIndex::build(&client, "Books").unwrap();
        let ids: Vec<&str> = index.items("author", "X").iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["i1", "i2"]);
        let urls: Vec<String> = client.transport().requests.borrow().iter().map(|r| r.url.clone()).collect();
        assert_eq!(urls[2], "http://koi.test/api/collections/c1/items?page=2");
    }

    #[test]
    fn unknown_title_is_not_found() {
        let client = Client::with_transport("http://koi.test", FakeTransport::default().respond(200, r#"{"member":[]}"#));
        let err = DatumIndex::build(&client, "Books").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.target(), Some("Books"));
    }

    #[test]
    fn failed_sub_call_names_the_item() {
        let transport = FakeTransport::default()
            .respond(200, r#"{"member":[{"id":"c1","title":"Books"}]}"#)
            .respond(200, r#"{"member":[{"id":"i1","name":"Dune"}]}"#)
            .respond(500, "boom");
        let client = Client::with_transport("http://koi.test", transport);
        let err = DatumIndex::build(&client, "Books").unwrap_err();
        assert_eq!(err.target(), Some("i1"));
    }
}
