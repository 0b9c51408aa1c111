//! Dependency-ordered deletion of everything an account owns.
//!
//! Dependents go before what they reference, so the server never refuses a
//! delete for referential integrity: photos and wishes, then items with
//! their loans and data, then the album, wishlist and collection trees
//! (children first, to any depth), templates with their fields, tags, tag
//! categories, choice lists and inventories. Users are never touched.
//!
//! Failures do not stop the run. Each one is recorded and the run reports
//! them together at the end.

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, info, warn};

use crate::client::Client;
use crate::error::ApiError;
use crate::http::Transport;
use crate::routes::ResourceKind;
use crate::types::{
    Album, ChoiceList, Collection, Deletable, Inventory, Item, Photo, Resource, Tag, TagCategory, Template, ToMany,
    Wish, Wishlist,
};

/// One step of the cascade that failed.
#[derive(Debug)]
pub struct CascadeFailure {
    /// `<kind> <id>` for a delete, `<kind> list` for a listing.
    pub label: String,
    pub error: ApiError,
}

impl fmt::Display for CascadeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.error)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("cascade delete finished with {} failure(s)", .failures.len())]
pub struct CascadeError {
    pub failures: Vec<CascadeFailure>,
}

impl CascadeError {
    pub fn count(&self) -> usize {
        self.failures.len()
    }
}

/// Delete every resource visible to the client's credential.
///
/// Returns the number of resources deleted. A resource that is already gone
/// (not found) counts as deleted, so running this twice is harmless.
pub fn delete_everything<T: Transport>(client: &Client<T>) -> Result<usize, CascadeError> {
    let mut run = Cascade::new(client);

    for photo in run.list::<Photo>() {
        run.delete(&photo);
    }
    for wish in run.list::<Wish>() {
        run.delete(&wish);
    }
    for item in run.list::<Item>() {
        for loan in run.children(Item::LOANS, &item) {
            run.delete(&loan);
        }
        for datum in run.children(Item::DATA, &item) {
            run.delete(&datum);
        }
        run.delete(&item);
    }
    for album in run.list::<Album>() {
        run.tree(&album, Album::CHILDREN, &|_, _| {});
    }
    for wishlist in run.list::<Wishlist>() {
        run.tree(&wishlist, Wishlist::CHILDREN, &|_, _| {});
    }
    for collection in run.list::<Collection>() {
        run.tree(&collection, Collection::CHILDREN, &|run, collection| {
            for datum in run.children(Collection::DATA, collection) {
                run.delete(&datum);
            }
        });
    }
    for template in run.list::<Template>() {
        for field in run.children(Template::FIELDS, &template) {
            run.delete(&field);
        }
        run.delete(&template);
    }
    for tag in run.list::<Tag>() {
        run.delete(&tag);
    }
    for category in run.list::<TagCategory>() {
        run.delete(&category);
    }
    for list in run.list::<ChoiceList>() {
        run.delete(&list);
    }
    for inventory in run.list::<Inventory>() {
        run.delete(&inventory);
    }

    run.finish()
}

struct Cascade<'a, T: Transport> {
    client: &'a Client<T>,
    deleted: HashSet<(ResourceKind, String)>,
    failures: Vec<CascadeFailure>,
}

impl<'a, T: Transport> Cascade<'a, T> {
    fn new(client: &'a Client<T>) -> Self {
        Self {
            client,
            deleted: HashSet::new(),
            failures: Vec::new(),
        }
    }

    fn fail(&mut self, label: String, error: ApiError) {
        warn!(%label, %error, "cascade step failed");
        self.failures.push(CascadeFailure { label, error });
    }

    fn list<R: Resource>(&mut self) -> Vec<R> {
        match self.client.list_all::<R>() {
            Ok(list) => {
                info!(kind = %R::KIND, count = list.len(), "cascade phase");
                list
            }
            Err(error) => {
                self.fail(format!("{} list", R::KIND), error);
                Vec::new()
            }
        }
    }

    fn children<P: Resource, C: Resource>(&mut self, relation: ToMany<P, C>, parent: &P) -> Vec<C> {
        match self.client.children(relation, parent.id()) {
            Ok(list) => list,
            Err(error) => {
                self.fail(format!("{} list", C::KIND), error);
                Vec::new()
            }
        }
    }

    fn is_deleted<R: Resource>(&self, value: &R) -> bool {
        self.deleted.contains(&(R::KIND, value.id().to_string()))
    }

    fn delete<R: Deletable>(&mut self, value: &R) {
        if self.is_deleted(value) {
            return;
        }
        match self.client.delete::<R>(value.id()) {
            Ok(()) => debug!(kind = %R::KIND, id = value.id(), "deleted"),
            Err(error) if error.is_not_found() => debug!(kind = %R::KIND, id = value.id(), "already gone"),
            Err(error) => {
                self.fail(format!("{} {}", R::KIND, value.id()), error);
                return;
            }
        }
        self.deleted.insert((R::KIND, value.id().to_string()));
    }

    /// Delete `node` after its whole subtree. `contents` runs for each node
    /// just before the node itself is deleted.
    fn tree<R: Deletable>(&mut self, node: &R, children: ToMany<R, R>, contents: &dyn Fn(&mut Self, &R)) {
        if self.is_deleted(node) {
            return;
        }
        for child in self.children(children, node) {
            self.tree(&child, children, contents);
        }
        contents(self, node);
        self.delete(node);
    }

    fn finish(self) -> Result<usize, CascadeError> {
        info!(deleted = self.deleted.len(), failures = self.failures.len(), "cascade delete finished");
        if self.failures.is_empty() {
            Ok(self.deleted.len())
        } else {
            Err(CascadeError { failures: self.failures })
        }
    }
}
