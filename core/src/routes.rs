//! The table mapping (resource kind, operation) to method and path.
//!
//! Every request `Api` builds goes through `route`, so the set of supported
//! combinations lives in one place. Combinations the server does not expose
//! (creating a log, uploading a video to an item) are rejected before any
//! request is built.

use std::fmt;

use crate::http::HttpMethod;

pub const AUTHENTICATION_PATH: &str = "/api/authentication_token";
pub const SEARCH_PATH: &str = "/search";

/// The resource kinds exposed by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Album,
    ChoiceList,
    Collection,
    Datum,
    Field,
    Inventory,
    Item,
    Loan,
    Log,
    Metrics,
    Photo,
    Tag,
    TagCategory,
    Template,
    User,
    Wish,
    Wishlist,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 17] = [
        ResourceKind::Album,
        ResourceKind::ChoiceList,
        ResourceKind::Collection,
        ResourceKind::Datum,
        ResourceKind::Field,
        ResourceKind::Inventory,
        ResourceKind::Item,
        ResourceKind::Loan,
        ResourceKind::Log,
        ResourceKind::Metrics,
        ResourceKind::Photo,
        ResourceKind::Tag,
        ResourceKind::TagCategory,
        ResourceKind::Template,
        ResourceKind::User,
        ResourceKind::Wish,
        ResourceKind::Wishlist,
    ];

    pub fn base_path(self) -> &'static str {
        match self {
            ResourceKind::Album => "/api/albums",
            ResourceKind::ChoiceList => "/api/choice_lists",
            ResourceKind::Collection => "/api/collections",
            ResourceKind::Datum => "/api/data",
            ResourceKind::Field => "/api/fields",
            ResourceKind::Inventory => "/api/inventories",
            ResourceKind::Item => "/api/items",
            ResourceKind::Loan => "/api/loans",
            ResourceKind::Log => "/api/logs",
            ResourceKind::Metrics => "/api/metrics",
            ResourceKind::Photo => "/api/photos",
            ResourceKind::Tag => "/api/tags",
            ResourceKind::TagCategory => "/api/tag_categories",
            ResourceKind::Template => "/api/templates",
            ResourceKind::User => "/api/users",
            ResourceKind::Wish => "/api/wishes",
            ResourceKind::Wishlist => "/api/wishlists",
        }
    }

    /// Singular human name, used in operation names and failure labels.
    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Album => "album",
            ResourceKind::ChoiceList => "choice list",
            ResourceKind::Collection => "collection",
            ResourceKind::Datum => "datum",
            ResourceKind::Field => "field",
            ResourceKind::Inventory => "inventory",
            ResourceKind::Item => "item",
            ResourceKind::Loan => "loan",
            ResourceKind::Log => "log",
            ResourceKind::Metrics => "metrics",
            ResourceKind::Photo => "photo",
            ResourceKind::Tag => "tag",
            ResourceKind::TagCategory => "tag category",
            ResourceKind::Template => "template",
            ResourceKind::User => "user",
            ResourceKind::Wish => "wish",
            ResourceKind::Wishlist => "wishlist",
        }
    }

    fn writable(self) -> bool {
        !matches!(
            self,
            ResourceKind::Inventory | ResourceKind::Log | ResourceKind::Metrics | ResourceKind::User
        )
    }

    fn deletable(self) -> bool {
        self.writable() || self == ResourceKind::Inventory
    }

    /// Media this kind accepts through `/<base>/<id>/<media>`.
    pub fn media(self) -> &'static [Media] {
        match self {
            ResourceKind::Datum => &[Media::Image, Media::File, Media::Video],
            ResourceKind::Album
            | ResourceKind::Collection
            | ResourceKind::Item
            | ResourceKind::Photo
            | ResourceKind::Tag
            | ResourceKind::Wish
            | ResourceKind::Wishlist => &[Media::Image],
            _ => &[],
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Binary content attached to a resource by upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Media {
    Image,
    File,
    Video,
}

impl Media {
    pub fn segment(self) -> &'static str {
        match self {
            Media::Image => "image",
            Media::File => "file",
            Media::Video => "video",
        }
    }

    /// Multipart field name the endpoint expects for this media.
    pub fn field_name(self, kind: ResourceKind) -> &'static str {
        match (kind, self) {
            (ResourceKind::Datum, Media::Image) => "fileImage",
            (ResourceKind::Datum, Media::File) => "fileFile",
            (ResourceKind::Datum, Media::Video) => "fileVideo",
            _ => "file",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Get,
    List,
    Update,
    Patch,
    Delete,
    ListRelation(&'static str),
    GetRelation(&'static str),
    Upload(Media),
}

impl Operation {
    pub fn verb(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Get => "get",
            Operation::List => "list",
            Operation::Update => "update",
            Operation::Patch => "patch",
            Operation::Delete => "delete",
            Operation::ListRelation(_) => "list",
            Operation::GetRelation(_) => "get",
            Operation::Upload(_) => "upload",
        }
    }

    /// Operation name used to annotate failures, e.g. `list item loans`.
    pub fn describe(self, kind: ResourceKind) -> String {
        match self {
            Operation::ListRelation(rel) | Operation::GetRelation(rel) => {
                format!("{} {} {}", self.verb(), kind.name(), rel.replace('_', " "))
            }
            Operation::Upload(media) => format!("upload {} {}", kind.name(), media.segment()),
            _ => format!("{} {}", self.verb(), kind.name()),
        }
    }
}

/// Method and server-relative path resolved for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub method: HttpMethod,
    pub path: String,
}

/// Why `route` refused a combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    Unsupported,
    MissingId,
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::Unsupported => write!(f, "operation not supported for this resource"),
            RouteError::MissingId => write!(f, "identifier is required"),
        }
    }
}

/// Resolve the method and path for `operation` on `kind`.
///
/// `id` is required for every operation except create and list.
pub fn route(kind: ResourceKind, operation: Operation, id: Option<&str>) -> Result<Route, RouteError> {
    let base = kind.base_path();
    let supported = match operation {
        Operation::Create | Operation::Update | Operation::Patch => kind.writable(),
        Operation::Delete => kind.deletable(),
        Operation::Get => kind != ResourceKind::Metrics,
        Operation::List => true,
        Operation::ListRelation(_) | Operation::GetRelation(_) => kind != ResourceKind::Metrics,
        Operation::Upload(media) => kind.media().contains(&media),
    };
    if !supported {
        return Err(RouteError::Unsupported);
    }

    let with_id = |suffix: Option<&str>| -> Result<String, RouteError> {
        let id = id.filter(|id| !id.is_empty()).ok_or(RouteError::MissingId)?;
        Ok(match suffix {
            Some(suffix) => format!("{base}/{id}/{suffix}"),
            None => format!("{base}/{id}"),
        })
    };

    let (method, path) = match operation {
        Operation::Create => (HttpMethod::Post, base.to_string()),
        Operation::List => (HttpMethod::Get, base.to_string()),
        Operation::Get => (HttpMethod::Get, with_id(None)?),
        Operation::Update => (HttpMethod::Put, with_id(None)?),
        Operation::Patch => (HttpMethod::Patch, with_id(None)?),
        Operation::Delete => (HttpMethod::Delete, with_id(None)?),
        Operation::ListRelation(rel) | Operation::GetRelation(rel) => (HttpMethod::Get, with_id(Some(rel))?),
        Operation::Upload(media) => (HttpMethod::Post, with_id(Some(media.segment()))?),
    };
    Ok(Route { method, path })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crud_paths_follow_the_rest_layout() {
        let cases = [
            (Operation::Create, None, HttpMethod::Post, "/api/items"),
            (Operation::List, None, HttpMethod::Get, "/api/items"),
            (Operation::Get, Some("7"), HttpMethod::Get, "/api/items/7"),
            (Operation::Update, Some("7"), HttpMethod::Put, "/api/items/7"),
            (Operation::Patch, Some("7"), HttpMethod::Patch, "/api/items/7"),
            (Operation::Delete, Some("7"), HttpMethod::Delete, "/api/items/7"),
            (Operation::ListRelation("loans"), Some("7"), HttpMethod::Get, "/api/items/7/loans"),
            (Operation::Upload(Media::Image), Some("7"), HttpMethod::Post, "/api/items/7/image"),
        ];
        for (operation, id, method, path) in cases {
            let route = route(ResourceKind::Item, operation, id).unwrap();
            assert_eq!(route.method, method, "{operation:?}");
            assert_eq!(route.path, path, "{operation:?}");
        }
    }

    #[test]
    fn read_only_kinds_refuse_writes() {
        for kind in [ResourceKind::Log, ResourceKind::User, ResourceKind::Metrics] {
            assert_eq!(route(kind, Operation::Create, None), Err(RouteError::Unsupported));
            assert_eq!(route(kind, Operation::Delete, Some("1")), Err(RouteError::Unsupported));
        }
        assert!(route(ResourceKind::Inventory, Operation::Delete, Some("1")).is_ok());
        assert_eq!(
            route(ResourceKind::Inventory, Operation::Create, None),
            Err(RouteError::Unsupported)
        );
    }

    #[test]
    fn only_data_accept_files_and_videos() {
        assert!(route(ResourceKind::Datum, Operation::Upload(Media::Video), Some("d")).is_ok());
        assert_eq!(
            route(ResourceKind::Item, Operation::Upload(Media::Video), Some("i")),
            Err(RouteError::Unsupported)
        );
        assert_eq!(Media::File.field_name(ResourceKind::Datum), "fileFile");
        assert_eq!(Media::Image.field_name(ResourceKind::Album), "file");
    }

    #[test]
    fn empty_identifier_is_refused() {
        assert_eq!(route(ResourceKind::Tag, Operation::Get, Some("")), Err(RouteError::MissingId));
        assert_eq!(route(ResourceKind::Tag, Operation::Get, None), Err(RouteError::MissingId));
    }

    #[test]
    fn operation_names_are_human_readable() {
        assert_eq!(Operation::ListRelation("related_items").describe(ResourceKind::Item), "list item related items");
        assert_eq!(Operation::Create.describe(ResourceKind::TagCategory), "create tag category");
    }
}
