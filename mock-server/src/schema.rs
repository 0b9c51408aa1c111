//! Per-resource rules of the mock: which fields are required, which fields
//! reference other resources and which media can be uploaded.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Media {
    Image,
    File,
    Video,
}

impl Media {
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "image" => Some(Media::Image),
            "file" => Some(Media::File),
            "video" => Some(Media::Video),
            _ => None,
        }
    }

    pub fn segment(self) -> &'static str {
        match self {
            Media::Image => "image",
            Media::File => "file",
            Media::Video => "video",
        }
    }

    /// Multipart field carrying the upload for a resource of `base`.
    pub fn field_name(self, base: &str) -> &'static str {
        match (base, self) {
            ("data", Media::Image) => "fileImage",
            ("data", Media::File) => "fileFile",
            ("data", Media::Video) => "fileVideo",
            _ => "file",
        }
    }
}

#[derive(Debug)]
pub struct Kind {
    pub base: &'static str,
    /// JSON-LD `@type`.
    pub type_name: &'static str,
    pub writable: bool,
    pub deletable: bool,
    pub required: &'static [&'static str],
    /// Scalar reference fields and the base they point into.
    pub refs: &'static [(&'static str, &'static str)],
    /// Array-of-reference fields, unlinked when the target goes away.
    pub list_refs: &'static [(&'static str, &'static str)],
    pub media: &'static [Media],
    /// Field shown as `objectLabel` in logs.
    pub label_field: &'static str,
}

const IMAGE: &[Media] = &[Media::Image];

pub const KINDS: &[Kind] = &[
    Kind {
        base: "albums",
        type_name: "Album",
        writable: true,
        deletable: true,
        required: &["title"],
        refs: &[("parent", "albums")],
        list_refs: &[],
        media: IMAGE,
        label_field: "title",
    },
    Kind {
        base: "choice_lists",
        type_name: "ChoiceList",
        writable: true,
        deletable: true,
        required: &["name", "choices"],
        refs: &[],
        list_refs: &[],
        media: &[],
        label_field: "name",
    },
    Kind {
        base: "collections",
        type_name: "Collection",
        writable: true,
        deletable: true,
        required: &["title"],
        refs: &[("parent", "collections"), ("itemsDefaultTemplate", "templates")],
        list_refs: &[],
        media: IMAGE,
        label_field: "title",
    },
    Kind {
        base: "data",
        type_name: "Datum",
        writable: true,
        deletable: true,
        required: &["label", "type"],
        refs: &[("item", "items"), ("collection", "collections"), ("choiceList", "choice_lists")],
        list_refs: &[],
        media: &[Media::Image, Media::File, Media::Video],
        label_field: "label",
    },
    Kind {
        base: "fields",
        type_name: "Field",
        writable: true,
        deletable: true,
        required: &["name", "type", "template"],
        refs: &[("template", "templates"), ("choiceList", "choice_lists")],
        list_refs: &[],
        media: &[],
        label_field: "name",
    },
    Kind {
        base: "inventories",
        type_name: "Inventory",
        writable: false,
        deletable: true,
        required: &[],
        refs: &[],
        list_refs: &[],
        media: &[],
        label_field: "name",
    },
    Kind {
        base: "items",
        type_name: "Item",
        writable: true,
        deletable: true,
        required: &["name", "collection"],
        refs: &[("collection", "collections")],
        list_refs: &[("tags", "tags"), ("relatedItems", "items")],
        media: IMAGE,
        label_field: "name",
    },
    Kind {
        base: "loans",
        type_name: "Loan",
        writable: true,
        deletable: true,
        required: &["item", "lentTo", "lentAt"],
        refs: &[("item", "items")],
        list_refs: &[],
        media: &[],
        label_field: "lentTo",
    },
    Kind {
        base: "logs",
        type_name: "Log",
        writable: false,
        deletable: false,
        required: &[],
        refs: &[],
        list_refs: &[],
        media: &[],
        label_field: "objectLabel",
    },
    Kind {
        base: "photos",
        type_name: "Photo",
        writable: true,
        deletable: true,
        required: &["title", "album"],
        refs: &[("album", "albums")],
        list_refs: &[],
        media: IMAGE,
        label_field: "title",
    },
    Kind {
        base: "tag_categories",
        type_name: "TagCategory",
        writable: true,
        deletable: true,
        required: &["label", "color"],
        refs: &[],
        list_refs: &[],
        media: &[],
        label_field: "label",
    },
    Kind {
        base: "tags",
        type_name: "Tag",
        writable: true,
        deletable: true,
        required: &["label"],
        refs: &[("category", "tag_categories")],
        list_refs: &[],
        media: IMAGE,
        label_field: "label",
    },
    Kind {
        base: "templates",
        type_name: "Template",
        writable: true,
        deletable: true,
        required: &["name"],
        refs: &[],
        list_refs: &[],
        media: &[],
        label_field: "name",
    },
    Kind {
        base: "users",
        type_name: "User",
        writable: false,
        deletable: false,
        required: &[],
        refs: &[],
        list_refs: &[],
        media: &[],
        label_field: "username",
    },
    Kind {
        base: "wishes",
        type_name: "Wish",
        writable: true,
        deletable: true,
        required: &["name", "wishlist"],
        refs: &[("wishlist", "wishlists")],
        list_refs: &[],
        media: IMAGE,
        label_field: "name",
    },
    Kind {
        base: "wishlists",
        type_name: "Wishlist",
        writable: true,
        deletable: true,
        required: &["name"],
        refs: &[("parent", "wishlists")],
        list_refs: &[],
        media: IMAGE,
        label_field: "name",
    },
];

pub fn kind(base: &str) -> Option<&'static Kind> {
    KINDS.iter().find(|k| k.base == base)
}

/// Sub-collections not backed by a field of the parent: `(parent base,
/// relation) -> (child base, child field pointing at the parent)`.
const REVERSE: &[(&str, &str, &str, &str)] = &[
    ("albums", "children", "albums", "parent"),
    ("albums", "photos", "photos", "album"),
    ("collections", "children", "collections", "parent"),
    ("collections", "items", "items", "collection"),
    ("collections", "data", "data", "collection"),
    ("items", "data", "data", "item"),
    ("items", "loans", "loans", "item"),
    ("tag_categories", "tags", "tags", "category"),
    ("tags", "items", "items", "tags"),
    ("templates", "fields", "fields", "template"),
    ("wishlists", "children", "wishlists", "parent"),
    ("wishlists", "wishes", "wishes", "wishlist"),
];

pub fn reverse_relation(base: &str, relation: &str) -> Option<(&'static str, &'static str)> {
    REVERSE
        .iter()
        .find(|(parent, rel, _, _)| *parent == base && *rel == relation)
        .map(|(_, _, child, field)| (*child, *field))
}

/// `items_default_template` -> `itemsDefaultTemplate`.
pub fn camel_case(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut upper = false;
    for c in segment.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_reference_points_at_a_known_base() {
        for kind in KINDS {
            for (_, target) in kind.refs.iter().chain(kind.list_refs) {
                assert!(super::kind(target).is_some(), "{} -> {target}", kind.base);
            }
        }
    }

    #[test]
    fn relation_segments_map_to_fields() {
        assert_eq!(camel_case("items_default_template"), "itemsDefaultTemplate");
        assert_eq!(camel_case("related_items"), "relatedItems");
        assert_eq!(camel_case("parent"), "parent");
        assert_eq!(reverse_relation("items", "loans"), Some(("loans", "item")));
        assert_eq!(reverse_relation("items", "parent"), None);
    }

    #[test]
    fn datum_upload_fields() {
        assert_eq!(Media::Video.field_name("data"), "fileVideo");
        assert_eq!(Media::Image.field_name("items"), "file");
        assert_eq!(Media::from_segment("file"), Some(Media::File));
    }
}
