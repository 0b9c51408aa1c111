//! Aligned `<TypeName>.<Field>: <value>` output for resources.

use std::io::{self, Write};

use koillection_core::{Album, Collection, Datum, Item, Tag, User, Wishlist};

/// A resource that can be printed field by field.
pub trait Describe {
    const TYPE_NAME: &'static str;

    /// Present fields in display order. Absent optional fields are left out.
    fn fields(&self, verbose: bool) -> Vec<(&'static str, String)>;
}

#[derive(Default)]
struct Fields(Vec<(&'static str, String)>);

impl Fields {
    fn add(mut self, name: &'static str, value: impl ToString) -> Self {
        self.0.push((name, value.to_string()));
        self
    }

    fn opt(mut self, name: &'static str, value: Option<impl ToString>) -> Self {
        if let Some(value) = value.map(|v| v.to_string()).filter(|v| !v.is_empty()) {
            self.0.push((name, value));
        }
        self
    }

    fn opt_if(self, verbose: bool, name: &'static str, value: Option<impl ToString>) -> Self {
        if verbose {
            self.opt(name, value)
        } else {
            self
        }
    }
}

impl Describe for Collection {
    const TYPE_NAME: &'static str = "Collection";

    fn fields(&self, verbose: bool) -> Vec<(&'static str, String)> {
        Fields::default()
            .add("ID", &self.id)
            .add("Title", &self.title)
            .opt("Parent", self.parent.as_deref())
            .opt("Visibility", self.visibility.map(|v| v.as_str()))
            .opt("Image", self.image.as_deref())
            .opt_if(verbose, "ItemsDefaultTemplate", self.items_default_template.as_deref())
            .opt_if(verbose, "Owner", self.owner.as_deref())
            .opt_if(verbose, "CreatedAt", self.created_at.map(|t| t.to_rfc3339()))
            .opt_if(verbose, "UpdatedAt", self.updated_at.map(|t| t.to_rfc3339()))
            .0
    }
}

impl Describe for Item {
    const TYPE_NAME: &'static str = "Item";

    fn fields(&self, verbose: bool) -> Vec<(&'static str, String)> {
        Fields::default()
            .add("ID", &self.id)
            .add("Name", &self.name)
            .add("Quantity", self.quantity)
            .add("Collection", &self.collection)
            .opt("Visibility", self.visibility.map(|v| v.as_str()))
            .opt("Image", self.image.as_deref())
            .opt_if(verbose, "Owner", self.owner.as_deref())
            .opt_if(verbose, "SeenCounter", Some(self.seen_counter))
            .opt_if(verbose, "CreatedAt", self.created_at.map(|t| t.to_rfc3339()))
            .opt_if(verbose, "UpdatedAt", self.updated_at.map(|t| t.to_rfc3339()))
            .0
    }
}

impl Describe for Datum {
    const TYPE_NAME: &'static str = "Datum";

    fn fields(&self, verbose: bool) -> Vec<(&'static str, String)> {
        if !verbose {
            return Fields::default()
                .add("Type", self.kind.as_str())
                .add("Label", &self.label)
                .opt("Value", self.value.as_deref())
                .0;
        }
        Fields::default()
            .add("ID", &self.id)
            .add("Type", self.kind.as_str())
            .add("Label", &self.label)
            .opt("Value", self.value.as_deref())
            .opt("Position", self.position)
            .opt("Currency", self.currency.as_deref())
            .opt("Item", self.item.as_deref())
            .opt("Collection", self.collection.as_deref())
            .opt("ChoiceList", self.choice_list.as_deref())
            .opt("Visibility", self.visibility.map(|v| v.as_str()))
            .opt("Image", self.image.as_deref())
            .opt("File", self.file.as_deref())
            .opt("Video", self.video.as_deref())
            .0
    }
}

impl Describe for Album {
    const TYPE_NAME: &'static str = "Album";

    fn fields(&self, verbose: bool) -> Vec<(&'static str, String)> {
        Fields::default()
            .add("ID", &self.id)
            .add("Title", &self.title)
            .opt("Parent", self.parent.as_deref())
            .opt("Visibility", self.visibility.map(|v| v.as_str()))
            .opt("Image", self.image.as_deref())
            .opt_if(verbose, "CreatedAt", self.created_at.map(|t| t.to_rfc3339()))
            .0
    }
}

impl Describe for Wishlist {
    const TYPE_NAME: &'static str = "Wishlist";

    fn fields(&self, verbose: bool) -> Vec<(&'static str, String)> {
        Fields::default()
            .add("ID", &self.id)
            .add("Name", &self.name)
            .opt("Parent", self.parent.as_deref())
            .opt("Visibility", self.visibility.map(|v| v.as_str()))
            .opt("Image", self.image.as_deref())
            .opt_if(verbose, "CreatedAt", self.created_at.map(|t| t.to_rfc3339()))
            .0
    }
}

impl Describe for Tag {
    const TYPE_NAME: &'static str = "Tag";

    fn fields(&self, verbose: bool) -> Vec<(&'static str, String)> {
        Fields::default()
            .add("ID", &self.id)
            .add("Label", &self.label)
            .opt("Description", self.description.as_deref())
            .opt("Category", self.category.as_deref())
            .opt("Visibility", self.visibility.map(|v| v.as_str()))
            .opt_if(verbose, "CreatedAt", self.created_at.map(|t| t.to_rfc3339()))
            .0
    }
}

impl Describe for User {
    const TYPE_NAME: &'static str = "User";

    fn fields(&self, verbose: bool) -> Vec<(&'static str, String)> {
        Fields::default()
            .add("ID", &self.id)
            .add("Username", &self.username)
            .opt("Email", self.email.as_deref())
            .opt("Currency", self.currency.as_deref())
            .opt("Locale", self.locale.as_deref())
            .opt("Timezone", self.timezone.as_deref())
            .add("Visibility", self.visibility.as_str())
            .opt_if(verbose, "Roles", Some(self.roles.join(",")))
            .opt_if(verbose, "DiskSpaceAllowed", Some(self.disk_space_allowed))
            .opt_if(verbose, "CreatedAt", self.created_at.map(|t| t.to_rfc3339()))
            .0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Printer {
    pub margin: usize,
    pub verbose: bool,
}

impl Printer {
    pub fn new(margin: usize, verbose: bool) -> Self {
        Self { margin, verbose }
    }

    pub fn indented(self, by: usize) -> Self {
        Self {
            margin: self.margin + by,
            ..self
        }
    }

    pub fn print<D: Describe>(&self, out: &mut impl Write, value: &D) -> io::Result<()> {
        let fields = value.fields(self.verbose);
        let width = fields.iter().map(|(name, _)| D::TYPE_NAME.len() + 1 + name.len()).max().unwrap_or(0);
        for (name, value) in fields {
            let key = format!("{}.{name}", D::TYPE_NAME);
            writeln!(out, "{:margin$}{key:<width$}: {value}", "", margin = self.margin)?;
        }
        Ok(())
    }

    pub fn print_all<D: Describe>(&self, out: &mut impl Write, values: &[D]) -> io::Result<()> {
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                writeln!(out)?;
            }
            self.print(out, value)?;
        }
        Ok(())
    }

    /// An item followed by its data, indented and ordered by position.
    pub fn print_item(&self, out: &mut impl Write, item: &Item, mut data: Vec<Datum>) -> io::Result<()> {
        self.print(out, item)?;
        sort_by_position(&mut data);
        let nested = self.indented(2);
        for datum in &data {
            writeln!(out)?;
            nested.print(out, datum)?;
        }
        Ok(())
    }
}

/// Ascending position; missing or negative positions go last, in their
/// original order.
pub fn sort_by_position(data: &mut [Datum]) {
    data.sort_by_key(|d| match d.position {
        Some(p) if p >= 0 => (0, p),
        _ => (1, 0),
    });
}
