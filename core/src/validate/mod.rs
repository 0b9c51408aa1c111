//! Local validation mirroring the server's write constraints.
//!
//! # Design
//! Validators collect every violated constraint in field declaration order so
//! a caller sees all problems at once. Visibility needs no check: `Visibility`
//! only has the three values the server accepts.

mod codes;
mod values;

use std::borrow::Cow;

use chrono::{DateTime, Utc};

use crate::types::{
    Album, ChoiceList, Collection, Datum, Field, FieldKind, Item, Loan, Photo, Tag, TagCategory, Template, Wish,
    Wishlist,
};

pub use values::{check_value, is_country, is_currency, is_decimal};

/// Pre-send checks for a writable resource.
pub trait Validate: Clone {
    fn validate(&self) -> Result<(), Vec<String>>;

    /// The value to send, adjusted for server quirks. Validation runs on it.
    fn normalized(&self) -> Cow<'_, Self> {
        Cow::Borrowed(self)
    }
}

#[derive(Debug, Default)]
struct Violations(Vec<String>);

impl Violations {
    fn require(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.0.push(format!("{field} is required"));
        }
    }

    fn check(&mut self, ok: bool, message: impl Into<String>) {
        if !ok {
            self.0.push(message.into());
        }
    }

    fn currency(&mut self, currency: Option<&str>) {
        if let Some(code) = currency {
            self.check(is_currency(code), format!("currency {code:?} is not an ISO 4217 code"));
        }
    }

    fn finish(self) -> Result<(), Vec<String>> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self.0)
        }
    }
}

impl Validate for Collection {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut v = Violations::default();
        v.require("title", &self.title);
        v.finish()
    }
}

impl Validate for Item {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut v = Violations::default();
        v.require("name", &self.name);
        v.check(self.quantity >= 1, format!("quantity must be at least 1, got {}", self.quantity));
        v.require("collection", &self.collection);
        v.finish()
    }

    /// The server rejects a zero quantity that its own forms send; send 1.
    fn normalized(&self) -> Cow<'_, Self> {
        if self.quantity == 0 {
            let mut item = self.clone();
            item.quantity = 1;
            Cow::Owned(item)
        } else {
            Cow::Borrowed(self)
        }
    }
}

impl Validate for Datum {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut v = Violations::default();
        v.check(
            self.item.is_some() != self.collection.is_some(),
            "exactly one of item or collection must be set",
        );
        v.require("label", &self.label);
        if let Some(value) = &self.value {
            if let Err(message) = check_value(self.kind, value) {
                v.0.push(message);
            }
        }
        if self.kind == FieldKind::Price {
            v.check(self.value.is_some(), "value is required for price data");
            v.check(self.currency.is_some(), "currency is required for price data");
        }
        v.currency(self.currency.as_deref());
        v.finish()
    }
}

impl Validate for Album {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut v = Violations::default();
        v.require("title", &self.title);
        v.finish()
    }
}

impl Validate for Photo {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut v = Violations::default();
        v.require("title", &self.title);
        v.require("album", &self.album);
        if let Some(taken_at) = &self.taken_at {
            v.check(
                DateTime::parse_from_rfc3339(taken_at).is_ok(),
                format!("takenAt {taken_at:?} is not a valid date-time"),
            );
        }
        v.finish()
    }
}

impl Validate for Tag {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut v = Violations::default();
        v.require("label", &self.label);
        v.finish()
    }
}

impl Validate for TagCategory {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut v = Violations::default();
        v.require("label", &self.label);
        v.require("color", &self.color);
        v.finish()
    }
}

impl Validate for Template {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut v = Violations::default();
        v.require("name", &self.name);
        v.finish()
    }
}

impl Validate for Field {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut v = Violations::default();
        v.require("name", &self.name);
        v.require("template", &self.template);
        v.finish()
    }
}

impl Validate for ChoiceList {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut v = Violations::default();
        v.require("name", &self.name);
        v.check(!self.choices.is_empty(), "choices must not be empty");
        v.finish()
    }
}

impl Validate for Loan {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut v = Violations::default();
        v.require("item", &self.item);
        v.require("lentTo", &self.lent_to);
        match self.lent_at {
            None => v.0.push("lentAt is required".to_string()),
            Some(at) => v.check(at != DateTime::<Utc>::UNIX_EPOCH, "lentAt must not be the zero time"),
        }
        v.finish()
    }
}

impl Validate for Wishlist {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut v = Violations::default();
        v.require("name", &self.name);
        v.finish()
    }
}

impl Validate for Wish {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut v = Violations::default();
        v.require("name", &self.name);
        v.require("wishlist", &self.wishlist);
        v.currency(self.currency.as_deref());
        v.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn zero_quantity_is_coerced_to_one() {
        let mut item = Item::new("Dune", "/api/collections/c1");
        item.quantity = 0;
        let normalized = item.normalized();
        assert_eq!(normalized.quantity, 1);
        assert!(normalized.validate().is_ok());
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let mut item = Item::new("Dune", "/api/collections/c1");
        item.quantity = -2;
        let errors = item.normalized().validate().unwrap_err();
        assert_eq!(errors, vec!["quantity must be at least 1, got -2"]);
    }

    #[test]
    fn errors_are_collected_in_declaration_order() {
        let item = Item { quantity: 1, ..Item::default() };
        assert_eq!(item.validate().unwrap_err(), vec!["name is required", "collection is required"]);
    }

    #[test]
    fn datum_requires_exactly_one_parent() {
        let neither = Datum { label: "Author".into(), ..Datum::default() };
        assert!(neither.validate().is_err());

        let mut both = Datum::for_item("/api/items/i", FieldKind::Text, "Author");
        both.collection = Some("/api/collections/c".into());
        assert!(both.validate().is_err());

        let one = Datum::for_collection("/api/collections/c", FieldKind::Text, "Author");
        assert!(one.validate().is_ok());
    }

    #[test]
    fn price_datum_needs_valid_currency_and_decimal() {
        let mut datum = Datum::for_item("/api/items/i", FieldKind::Price, "Price").with_value("99.99");
        assert_eq!(datum.validate().unwrap_err(), vec!["currency is required for price data"]);

        datum.currency = Some("EUR".into());
        assert!(datum.validate().is_ok());

        datum.currency = Some("EURO".into());
        datum.value = Some("cheap".into());
        assert_eq!(datum.validate().unwrap_err().len(), 2);
    }

    #[test]
    fn price_datum_needs_a_value() {
        let mut datum = Datum::for_item("/api/items/i", FieldKind::Price, "Price");
        datum.currency = Some("EUR".into());
        assert_eq!(datum.validate().unwrap_err(), vec!["value is required for price data"]);
    }

    #[test]
    fn media_datum_without_value_is_valid() {
        let datum = Datum::for_item("/api/items/i", FieldKind::Image, "Cover");
        assert!(datum.validate().is_ok());
    }

    #[test]
    fn loan_requires_non_zero_lent_at() {
        let open = Loan::new("/api/items/i", "Alice", Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        assert!(open.validate().is_ok());
        assert!(open.is_open());

        let zero = Loan::new("/api/items/i", "Alice", DateTime::<Utc>::UNIX_EPOCH);
        assert!(zero.validate().is_err());

        let missing = Loan { lent_at: None, ..open };
        assert_eq!(missing.validate().unwrap_err(), vec!["lentAt is required"]);
    }

    #[test]
    fn photo_taken_at_must_be_a_date_time() {
        let mut photo = Photo::new("Beach", "/api/albums/a");
        assert!(photo.validate().is_ok());
        photo.taken_at = Some("2024-07-01T09:30:00+02:00".into());
        assert!(photo.validate().is_ok());
        photo.taken_at = Some("last summer".into());
        assert!(photo.validate().is_err());
    }

    #[test]
    fn wish_currency_is_checked_when_present() {
        let mut wish = Wish::new("Lamp", "/api/wishlists/w");
        assert!(wish.validate().is_ok());
        wish.currency = Some("XYZ".into());
        assert!(wish.validate().is_err());
    }

    #[test]
    fn named_resources_reject_blank_names() {
        assert!(Album::new(" ").validate().is_err());
        assert!(Wishlist::new("").validate().is_err());
        assert!(Template::new("").validate().is_err());
        assert!(TagCategory::new("Genre", "").validate().is_err());
        assert!(Tag::new("").validate().is_err());
        assert!(Field::new("Author", 0, FieldKind::Text, "").validate().is_err());
        assert!(ChoiceList::new("Colors", Vec::<String>::new()).validate().is_err());
    }
}
