//! Bulk deletion and the datum index against a populated mock server.

mod common;

use chrono::Utc;
use koillection_core::{
    delete_everything, Album, ChoiceList, Collection, Datum, DatumIndex, Field, FieldKind, Inventory, Item, Loan,
    Photo, Resource, Tag, TagCategory, Template, User, Wish, Wishlist,
};
use mock_server::MockState;

fn populate(client: &koillection_core::Client) {
    let template = client.create(&Template::new("Book")).unwrap();
    let choices = client.create(&ChoiceList::new("Formats", ["paperback", "hardcover"])).unwrap();
    let mut format = Field::new("Format", 1, FieldKind::ChoiceList, template.iri());
    format.choice_list = Some(choices.iri());
    client.create(&format).unwrap();

    let root = client.create(&Collection::new("Library")).unwrap();
    let mut books = Collection::new("Books");
    books.parent = Some(root.iri());
    books.items_default_template = Some(template.iri());
    let books = client.create(&books).unwrap();
    let mut shelf = Collection::new("Shelf");
    shelf.parent = Some(books.iri());
    let shelf = client.create(&shelf).unwrap();
    client
        .create(&Datum::for_collection(shelf.iri(), FieldKind::Text, "room").with_value("attic"))
        .unwrap();

    let category = client.create(&TagCategory::new("Genre", "#ff0000")).unwrap();
    let mut tag = Tag::new("sci-fi");
    tag.category = Some(category.iri());
    let tag = client.create(&tag).unwrap();

    let mut dune = Item::new("Dune", books.iri());
    dune.tags = vec![tag.iri()];
    let dune = client.create(&dune).unwrap();
    let mut datum = Datum::for_item(dune.iri(), FieldKind::Text, "author").with_value("Herbert");
    datum.choice_list = Some(choices.iri());
    client.create(&datum).unwrap();
    client.create(&Loan::new(dune.iri(), "Alice", Utc::now())).unwrap();

    let album = client.create(&Album::new("Holidays")).unwrap();
    let mut nested = Album::new("Beach");
    nested.parent = Some(album.iri());
    let nested = client.create(&nested).unwrap();
    client.create(&Photo::new("Sunset", nested.iri())).unwrap();

    let wishlist = client.create(&Wishlist::new("Gifts")).unwrap();
    let mut inner = Wishlist::new("Books to buy");
    inner.parent = Some(wishlist.iri());
    let inner = client.create(&inner).unwrap();
    client.create(&Wish::new("Hyperion", inner.iri())).unwrap();
}

fn assert_empty<R: Resource>(client: &koillection_core::Client) {
    let left: Vec<R> = client.list_all().unwrap();
    assert!(left.is_empty(), "{} left: {}", R::KIND, left.len());
}

#[test]
fn cascade_empties_the_account_and_is_idempotent() {
    let client = common::client_with(MockState::default().with_inventory("2024", serde_json::json!({})));
    populate(&client);

    let deleted = delete_everything(&client).unwrap();
    assert_eq!(deleted, 19);

    assert_empty::<Photo>(&client);
    assert_empty::<Wish>(&client);
    assert_empty::<Item>(&client);
    assert_empty::<Loan>(&client);
    assert_empty::<Datum>(&client);
    assert_empty::<Album>(&client);
    assert_empty::<Wishlist>(&client);
    assert_empty::<Collection>(&client);
    assert_empty::<Field>(&client);
    assert_empty::<Template>(&client);
    assert_empty::<Tag>(&client);
    assert_empty::<TagCategory>(&client);
    assert_empty::<ChoiceList>(&client);
    assert_empty::<Inventory>(&client);

    let users: Vec<User> = client.list_all().unwrap();
    assert_eq!(users.len(), 1);

    assert_eq!(delete_everything(&client).unwrap(), 0);
}

#[test]
fn datum_index_groups_items_by_label_and_value() {
    let client = common::client();
    let books = client.create(&Collection::new("Books")).unwrap();
    let films = client.create(&Collection::new("Films")).unwrap();

    let first = client.create(&Item::new("Dune", books.iri())).unwrap();
    let second = client.create(&Item::new("Emma", books.iri())).unwrap();
    let other = client.create(&Item::new("Alien", films.iri())).unwrap();
    for (item, value) in [(&first, "X"), (&second, "Y"), (&other, "X")] {
        client
            .create(&Datum::for_item(item.iri(), FieldKind::Text, "author").with_value(value))
            .unwrap();
    }

    let index = DatumIndex::build(&client, "Books").unwrap();
    let x = index.items("author", "X");
    assert_eq!(x.len(), 1);
    assert_eq!(x[0].id, first.id);
    let y = index.items("author", "Y");
    assert_eq!(y.len(), 1);
    assert_eq!(y[0].id, second.id);
    assert_eq!(index.len(), 2);

    let err = DatumIndex::build(&client, "Comics").unwrap_err();
    assert!(err.is_not_found());
}
