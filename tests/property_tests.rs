//! Property-based tests for the entity round trip.
//!
//! Generated entities are serialized and rebuilt through the default mapper;
//! the result must equal the input for every naming convention.

use entity_map::{
    from_map_with_options, to_map_with_options, Entity, MapperOptions, NamingConvention,
    SchemaBuilder, Value,
};
use proptest::prelude::*;

#[derive(Debug, Default, Clone, PartialEq)]
struct Item {
    code: String,
    count: u32,
}

impl Entity for Item {
    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema.construct_default();
        schema.property("code", |i: &Item| &i.code, |i: &mut Item| &mut i.code);
        schema.property("count", |i: &Item| &i.count, |i: &mut Item| &mut i.count);
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Basket {
    owner_id: i64,
    active: bool,
    weight: Option<i16>,
    items: Vec<Item>,
    pinned: [Item; 2],
    matrix: Vec<Vec<u8>>,
    total: u128,
}

impl Entity for Basket {
    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema.construct_default();
        schema.property("owner_id", |b: &Basket| &b.owner_id, |b: &mut Basket| &mut b.owner_id);
        schema.property("active", |b: &Basket| &b.active, |b: &mut Basket| &mut b.active);
        schema.property("weight", |b: &Basket| &b.weight, |b: &mut Basket| &mut b.weight);
        schema.property("items", |b: &Basket| &b.items, |b: &mut Basket| &mut b.items);
        schema.property("pinned", |b: &Basket| &b.pinned, |b: &mut Basket| &mut b.pinned);
        schema.property("matrix", |b: &Basket| &b.matrix, |b: &mut Basket| &mut b.matrix);
        schema.property("total", |b: &Basket| &b.total, |b: &mut Basket| &mut b.total);
    }
}

fn item() -> impl Strategy<Value = Item> {
    ("[a-zA-Z0-9 ]{0,12}", any::<u32>()).prop_map(|(code, count)| Item { code, count })
}

fn basket() -> impl Strategy<Value = Basket> {
    (
        any::<i64>(),
        any::<bool>(),
        proptest::option::of(any::<i16>()),
        prop::collection::vec(item(), 0..8),
        (item(), item()),
        prop::collection::vec(prop::collection::vec(any::<u8>(), 0..4), 0..4),
        any::<u128>(),
    )
        .prop_map(
            |(owner_id, active, weight, items, (first, second), matrix, total)| Basket {
                owner_id,
                active,
                weight,
                items,
                pinned: [first, second],
                matrix,
                total,
            },
        )
}

fn naming() -> impl Strategy<Value = NamingConvention> {
    prop_oneof![
        Just(NamingConvention::AsDeclared),
        Just(NamingConvention::PascalCase),
        Just(NamingConvention::CamelCase),
        Just(NamingConvention::SnakeCase),
        Just(NamingConvention::KebabCase),
        Just(NamingConvention::ScreamingSnakeCase),
    ]
}

proptest! {
    #[test]
    fn prop_basket_round_trip(basket in basket(), naming in naming()) {
        let options = MapperOptions::new().with_naming(naming);
        let map = to_map_with_options(&basket, options.clone()).unwrap();
        prop_assert_eq!(map.len(), 7);

        let back = from_map_with_options::<Basket>(&map, options).unwrap();
        prop_assert_eq!(back, basket);
    }

    #[test]
    fn prop_list_length_and_order_kept(items in prop::collection::vec(item(), 0..16)) {
        let basket = Basket { items: items.clone(), ..Default::default() };
        let map = to_map_with_options(&basket, MapperOptions::new()).unwrap();

        let mapped = map.get("items").and_then(Value::as_array).unwrap();
        prop_assert_eq!(mapped.len(), items.len());
        for (value, item) in mapped.iter().zip(&items) {
            let code = value.as_map().and_then(|m| m.get("code")).and_then(Value::as_str);
            prop_assert_eq!(code, Some(item.code.as_str()));
        }
    }

    #[test]
    fn prop_strict_options_accept_complete_maps(basket in basket()) {
        let map = to_map_with_options(&basket, MapperOptions::strict()).unwrap();
        let back = from_map_with_options::<Basket>(&map, MapperOptions::strict()).unwrap();
        prop_assert_eq!(back, basket);
    }
}
