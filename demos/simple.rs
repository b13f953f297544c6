//! Basic entity to map conversion and back.
//!
//! Run with: cargo run --example simple

use entity_map::{
    CachedEntity, DefaultPropertyMapper, Entity, MapperOptions, NamingConvention, SchemaBuilder,
};
use std::error::Error;
use std::sync::Arc;

#[derive(Debug, Default, PartialEq)]
struct SimpleUserEntity {
    id: i32,
    username: String,
}

impl Entity for SimpleUserEntity {
    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema.construct_default();
        schema.property(
            "id",
            |u: &SimpleUserEntity| &u.id,
            |u: &mut SimpleUserEntity| &mut u.id,
        );
        schema.property(
            "username",
            |u: &SimpleUserEntity| &u.username,
            |u: &mut SimpleUserEntity| &mut u.username,
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let mapper = DefaultPropertyMapper::with_options(
        MapperOptions::new().with_naming(NamingConvention::PascalCase),
    );
    let cached = CachedEntity::<SimpleUserEntity>::new(Arc::new(mapper));

    let user = SimpleUserEntity {
        id: 1,
        username: "Jack".to_string(),
    };

    // Entity to map
    let map = cached.serialize_to_map(&user)?;
    println!("Map output:\n{}\n", serde_json::to_string_pretty(&map)?);

    // Map back to a fresh entity
    let user_back = cached.deserialize_from_map(&map)?;
    assert_eq!(user, user_back);
    println!("✓ Round-trip successful");

    Ok(())
}
