//! # entity_map
//!
//! Reflection-driven conversion between entities and string-keyed maps.
//!
//! ## Overview
//!
//! An entity is a plain Rust struct that describes its properties once through
//! the [`Entity`] trait. The crate turns the description into a cached
//! [`EntityDescriptor`], shared by every caller, and walks it to serialize an
//! instance into an [`EntityMap`] or to rebuild an instance from one.
//!
//! - **Descriptor cache**: [`CachedEntity`] fetches the per-type descriptor from a
//!   process-wide registry and exposes `serialize_to_map` / `deserialize_from_map`
//! - **Property mapper**: [`PropertyMapper`] resolves map keys and converts
//!   values; [`DefaultPropertyMapper`] is configured through [`MapperOptions`]
//! - **Strategy chain**: [`strategy`] recursively maps arrays, lists, optional
//!   values and nested entities, to any depth
//! - **Values**: [`Value`] is the dynamic value stored in a map and implements
//!   `serde::Serialize` / `serde::Deserialize`
//!
//! ## Quick Start
//!
//! ```rust
//! use entity_map::{from_map, to_map, value, Entity, SchemaBuilder};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl Entity for Point {
//!     fn describe(schema: &mut SchemaBuilder<Self>) {
//!         schema.construct_default();
//!         schema.property("x", |p: &Point| &p.x, |p: &mut Point| &mut p.x);
//!         schema.property("y", |p: &Point| &p.y, |p: &mut Point| &mut p.y);
//!     }
//! }
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Route {
//!     name: String,
//!     stops: Vec<Point>,
//! }
//!
//! impl Entity for Route {
//!     fn describe(schema: &mut SchemaBuilder<Self>) {
//!         schema.construct_default();
//!         schema.property("name", |r: &Route| &r.name, |r: &mut Route| &mut r.name);
//!         schema.property("stops", |r: &Route| &r.stops, |r: &mut Route| &mut r.stops);
//!     }
//! }
//!
//! let route = Route {
//!     name: "loop".to_string(),
//!     stops: vec![Point { x: 0, y: 0 }, Point { x: 3, y: 4 }],
//! };
//!
//! let map = to_map(&route).unwrap();
//! assert_eq!(
//!     entity_map::Value::Map(map.clone()),
//!     value!({
//!         "name": "loop",
//!         "stops": [{"x": 0, "y": 0}, {"x": 3, "y": 4}]
//!     })
//! );
//!
//! let back: Route = from_map(&map).unwrap();
//! assert_eq!(back, route);
//! ```
//!
//! ## Degraded behavior
//!
//! - A value whose container element type cannot be determined is passed
//!   through unchanged instead of failing
//! - Properties missing from a map keep their constructor default
//! - Two properties resolving to the same key: the later one wins
//!
//! The last two can be made errors with [`MapperOptions::strict`].

#[macro_use]
pub mod macros;

pub mod cached;
pub mod descriptor;
pub mod error;
pub mod field;
pub mod map;
pub mod mapper;
pub mod options;
pub mod reflect;
pub mod registry;
pub mod shape;
pub mod strategy;
pub mod value;

pub use cached::{CachedEntity, DynCachedEntity};
pub use descriptor::{Entity, EntityDescriptor, EntityType, PropertyDescriptor, SchemaBuilder};
pub use error::{Error, Result};
pub use field::{FieldRef, FieldValue};
pub use map::EntityMap;
pub use mapper::{DefaultPropertyMapper, PropertyMapper};
pub use options::{DuplicateKeyPolicy, MapperOptions, MissingKeyPolicy, NamingConvention};
pub use reflect::Reflect;
pub use shape::TypeShape;
pub use strategy::{CollectionMapperStrategy, EntityMapperStrategy, MapperStrategy};
pub use value::{Number, Value};

use std::any::type_name;

/// Serializes `entity` with a [`DefaultPropertyMapper`] using default options.
///
/// # Errors
///
/// Returns an error if a property value cannot be mapped.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_map<T: Entity>(entity: &T) -> Result<EntityMap> {
    to_map_with_options(entity, MapperOptions::default())
}

/// Serializes `entity` with a [`DefaultPropertyMapper`] using `options`.
///
/// # Errors
///
/// Returns an error if a property value cannot be mapped, or
/// [`Error::DuplicateKey`] if two properties share a key and `options` rejects
/// duplicates.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_map_with_options<T: Entity>(entity: &T, options: MapperOptions) -> Result<EntityMap> {
    let mapper = DefaultPropertyMapper::with_options(options);
    cached::write_map(&registry::descriptor_of::<T>(), &mapper, entity)
}

/// Deserializes a `T` with a [`DefaultPropertyMapper`] using default options.
///
/// # Examples
///
/// ```rust
/// use entity_map::{from_map, value, Entity, SchemaBuilder, Value};
///
/// #[derive(Default)]
/// struct Flag {
///     on: bool,
/// }
///
/// impl Entity for Flag {
///     fn describe(schema: &mut SchemaBuilder<Self>) {
///         schema.construct_default();
///         schema.property("on", |f: &Flag| &f.on, |f: &mut Flag| &mut f.on);
///     }
/// }
///
/// let map = match value!({"on": true}) {
///     Value::Map(map) => map,
///     _ => unreachable!(),
/// };
/// let flag: Flag = from_map(&map).unwrap();
/// assert!(flag.on);
/// ```
///
/// # Errors
///
/// Returns [`Error::Instantiation`] if `T` registered no constructor, or an
/// error if a present value cannot be converted to its property type.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_map<T: Entity>(map: &EntityMap) -> Result<T> {
    from_map_with_options(map, MapperOptions::default())
}

/// Deserializes a `T` with a [`DefaultPropertyMapper`] using `options`.
///
/// # Errors
///
/// As [`from_map`], plus [`Error::MissingKey`] if a key is absent and
/// `options` rejects missing keys.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_map_with_options<T: Entity>(map: &EntityMap, options: MapperOptions) -> Result<T> {
    let mapper = DefaultPropertyMapper::with_options(options);
    let entity = cached::read_map(&registry::descriptor_of::<T>(), &mapper, map.clone())?;
    entity
        .downcast::<T>()
        .map(|entity| *entity)
        .map_err(|_| Error::entity_mismatch(type_name::<T>()))
}
