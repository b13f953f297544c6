//! Entity serialization driven by a cached descriptor.
//!
//! [`CachedEntity<T>`] pairs the shared descriptor of `T` with a property
//! mapper and exposes the two entry points of the crate,
//! [`serialize_to_map`](CachedEntity::serialize_to_map) and
//! [`deserialize_from_map`](CachedEntity::deserialize_from_map).
//! [`DynCachedEntity`] does the same for a type only known at runtime through
//! an [`EntityType`]. Nested entities reached by the strategy chain go through
//! the same descriptor walk with the caller's mapper.
//!
//! ## Examples
//!
//! ```rust
//! use entity_map::{
//!     value, CachedEntity, DefaultPropertyMapper, Entity, MapperOptions, NamingConvention,
//!     SchemaBuilder,
//! };
//! use std::sync::Arc;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct User {
//!     id: i64,
//!     username: String,
//! }
//!
//! impl Entity for User {
//!     fn describe(schema: &mut SchemaBuilder<Self>) {
//!         schema.construct_default();
//!         schema.property("id", |u: &User| &u.id, |u: &mut User| &mut u.id);
//!         schema.property("username", |u: &User| &u.username, |u: &mut User| {
//!             &mut u.username
//!         });
//!     }
//! }
//!
//! let mapper = DefaultPropertyMapper::with_options(
//!     MapperOptions::new().with_naming(NamingConvention::PascalCase),
//! );
//! let cached = CachedEntity::<User>::new(Arc::new(mapper));
//!
//! let user = User { id: 1, username: "Jack".to_string() };
//! let map = cached.serialize_to_map(&user).unwrap();
//! assert_eq!(value!(map.clone()), value!({"Id": 1, "Username": "Jack"}));
//!
//! let back = cached.deserialize_from_map(&map).unwrap();
//! assert_eq!(back, user);
//! ```

use crate::descriptor::{Entity, EntityDescriptor, EntityType, PropertyDescriptor};
use crate::options::{DuplicateKeyPolicy, MissingKeyPolicy};
use crate::{EntityMap, Error, PropertyMapper, Result};
use std::any::{type_name, Any};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Writes every property of `entity` into a fresh map.
pub(crate) fn write_map(
    descriptor: &EntityDescriptor,
    mapper: &dyn PropertyMapper,
    entity: &(dyn Any + Send + Sync),
) -> Result<EntityMap> {
    let mut map = EntityMap::with_capacity(descriptor.len());
    for property in descriptor.properties() {
        let key = mapper.property_name(entity, property);
        let value = mapper
            .property_value(entity, property)
            .and_then(|raw| mapper.map_property_value(property, raw))
            .map_err(|e| failed_at(descriptor, property, e))?;

        if map.contains_key(&key) {
            match mapper.duplicate_key_policy() {
                DuplicateKeyPolicy::LastWriteWins => {
                    log::trace!(
                        "{}.{} overwrites key `{}`",
                        descriptor.type_name(),
                        property.name(),
                        key
                    );
                }
                DuplicateKeyPolicy::Reject => {
                    return Err(Error::DuplicateKey {
                        type_name: descriptor.type_name(),
                        key,
                    });
                }
            }
        }
        map.insert(key, value);
    }
    Ok(map)
}

/// Builds a fresh instance and assigns every property present in `map`.
///
/// Values are moved out of `map`, so a key feeds at most one property: the
/// first writable property resolving to it.
pub(crate) fn read_map(
    descriptor: &EntityDescriptor,
    mapper: &dyn PropertyMapper,
    mut map: EntityMap,
) -> Result<Box<dyn Any + Send + Sync>> {
    let mut entity = descriptor.instantiate()?;
    let mut consumed: Vec<String> = Vec::new();
    for property in descriptor.properties().iter().filter(|p| p.is_writable()) {
        let key = mapper.property_name(&*entity, property);
        let Some(value) = map.remove(&key) else {
            if consumed.contains(&key) {
                log::trace!(
                    "{}.{} skipped, key `{}` already assigned",
                    descriptor.type_name(),
                    property.name(),
                    key
                );
            } else if mapper.missing_key_policy() == MissingKeyPolicy::Reject {
                return Err(Error::MissingKey {
                    type_name: descriptor.type_name(),
                    key,
                });
            }
            continue;
        };
        mapper
            .unmap_property_value(property, value)
            .and_then(|restored| mapper.set_property_value(&mut *entity, property, restored))
            .map_err(|e| failed_at(descriptor, property, e))?;
        consumed.push(key);
    }
    Ok(entity)
}

fn failed_at(descriptor: &EntityDescriptor, property: &PropertyDescriptor, err: Error) -> Error {
    log::debug!(
        "mapping {}.{} failed: {}",
        descriptor.type_name(),
        property.name(),
        err
    );
    err
}

/// Cached descriptor of a runtime-typed entity paired with a mapper.
#[derive(Clone)]
pub struct DynCachedEntity {
    descriptor: Arc<EntityDescriptor>,
    mapper: Arc<dyn PropertyMapper>,
}

impl DynCachedEntity {
    /// Fetches (or builds) the descriptor of `entity_type`.
    #[must_use]
    pub fn new(mapper: Arc<dyn PropertyMapper>, entity_type: EntityType) -> Self {
        DynCachedEntity {
            descriptor: entity_type.descriptor(),
            mapper,
        }
    }

    #[must_use]
    pub fn descriptor(&self) -> &Arc<EntityDescriptor> {
        &self.descriptor
    }

    /// Returns the properties in declaration order.
    #[must_use]
    pub fn properties(&self) -> &[PropertyDescriptor] {
        self.descriptor.properties()
    }

    /// Serializes a type-erased entity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntityMismatch`] if `entity` is not of the described
    /// type, or the first error raised while mapping a property value.
    pub fn serialize_to_map(&self, entity: &(dyn Any + Send + Sync)) -> Result<EntityMap> {
        write_map(&self.descriptor, &*self.mapper, entity)
    }

    /// Deserializes into a fresh, type-erased instance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Instantiation`] if the type has no constructor, or any
    /// error raised while restoring a property value.
    pub fn deserialize_from_map(&self, map: &EntityMap) -> Result<Box<dyn Any + Send + Sync>> {
        read_map(&self.descriptor, &*self.mapper, map.clone())
    }
}

impl fmt::Debug for DynCachedEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynCachedEntity")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Cached descriptor of `T` paired with a mapper.
pub struct CachedEntity<T> {
    inner: DynCachedEntity,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity> CachedEntity<T> {
    /// Fetches (or builds) the descriptor of `T`.
    #[must_use]
    pub fn new(mapper: Arc<dyn PropertyMapper>) -> Self {
        CachedEntity {
            inner: DynCachedEntity::new(mapper, EntityType::of::<T>()),
            _marker: PhantomData,
        }
    }

    /// Builds the cache from a runtime type handle, which must denote `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntityMismatch`] if `entity_type` is not `T`.
    pub fn from_runtime_type(
        mapper: Arc<dyn PropertyMapper>,
        entity_type: EntityType,
    ) -> Result<Self> {
        if entity_type != EntityType::of::<T>() {
            return Err(Error::entity_mismatch(type_name::<T>()));
        }
        Ok(CachedEntity {
            inner: DynCachedEntity::new(mapper, entity_type),
            _marker: PhantomData,
        })
    }

    #[must_use]
    pub fn descriptor(&self) -> &Arc<EntityDescriptor> {
        self.inner.descriptor()
    }

    /// Returns the properties in declaration order.
    #[must_use]
    pub fn properties(&self) -> &[PropertyDescriptor] {
        self.inner.properties()
    }

    /// Serializes `entity` into a fresh map.
    ///
    /// Keys are resolved by the mapper for each property; when two properties
    /// resolve to the same key the later one wins unless the mapper rejects
    /// duplicates.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while mapping a property value.
    pub fn serialize_to_map(&self, entity: &T) -> Result<EntityMap> {
        self.inner.serialize_to_map(entity)
    }

    /// Deserializes a fresh `T` from `map`.
    ///
    /// Properties without a matching key keep their constructor default.
    /// Read-only properties are never assigned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Instantiation`] if `T` registered no constructor, or the
    /// first error raised while restoring a property value.
    pub fn deserialize_from_map(&self, map: &EntityMap) -> Result<T> {
        let entity = self.inner.deserialize_from_map(map)?;
        entity
            .downcast::<T>()
            .map(|entity| *entity)
            .map_err(|_| Error::entity_mismatch(type_name::<T>()))
    }
}

impl<T> Clone for CachedEntity<T> {
    fn clone(&self) -> Self {
        CachedEntity {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for CachedEntity<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CachedEntity").field(&self.inner).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DefaultPropertyMapper, MapperOptions, SchemaBuilder, Value};

    #[derive(Debug, Default, PartialEq)]
    struct Pair {
        left: i32,
        right: i32,
    }

    impl Entity for Pair {
        fn describe(schema: &mut SchemaBuilder<Self>) {
            schema.construct_default();
            schema
                .property("left", |p: &Pair| &p.left, |p: &mut Pair| &mut p.left)
                .with_key("v");
            schema
                .property("right", |p: &Pair| &p.right, |p: &mut Pair| &mut p.right)
                .with_key("v");
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Other {
        flag: bool,
    }

    impl Entity for Other {
        fn describe(schema: &mut SchemaBuilder<Self>) {
            schema.construct_default();
            schema.property("flag", |o: &Other| &o.flag, |o: &mut Other| &mut o.flag);
        }
    }

    fn cached<T: Entity>(options: MapperOptions) -> CachedEntity<T> {
        CachedEntity::new(Arc::new(DefaultPropertyMapper::with_options(options)))
    }

    #[test]
    fn test_colliding_keys_last_write_wins() {
        let cache = cached::<Pair>(MapperOptions::new());
        let map = cache.serialize_to_map(&Pair { left: 1, right: 2 }).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("v"), Some(&Value::from(2)));
    }

    #[test]
    fn test_colliding_keys_rejected_when_strict() {
        let cache = cached::<Pair>(MapperOptions::strict());
        let err = cache
            .serialize_to_map(&Pair { left: 1, right: 2 })
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { ref key, .. } if key == "v"));
    }

    #[test]
    fn test_missing_key_rejected_when_strict() {
        let cache = cached::<Other>(MapperOptions::strict());
        let err = cache.deserialize_from_map(&EntityMap::new()).unwrap_err();
        assert!(matches!(err, Error::MissingKey { ref key, .. } if key == "flag"));
    }

    #[test]
    fn test_caches_share_descriptor() {
        let a = cached::<Other>(MapperOptions::new());
        let b = cached::<Other>(MapperOptions::strict());
        assert!(Arc::ptr_eq(a.descriptor(), b.descriptor()));
    }

    #[test]
    fn test_from_runtime_type_checks_identity() {
        let mapper: Arc<dyn PropertyMapper> = Arc::new(DefaultPropertyMapper::new());
        assert!(
            CachedEntity::<Other>::from_runtime_type(mapper.clone(), EntityType::of::<Other>())
                .is_ok()
        );

        let err = CachedEntity::<Other>::from_runtime_type(mapper, EntityType::of::<Pair>())
            .unwrap_err();
        assert!(matches!(err, Error::EntityMismatch { .. }));
    }

    #[test]
    fn test_dyn_cache_rejects_foreign_entity() {
        let mapper: Arc<dyn PropertyMapper> = Arc::new(DefaultPropertyMapper::new());
        let cache = DynCachedEntity::new(mapper, EntityType::of::<Other>());
        let err = cache.serialize_to_map(&Pair::default()).unwrap_err();
        assert!(matches!(err, Error::EntityMismatch { .. }));
    }

    #[test]
    fn test_colliding_key_feeds_first_property_on_read() {
        let cache = cached::<Pair>(MapperOptions::new());
        let mut map = EntityMap::new();
        map.insert("v".to_string(), Value::from(7));

        let pair = cache.deserialize_from_map(&map).unwrap();
        assert_eq!(pair, Pair { left: 7, right: 0 });
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_colliding_key_read_is_not_missing_when_strict() {
        let cache = cached::<Pair>(MapperOptions::strict());
        let mut map = EntityMap::new();
        map.insert("v".to_string(), Value::from(7));

        let pair = cache.deserialize_from_map(&map).unwrap();
        assert_eq!(pair.left, 7);
    }

    #[test]
    fn test_dyn_cache_round_trip() {
        let mapper: Arc<dyn PropertyMapper> = Arc::new(DefaultPropertyMapper::new());
        let cache = DynCachedEntity::new(mapper, EntityType::of::<Other>());

        let map = cache.serialize_to_map(&Other { flag: true }).unwrap();
        let restored = cache.deserialize_from_map(&map).unwrap();
        assert_eq!(restored.downcast_ref::<Other>(), Some(&Other { flag: true }));
    }
}
