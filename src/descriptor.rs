//! Per-type property schemas.
//!
//! An [`Entity`] describes its properties once through a [`SchemaBuilder`]. The
//! result is an immutable [`EntityDescriptor`]: an ordered list of
//! [`PropertyDescriptor`]s, each holding the declared name, an optional explicit
//! key, the declared [`TypeShape`], and type-erased accessors, plus the
//! zero-argument constructor used during deserialization.
//!
//! ## Examples
//!
//! ```rust
//! use entity_map::{Entity, EntityDescriptor, SchemaBuilder};
//!
//! #[derive(Default)]
//! struct User {
//!     id: i64,
//!     username: String,
//! }
//!
//! impl Entity for User {
//!     fn describe(schema: &mut SchemaBuilder<Self>) {
//!         schema.construct_default();
//!         schema.property("id", |u: &User| &u.id, |u: &mut User| &mut u.id);
//!         schema
//!             .property("username", |u: &User| &u.username, |u: &mut User| &mut u.username)
//!             .with_key("login");
//!     }
//! }
//!
//! let descriptor = EntityDescriptor::build::<User>();
//! let names: Vec<_> = descriptor.properties().iter().map(|p| p.name()).collect();
//! assert_eq!(names, vec!["id", "username"]);
//! assert_eq!(descriptor.properties()[1].key(), Some("login"));
//! ```

use crate::{Error, FieldRef, FieldValue, Reflect, Result, TypeShape};
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A user-defined structured type with named properties.
///
/// Implementors register their properties in [`Entity::describe`], which runs
/// exactly once per type, the first time the type is mapped.
/// `describe` must not map entities itself.
pub trait Entity: Sized + Send + Sync + 'static {
    /// Registers the constructor and properties of this type.
    fn describe(schema: &mut SchemaBuilder<Self>);
}

type Getter =
    Box<dyn for<'a> Fn(&'a (dyn Any + Send + Sync)) -> Result<FieldRef<'a>> + Send + Sync>;
type Setter = Box<dyn Fn(&mut (dyn Any + Send + Sync), FieldValue) -> Result<()> + Send + Sync>;
type Constructor = Box<dyn Fn() -> Box<dyn Any + Send + Sync> + Send + Sync>;

fn erased_getter<G>(getter: G) -> Getter
where
    G: for<'a> Fn(&'a (dyn Any + Send + Sync)) -> Result<FieldRef<'a>> + Send + Sync + 'static,
{
    Box::new(getter)
}

fn erased_setter<S>(setter: S) -> Setter
where
    S: Fn(&mut (dyn Any + Send + Sync), FieldValue) -> Result<()> + Send + Sync + 'static,
{
    Box::new(setter)
}

/// Metadata and accessors for a single property.
pub struct PropertyDescriptor {
    name: &'static str,
    key: Option<String>,
    type_name: &'static str,
    shape: TypeShape,
    getter: Getter,
    setter: Option<Setter>,
}

impl PropertyDescriptor {
    /// Returns the declared property name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the explicit external key, if one was registered.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Sets an explicit external key, bypassing the mapper's naming convention.
    pub fn with_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.key = Some(key.into());
        self
    }

    /// Returns the Rust type name of the property.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the declared shape of the property.
    #[must_use]
    pub const fn shape(&self) -> &TypeShape {
        &self.shape
    }

    /// Returns `true` if the property can be assigned during deserialization.
    #[must_use]
    pub const fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    /// Reads the raw property value from `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntityMismatch`] if `entity` is not of the owning type.
    pub fn get<'a>(&self, entity: &'a (dyn Any + Send + Sync)) -> Result<FieldRef<'a>> {
        (self.getter)(entity)
    }

    /// Assigns a restored value to the property of `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntityMismatch`] if `entity` is not of the owning type,
    /// a conversion error if `value` does not fit the property type, or
    /// [`Error::Custom`] if the property is read-only.
    pub fn set(&self, entity: &mut (dyn Any + Send + Sync), value: FieldValue) -> Result<()> {
        match &self.setter {
            Some(setter) => setter(entity, value),
            None => Err(Error::custom(format!("property `{}` is read-only", self.name))),
        }
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("type_name", &self.type_name)
            .field("shape", &self.shape)
            .field("writable", &self.is_writable())
            .finish()
    }
}

/// Builder handed to [`Entity::describe`].
pub struct SchemaBuilder<T> {
    properties: Vec<PropertyDescriptor>,
    constructor: Option<Constructor>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity> SchemaBuilder<T> {
    fn new() -> Self {
        SchemaBuilder {
            properties: Vec::new(),
            constructor: None,
            _marker: PhantomData,
        }
    }

    /// Registers the zero-argument constructor used to allocate fresh instances.
    pub fn construct_with<C>(&mut self, constructor: C) -> &mut Self
    where
        C: Fn() -> T + Send + Sync + 'static,
    {
        self.constructor = Some(Box::new(move || -> Box<dyn Any + Send + Sync> {
            Box::new(constructor())
        }));
        self
    }

    /// Registers [`Default::default`] as the constructor.
    pub fn construct_default(&mut self) -> &mut Self
    where
        T: Default,
    {
        self.construct_with(T::default)
    }

    /// Registers a readable and writable property.
    ///
    /// Properties are serialized in registration order.
    pub fn property<F, G, S>(
        &mut self,
        name: &'static str,
        get: G,
        set: S,
    ) -> &mut PropertyDescriptor
    where
        F: Reflect,
        G: for<'a> Fn(&'a T) -> &'a F + Send + Sync + 'static,
        S: Fn(&mut T) -> &mut F + Send + Sync + 'static,
    {
        let setter = erased_setter(move |entity, value| {
            let entity = entity
                .downcast_mut::<T>()
                .ok_or_else(|| Error::entity_mismatch(type_name::<T>()))?;
            *set(entity) = F::from_field(value)?;
            Ok(())
        });
        self.push::<F, G>(name, get, Some(setter))
    }

    /// Registers a property that is serialized but never assigned.
    pub fn read_only<F, G>(&mut self, name: &'static str, get: G) -> &mut PropertyDescriptor
    where
        F: Reflect,
        G: for<'a> Fn(&'a T) -> &'a F + Send + Sync + 'static,
    {
        self.push::<F, G>(name, get, None)
    }

    fn push<F, G>(
        &mut self,
        name: &'static str,
        get: G,
        setter: Option<Setter>,
    ) -> &mut PropertyDescriptor
    where
        F: Reflect,
        G: for<'a> Fn(&'a T) -> &'a F + Send + Sync + 'static,
    {
        let getter = erased_getter(move |entity| {
            let entity = entity
                .downcast_ref::<T>()
                .ok_or_else(|| Error::entity_mismatch(type_name::<T>()))?;
            Ok(get(entity).to_field())
        });
        let index = self.properties.len();
        self.properties.push(PropertyDescriptor {
            name,
            key: None,
            type_name: type_name::<F>(),
            shape: F::shape(),
            getter,
            setter,
        });
        &mut self.properties[index]
    }
}

/// Immutable schema of one concrete entity type.
pub struct EntityDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    properties: Vec<PropertyDescriptor>,
    constructor: Option<Constructor>,
}

impl EntityDescriptor {
    /// Runs [`Entity::describe`] for `T` and freezes the result.
    ///
    /// This does not consult the shared registry; use
    /// [`registry::descriptor_of`](crate::registry::descriptor_of) to obtain the
    /// cached descriptor.
    #[must_use]
    pub fn build<T: Entity>() -> Self {
        let mut schema = SchemaBuilder::<T>::new();
        T::describe(&mut schema);
        EntityDescriptor {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            properties: schema.properties,
            constructor: schema.constructor,
        }
    }

    /// Returns the [`TypeId`] of the described type.
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the Rust type name of the described type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the properties in registration order.
    #[must_use]
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Looks up a property by its declared name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Returns the number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if no properties were registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Returns `true` if a constructor was registered.
    #[must_use]
    pub const fn is_constructible(&self) -> bool {
        self.constructor.is_some()
    }

    /// Allocates a fresh instance through the registered constructor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Instantiation`] if the type registered no constructor.
    pub fn instantiate(&self) -> Result<Box<dyn Any + Send + Sync>> {
        self.constructor
            .as_ref()
            .map(|construct| construct())
            .ok_or_else(|| Error::instantiation(self.type_name))
    }
}

impl fmt::Debug for EntityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field("type_name", &self.type_name)
            .field("properties", &self.properties)
            .field("constructible", &self.is_constructible())
            .finish()
    }
}

/// Runtime handle to an entity type.
///
/// Carries the type identity plus a function resolving the type's cached
/// descriptor, so element types discovered through a [`TypeShape`] can be
/// mapped without knowing them statically.
#[derive(Clone, Copy)]
pub struct EntityType {
    id: TypeId,
    name: &'static str,
    resolve: fn() -> Arc<EntityDescriptor>,
}

impl EntityType {
    /// Returns the handle for `T`.
    #[must_use]
    pub fn of<T: Entity>() -> Self {
        EntityType {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            resolve: crate::registry::descriptor_of::<T>,
        }
    }

    /// Returns the [`TypeId`] of the entity type.
    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the Rust type name of the entity type.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the cached descriptor, building it on first use.
    #[must_use]
    pub fn descriptor(&self) -> Arc<EntityDescriptor> {
        (self.resolve)()
    }
}

impl PartialEq for EntityType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EntityType {}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityType").field(&self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    #[derive(Default)]
    struct Point {
        x: i32,
        y: i32,
        label: Option<String>,
    }

    impl Entity for Point {
        fn describe(schema: &mut SchemaBuilder<Self>) {
            schema.construct_default();
            schema.property("x", |p: &Point| &p.x, |p: &mut Point| &mut p.x);
            schema.property("y", |p: &Point| &p.y, |p: &mut Point| &mut p.y);
            schema.read_only("label", |p: &Point| &p.label);
        }
    }

    struct NoConstructor {
        flag: bool,
    }

    impl Entity for NoConstructor {
        fn describe(schema: &mut SchemaBuilder<Self>) {
            schema.property(
                "flag",
                |n: &NoConstructor| &n.flag,
                |n: &mut NoConstructor| &mut n.flag,
            );
        }
    }

    #[test]
    fn test_properties_keep_registration_order() {
        let descriptor = EntityDescriptor::build::<Point>();
        let names: Vec<_> = descriptor.properties().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["x", "y", "label"]);
        assert_eq!(
            descriptor.property("label").map(|p| p.shape().clone()),
            Some(TypeShape::optional(TypeShape::Scalar))
        );
    }

    #[test]
    fn test_get_and_set_through_erased_accessors() {
        let descriptor = EntityDescriptor::build::<Point>();
        let mut point: Box<dyn Any + Send + Sync> = descriptor.instantiate().unwrap();

        let x = descriptor.property("x").unwrap();
        x.set(&mut *point, FieldValue::Value(Value::from(7))).unwrap();

        let raw = x.get(&*point).unwrap().into_value().unwrap();
        assert_eq!(raw, Value::from(7));
    }

    #[test]
    fn test_read_only_property_rejects_assignment() {
        let descriptor = EntityDescriptor::build::<Point>();
        let label = descriptor.property("label").unwrap();
        assert!(!label.is_writable());

        let mut point: Box<dyn Any + Send + Sync> = Box::new(Point::default());
        assert!(label
            .set(&mut *point, FieldValue::Value(Value::Null))
            .is_err());
    }

    #[test]
    fn test_accessor_rejects_foreign_entity() {
        let descriptor = EntityDescriptor::build::<Point>();
        let other = NoConstructor { flag: true };
        let err = descriptor.properties()[0].get(&other).unwrap_err();
        assert!(matches!(err, Error::EntityMismatch { .. }));
    }

    #[test]
    fn test_missing_constructor_is_instantiation_error() {
        let descriptor = EntityDescriptor::build::<NoConstructor>();
        assert!(!descriptor.is_constructible());
        assert!(matches!(
            descriptor.instantiate(),
            Err(Error::Instantiation { .. })
        ));
    }

    #[test]
    fn test_entity_type_identity() {
        assert_eq!(EntityType::of::<Point>(), EntityType::of::<Point>());
        assert_ne!(EntityType::of::<Point>(), EntityType::of::<NoConstructor>());
        assert!(EntityType::of::<Point>().name().ends_with("Point"));
    }
}
