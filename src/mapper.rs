//! Property-level mapping policy.
//!
//! A [`PropertyMapper`] decides which key a property is stored under, reads and
//! writes property values, and converts single values. Structural conversion of
//! collections and nested entities is delegated back into the
//! [strategy chain](crate::strategy), which in turn calls the mapper again for
//! every nested entity.
//!
//! [`DefaultPropertyMapper`] covers the common case and is configured through
//! [`MapperOptions`].
//!
//! ## Custom mappers
//!
//! ```rust
//! use entity_map::strategy::{self, MapperStrategy};
//! use entity_map::{FieldRef, FieldValue, PropertyDescriptor, PropertyMapper, Result, Value};
//! use std::any::Any;
//!
//! /// Stores every property under an upper-case key.
//! struct UpperKeys;
//!
//! impl PropertyMapper for UpperKeys {
//!     fn property_name(
//!         &self,
//!         _: &(dyn Any + Send + Sync),
//!         property: &PropertyDescriptor,
//!     ) -> String {
//!         property.name().to_uppercase()
//!     }
//!
//!     fn map_property_value(
//!         &self,
//!         property: &PropertyDescriptor,
//!         value: FieldRef<'_>,
//!     ) -> Result<Value> {
//!         strategy::recursive(self).map_value(property.shape(), value)
//!     }
//!
//!     fn unmap_property_value(
//!         &self,
//!         property: &PropertyDescriptor,
//!         value: Value,
//!     ) -> Result<FieldValue> {
//!         strategy::recursive(self).unmap_value(property.shape(), value)
//!     }
//! }
//! ```

use crate::options::{DuplicateKeyPolicy, MapperOptions, MissingKeyPolicy};
use crate::strategy::{self, MapperStrategy};
use crate::{FieldRef, FieldValue, PropertyDescriptor, Result, Value};
use std::any::Any;

/// Collaborator resolving keys and converting individual property values.
pub trait PropertyMapper: Send + Sync {
    /// Returns the map key for `property` of `entity`.
    ///
    /// The key may depend on the instance being serialized. During
    /// deserialization `entity` is the freshly constructed instance.
    fn property_name(
        &self,
        entity: &(dyn Any + Send + Sync),
        property: &PropertyDescriptor,
    ) -> String;

    /// Reads the raw value of `property` from `entity`.
    fn property_value<'a>(
        &self,
        entity: &'a (dyn Any + Send + Sync),
        property: &PropertyDescriptor,
    ) -> Result<FieldRef<'a>> {
        property.get(entity)
    }

    /// Assigns a restored value to `property` of `entity`.
    fn set_property_value(
        &self,
        entity: &mut (dyn Any + Send + Sync),
        property: &PropertyDescriptor,
        value: FieldValue,
    ) -> Result<()> {
        property.set(entity, value)
    }

    /// Converts a raw property value to its map form.
    fn map_property_value(
        &self,
        property: &PropertyDescriptor,
        value: FieldRef<'_>,
    ) -> Result<Value>;

    /// Converts a map value back to a value assignable to `property`.
    fn unmap_property_value(
        &self,
        property: &PropertyDescriptor,
        value: Value,
    ) -> Result<FieldValue>;

    /// Treatment of properties absent from the map.
    fn missing_key_policy(&self) -> MissingKeyPolicy {
        MissingKeyPolicy::default()
    }

    /// Treatment of properties resolving to an already written key.
    fn duplicate_key_policy(&self) -> DuplicateKeyPolicy {
        DuplicateKeyPolicy::default()
    }
}

/// Options-driven property mapper.
///
/// Keys are the explicit property key when one was registered, otherwise the
/// declared name converted by the configured naming convention.
///
/// # Examples
///
/// ```rust
/// use entity_map::{
///     CachedEntity, DefaultPropertyMapper, Entity, MapperOptions, NamingConvention, SchemaBuilder,
/// };
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct User {
///     id: i64,
///     user_name: String,
/// }
///
/// impl Entity for User {
///     fn describe(schema: &mut SchemaBuilder<Self>) {
///         schema.construct_default();
///         schema.property("id", |u: &User| &u.id, |u: &mut User| &mut u.id);
///         schema.property("user_name", |u: &User| &u.user_name, |u: &mut User| {
///             &mut u.user_name
///         });
///     }
/// }
///
/// let mapper = DefaultPropertyMapper::with_options(
///     MapperOptions::new().with_naming(NamingConvention::CamelCase),
/// );
/// let cached = CachedEntity::<User>::new(Arc::new(mapper));
/// let map = cached.serialize_to_map(&User { id: 1, user_name: "jack".into() }).unwrap();
/// assert_eq!(map.keys().collect::<Vec<_>>(), vec!["id", "userName"]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct DefaultPropertyMapper {
    options: MapperOptions,
}

impl DefaultPropertyMapper {
    /// Creates a mapper with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: MapperOptions) -> Self {
        DefaultPropertyMapper { options }
    }

    #[must_use]
    pub fn options(&self) -> &MapperOptions {
        &self.options
    }
}

impl PropertyMapper for DefaultPropertyMapper {
    fn property_name(
        &self,
        _entity: &(dyn Any + Send + Sync),
        property: &PropertyDescriptor,
    ) -> String {
        match property.key() {
            Some(key) => key.to_owned(),
            None => self.options.naming.apply(property.name()),
        }
    }

    fn map_property_value(
        &self,
        property: &PropertyDescriptor,
        value: FieldRef<'_>,
    ) -> Result<Value> {
        strategy::recursive(self).map_value(property.shape(), value)
    }

    fn unmap_property_value(
        &self,
        property: &PropertyDescriptor,
        value: Value,
    ) -> Result<FieldValue> {
        strategy::recursive(self).unmap_value(property.shape(), value)
    }

    fn missing_key_policy(&self) -> MissingKeyPolicy {
        self.options.missing_keys
    }

    fn duplicate_key_policy(&self) -> DuplicateKeyPolicy {
        self.options.duplicate_keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Entity, EntityDescriptor, NamingConvention, SchemaBuilder};

    #[derive(Default)]
    struct Account {
        account_id: i64,
        display_name: String,
    }

    impl Entity for Account {
        fn describe(schema: &mut SchemaBuilder<Self>) {
            schema.construct_default();
            schema.property(
                "account_id",
                |a: &Account| &a.account_id,
                |a: &mut Account| &mut a.account_id,
            );
            schema
                .property(
                    "display_name",
                    |a: &Account| &a.display_name,
                    |a: &mut Account| &mut a.display_name,
                )
                .with_key("name");
        }
    }

    #[test]
    fn test_naming_convention_and_explicit_key() {
        let descriptor = EntityDescriptor::build::<Account>();
        let account = Account::default();
        let mapper = DefaultPropertyMapper::with_options(
            MapperOptions::new().with_naming(NamingConvention::PascalCase),
        );

        let names: Vec<_> = descriptor
            .properties()
            .iter()
            .map(|p| mapper.property_name(&account, p))
            .collect();
        assert_eq!(names, vec!["AccountId", "name"]);
    }

    #[test]
    fn test_policies_follow_options() {
        let mapper = DefaultPropertyMapper::new();
        assert_eq!(mapper.missing_key_policy(), MissingKeyPolicy::Ignore);

        let mapper = DefaultPropertyMapper::with_options(MapperOptions::strict());
        assert_eq!(mapper.missing_key_policy(), MissingKeyPolicy::Reject);
        assert_eq!(mapper.duplicate_key_policy(), DuplicateKeyPolicy::Reject);
    }

    #[test]
    fn test_scalar_value_conversion() {
        let descriptor = EntityDescriptor::build::<Account>();
        let mapper = DefaultPropertyMapper::new();
        let account = Account {
            account_id: 12,
            display_name: String::new(),
        };
        let property = &descriptor.properties()[0];

        let raw = mapper.property_value(&account, property).unwrap();
        let mapped = mapper.map_property_value(property, raw).unwrap();
        assert_eq!(mapped, Value::from(12));

        let restored = mapper.unmap_property_value(property, mapped).unwrap();
        assert_eq!(restored.into_scalar("integer").unwrap(), Value::from(12));
    }
}
