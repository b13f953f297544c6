//! Recursive value transformation.
//!
//! A [`MapperStrategy`] converts a raw property value to its map form and back,
//! guided by the declared [`TypeShape`]. Strategies compose as a chain:
//! [`EntityMapperStrategy`] is the base and handles leaves and nested entities,
//! [`CollectionMapperStrategy`] wraps it and takes care of arrays, lists and
//! optional values, recursing through itself for each element so nesting depth
//! is unbounded.
//!
//! ## Examples
//!
//! ```rust
//! use entity_map::strategy::{self, MapperStrategy};
//! use entity_map::{DefaultPropertyMapper, Reflect};
//!
//! let mapper = DefaultPropertyMapper::new();
//! let chain = strategy::recursive(&mapper);
//!
//! let nested = vec![vec![1, 2], vec![3]];
//! let mapped = chain.map_value(&Vec::<Vec<i32>>::shape(), nested.to_field()).unwrap();
//! assert_eq!(mapped.as_array().map(Vec::len), Some(2));
//!
//! let first = mapped.as_array().unwrap()[0].clone();
//! let restored = chain.unmap_value(&<[i32; 2]>::shape(), first).unwrap();
//! assert!(restored.is_array());
//! ```

use crate::cached;
use crate::{Error, FieldRef, FieldValue, PropertyMapper, Result, TypeShape, Value};

/// A composable transformer over (declared shape, value) pairs.
///
/// Implementations are side-effect free apart from whatever the property mapper
/// they call into does.
pub trait MapperStrategy {
    /// Converts a raw property value to its map form.
    fn map_value(&self, shape: &TypeShape, value: FieldRef<'_>) -> Result<Value>;

    /// Converts a map-form value back to a value assignable to a property.
    fn unmap_value(&self, shape: &TypeShape, value: Value) -> Result<FieldValue>;
}

/// The full strategy chain used for property values.
pub type RecursiveMapperStrategy<'m> = CollectionMapperStrategy<EntityMapperStrategy<'m>>;

/// Builds the full strategy chain on top of `mapper`.
///
/// Nested entities reached through the chain are mapped with the same `mapper`.
#[must_use]
pub fn recursive(mapper: &dyn PropertyMapper) -> RecursiveMapperStrategy<'_> {
    CollectionMapperStrategy::new(EntityMapperStrategy::new(mapper))
}

/// Base strategy: leaves pass through, nested entities become nested maps.
#[derive(Clone, Copy)]
pub struct EntityMapperStrategy<'m> {
    mapper: &'m dyn PropertyMapper,
}

impl<'m> EntityMapperStrategy<'m> {
    #[must_use]
    pub fn new(mapper: &'m dyn PropertyMapper) -> Self {
        EntityMapperStrategy { mapper }
    }
}

impl MapperStrategy for EntityMapperStrategy<'_> {
    fn map_value(&self, shape: &TypeShape, value: FieldRef<'_>) -> Result<Value> {
        match (shape, value) {
            (TypeShape::Entity(ty), FieldRef::Entity(entity)) => {
                cached::write_map(&ty.descriptor(), self.mapper, entity).map(Value::Map)
            }
            (_, FieldRef::Entity(_)) => Err(Error::type_conversion(&shape.to_string(), "entity")),
            (_, other) => other.into_value(),
        }
    }

    fn unmap_value(&self, shape: &TypeShape, value: Value) -> Result<FieldValue> {
        match (shape, value) {
            (TypeShape::Entity(ty), Value::Map(map)) => {
                cached::read_map(&ty.descriptor(), self.mapper, map).map(FieldValue::Entity)
            }
            (_, other) => Ok(FieldValue::Value(other)),
        }
    }
}

/// Decorator handling arrays, lists and optional values.
///
/// Shapes without an element type are delegated to the inner strategy
/// unchanged, as are container-shaped values that are not sequences.
#[derive(Clone, Copy)]
pub struct CollectionMapperStrategy<S> {
    inner: S,
}

impl<S: MapperStrategy> CollectionMapperStrategy<S> {
    #[must_use]
    pub fn new(inner: S) -> Self {
        CollectionMapperStrategy { inner }
    }

    /// Returns the wrapped strategy.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: MapperStrategy> MapperStrategy for CollectionMapperStrategy<S> {
    fn map_value(&self, shape: &TypeShape, value: FieldRef<'_>) -> Result<Value> {
        if let TypeShape::Optional(inner) = shape {
            return match value {
                FieldRef::Value(Value::Null) => Ok(Value::Null),
                other => self.map_value(inner, other),
            };
        }

        match (shape.element(), value) {
            (Some(element), FieldRef::Seq(items)) => items
                .into_iter()
                .map(|item| self.map_value(element, item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            (Some(_), other) => {
                log::trace!("{} value under {} shape passed through", other.kind(), shape);
                self.inner.map_value(shape, other)
            }
            (None, other) => self.inner.map_value(shape, other),
        }
    }

    fn unmap_value(&self, shape: &TypeShape, value: Value) -> Result<FieldValue> {
        if let TypeShape::Optional(inner) = shape {
            return match value {
                Value::Null => Ok(FieldValue::Value(Value::Null)),
                other => self.unmap_value(inner, other),
            };
        }

        match (shape.element(), value) {
            (Some(element), Value::Array(items)) => {
                let items = items
                    .into_iter()
                    .map(|item| self.unmap_value(element, item))
                    .collect::<Result<Vec<_>>>()?;
                if shape.is_array() {
                    Ok(FieldValue::Array(items))
                } else {
                    Ok(FieldValue::List(items))
                }
            }
            (Some(_), other) => {
                log::trace!("{} value under {} shape passed through", other.kind(), shape);
                self.inner.unmap_value(shape, other)
            }
            (None, other) => self.inner.unmap_value(shape, other),
        }
    }
}
