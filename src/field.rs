//! Raw property values exchanged between entities and the mapping pipeline.
//!
//! [`FieldRef`] is what a property getter hands out: scalars already coerced to
//! a [`Value`], nested entities borrowed from their parent, collections as a
//! sequence of element views. [`FieldValue`] is the owned counterpart assigned
//! back through a property setter, and keeps arrays and lists apart so the
//! declared container kind survives a round trip.

use crate::{Error, Result, Value};
use std::any::Any;
use std::fmt;

/// Borrowed view of a property value, read from an entity instance.
pub enum FieldRef<'a> {
    /// Scalar or opaque value
    Value(Value),
    /// Nested entity borrowed from its parent
    Entity(&'a (dyn Any + Send + Sync)),
    /// Elements of an array or list, in iteration order
    Seq(Vec<FieldRef<'a>>),
}

impl<'a> FieldRef<'a> {
    /// Returns a short name for the kind of value, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            FieldRef::Value(value) => value.kind(),
            FieldRef::Entity(_) => "entity",
            FieldRef::Seq(_) => "sequence",
        }
    }

    /// Converts the view into a [`Value`] without any structural mapping.
    ///
    /// Sequences become arrays element by element. A nested entity cannot be
    /// represented without its descriptor, so it is rejected.
    pub fn into_value(self) -> Result<Value> {
        match self {
            FieldRef::Value(value) => Ok(value),
            FieldRef::Seq(items) => items
                .into_iter()
                .map(FieldRef::into_value)
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            FieldRef::Entity(_) => Err(Error::type_conversion("value", "entity")),
        }
    }
}

impl From<Value> for FieldRef<'_> {
    fn from(value: Value) -> Self {
        FieldRef::Value(value)
    }
}

impl fmt::Debug for FieldRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRef::Value(value) => f.debug_tuple("Value").field(value).finish(),
            FieldRef::Entity(_) => f.write_str("Entity(..)"),
            FieldRef::Seq(items) => f.debug_tuple("Seq").field(items).finish(),
        }
    }
}

/// Owned property value, produced by unmapping and assigned to an entity.
pub enum FieldValue {
    /// Scalar or opaque value
    Value(Value),
    /// Freshly deserialized nested entity
    Entity(Box<dyn Any + Send + Sync>),
    /// Elements restored for an array-shaped property
    Array(Vec<FieldValue>),
    /// Elements restored for a list-shaped property
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Returns a short name for the kind of value, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Value(value) => value.kind(),
            FieldValue::Entity(_) => "entity",
            FieldValue::Array(_) => "array",
            FieldValue::List(_) => "list",
        }
    }

    /// Returns `true` if this is an array restored from an array-shaped property.
    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, FieldValue::Array(_))
    }

    /// Returns `true` if this is a list restored from a list-shaped property.
    #[inline]
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, FieldValue::List(_))
    }

    /// Extracts the scalar value, failing for entities and restored collections.
    pub fn into_scalar(self, expected: &str) -> Result<Value> {
        match self {
            FieldValue::Value(value) => Ok(value),
            other => Err(Error::type_conversion(expected, other.kind())),
        }
    }

    /// Extracts collection elements.
    ///
    /// A raw [`Value::Array`] that passed through unmapped is accepted as well,
    /// each item becoming a scalar element.
    pub fn into_elements(self, expected: &str) -> Result<Vec<FieldValue>> {
        match self {
            FieldValue::Array(items) | FieldValue::List(items) => Ok(items),
            FieldValue::Value(Value::Array(items)) => {
                Ok(items.into_iter().map(FieldValue::Value).collect())
            }
            other => Err(Error::type_conversion(expected, other.kind())),
        }
    }

    /// Downcasts a restored entity to its concrete type.
    pub fn into_entity<T: Any>(self) -> Result<T> {
        match self {
            FieldValue::Entity(entity) => entity
                .downcast::<T>()
                .map(|entity| *entity)
                .map_err(|_| Error::entity_mismatch(std::any::type_name::<T>())),
            other => Err(Error::type_conversion(
                std::any::type_name::<T>(),
                other.kind(),
            )),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Value(value)
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Value(value) => f.debug_tuple("Value").field(value).finish(),
            FieldValue::Entity(_) => f.write_str("Entity(..)"),
            FieldValue::Array(items) => f.debug_tuple("Array").field(items).finish(),
            FieldValue::List(items) => f.debug_tuple("List").field(items).finish(),
        }
    }
}
