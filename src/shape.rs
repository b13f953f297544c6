//! Declared-type classification.
//!
//! A [`TypeShape`] is computed once per property, when its entity descriptor is
//! built, from [`Reflect::shape`](crate::Reflect::shape). The mapping pipeline
//! dispatches on this tag afterwards instead of inspecting values at runtime.

use crate::descriptor::EntityType;
use std::fmt;

/// The structural class of a declared property type.
///
/// # Examples
///
/// ```rust
/// use entity_map::{Reflect, TypeShape};
///
/// assert_eq!(i32::shape(), TypeShape::Scalar);
/// assert_eq!(Vec::<String>::shape(), TypeShape::list(TypeShape::Scalar));
/// assert_eq!(<[u8; 4]>::shape(), TypeShape::array(TypeShape::Scalar));
/// assert_eq!(Vec::<String>::shape().element(), Some(&TypeShape::Scalar));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum TypeShape {
    /// Leaf value converted directly to and from a [`Value`](crate::Value)
    Scalar,
    /// Nested entity, serialized as a nested map through its own descriptor
    Entity(EntityType),
    /// Nullable wrapper around another shape
    Optional(Box<TypeShape>),
    /// Fixed-size or boxed-slice container of the element shape
    Array(Box<TypeShape>),
    /// Growable single-type-argument container of the element shape
    List(Box<TypeShape>),
    /// Value whose element type cannot be determined; passed through unchanged
    Opaque,
}

impl TypeShape {
    /// Creates an array shape around `element`.
    #[must_use]
    pub fn array(element: TypeShape) -> Self {
        TypeShape::Array(Box::new(element))
    }

    /// Creates a list shape around `element`.
    #[must_use]
    pub fn list(element: TypeShape) -> Self {
        TypeShape::List(Box::new(element))
    }

    /// Creates an optional shape around `inner`.
    #[must_use]
    pub fn optional(inner: TypeShape) -> Self {
        TypeShape::Optional(Box::new(inner))
    }

    /// Returns the element shape of an array or list, `None` for everything else.
    #[must_use]
    pub fn element(&self) -> Option<&TypeShape> {
        match self {
            TypeShape::Array(element) | TypeShape::List(element) => Some(element),
            _ => None,
        }
    }

    /// Returns `true` if the shape is a nested entity.
    #[inline]
    #[must_use]
    pub const fn is_entity(&self) -> bool {
        matches!(self, TypeShape::Entity(_))
    }

    /// Returns `true` if the shape is an array.
    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, TypeShape::Array(_))
    }

    /// Returns `true` if the shape is an array or a list.
    #[inline]
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, TypeShape::Array(_) | TypeShape::List(_))
    }

    /// Returns the entity type if the shape is a nested entity.
    #[must_use]
    pub fn entity_type(&self) -> Option<&EntityType> {
        match self {
            TypeShape::Entity(ty) => Some(ty),
            _ => None,
        }
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeShape::Scalar => write!(f, "scalar"),
            TypeShape::Entity(ty) => write!(f, "entity {}", ty.name()),
            TypeShape::Optional(inner) => write!(f, "optional<{}>", inner),
            TypeShape::Array(element) => write!(f, "array<{}>", element),
            TypeShape::List(element) => write!(f, "list<{}>", element),
            TypeShape::Opaque => write!(f, "opaque"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_only_for_collections() {
        let list = TypeShape::list(TypeShape::Scalar);
        assert_eq!(list.element(), Some(&TypeShape::Scalar));

        let nested = TypeShape::array(TypeShape::list(TypeShape::Scalar));
        assert_eq!(nested.element(), Some(&TypeShape::list(TypeShape::Scalar)));

        assert_eq!(TypeShape::Opaque.element(), None);
        assert_eq!(TypeShape::optional(TypeShape::Scalar).element(), None);
    }

    #[test]
    fn test_display() {
        let shape = TypeShape::optional(TypeShape::array(TypeShape::list(TypeShape::Scalar)));
        assert_eq!(shape.to_string(), "optional<array<list<scalar>>>");
    }
}
