//! Leaf coercion between Rust property types and [`Value`]s.
//!
//! Every declared property type implements [`Reflect`]. The trait classifies the
//! type once ([`Reflect::shape`]), lends out a raw view of a value
//! ([`Reflect::to_field`]) and rebuilds a value from its restored form
//! ([`Reflect::from_field`]). Recursion into collections and nested entities
//! belongs to the [strategy chain](crate::strategy); the implementations here
//! only expose elements and coerce scalars.
//!
//! Implementations are provided for:
//!
//! - scalars: `bool`, all integer widths, `f32`, `f64`, `char`, `String`,
//!   `DateTime<Utc>`, `BigInt`
//! - `Option<T>` (optional shape)
//! - `Vec<T>`, `VecDeque<T>`, `BTreeSet<T>` (list shape)
//! - `[T; N]`, `Box<[T]>` (array shape)
//! - `Value`, `EntityMap`, `HashMap<String, Value>`, `BTreeMap<String, Value>`
//!   (opaque shape, passed through unchanged)
//! - every [`Entity`](crate::Entity) (entity shape)

use crate::descriptor::{Entity, EntityType};
use crate::{EntityMap, Error, FieldRef, FieldValue, Result, TypeShape, Value};
use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use std::any::type_name;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

/// A type that can be held by an entity property.
///
/// # Examples
///
/// ```rust
/// use entity_map::{FieldValue, Reflect, Value};
///
/// let value = 42u16.to_field().into_value().unwrap();
/// assert_eq!(value, Value::from(42));
///
/// let back = u16::from_field(FieldValue::Value(value)).unwrap();
/// assert_eq!(back, 42);
/// ```
pub trait Reflect: Sized + Send + Sync + 'static {
    /// Returns the structural class of this type.
    fn shape() -> TypeShape;

    /// Returns a raw view of the value.
    fn to_field(&self) -> FieldRef<'_>;

    /// Rebuilds a value from its restored form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeConversion`] if the restored form cannot be coerced
    /// to this type.
    fn from_field(value: FieldValue) -> Result<Self>;
}

impl<T: Entity> Reflect for T {
    fn shape() -> TypeShape {
        TypeShape::Entity(EntityType::of::<T>())
    }

    fn to_field(&self) -> FieldRef<'_> {
        FieldRef::Entity(self)
    }

    fn from_field(value: FieldValue) -> Result<Self> {
        value.into_entity::<T>()
    }
}

macro_rules! impl_reflect_scalar {
    ($($ty:ty),*) => {
        $(
            impl Reflect for $ty {
                fn shape() -> TypeShape {
                    TypeShape::Scalar
                }

                fn to_field(&self) -> FieldRef<'_> {
                    FieldRef::Value(Value::from(self.clone()))
                }

                fn from_field(value: FieldValue) -> Result<Self> {
                    <$ty>::try_from(value.into_scalar(type_name::<$ty>())?)
                }
            }
        )*
    };
}

impl_reflect_scalar!(bool, i64, f64, String, BigInt, DateTime<Utc>);

macro_rules! impl_reflect_narrow_int {
    ($via:ty => $($ty:ty),*) => {
        $(
            impl Reflect for $ty {
                fn shape() -> TypeShape {
                    TypeShape::Scalar
                }

                fn to_field(&self) -> FieldRef<'_> {
                    FieldRef::Value(Value::from(*self))
                }

                fn from_field(value: FieldValue) -> Result<Self> {
                    let wide = <$via>::try_from(value.into_scalar(type_name::<$ty>())?)?;
                    <$ty>::try_from(wide).map_err(|_| {
                        Error::type_conversion(type_name::<$ty>(), "out-of-range integer")
                    })
                }
            }
        )*
    };
}

impl_reflect_narrow_int!(i64 => i8, i16, i32, u8, u16, u32);
impl_reflect_narrow_int!(BigInt => u64, i128, u128);

impl Reflect for usize {
    fn shape() -> TypeShape {
        TypeShape::Scalar
    }

    fn to_field(&self) -> FieldRef<'_> {
        FieldRef::Value(Value::from(*self as u64))
    }

    fn from_field(value: FieldValue) -> Result<Self> {
        let wide = u64::from_field(value)?;
        usize::try_from(wide)
            .map_err(|_| Error::type_conversion("usize", "out-of-range integer"))
    }
}

impl Reflect for f32 {
    fn shape() -> TypeShape {
        TypeShape::Scalar
    }

    fn to_field(&self) -> FieldRef<'_> {
        FieldRef::Value(Value::from(*self))
    }

    fn from_field(value: FieldValue) -> Result<Self> {
        let wide = f64::from_field(value)?;
        if wide.is_finite() && wide.abs() > f64::from(f32::MAX) {
            return Err(Error::type_conversion("f32", "out-of-range float"));
        }
        Ok(wide as f32)
    }
}

impl Reflect for char {
    fn shape() -> TypeShape {
        TypeShape::Scalar
    }

    fn to_field(&self) -> FieldRef<'_> {
        FieldRef::Value(Value::String(self.to_string()))
    }

    fn from_field(value: FieldValue) -> Result<Self> {
        let s = String::from_field(value)?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(Error::type_conversion("char", "multi-character string")),
        }
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn shape() -> TypeShape {
        TypeShape::optional(T::shape())
    }

    fn to_field(&self) -> FieldRef<'_> {
        match self {
            Some(inner) => inner.to_field(),
            None => FieldRef::Value(Value::Null),
        }
    }

    fn from_field(value: FieldValue) -> Result<Self> {
        match value {
            FieldValue::Value(Value::Null) => Ok(None),
            other => T::from_field(other).map(Some),
        }
    }
}

fn restore_elements<T: Reflect>(value: FieldValue, expected: &str) -> Result<Vec<T>> {
    value
        .into_elements(expected)?
        .into_iter()
        .map(T::from_field)
        .collect()
}

impl<T: Reflect> Reflect for Vec<T> {
    fn shape() -> TypeShape {
        TypeShape::list(T::shape())
    }

    fn to_field(&self) -> FieldRef<'_> {
        FieldRef::Seq(self.iter().map(Reflect::to_field).collect())
    }

    fn from_field(value: FieldValue) -> Result<Self> {
        restore_elements(value, "list")
    }
}

impl<T: Reflect> Reflect for VecDeque<T> {
    fn shape() -> TypeShape {
        TypeShape::list(T::shape())
    }

    fn to_field(&self) -> FieldRef<'_> {
        FieldRef::Seq(self.iter().map(Reflect::to_field).collect())
    }

    fn from_field(value: FieldValue) -> Result<Self> {
        restore_elements::<T>(value, "list").map(VecDeque::from)
    }
}

impl<T: Reflect + Ord> Reflect for BTreeSet<T> {
    fn shape() -> TypeShape {
        TypeShape::list(T::shape())
    }

    fn to_field(&self) -> FieldRef<'_> {
        FieldRef::Seq(self.iter().map(Reflect::to_field).collect())
    }

    fn from_field(value: FieldValue) -> Result<Self> {
        restore_elements::<T>(value, "set").map(BTreeSet::from_iter)
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn shape() -> TypeShape {
        TypeShape::array(T::shape())
    }

    fn to_field(&self) -> FieldRef<'_> {
        FieldRef::Seq(self.iter().map(Reflect::to_field).collect())
    }

    fn from_field(value: FieldValue) -> Result<Self> {
        let items = restore_elements::<T>(value, "array")?;
        <[T; N]>::try_from(items).map_err(|items: Vec<T>| {
            Error::type_conversion(
                &format!("array of {} elements", N),
                &format!("{} elements", items.len()),
            )
        })
    }
}

impl<T: Reflect> Reflect for Box<[T]> {
    fn shape() -> TypeShape {
        TypeShape::array(T::shape())
    }

    fn to_field(&self) -> FieldRef<'_> {
        FieldRef::Seq(self.iter().map(Reflect::to_field).collect())
    }

    fn from_field(value: FieldValue) -> Result<Self> {
        restore_elements::<T>(value, "array").map(Vec::into_boxed_slice)
    }
}

impl Reflect for Value {
    fn shape() -> TypeShape {
        TypeShape::Opaque
    }

    fn to_field(&self) -> FieldRef<'_> {
        FieldRef::Value(self.clone())
    }

    fn from_field(value: FieldValue) -> Result<Self> {
        value.into_scalar("value")
    }
}

impl Reflect for EntityMap {
    fn shape() -> TypeShape {
        TypeShape::Opaque
    }

    fn to_field(&self) -> FieldRef<'_> {
        FieldRef::Value(Value::Map(self.clone()))
    }

    fn from_field(value: FieldValue) -> Result<Self> {
        EntityMap::try_from(value.into_scalar("map")?)
    }
}

impl Reflect for HashMap<String, Value> {
    fn shape() -> TypeShape {
        TypeShape::Opaque
    }

    fn to_field(&self) -> FieldRef<'_> {
        FieldRef::Value(Value::Map(EntityMap::from(self.clone())))
    }

    fn from_field(value: FieldValue) -> Result<Self> {
        EntityMap::from_field(value).map(HashMap::from)
    }
}

impl Reflect for BTreeMap<String, Value> {
    fn shape() -> TypeShape {
        TypeShape::Opaque
    }

    fn to_field(&self) -> FieldRef<'_> {
        FieldRef::Value(Value::Map(EntityMap::from(self.clone())))
    }

    fn from_field(value: FieldValue) -> Result<Self> {
        EntityMap::from_field(value).map(|map| map.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn restore<T: Reflect>(value: Value) -> Result<T> {
        T::from_field(FieldValue::Value(value))
    }

    #[test]
    fn test_narrow_int_range_checked() {
        assert_eq!(restore::<u8>(Value::from(255)).unwrap(), 255);

        let err = restore::<u8>(Value::from(256)).unwrap_err();
        assert!(matches!(err, Error::TypeConversion { .. }));

        let err = restore::<i32>(Value::from("12")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "type conversion failed: expected integer, found string"
        );
    }

    #[test]
    fn test_wide_ints_through_bigint() {
        let field = u64::MAX.to_field().into_value().unwrap();
        assert!(field.as_bigint().is_some());
        assert_eq!(restore::<u64>(field).unwrap(), u64::MAX);

        assert_eq!(restore::<i128>(Value::from(-5)).unwrap(), -5);
    }

    #[test]
    fn test_f32_range_checked() {
        assert_eq!(restore::<f32>(Value::from(1.5)).unwrap(), 1.5);
        assert_eq!(restore::<f32>(Value::from(f64::INFINITY)).unwrap(), f32::INFINITY);

        let err = restore::<f32>(Value::from(1e300)).unwrap_err();
        assert!(matches!(err, Error::TypeConversion { .. }));
    }

    #[test]
    fn test_wide_ints_accept_integral_floats() {
        assert_eq!(restore::<u32>(Value::from(5.0)).unwrap(), 5);
        assert_eq!(restore::<u64>(Value::from(5.0)).unwrap(), 5);
        assert_eq!(restore::<u128>(Value::from(5.0)).unwrap(), 5);
        assert!(restore::<i64>(Value::from(2f64.powi(63))).is_err());
    }

    #[test]
    fn test_char_requires_single_character() {
        assert_eq!(restore::<char>(Value::from("x")).unwrap(), 'x');
        assert!(restore::<char>(Value::from("xy")).is_err());
    }

    #[test]
    fn test_option_null_is_none() {
        assert_eq!(restore::<Option<i32>>(Value::Null).unwrap(), None);
        assert_eq!(restore::<Option<i32>>(Value::from(3)).unwrap(), Some(3));
        assert_eq!(
            Option::<i32>::shape(),
            TypeShape::optional(TypeShape::Scalar)
        );
    }

    #[test]
    fn test_fixed_array_length_checked() {
        let restored = <[i32; 2]>::from_field(FieldValue::Array(vec![
            FieldValue::Value(Value::from(1)),
            FieldValue::Value(Value::from(2)),
        ]))
        .unwrap();
        assert_eq!(restored, [1, 2]);

        let err = <[i32; 3]>::from_field(FieldValue::Array(vec![FieldValue::Value(
            Value::from(1),
        )]))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "type conversion failed: expected array of 3 elements, found 1 elements"
        );
    }

    #[test]
    fn test_container_shapes() {
        assert_eq!(Vec::<i32>::shape(), TypeShape::list(TypeShape::Scalar));
        assert_eq!(VecDeque::<i32>::shape(), TypeShape::list(TypeShape::Scalar));
        assert_eq!(BTreeSet::<i32>::shape(), TypeShape::list(TypeShape::Scalar));
        assert_eq!(Box::<[i32]>::shape(), TypeShape::array(TypeShape::Scalar));
        assert_eq!(
            Vec::<[i32; 2]>::shape(),
            TypeShape::list(TypeShape::array(TypeShape::Scalar))
        );
        assert_eq!(HashMap::<String, Value>::shape(), TypeShape::Opaque);
    }

    #[test]
    fn test_date_scalar() {
        let date = DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let value = date.to_field().into_value().unwrap();
        assert_eq!(value, Value::Date(date));
        assert_eq!(restore::<DateTime<Utc>>(value).unwrap(), date);
    }
}
