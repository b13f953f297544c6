//! Error types for entity mapping.
//!
//! Every failure surfaces synchronously to the caller of
//! [`CachedEntity::serialize_to_map`](crate::CachedEntity::serialize_to_map) or
//! [`CachedEntity::deserialize_from_map`](crate::CachedEntity::deserialize_from_map).
//! Nothing is retried; all of these indicate a schema or configuration bug rather
//! than a transient condition.
//!
//! Errors raised while handling a property reach the caller as the variant they
//! were raised with, however deeply the property is nested. The failing
//! property is logged at debug level.
//!
//! ## Error Categories
//!
//! - **Instantiation**: the entity registered no zero-argument constructor
//! - **Type conversion**: a leaf value could not be coerced to the declared property type
//! - **Entity mismatch**: a type-erased entity did not match the descriptor it was handed to
//! - **Policy violations**: missing or duplicate keys, only under the strict policies
//!
//! ## Examples
//!
//! ```rust
//! use entity_map::Error;
//!
//! let err = Error::type_conversion("integer", "string");
//! assert!(err.to_string().contains("expected integer"));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised while mapping entities to and from maps.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The entity type offers no zero-argument construction path
    #[error("cannot instantiate {type_name}: no constructor registered")]
    Instantiation { type_name: &'static str },

    /// A leaf value could not be coerced to the declared property type
    #[error("type conversion failed: expected {expected}, found {found}")]
    TypeConversion { expected: String, found: String },

    /// A type-erased entity did not downcast to the expected type
    #[error("entity mismatch: value is not a {expected}")]
    EntityMismatch { expected: &'static str },

    /// A property key was absent and the missing-key policy rejects that
    #[error("missing key `{key}` for {type_name}")]
    MissingKey { type_name: &'static str, key: String },

    /// Two properties resolved to the same key and the duplicate-key policy rejects that
    #[error("duplicate key `{key}` for {type_name}")]
    DuplicateKey { type_name: &'static str, key: String },

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates an instantiation error for a type without a registered constructor.
    pub fn instantiation(type_name: &'static str) -> Self {
        Error::Instantiation { type_name }
    }

    /// Creates a type conversion error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use entity_map::Error;
    ///
    /// let err = Error::type_conversion("bool", "number");
    /// assert_eq!(err.to_string(), "type conversion failed: expected bool, found number");
    /// ```
    pub fn type_conversion(expected: &str, found: &str) -> Self {
        Error::TypeConversion {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates an entity mismatch error.
    pub fn entity_mismatch(expected: &'static str) -> Self {
        Error::EntityMismatch { expected }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_conversion_display() {
        let err = Error::type_conversion("integer", "string");
        assert_eq!(
            err.to_string(),
            "type conversion failed: expected integer, found string"
        );
    }

    #[test]
    fn test_policy_errors_name_the_key() {
        let err = Error::MissingKey {
            type_name: "User",
            key: "Username".to_string(),
        };
        assert_eq!(err.to_string(), "missing key `Username` for User");

        let err = Error::instantiation("Address");
        assert_eq!(
            err.to_string(),
            "cannot instantiate Address: no constructor registered"
        );
    }
}
