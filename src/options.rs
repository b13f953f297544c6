//! Configuration options for the default property mapper.
//!
//! This module provides types to customize how properties become map keys and
//! how unexpected map contents are treated:
//!
//! - [`MapperOptions`]: Main configuration struct
//! - [`NamingConvention`]: Case conversion applied to declared property names
//! - [`MissingKeyPolicy`]: What happens when a property has no entry in the map
//! - [`DuplicateKeyPolicy`]: What happens when two properties resolve to one key
//!
//! ## Examples
//!
//! ```rust
//! use entity_map::{DuplicateKeyPolicy, MapperOptions, NamingConvention};
//!
//! let options = MapperOptions::new()
//!     .with_naming(NamingConvention::PascalCase)
//!     .with_duplicate_keys(DuplicateKeyPolicy::Reject);
//!
//! assert_eq!(options.naming.apply("user_name"), "UserName");
//! ```

use convert_case::{Case, Casing};

/// Case conversion applied to declared property names.
///
/// # Examples
///
/// ```rust
/// use entity_map::NamingConvention;
///
/// assert_eq!(NamingConvention::AsDeclared.apply("user_id"), "user_id");
/// assert_eq!(NamingConvention::PascalCase.apply("user_id"), "UserId");
/// assert_eq!(NamingConvention::CamelCase.apply("user_id"), "userId");
/// assert_eq!(NamingConvention::KebabCase.apply("user_id"), "user-id");
/// assert_eq!(NamingConvention::ScreamingSnakeCase.apply("user_id"), "USER_ID");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum NamingConvention {
    #[default]
    AsDeclared,
    PascalCase,
    CamelCase,
    SnakeCase,
    KebabCase,
    ScreamingSnakeCase,
}

impl NamingConvention {
    /// Converts a declared property name to a map key.
    #[must_use]
    pub fn apply(&self, name: &str) -> String {
        match self {
            NamingConvention::AsDeclared => name.to_owned(),
            NamingConvention::PascalCase => name.to_case(Case::Pascal),
            NamingConvention::CamelCase => name.to_case(Case::Camel),
            NamingConvention::SnakeCase => name.to_case(Case::Snake),
            NamingConvention::KebabCase => name.to_case(Case::Kebab),
            NamingConvention::ScreamingSnakeCase => name.to_case(Case::UpperSnake),
        }
    }
}

/// Treatment of properties absent from the map during deserialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MissingKeyPolicy {
    /// Leave the property at its constructor default
    #[default]
    Ignore,
    /// Fail with [`Error::MissingKey`](crate::Error::MissingKey)
    Reject,
}

/// Treatment of two properties resolving to the same key during serialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DuplicateKeyPolicy {
    /// The later property overwrites the earlier entry
    #[default]
    LastWriteWins,
    /// Fail with [`Error::DuplicateKey`](crate::Error::DuplicateKey)
    Reject,
}

/// Configuration for [`DefaultPropertyMapper`](crate::DefaultPropertyMapper).
///
/// The defaults are permissive: names are used as declared, missing keys are
/// ignored and colliding keys overwrite each other.
///
/// # Examples
///
/// ```rust
/// use entity_map::{MapperOptions, MissingKeyPolicy, NamingConvention};
///
/// let options = MapperOptions::new();
/// assert_eq!(options.naming, NamingConvention::AsDeclared);
///
/// let strict = MapperOptions::strict();
/// assert_eq!(strict.missing_keys, MissingKeyPolicy::Reject);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MapperOptions {
    pub naming: NamingConvention,
    pub missing_keys: MissingKeyPolicy,
    pub duplicate_keys: DuplicateKeyPolicy,
}

impl MapperOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options that reject both missing and duplicate keys.
    #[must_use]
    pub fn strict() -> Self {
        MapperOptions {
            missing_keys: MissingKeyPolicy::Reject,
            duplicate_keys: DuplicateKeyPolicy::Reject,
            ..Default::default()
        }
    }

    /// Sets the naming convention for map keys.
    #[must_use]
    pub fn with_naming(mut self, naming: NamingConvention) -> Self {
        self.naming = naming;
        self
    }

    /// Sets the policy for properties absent from the map.
    #[must_use]
    pub fn with_missing_keys(mut self, policy: MissingKeyPolicy) -> Self {
        self.missing_keys = policy;
        self
    }

    /// Sets the policy for colliding keys.
    #[must_use]
    pub fn with_duplicate_keys(mut self, policy: DuplicateKeyPolicy) -> Self {
        self.duplicate_keys = policy;
        self
    }
}
