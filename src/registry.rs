//! Process-wide cache of entity descriptors.
//!
//! Descriptors are keyed by [`TypeId`] and built on first request. The write
//! lock is held while a descriptor is built and the map is re-checked under it,
//! so concurrent first access runs [`Entity::describe`] exactly once per type.
//! After that every lookup is a read-locked map hit returning a shared [`Arc`].

use crate::descriptor::{Entity, EntityDescriptor};
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

type DescriptorMap = HashMap<TypeId, Arc<EntityDescriptor>>;

static DESCRIPTORS: OnceLock<RwLock<DescriptorMap>> = OnceLock::new();

fn descriptors() -> &'static RwLock<DescriptorMap> {
    DESCRIPTORS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Returns the cached descriptor for `T`, building it on first use.
///
/// # Examples
///
/// ```rust
/// use entity_map::{registry, Entity, SchemaBuilder};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Tag {
///     label: String,
/// }
///
/// impl Entity for Tag {
///     fn describe(schema: &mut SchemaBuilder<Self>) {
///         schema.construct_default();
///         schema.property("label", |t: &Tag| &t.label, |t: &mut Tag| &mut t.label);
///     }
/// }
///
/// let first = registry::descriptor_of::<Tag>();
/// let second = registry::descriptor_of::<Tag>();
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
pub fn descriptor_of<T: Entity>() -> Arc<EntityDescriptor> {
    let id = TypeId::of::<T>();

    // A panic inside `describe` never leaves a partial entry behind, so a
    // poisoned lock still guards a consistent map.
    if let Some(found) = descriptors()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
    {
        return Arc::clone(found);
    }

    let mut map = descriptors()
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    let descriptor = map.entry(id).or_insert_with(|| {
        let descriptor = EntityDescriptor::build::<T>();
        log::debug!(
            "built entity descriptor for {} ({} properties, constructible: {})",
            type_name::<T>(),
            descriptor.len(),
            descriptor.is_constructible()
        );
        Arc::new(descriptor)
    });
    Arc::clone(descriptor)
}

/// Returns `true` if a descriptor for `T` has already been built.
#[must_use]
pub fn is_registered<T: Entity>() -> bool {
    descriptors()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .contains_key(&TypeId::of::<T>())
}

/// Returns the number of cached descriptors.
#[must_use]
pub fn len() -> usize {
    descriptors()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SchemaBuilder;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    static DESCRIBE_CALLS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Default)]
    struct Counted {
        value: i32,
    }

    impl Entity for Counted {
        fn describe(schema: &mut SchemaBuilder<Self>) {
            DESCRIBE_CALLS.fetch_add(1, Ordering::SeqCst);
            schema.construct_default();
            schema.property("value", |c: &Counted| &c.value, |c: &mut Counted| &mut c.value);
        }
    }

    #[derive(Default)]
    struct Untouched {
        value: i32,
    }

    impl Entity for Untouched {
        fn describe(schema: &mut SchemaBuilder<Self>) {
            schema.property("value", |u: &Untouched| &u.value, |u: &mut Untouched| &mut u.value);
        }
    }

    #[test]
    fn test_concurrent_first_access_builds_once() {
        let handles: Vec<_> = (0..8)
            .map(|_| thread::spawn(descriptor_of::<Counted>))
            .collect();
        let descriptors: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(DESCRIBE_CALLS.load(Ordering::SeqCst), 1);
        assert!(descriptors.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert!(is_registered::<Counted>());
    }

    #[test]
    fn test_lookup_is_lazy() {
        assert!(!is_registered::<Untouched>());
        let descriptor = descriptor_of::<Untouched>();
        assert_eq!(descriptor.len(), 1);
        assert!(is_registered::<Untouched>());
        assert!(len() >= 1);
    }
}
