// Mutation Cache
//
// Metadata registered by compiler passes after mutating an element. Builds of
// the same (declaring type, element) key return the registered value instead
// of walking the hierarchy again, until the cache is cleared.

use crate::metadata::AnnotationMetadata;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MutationKey<E> {
    declaring_type: String,
    element: E,
}

#[derive(Debug)]
pub struct MutationCache<E> {
    entries: RwLock<HashMap<MutationKey<E>, AnnotationMetadata>>,
}

impl<E> Default for MutationCache<E> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<E: Clone + Eq + Hash> MutationCache<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers metadata for a key, replacing any earlier entry.
    pub fn add(&self, declaring_type: &str, element: &E, metadata: AnnotationMetadata) {
        self.entries.write().insert(Self::key(declaring_type, element), metadata);
    }

    pub fn get(&self, declaring_type: &str, element: &E) -> Option<AnnotationMetadata> {
        self.entries
            .read()
            .get(&Self::key(declaring_type, element))
            .cloned()
    }

    pub fn contains(&self, declaring_type: &str, element: &E) -> bool {
        self.entries
            .read()
            .contains_key(&Self::key(declaring_type, element))
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn key(declaring_type: &str, element: &E) -> MutationKey<E> {
        MutationKey {
            declaring_type: declaring_type.to_string(),
            element: element.clone(),
        }
    }
}
