// Default Value Registry
//
// Session-wide record of annotation member defaults, keyed by annotation name.

use crate::annotation::AnnotationValues;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Annotation defaults registered while building. The first value registered
/// for a member wins; later registrations only add missing members.
#[derive(Debug, Default)]
pub struct DefaultValueRegistry {
    defaults: RwLock<HashMap<String, AnnotationValues>>,
}

impl DefaultValueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, annotation: &str, values: &AnnotationValues) {
        let mut defaults = self.defaults.write();
        let existing = defaults.entry(annotation.to_string()).or_default();
        for (member, value) in values {
            if !existing.contains_key(member) {
                existing.insert(member.clone(), value.clone());
            }
        }
    }

    pub fn get(&self, annotation: &str) -> Option<AnnotationValues> {
        self.defaults.read().get(annotation).cloned()
    }

    pub fn contains(&self, annotation: &str) -> bool {
        self.defaults.read().contains_key(annotation)
    }

    pub fn len(&self) -> usize {
        self.defaults.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.defaults.read().is_empty()
    }

    pub fn clear(&self) {
        self.defaults.write().clear();
    }
}
