// Annotation Metadata
//
// Query-facing result of a build: empty, a single store, a hierarchy of a
// parent and a declared part, or a reference to another class' metadata.

use super::store::{DefaultAnnotationMetadata, MutableAnnotationMetadata};
use crate::annotation::{AnnotationValue, AnnotationValues, Value};
use indexmap::IndexSet;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// The metadata of one element.
///
/// Cloning is cheap; every non-empty variant is reference counted. Builders
/// never mutate a value once it is handed out, so `annotate` returns a new one.
#[derive(Debug, Clone, Default)]
pub enum AnnotationMetadata {
    #[default]
    Empty,
    Default(Arc<DefaultAnnotationMetadata>),
    Hierarchy(Arc<AnnotationMetadataHierarchy>),
    Reference(Arc<AnnotationMetadataReference>),
}

/// Metadata inherited from a parent layered under a declared part.
#[derive(Debug, Clone)]
pub struct AnnotationMetadataHierarchy {
    parent: AnnotationMetadata,
    declared: AnnotationMetadata,
}

impl AnnotationMetadataHierarchy {
    pub fn new(parent: AnnotationMetadata, declared: AnnotationMetadata) -> Self {
        Self { parent, declared }
    }

    pub fn parent(&self) -> &AnnotationMetadata {
        &self.parent
    }

    pub fn declared(&self) -> &AnnotationMetadata {
        &self.declared
    }

    /// A hierarchy over the same parent with a different declared part.
    pub fn create_sibling(&self, declared: AnnotationMetadata) -> AnnotationMetadata {
        AnnotationMetadata::hierarchy(self.parent.clone(), declared)
    }
}

/// Metadata owned by another class, referred to by that class' name.
#[derive(Debug, Clone)]
pub struct AnnotationMetadataReference {
    class_name: String,
    target: AnnotationMetadata,
}

impl AnnotationMetadataReference {
    pub fn new(class_name: impl Into<String>, target: AnnotationMetadata) -> Self {
        Self {
            class_name: class_name.into(),
            target,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn target(&self) -> &AnnotationMetadata {
        &self.target
    }
}

impl AnnotationMetadata {
    /// Freezes a store. An empty store collapses to [`AnnotationMetadata::Empty`].
    pub fn from_store(store: MutableAnnotationMetadata) -> Self {
        if store.is_empty() {
            AnnotationMetadata::Empty
        } else {
            AnnotationMetadata::Default(Arc::new(store.into_inner()))
        }
    }

    pub fn hierarchy(parent: AnnotationMetadata, declared: AnnotationMetadata) -> Self {
        AnnotationMetadata::Hierarchy(Arc::new(AnnotationMetadataHierarchy::new(parent, declared)))
    }

    pub fn reference(class_name: impl Into<String>, target: AnnotationMetadata) -> Self {
        AnnotationMetadata::Reference(Arc::new(AnnotationMetadataReference::new(
            class_name, target,
        )))
    }

    /// Identity comparison; two handles are equal when they share storage.
    pub fn ptr_eq(&self, other: &AnnotationMetadata) -> bool {
        match (self, other) {
            (AnnotationMetadata::Empty, AnnotationMetadata::Empty) => true,
            (AnnotationMetadata::Default(a), AnnotationMetadata::Default(b)) => Arc::ptr_eq(a, b),
            (AnnotationMetadata::Hierarchy(a), AnnotationMetadata::Hierarchy(b)) => {
                Arc::ptr_eq(a, b)
            }
            (AnnotationMetadata::Reference(a), AnnotationMetadata::Reference(b)) => {
                Arc::ptr_eq(a, b)
            }
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            AnnotationMetadata::Empty => true,
            AnnotationMetadata::Default(data) => data.is_empty(),
            AnnotationMetadata::Hierarchy(h) => h.parent.is_empty() && h.declared.is_empty(),
            AnnotationMetadata::Reference(r) => r.target.is_empty(),
        }
    }

    pub fn has_annotation(&self, annotation: &str) -> bool {
        self.any(|data| data.has_annotation(annotation))
    }

    pub fn has_stereotype(&self, annotation: &str) -> bool {
        self.any(|data| data.has_stereotype(annotation))
    }

    pub fn has_declared_annotation(&self, annotation: &str) -> bool {
        self.declared_part()
            .is_some_and(|data| data.has_declared_annotation(annotation))
    }

    pub fn has_declared_stereotype(&self, annotation: &str) -> bool {
        self.declared_part()
            .is_some_and(|data| data.has_declared_stereotype(annotation))
    }

    pub fn annotation_names(&self) -> Vec<String> {
        self.collect_names(|data| data.annotation_names().map(str::to_string).collect())
    }

    pub fn declared_annotation_names(&self) -> Vec<String> {
        self.declared_part()
            .map(|data| data.declared_annotation_names().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn stereotype_names(&self) -> Vec<String> {
        self.collect_names(|data| data.stereotype_names().map(str::to_string).collect())
    }

    pub fn declared_stereotype_names(&self) -> Vec<String> {
        self.declared_part()
            .map(|data| data.declared_stereotype_names().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn annotation_names_by_stereotype(&self, stereotype: &str) -> Vec<String> {
        self.collect_names(|data| data.annotation_names_by_stereotype(stereotype))
    }

    /// Member values of an annotation; the most specific layer wins.
    pub fn values(&self, annotation: &str) -> Option<&AnnotationValues> {
        self.find(|data| data.values(annotation))
    }

    pub fn value(&self, annotation: &str, member: &str) -> Option<&Value> {
        self.find(|data| data.value(annotation, member))
    }

    pub fn string_value(&self, annotation: &str, member: &str) -> Option<&str> {
        self.value(annotation, member).and_then(Value::as_name)
    }

    pub fn default_values(&self, annotation: &str) -> Option<&AnnotationValues> {
        self.find(|data| data.default_values(annotation))
    }

    pub fn annotation_values_by_type(&self, annotation: &str) -> Vec<AnnotationValue> {
        let mut found = Vec::new();
        self.for_each_layer(&mut |data| {
            for value in data.annotation_values_by_type(annotation) {
                if !found.contains(&value) {
                    found.push(value);
                }
            }
        });
        found
    }

    pub fn declared_annotation_values_by_type(&self, annotation: &str) -> Vec<AnnotationValue> {
        self.declared_part()
            .map(|data| data.declared_annotation_values_by_type(annotation))
            .unwrap_or_default()
    }

    /// The store holding the element's own declared annotations, if any.
    pub fn declared_part(&self) -> Option<&DefaultAnnotationMetadata> {
        match self {
            AnnotationMetadata::Empty => None,
            AnnotationMetadata::Default(data) => Some(data),
            AnnotationMetadata::Hierarchy(h) => h.declared.declared_part(),
            AnnotationMetadata::Reference(r) => r.target.declared_part(),
        }
    }

    /// Flattens every layer into one store. Declared partitions only come
    /// from the declared layer.
    pub fn snapshot(&self) -> DefaultAnnotationMetadata {
        match self {
            AnnotationMetadata::Empty => DefaultAnnotationMetadata::default(),
            AnnotationMetadata::Default(data) => data.as_ref().clone(),
            AnnotationMetadata::Hierarchy(h) => {
                let mut merged = MutableAnnotationMetadata::from_existing(&h.declared.snapshot());
                merged.absorb(&h.parent.snapshot(), false);
                merged.into_inner()
            }
            AnnotationMetadata::Reference(r) => r.target.snapshot(),
        }
    }

    fn any(&self, mut predicate: impl FnMut(&DefaultAnnotationMetadata) -> bool) -> bool {
        let mut found = false;
        self.for_each_layer(&mut |data| found = found || predicate(data));
        found
    }

    fn find<'a, T: ?Sized>(
        &'a self,
        lookup: impl Fn(&'a DefaultAnnotationMetadata) -> Option<&'a T> + Copy,
    ) -> Option<&'a T> {
        match self {
            AnnotationMetadata::Empty => None,
            AnnotationMetadata::Default(data) => lookup(data),
            AnnotationMetadata::Hierarchy(h) => {
                h.declared.find(lookup).or_else(|| h.parent.find(lookup))
            }
            AnnotationMetadata::Reference(r) => r.target.find(lookup),
        }
    }

    fn collect_names(
        &self,
        names: impl Fn(&DefaultAnnotationMetadata) -> Vec<String>,
    ) -> Vec<String> {
        let mut all = IndexSet::new();
        self.for_each_layer(&mut |data| all.extend(names(data)));
        all.into_iter().collect()
    }

    /// Visits stores from the most specific layer to the most general.
    fn for_each_layer(&self, visit: &mut dyn FnMut(&DefaultAnnotationMetadata)) {
        match self {
            AnnotationMetadata::Empty => {}
            AnnotationMetadata::Default(data) => visit(data),
            AnnotationMetadata::Hierarchy(h) => {
                h.declared.for_each_layer(visit);
                h.parent.for_each_layer(visit);
            }
            AnnotationMetadata::Reference(r) => r.target.for_each_layer(visit),
        }
    }
}

impl Serialize for AnnotationMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.snapshot().serialize(serializer)
    }
}
